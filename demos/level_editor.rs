use std::path::Path;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_levelkit::prelude::*;
use bevy_levelkit::console_layer_factory;

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(LogPlugin {
        custom_layer: console_layer_factory,
        ..default()
    }));
    app.add_plugins(LevelKitPlugin {
        levels_directory: Path::new(".").join("assets").join("levels"),
        settings_path: Some(Path::new(".").join("level_editor_settings.json")),
    });
    app.add_systems(Startup, |mut commands: Commands| {
        commands.spawn(Camera2d);
    });
    app.add_systems(Update, show_selected_background);
    app.run();
}

/// Paint the window with the background color of the selected level.
fn show_selected_background(
    mut session: ResMut<LevelEditorSession>,
    store: Res<LevelStore>,
    mut clear_color: ResMut<ClearColor>,
) {
    let color = session
        .selected(&store)
        .map_or(LevelColor::rgb(0.1, 0.1, 0.1), |level| level.background_color);
    clear_color.0 = color.into();
}
