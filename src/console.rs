use bevy::log::BoxedLayer;
use bevy::log::tracing;
use bevy::log::tracing_subscriber;
use bevy::prelude::*;
use bevy_egui::egui;
use std::collections::VecDeque;
use std::sync::mpsc;

/// Severity of a captured log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    pub const ALL: [LogSeverity; 4] = [
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];

    pub fn color(&self) -> egui::Color32 {
        match self {
            LogSeverity::Debug => egui::Color32::LIGHT_GRAY,
            LogSeverity::Info => egui::Color32::WHITE,
            LogSeverity::Warn => egui::Color32::from_rgb(255, 200, 0),
            LogSeverity::Error => egui::Color32::from_rgb(255, 100, 100),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO",
            LogSeverity::Warn => "WARN",
            LogSeverity::Error => "ERROR",
        }
    }

    fn from_tracing(level: tracing::Level) -> Option<Self> {
        Some(match level {
            tracing::Level::TRACE => return None,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        })
    }
}

/// A log line captured from the tracing system.
#[derive(Clone, Debug, Message)]
pub struct LogLine {
    pub severity: LogSeverity,
    pub message: String,
    pub target: String,
}

/// Non-send resource holding the receiving end of the capture channel.
struct CapturedLogLines(mpsc::Receiver<LogLine>);

/// The lines shown in the console panel, oldest first.
#[derive(Resource)]
pub struct LevelKitLogHistory {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl LevelKitLogHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: LogLine) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for LevelKitLogHistory {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Which severities the console panel shows.
#[derive(Debug, Clone)]
pub struct ConsoleFilters {
    shown: [bool; 4],
}

impl Default for ConsoleFilters {
    fn default() -> Self {
        Self {
            shown: [false, true, true, true],
        }
    }
}

impl ConsoleFilters {
    pub fn shows(&self, severity: LogSeverity) -> bool {
        self.shown[severity as usize]
    }

    pub fn set_shown(&mut self, severity: LogSeverity, shown: bool) {
        self.shown[severity as usize] = shown;
    }

    pub(crate) fn checkboxes(&mut self, ui: &mut egui::Ui) {
        for severity in LogSeverity::ALL {
            ui.checkbox(&mut self.shown[severity as usize], severity.label());
        }
    }
}

/// Draw the captured log lines with their filter bar.
pub(crate) fn console_ui(
    ui: &mut egui::Ui,
    filters: &mut ConsoleFilters,
    history: Option<&mut LevelKitLogHistory>,
) {
    let Some(history) = history else {
        ui.label("Log capture is not enabled. Install `console_layer_factory` in the LogPlugin.");
        return;
    };

    ui.horizontal(|ui| {
        ui.label("Filters:");
        filters.checkboxes(ui);
        ui.separator();
        if ui.button("Clear").clicked() {
            history.clear();
        }
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("levelkit_console")
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .max_height(400.0)
        .show(ui, |ui| {
            for line in history.lines().filter(|line| filters.shows(line.severity)) {
                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(line.severity.color(), format!("[{}]", line.severity.label()));
                    ui.label(&line.message);
                });
            }
        });
}

/// Tracing layer forwarding every event to the console.
pub struct LevelKitConsoleLayer {
    sender: mpsc::Sender<LogLine>,
}

impl LevelKitConsoleLayer {
    pub fn new(sender: mpsc::Sender<LogLine>) -> Self {
        Self { sender }
    }
}

impl<S> tracing_subscriber::Layer<S> for LevelKitConsoleLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let Some(severity) = LogSeverity::from_tracing(*metadata.level()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Some(message) = visitor.message {
            // The receiver is gone once the app shuts down.
            let _ = self.sender.send(LogLine {
                severity,
                message,
                target: metadata.target().to_string(),
            });
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value).trim_matches('"').to_string());
        }
    }
}

fn drain_captured_lines(
    receiver: NonSend<CapturedLogLines>,
    mut writer: MessageWriter<LogLine>,
) {
    writer.write_batch(receiver.0.try_iter());
}

fn record_log_lines(
    mut reader: MessageReader<LogLine>,
    history: Option<ResMut<LevelKitLogHistory>>,
) {
    let Some(mut history) = history else {
        return;
    };
    for line in reader.read() {
        history.push(line.clone());
    }
}

/// Creates the tracing layer that feeds the level editor console.
///
/// Pass it as the custom layer of Bevy's `LogPlugin`:
///
/// ```no_run
/// # use bevy::{prelude::*, log::LogPlugin};
/// # use bevy_levelkit::console_layer_factory;
/// App::new().add_plugins(DefaultPlugins.set(LogPlugin {
///     custom_layer: console_layer_factory,
///     ..default()
/// }));
/// ```
pub fn console_layer_factory(app: &mut App) -> Option<BoxedLayer> {
    let (sender, receiver) = mpsc::channel();

    app.insert_non_send_resource(CapturedLogLines(receiver));
    app.init_resource::<LevelKitLogHistory>();
    app.add_message::<LogLine>();
    app.add_systems(Update, (drain_captured_lines, record_log_lines).chain());

    Some(Box::new(LevelKitConsoleLayer::new(sender)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(severity: LogSeverity, message: &str) -> LogLine {
        LogLine {
            severity,
            message: message.to_owned(),
            target: "test".to_owned(),
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = LevelKitLogHistory::new(2);
        history.push(line(LogSeverity::Info, "a"));
        history.push(line(LogSeverity::Warn, "b"));
        history.push(line(LogSeverity::Error, "c"));
        let messages: Vec<_> = history.lines().map(|line| line.message.as_str()).collect();
        assert_eq!(messages, ["b", "c"]);
    }

    #[test]
    fn test_default_filters_hide_debug() {
        let mut filters = ConsoleFilters::default();
        assert!(!filters.shows(LogSeverity::Debug));
        assert!(filters.shows(LogSeverity::Error));
        filters.set_shown(LogSeverity::Debug, true);
        assert!(filters.shows(LogSeverity::Debug));
    }
}
