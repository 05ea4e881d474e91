use std::fmt;

use bevy::prelude::*;
use bevy_egui::egui;
use serde::{Deserialize, Serialize};

/// The file extension used for level files.
pub const LEVEL_FILE_EXTENSION: &str = "level";

/// Where a level is stored inside a [`LevelRepository`](crate::LevelRepository).
///
/// Locations are repository-relative paths with forward slashes, e.g. `Level_3.level` or
/// `chapter1/Level_3_Copy.level`. The location - not the content - is what makes a level a
/// distinct entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelLocation(String);

impl LevelLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The default location for a freshly created level with the given number.
    pub fn for_level_number(id: u32) -> Self {
        Self(format!("Level_{id}.{LEVEL_FILE_EXTENSION}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory part, without the trailing slash. Empty for top-level locations.
    pub fn directory(&self) -> &str {
        match self.0.rfind('/') {
            Some(index) => &self.0[..index],
            None => "",
        }
    }

    /// File name without directory and without extension.
    pub fn stem(&self) -> &str {
        let file_name = match self.0.rfind('/') {
            Some(index) => &self.0[index + 1..],
            None => &self.0,
        };
        match file_name.rfind('.') {
            Some(0) | None => file_name,
            Some(index) => &file_name[..index],
        }
    }

    /// Extension without the dot, if there is one.
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.0.rsplit('/').next().unwrap_or(&self.0);
        match file_name.rfind('.') {
            Some(0) | None => None,
            Some(index) => Some(&file_name[index + 1..]),
        }
    }

    /// A sibling location in the same directory with a different stem (same extension).
    pub fn with_stem(&self, stem: &str) -> Self {
        let mut path = String::new();
        let directory = self.directory();
        if !directory.is_empty() {
            path.push_str(directory);
            path.push('/');
        }
        path.push_str(stem);
        if let Some(extension) = self.extension() {
            path.push('.');
            path.push_str(extension);
        }
        Self(path)
    }
}

impl fmt::Display for LevelLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LevelColor {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Sum of the absolute per-channel differences.
    pub fn distance(&self, other: &Self) -> f32 {
        (self.r - other.r).abs()
            + (self.g - other.g).abs()
            + (self.b - other.b).abs()
            + (self.a - other.a).abs()
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// `RRGGBBAA`, uppercase, no leading `#`.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(channel_to_byte);
        format!("{r:02X}{g:02X}{b:02X}{a:02X}")
    }

    /// Parses `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return None;
        }
        let byte = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();
        let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
        Some(Self::rgba(
            byte(0)? as f32 / 255.0,
            byte(2)? as f32 / 255.0,
            byte(4)? as f32 / 255.0,
            alpha as f32 / 255.0,
        ))
    }
}

fn channel_to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Default for LevelColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<LevelColor> for egui::Color32 {
    fn from(color: LevelColor) -> Self {
        egui::Rgba::from_rgba_unmultiplied(color.r, color.g, color.b, color.a).into()
    }
}

impl From<egui::Color32> for LevelColor {
    fn from(color: egui::Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }
}

impl From<LevelColor> for Color {
    fn from(color: LevelColor) -> Self {
        Color::srgba(color.r, color.g, color.b, color.a)
    }
}

/// The tile symbols a level layout is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Empty,
    Wall,
    Player,
    Enemy,
    Collectible,
    Special,
}

impl TileKind {
    pub const ALL: [TileKind; 6] = [
        TileKind::Empty,
        TileKind::Wall,
        TileKind::Player,
        TileKind::Enemy,
        TileKind::Collectible,
        TileKind::Special,
    ];

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Some(match symbol {
            '.' => Self::Empty,
            '#' => Self::Wall,
            'P' => Self::Player,
            'E' => Self::Enemy,
            'C' => Self::Collectible,
            'S' => Self::Special,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => '#',
            Self::Player => 'P',
            Self::Enemy => 'E',
            Self::Collectible => 'C',
            Self::Special => 'S',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Wall => "Wall",
            Self::Player => "Player",
            Self::Enemy => "Enemy",
            Self::Collectible => "Collectible",
            Self::Special => "Special",
        }
    }

    /// The color used when previewing this tile.
    pub fn color(&self) -> LevelColor {
        match self {
            Self::Empty => LevelColor::rgb(0.9, 0.9, 0.9),
            Self::Wall => LevelColor::rgb(0.3, 0.3, 0.3),
            Self::Player => LevelColor::rgb(0.2, 0.8, 0.2),
            Self::Enemy => LevelColor::rgb(0.8, 0.2, 0.2),
            Self::Collectible => LevelColor::rgb(1.0, 0.8, 0.2),
            Self::Special => LevelColor::rgb(0.2, 0.6, 1.0),
        }
    }
}

/// Preview color for any layout symbol. Unknown symbols are white.
pub fn tile_color(symbol: char) -> LevelColor {
    TileKind::from_symbol(symbol).map_or(LevelColor::WHITE, |kind| kind.color())
}

/// A level description: its number, grid dimensions, background color and layout rows.
///
/// Records are plain values - edit the fields directly and hand the record to
/// [`LevelStore::apply_changes`](crate::LevelStore::apply_changes) to persist the edits. The
/// [`location`](Self::location) binding is owned by the [`LevelStore`](crate::LevelStore).
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRecord {
    pub id: u32,
    pub width: i32,
    pub height: i32,
    pub background_color: LevelColor,
    pub layout: Vec<String>,
    pub(crate) location: Option<LevelLocation>,
}

impl LevelRecord {
    /// A record with a white background and `height` rows of `width` empty tiles.
    ///
    /// Non-positive dimensions produce an empty layout (and a record that fails validation).
    pub fn new_blank(id: u32, width: i32, height: i32) -> Self {
        let row = ".".repeat(width.max(0) as usize);
        Self {
            id,
            width,
            height,
            background_color: LevelColor::WHITE,
            layout: vec![row; height.max(0) as usize],
            location: None,
        }
    }

    /// The location this record is persisted at, if it was loaded from or saved to a store.
    pub fn location(&self) -> Option<&LevelLocation> {
        self.location.as_ref()
    }

    /// Same id, dimensions, color and layout, wherever the two records are stored.
    pub fn same_contents(&self, other: &Self) -> bool {
        self.id == other.id
            && self.width == other.width
            && self.height == other.height
            && self.background_color == other.background_color
            && self.layout == other.layout
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<char> {
        self.layout.get(row)?.chars().nth(col)
    }

    /// Replaces a single layout symbol. Returns `false` if the cell does not exist.
    pub fn set_cell(&mut self, row: usize, col: usize, symbol: char) -> bool {
        let Some(line) = self.layout.get_mut(row) else {
            return false;
        };
        let mut chars: Vec<char> = line.chars().collect();
        let Some(cell) = chars.get_mut(col) else {
            return false;
        };
        *cell = symbol;
        *line = chars.into_iter().collect();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parts() {
        let location = LevelLocation::new("chapter1/Level_3.level");
        assert_eq!(location.directory(), "chapter1");
        assert_eq!(location.stem(), "Level_3");
        assert_eq!(location.extension(), Some("level"));
        assert_eq!(
            location.with_stem("Level_3_Copy").as_str(),
            "chapter1/Level_3_Copy.level"
        );

        let top_level = LevelLocation::for_level_number(7);
        assert_eq!(top_level.as_str(), "Level_7.level");
        assert_eq!(top_level.directory(), "");
        assert_eq!(top_level.with_stem("Level_7 1").as_str(), "Level_7 1.level");
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(LevelColor::WHITE.to_hex(), "FFFFFFFF");
        let grid = LevelColor::from_hex("#80808080").unwrap();
        assert_eq!(grid.to_hex(), "80808080");
        assert_eq!(LevelColor::from_hex("00FF00"), Some(LevelColor::rgb(0.0, 1.0, 0.0)));
        assert_eq!(LevelColor::from_hex("nope"), None);
    }

    #[test]
    fn test_set_cell() {
        let mut record = LevelRecord::new_blank(1, 3, 2);
        assert!(record.set_cell(1, 2, 'P'));
        assert_eq!(record.layout, vec!["...".to_owned(), "..P".to_owned()]);
        assert_eq!(record.cell(1, 2), Some('P'));
        assert!(!record.set_cell(2, 0, '#'));
        assert!(!record.set_cell(0, 3, '#'));
    }

    #[test]
    fn test_unknown_symbols_are_white() {
        assert_eq!(tile_color('?'), LevelColor::WHITE);
        assert_eq!(tile_color('#'), TileKind::Wall.color());
    }
}
