use crate::level_record::LevelColor;

pub const DEFAULT_BRUSH_CELL_COLOR: LevelColor = LevelColor::rgba(0.3, 0.3, 0.3, 1.0);

/// Two palette colors closer than this (summed channel distance) count as the same color.
const SAME_COLOR_THRESHOLD: f32 = 0.01;

/// One cell of a brush grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushCell {
    pub color: LevelColor,
    /// Asset path of the texture drawn in the cell, tinted with `color`.
    pub texture: Option<String>,
}

impl Default for BrushCell {
    fn default() -> Self {
        Self {
            color: DEFAULT_BRUSH_CELL_COLOR,
            texture: None,
        }
    }
}

/// Which of the two side-by-side grids an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushGridSide {
    First,
    Second,
}

impl BrushGridSide {
    pub const BOTH: [BrushGridSide; 2] = [BrushGridSide::First, BrushGridSide::Second];

    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "Grid 1",
            Self::Second => "Grid 2",
        }
    }
}

/// The state of the brush panel: two paintable grids, the current paint, and a palette.
#[derive(Debug, Clone)]
pub struct BrushGrid {
    rows: usize,
    columns: usize,
    grids: [Vec<BrushCell>; 2],
    pub current_color: LevelColor,
    pub current_texture: Option<String>,
    pub palette: Vec<LevelColor>,
}

impl Default for BrushGrid {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

impl BrushGrid {
    pub fn new(rows: usize, columns: usize) -> Self {
        let mut result = Self {
            rows: 0,
            columns: 0,
            grids: Default::default(),
            current_color: LevelColor::WHITE,
            current_texture: None,
            palette: Vec::new(),
        };
        result.resize(rows, columns);
        result
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Change the grid size. Both grids are cleared, even if the size did not change.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        self.rows = rows.max(1);
        self.columns = columns.max(1);
        let cell_count = self.rows * self.columns;
        self.grids = [
            vec![BrushCell::default(); cell_count],
            vec![BrushCell::default(); cell_count],
        ];
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.columns).then(|| row * self.columns + col)
    }

    fn grid(&self, side: BrushGridSide) -> &Vec<BrushCell> {
        match side {
            BrushGridSide::First => &self.grids[0],
            BrushGridSide::Second => &self.grids[1],
        }
    }

    fn grid_mut(&mut self, side: BrushGridSide) -> &mut Vec<BrushCell> {
        match side {
            BrushGridSide::First => &mut self.grids[0],
            BrushGridSide::Second => &mut self.grids[1],
        }
    }

    pub fn cell(&self, side: BrushGridSide, row: usize, col: usize) -> Option<&BrushCell> {
        let index = self.index(row, col)?;
        self.grid(side).get(index)
    }

    /// Paint a cell with the current color and texture. Out-of-range cells are ignored.
    pub fn paint(&mut self, side: BrushGridSide, row: usize, col: usize) -> bool {
        let Some(index) = self.index(row, col) else {
            return false;
        };
        let cell = BrushCell {
            color: self.current_color,
            texture: self.current_texture.clone(),
        };
        self.grid_mut(side)[index] = cell;
        true
    }

    /// Restore a cell to the default color and drop its texture.
    pub fn erase(&mut self, side: BrushGridSide, row: usize, col: usize) -> bool {
        let Some(index) = self.index(row, col) else {
            return false;
        };
        self.grid_mut(side)[index] = BrushCell::default();
        true
    }

    pub fn is_current_color(&self, color: &LevelColor) -> bool {
        self.current_color.distance(color) < SAME_COLOR_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_and_erase() {
        let mut brush = BrushGrid::default();
        brush.current_color = LevelColor::rgb(1.0, 0.0, 0.0);
        assert!(brush.paint(BrushGridSide::First, 1, 2));
        assert_eq!(
            brush.cell(BrushGridSide::First, 1, 2).unwrap().color,
            LevelColor::rgb(1.0, 0.0, 0.0)
        );
        assert_eq!(
            brush.cell(BrushGridSide::Second, 1, 2),
            Some(&BrushCell::default())
        );

        brush.current_texture = Some("textures/brick.png".to_owned());
        assert!(brush.paint(BrushGridSide::First, 1, 2));
        assert_eq!(
            brush.cell(BrushGridSide::First, 1, 2).unwrap().texture.as_deref(),
            Some("textures/brick.png")
        );

        assert!(brush.erase(BrushGridSide::First, 1, 2));
        assert_eq!(
            brush.cell(BrushGridSide::First, 1, 2),
            Some(&BrushCell::default())
        );
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut brush = BrushGrid::new(2, 3);
        assert!(!brush.paint(BrushGridSide::Second, 2, 0));
        assert!(!brush.erase(BrushGridSide::Second, 0, 3));
        assert_eq!(brush.cell(BrushGridSide::First, 0, 3), None);
    }

    #[test]
    fn test_resize_clamps_and_clears() {
        let mut brush = BrushGrid::new(3, 3);
        brush.current_color = LevelColor::rgb(0.0, 0.0, 1.0);
        brush.paint(BrushGridSide::First, 0, 0);
        brush.resize(0, 4);
        assert_eq!((brush.rows(), brush.columns()), (1, 4));
        assert_eq!(
            brush.cell(BrushGridSide::First, 0, 0),
            Some(&BrushCell::default())
        );
    }

    #[test]
    fn test_current_color_matching() {
        let mut brush = BrushGrid::default();
        brush.current_color = LevelColor::rgb(0.5, 0.5, 0.5);
        assert!(brush.is_current_color(&LevelColor::rgb(0.501, 0.5, 0.5)));
        assert!(!brush.is_current_color(&LevelColor::rgb(0.6, 0.5, 0.5)));
    }
}
