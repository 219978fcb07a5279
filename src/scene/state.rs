use crate::{foundation::core::Rgba8, mapping::event::CellCoord};

/// Animation state of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellState {
    pub row: u32,
    pub col: u32,
    pub current_scale: f64,
    pub target_scale: f64,
    pub current_alpha: f64,
    pub target_alpha: f64,
    /// Flash overlay alpha in `[0, 1]`.
    pub brightness: f64,
    pub is_animating: bool,
    pub is_flashing: bool,
    pub flash_intensity: f64,
}

impl CellState {
    /// Scale 1, alpha 1, no flags.
    pub fn neutral(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            current_scale: 1.0,
            target_scale: 1.0,
            current_alpha: 1.0,
            target_alpha: 1.0,
            brightness: 0.0,
            is_animating: false,
            is_flashing: false,
            flash_intensity: 0.0,
        }
    }

    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }

    /// `true` when the cell draws exactly like a neutral cell.
    pub fn is_visually_neutral(&self) -> bool {
        self.current_scale == 1.0 && self.current_alpha == 1.0 && self.brightness == 0.0
    }
}

/// Row-major `rows x cols` cell grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<CellState>,
}

impl Grid {
    pub fn neutral(rows: u32, cols: u32) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| CellState::neutral(row, col)))
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&CellState> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, row: u32, col: u32) -> Option<&mut CellState> {
        self.index(row, col).map(|i| &mut self.cells[i])
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [CellState] {
        &mut self.cells
    }

    /// Cells of one row; empty when `row` is out of range.
    pub fn row_mut(&mut self, row: u32) -> &mut [CellState] {
        if row >= self.rows {
            return &mut [];
        }
        let start = (row * self.cols) as usize;
        &mut self.cells[start..start + self.cols as usize]
    }

    fn index(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| (row * self.cols + col) as usize)
    }
}

/// A live particle at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining life in `(0, 1]`.
    pub life: f64,
    pub size: f64,
    pub color: Rgba8,
}

/// Fully resolved visual parameters for one frame timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneState {
    pub grid: Grid,
    pub particles: Vec<Particle>,
    /// Timestamp this state was advanced to.
    pub time: f64,
    /// A beat falls on this frame.
    pub beat_frame: bool,
}

impl SceneState {
    pub fn neutral(rows: u32, cols: u32) -> Self {
        Self {
            grid: Grid::neutral(rows, cols),
            particles: Vec::new(),
            time: 0.0,
            beat_frame: false,
        }
    }
}
