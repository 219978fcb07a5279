use crate::foundation::{
    core::Rgba8,
    error::{PixbeatError, PixbeatResult},
};

/// Named palette families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    /// Saturated magenta/cyan on near-black; energetic or electronic songs.
    Neon,
    /// Warm bright primaries; happy or pop songs.
    Vibrant,
    /// Muted blues and greens for everything else.
    Calm,
}

impl PaletteKind {
    /// Pick a palette from the analyzer's mood and genre labels (case-insensitive).
    pub fn select(mood: &str, genre: &str) -> Self {
        let is = |label: &str, want: &str| label.trim().eq_ignore_ascii_case(want);
        if is(mood, "energetic") || is(genre, "electronic") {
            Self::Neon
        } else if is(mood, "happy") || is(genre, "pop") {
            Self::Vibrant
        } else {
            Self::Calm
        }
    }
}

/// Immutable job palette. Selected once at job start and shared read-only by every worker.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    kind: PaletteKind,
    background: [Rgba8; 2],
    cells: Vec<Rgba8>,
    accent: Rgba8,
    text: Rgba8,
}

impl Palette {
    /// Built-in palette for `kind`.
    pub fn builtin(kind: PaletteKind) -> Self {
        match kind {
            PaletteKind::Neon => Self {
                kind,
                background: [Rgba8::opaque(10, 6, 24), Rgba8::opaque(32, 8, 52)],
                cells: vec![
                    Rgba8::opaque(255, 0, 170),
                    Rgba8::opaque(0, 240, 255),
                    Rgba8::opaque(160, 60, 255),
                    Rgba8::opaque(57, 255, 20),
                    Rgba8::opaque(255, 230, 0),
                ],
                accent: Rgba8::opaque(0, 255, 213),
                text: Rgba8::opaque(240, 240, 255),
            },
            PaletteKind::Vibrant => Self {
                kind,
                background: [Rgba8::opaque(40, 12, 40), Rgba8::opaque(80, 24, 48)],
                cells: vec![
                    Rgba8::opaque(255, 89, 94),
                    Rgba8::opaque(255, 202, 58),
                    Rgba8::opaque(138, 201, 38),
                    Rgba8::opaque(25, 130, 196),
                    Rgba8::opaque(106, 76, 147),
                ],
                accent: Rgba8::opaque(255, 202, 58),
                text: Rgba8::opaque(255, 248, 240),
            },
            PaletteKind::Calm => Self {
                kind,
                background: [Rgba8::opaque(12, 24, 36), Rgba8::opaque(24, 44, 56)],
                cells: vec![
                    Rgba8::opaque(94, 129, 172),
                    Rgba8::opaque(129, 161, 193),
                    Rgba8::opaque(136, 192, 208),
                    Rgba8::opaque(143, 188, 187),
                    Rgba8::opaque(163, 190, 140),
                ],
                accent: Rgba8::opaque(136, 192, 208),
                text: Rgba8::opaque(229, 233, 240),
            },
        }
    }

    /// Built-in palette chosen from mood and genre.
    pub fn select(mood: &str, genre: &str) -> Self {
        Self::builtin(PaletteKind::select(mood, genre))
    }

    /// Replace the cell colors with `#RRGGBB[AA]` strings. An empty list keeps the built-in set.
    pub fn with_cell_colors<S: AsRef<str>>(mut self, hex: &[S]) -> PixbeatResult<Self> {
        if hex.is_empty() {
            return Ok(self);
        }
        self.cells = hex
            .iter()
            .map(|h| Rgba8::parse_hex(h.as_ref()))
            .collect::<PixbeatResult<Vec<_>>>()
            .map_err(|e| PixbeatError::validation(format!("palette override: {e}")))?;
        Ok(self)
    }

    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    /// Background gradient endpoints.
    pub fn background(&self) -> [Rgba8; 2] {
        self.background
    }

    /// Cell color cycle.
    pub fn cells(&self) -> &[Rgba8] {
        &self.cells
    }

    pub fn accent(&self) -> Rgba8 {
        self.accent
    }

    pub fn text(&self) -> Rgba8 {
        self.text
    }

    /// Palette color `i`, wrapping around the cycle.
    pub fn cell(&self, i: usize) -> Rgba8 {
        self.cells[i % self.cells.len()]
    }

    /// Cell fill color drifting smoothly over the cycle with position and time.
    ///
    /// Neighbouring cells sit a fraction of a step apart and the whole grid advances a quarter step
    /// per second, so both adjacent cells and adjacent frames change gradually.
    pub fn cell_color(&self, row: u32, col: u32, t: f64) -> Rgba8 {
        let phase = (f64::from(row) + f64::from(col)) * 0.35 + t * 0.25;
        let n = self.cells.len() as f64;
        let wrapped = phase.rem_euclid(n);
        let i = wrapped.floor();
        let frac = wrapped - i;
        let i = i as usize;
        self.cell(i).lerp(self.cell(i + 1), frac)
    }
}
