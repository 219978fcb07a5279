use crate::{
    foundation::error::{PixbeatError, PixbeatResult},
    mapping::mapper::{MapperRules, WipeMode},
};

/// Built-in visual styles. One engine renders all of them; styles only vary the mapper rule set
/// and the renderer's layer list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualStyle {
    /// Scrolling pixel skyline behind a beat grid.
    PixelRunner,
    /// Grid over a mesh backdrop, row flashes read like equalizer bands.
    Equalizer,
    /// Starfield with a breathing grid.
    Waveform,
    /// Dense reactive grid with every effect enabled.
    #[serde(rename = "square_boom", alias = "square_boom_grid")]
    SquareBoomGrid,
}

/// Secondary background motif drawn between the background and the particle layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motif {
    /// Two parallax rows of pixel buildings.
    Skyline,
    /// Twinkling star points.
    Stars,
    /// Thin perspective mesh lines.
    Mesh,
}

impl VisualStyle {
    /// All styles, in template-id order.
    pub const ALL: [Self; 4] = [
        Self::PixelRunner,
        Self::Equalizer,
        Self::Waveform,
        Self::SquareBoomGrid,
    ];

    /// Parse a template id (`pixel_runner`, `equalizer`, `waveform`, `square_boom`).
    pub fn from_template_id(id: &str) -> PixbeatResult<Self> {
        match id.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pixel_runner" => Ok(Self::PixelRunner),
            "equalizer" => Ok(Self::Equalizer),
            "waveform" => Ok(Self::Waveform),
            "square_boom" | "square_boom_grid" | "squareboom" => Ok(Self::SquareBoomGrid),
            other => Err(PixbeatError::validation(format!(
                "unknown template id '{other}'"
            ))),
        }
    }

    /// Canonical template id.
    pub fn template_id(self) -> &'static str {
        match self {
            Self::PixelRunner => "pixel_runner",
            Self::Equalizer => "equalizer",
            Self::Waveform => "waveform",
            Self::SquareBoomGrid => "square_boom",
        }
    }

    /// Event-mapping rules enabled for this style.
    pub fn mapper_rules(self) -> MapperRules {
        match self {
            Self::PixelRunner => MapperRules {
                beat_pulse: true,
                onset_flash: false,
                wipe: Some(WipeMode::FixedLeftRight),
                loudness_swell: true,
            },
            Self::Equalizer => MapperRules {
                beat_pulse: true,
                onset_flash: true,
                wipe: Some(WipeMode::FixedLeftRight),
                loudness_swell: true,
            },
            Self::Waveform => MapperRules {
                beat_pulse: true,
                onset_flash: true,
                wipe: Some(WipeMode::Alternate),
                loudness_swell: false,
            },
            Self::SquareBoomGrid => MapperRules::all(),
        }
    }

    /// Motif layers, back to front.
    pub fn motifs(self) -> &'static [Motif] {
        match self {
            Self::PixelRunner => &[Motif::Skyline],
            Self::Equalizer => &[Motif::Mesh],
            Self::Waveform => &[Motif::Stars],
            Self::SquareBoomGrid => &[Motif::Stars, Motif::Mesh],
        }
    }

    /// Whether the background receives a noise speckle overlay.
    pub fn noise_speckle(self) -> bool {
        matches!(self, Self::PixelRunner | Self::SquareBoomGrid)
    }

    /// Radial (true) or vertical linear (false) background gradient.
    pub fn radial_background(self) -> bool {
        matches!(self, Self::Waveform | Self::SquareBoomGrid)
    }

    /// Particle gravity as a fraction of frame height per second squared.
    pub fn particle_gravity(self) -> f64 {
        match self {
            Self::PixelRunner => 0.6,
            Self::Equalizer => 0.0,
            Self::Waveform => -0.1,
            Self::SquareBoomGrid => 0.25,
        }
    }
}

/// Grid template: style plus grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    /// Visual style.
    pub style: VisualStyle,
    /// Grid rows (6..=12).
    pub rows: u32,
    /// Grid columns (6..=12).
    pub cols: u32,
}

impl TemplateConfig {
    /// Smallest supported grid side.
    pub const MIN_SIDE: u32 = 6;
    /// Largest supported grid side.
    pub const MAX_SIDE: u32 = 12;

    /// Default 8x8 grid for `style`.
    pub fn new(style: VisualStyle) -> Self {
        Self {
            style,
            rows: 8,
            cols: 8,
        }
    }

    /// Reject grids outside `6..=12` on either side.
    pub fn validate(&self) -> PixbeatResult<()> {
        let ok = |n: u32| (Self::MIN_SIDE..=Self::MAX_SIDE).contains(&n);
        if !ok(self.rows) || !ok(self.cols) {
            return Err(PixbeatError::validation(format!(
                "grid must be between {min}x{min} and {max}x{max} (got {}x{})",
                self.rows,
                self.cols,
                min = Self::MIN_SIDE,
                max = Self::MAX_SIDE,
            )));
        }
        Ok(())
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }
}
