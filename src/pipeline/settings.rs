use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    analysis::{
        features::{AnalysisTimeline, AudioFeatures},
        timeline::{SongInfo, Timeline},
    },
    encode::sink::Quality,
    foundation::{
        core::{Canvas, Fps},
        error::{PixbeatError, PixbeatResult, Stage},
    },
    scene::style::{TemplateConfig, VisualStyle},
};

/// Largest accepted output side.
pub const MAX_DIMENSION: u32 = 8192;
/// Largest accepted frame rate.
pub const MAX_FPS: u32 = 240;

/// Per-job render settings, loaded from JSON with defaults for every missing key.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub quality: Quality,
    /// Render only the first `n` seconds; the whole song when `None`.
    pub duration_seconds: Option<f64>,
    /// Bottom-right watermark; empty disables it.
    pub watermark_text: String,
    /// Seed for every pseudo-random choice of the job.
    pub seed: u64,
    pub grid_rows: u32,
    pub grid_cols: u32,
    /// Maximum number of live particles.
    pub particle_cap: usize,
    /// Progress report cadence in frames.
    pub progress_every: u64,
    /// Worker threads; all cores when `None`.
    pub threads: Option<usize>,
    /// Cell color override (`#RRGGBB[AA]`); built-in palette when empty.
    pub palette: Vec<String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            quality: Quality::Standard,
            duration_seconds: None,
            watermark_text: "PIXBEAT".to_string(),
            seed: 42,
            grid_rows: 8,
            grid_cols: 8,
            particle_cap: 256,
            progress_every: 15,
            threads: None,
            palette: Vec::new(),
        }
    }
}

impl ProjectSettings {
    pub fn from_path(path: impl AsRef<Path>) -> PixbeatResult<Self> {
        read_json(path.as_ref(), "settings")
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn fps(&self) -> PixbeatResult<Fps> {
        Fps::new(self.fps)
    }

    /// Grid template for `style` using this job's grid size.
    pub fn template(&self, style: VisualStyle) -> TemplateConfig {
        TemplateConfig {
            style,
            rows: self.grid_rows,
            cols: self.grid_cols,
        }
    }

    /// Seconds actually rendered for a song of `song_duration` seconds.
    pub fn render_duration(&self, song_duration: f64) -> f64 {
        match self.duration_seconds {
            Some(d) => d.min(song_duration),
            None => song_duration,
        }
    }

    pub fn validate(&self) -> PixbeatResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PixbeatError::validation("width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(PixbeatError::validation(format!(
                "width/height must be even (got {}x{})",
                self.width, self.height
            )));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(PixbeatError::validation(format!(
                "width/height must be <= {MAX_DIMENSION} (got {}x{})",
                self.width, self.height
            )));
        }
        if !(1..=MAX_FPS).contains(&self.fps) {
            return Err(PixbeatError::validation(format!(
                "fps must be in 1..={MAX_FPS} (got {})",
                self.fps
            )));
        }
        if let Some(d) = self.duration_seconds
            && !(d.is_finite() && d > 0.0)
        {
            return Err(PixbeatError::validation(format!(
                "durationSeconds must be finite and > 0 when set (got {d})"
            )));
        }
        if self.progress_every == 0 {
            return Err(PixbeatError::validation("progressEvery must be >= 1"));
        }
        if self.threads == Some(0) {
            return Err(PixbeatError::validation("threads must be >= 1 when set"));
        }
        self.template(VisualStyle::SquareBoomGrid).validate()
    }
}

/// Analyzer output feeding a job: either the compact feature contract or a detailed timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SongInput {
    AudioFeatures(AudioFeatures),
    Timeline(AnalysisTimeline),
}

impl SongInput {
    /// Normalize into a [`Timeline`].
    pub fn to_timeline(&self) -> PixbeatResult<Timeline> {
        match self {
            Self::AudioFeatures(f) => Timeline::from_features(f),
            Self::Timeline(t) => Timeline::from_analysis(t),
        }
    }
}

/// A render job as requested by the host application.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJobRequest {
    #[serde(flatten)]
    pub input: SongInput,
    /// One of `pixel_runner`, `equalizer`, `waveform`, `square_boom`.
    pub template_id: String,
    #[serde(default)]
    pub settings: ProjectSettings,
    /// Directory the host would like the video written to.
    #[serde(default)]
    pub output_directory_hint: Option<PathBuf>,
    /// Genre/mood labels for inputs that do not carry them (detailed timelines).
    #[serde(default)]
    pub song_info: Option<SongInfo>,
}

impl RenderJobRequest {
    pub fn from_path(path: impl AsRef<Path>) -> PixbeatResult<Self> {
        read_json(path.as_ref(), "render request")
    }

    pub fn style(&self) -> PixbeatResult<VisualStyle> {
        VisualStyle::from_template_id(&self.template_id)
    }

    /// Timeline for this request, with `song_info` applied when given.
    pub fn timeline(&self) -> PixbeatResult<Timeline> {
        let timeline = self.input.to_timeline()?;
        Ok(match self.song_info.clone() {
            Some(info) => timeline.with_info(info),
            None => timeline,
        })
    }
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    what: &str,
) -> PixbeatResult<T> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {what} '{}'", path.display()))
        .map_err(|e| PixbeatError::io(Stage::Analysis, e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PixbeatError::serde(format!("{what} '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/settings.rs"]
mod tests;
