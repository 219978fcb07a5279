use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{PixbeatError, PixbeatResult, Stage};

/// Feature set delivered by the upstream audio analyzer.
///
/// Keys follow the camelCase contract; the snake_case names written by the simple analyzer
/// (`tempo`, `beat_times`, `energy_levels`, `duration`) are accepted as aliases.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFeatures {
    /// Estimated tempo in beats per minute.
    #[serde(alias = "tempo", alias = "bpm", default)]
    pub tempo_bpm: f64,
    /// Detected beat timestamps in seconds; empty means "synthesize from tempo".
    #[serde(alias = "beat_times", alias = "beats", default)]
    pub beat_times: Vec<f64>,
    /// Coarse energy envelope, normalized to `0..1`, evenly spaced across the duration.
    #[serde(alias = "energy_levels", default)]
    pub energy_levels: Vec<f64>,
    /// Genre label (e.g. "Electronic").
    #[serde(default)]
    pub genre: String,
    /// Musical key (e.g. "C#").
    #[serde(default)]
    pub key: String,
    /// `major` or `minor`.
    #[serde(default)]
    pub mode: String,
    /// Mood label (e.g. "Energetic").
    #[serde(default)]
    pub mood: String,
    /// Analyzer confidence in `0..1`.
    #[serde(default)]
    pub confidence: f64,
    /// Song length in seconds.
    #[serde(alias = "duration", alias = "duration_seconds", default)]
    pub duration_seconds: f64,
}

impl AudioFeatures {
    /// Load features from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> PixbeatResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read features '{}'", path.display()))
            .map_err(|e| PixbeatError::io(Stage::Analysis, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Onset record as written by the detailed analyzer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisOnset {
    /// Onset time in seconds.
    pub t: f64,
    /// Normalized strength in `0..1`.
    pub strength: f64,
    /// Spectral-centroid frequency estimate in Hz.
    pub freq: f64,
}

/// Section record as written by the detailed analyzer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisSection {
    /// Section start in seconds.
    pub t: f64,
    /// Structural label (intro/verse/chorus/bridge/outro).
    pub label: String,
}

/// Short-term loudness record as written by the detailed analyzer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisLoudness {
    /// Window start in seconds.
    pub t: f64,
    /// Approximate LUFS level.
    pub lufs: f64,
}

/// Complete timeline written by the grid-oriented analyzer (`timeline.json`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisTimeline {
    /// Sample rate the audio was analyzed at.
    #[serde(default = "default_sample_rate")]
    pub sr: u32,
    /// Song length in seconds.
    pub duration: f64,
    /// Tempo in beats per minute.
    pub bpm: f64,
    /// Beat timestamps in seconds.
    #[serde(default)]
    pub beats: Vec<f64>,
    /// Onset events.
    #[serde(default)]
    pub onsets: Vec<AnalysisOnset>,
    /// Structural sections.
    #[serde(default)]
    pub sections: Vec<AnalysisSection>,
    /// Short-term loudness samples.
    #[serde(default)]
    pub loudness: Vec<AnalysisLoudness>,
    /// Key and mode as `"C:maj"`.
    #[serde(default)]
    pub key: String,
}

impl AnalysisTimeline {
    /// Load a detailed analyzer timeline from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> PixbeatResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read timeline '{}'", path.display()))
            .map_err(|e| PixbeatError::io(Stage::Analysis, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

pub(crate) fn default_sample_rate() -> u32 {
    44_100
}
