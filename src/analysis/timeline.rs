use crate::{
    analysis::derive,
    analysis::features::{AnalysisTimeline, AudioFeatures, default_sample_rate},
    foundation::error::{PixbeatError, PixbeatResult},
};

/// A detected transient with strength and approximate dominant frequency.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Onset {
    /// Absolute time in seconds.
    pub time: f64,
    /// Strength in `[0, 1]`.
    pub strength: f64,
    /// Approximate dominant frequency.
    pub frequency_hz: f64,
}

/// A coarse structural region start.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Section {
    /// Start time in seconds.
    pub time: f64,
    /// Structural label (intro/verse/chorus/bridge/outro).
    pub label: String,
}

/// One short-term loudness sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoudnessSample {
    /// Sample time in seconds.
    pub time: f64,
    /// LUFS-like level.
    pub level_lufs: f64,
}

/// Descriptive labels carried along with the timeline (palette selection, overlays).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SongInfo {
    /// Genre label.
    pub genre: String,
    /// Musical key.
    pub key: String,
    /// `major` / `minor`.
    pub mode: String,
    /// Mood label.
    pub mood: String,
    /// Analyzer confidence.
    pub confidence: f64,
}

/// Normalized, time-ordered musical events for one song. Read-only once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    sample_rate: u32,
    duration_seconds: f64,
    bpm: f64,
    beats: Vec<f64>,
    onsets: Vec<Onset>,
    sections: Vec<Section>,
    loudness: Vec<LoudnessSample>,
    info: SongInfo,
}

impl Timeline {
    /// Build a timeline from the analyzer feature contract.
    ///
    /// Beats are synthesized from `tempo_bpm` when `beat_times` is empty; onsets, sections and
    /// loudness are derived from the energy envelope (flat defaults without one).
    #[tracing::instrument(skip(features), fields(duration = features.duration_seconds))]
    pub fn from_features(features: &AudioFeatures) -> PixbeatResult<Self> {
        let duration = validate_duration(features.duration_seconds)?;
        let beats = resolve_beats(&features.beat_times, features.tempo_bpm, duration)?;

        let energy: Vec<f64> = features
            .energy_levels
            .iter()
            .map(|e| if e.is_finite() { e.clamp(0.0, 1.0) } else { 0.0 })
            .collect();
        if energy.is_empty() {
            tracing::debug!("no energy envelope, using flat onset/section/loudness defaults");
        }

        Ok(Self {
            sample_rate: default_sample_rate(),
            duration_seconds: duration,
            bpm: effective_bpm(features.tempo_bpm, &beats),
            onsets: derive::derive_onsets(&energy, duration),
            sections: derive::derive_sections(&energy, duration),
            loudness: derive::derive_loudness(&energy, duration),
            beats,
            info: SongInfo {
                genre: features.genre.clone(),
                key: features.key.clone(),
                mode: features.mode.clone(),
                mood: features.mood.clone(),
                confidence: features.confidence,
            },
        })
    }

    /// Build a timeline from the detailed analyzer output, keeping its event lists.
    pub fn from_analysis(analysis: &AnalysisTimeline) -> PixbeatResult<Self> {
        let duration = validate_duration(analysis.duration)?;
        let beats = resolve_beats(&analysis.beats, analysis.bpm, duration)?;

        let mut onsets: Vec<Onset> = analysis
            .onsets
            .iter()
            .filter(|o| in_range(o.t, duration) && o.freq.is_finite())
            .map(|o| Onset {
                time: o.t,
                strength: if o.strength.is_finite() {
                    o.strength.clamp(0.0, 1.0)
                } else {
                    0.0
                },
                frequency_hz: o.freq,
            })
            .collect();
        onsets.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut sections: Vec<Section> = analysis
            .sections
            .iter()
            .filter(|s| in_range(s.t, duration))
            .map(|s| Section {
                time: s.t,
                label: s.label.clone(),
            })
            .collect();
        sections.sort_by(|a, b| a.time.total_cmp(&b.time));
        if sections.first().is_none_or(|s| s.time > 0.0) {
            sections.insert(
                0,
                Section {
                    time: 0.0,
                    label: "intro".to_string(),
                },
            );
        }

        let mut loudness: Vec<LoudnessSample> = analysis
            .loudness
            .iter()
            .filter(|l| in_range(l.t, duration) && l.lufs.is_finite())
            .map(|l| LoudnessSample {
                time: l.t,
                level_lufs: l.lufs,
            })
            .collect();
        loudness.sort_by(|a, b| a.time.total_cmp(&b.time));

        let (key, mode) = match analysis.key.split_once(':') {
            Some((k, m)) => (k.to_string(), normalize_mode(m)),
            None => (analysis.key.clone(), String::new()),
        };

        Ok(Self {
            sample_rate: analysis.sr,
            duration_seconds: duration,
            bpm: effective_bpm(analysis.bpm, &beats),
            beats,
            onsets,
            sections,
            loudness,
            info: SongInfo {
                key,
                mode,
                ..SongInfo::default()
            },
        })
    }

    /// Replace the descriptive labels (used when the detailed timeline arrives without them).
    pub fn with_info(mut self, info: SongInfo) -> Self {
        self.info = info;
        self
    }

    /// Sample rate the audio was analyzed at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Song length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Tempo in beats per minute.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Beat times, ascending.
    pub fn beats(&self) -> &[f64] {
        &self.beats
    }

    /// Onsets, ascending by time.
    pub fn onsets(&self) -> &[Onset] {
        &self.onsets
    }

    /// Sections, ascending; the first starts at 0.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Loudness samples, ascending.
    pub fn loudness(&self) -> &[LoudnessSample] {
        &self.loudness
    }

    /// Descriptive labels.
    pub fn info(&self) -> &SongInfo {
        &self.info
    }

    /// Label of the section active at `t`.
    pub fn section_at(&self, t: f64) -> Option<&Section> {
        let idx = self.sections.partition_point(|s| s.time <= t);
        idx.checked_sub(1).map(|i| &self.sections[i])
    }

    /// `true` when some beat falls in `[lo, hi)`.
    pub fn has_beat_in(&self, lo: f64, hi: f64) -> bool {
        let idx = self.beats.partition_point(|&b| b < lo);
        self.beats.get(idx).is_some_and(|&b| b < hi)
    }
}

// Absorbs `k * interval` rounding so a beat landing exactly on `duration` is kept.
const BEAT_GRID_EPSILON: f64 = 1e-9;

/// Uniform beat grid `k * 60 / bpm` for every `k` with `t <= duration`.
///
/// The end is inclusive: when the duration is a whole number of intervals the last beat lands
/// exactly on `duration` (10 s at 120 bpm gives 0.0..=10.0, 21 beats). No frame is rendered at
/// that time, so the final beat only feeds event mapping and never shows on screen.
pub fn synthesize_beats(bpm: f64, duration: f64) -> Vec<f64> {
    let interval = 60.0 / bpm;
    let mut out = Vec::new();
    let mut k = 0u64;
    loop {
        let t = (k as f64) * interval;
        if t > duration + BEAT_GRID_EPSILON {
            break;
        }
        out.push(t.min(duration));
        k += 1;
    }
    out
}

fn validate_duration(duration: f64) -> PixbeatResult<f64> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(PixbeatError::missing_input(format!(
            "durationSeconds must be finite and > 0 (got {duration})"
        )));
    }
    Ok(duration)
}

fn resolve_beats(explicit: &[f64], bpm: f64, duration: f64) -> PixbeatResult<Vec<f64>> {
    let mut beats: Vec<f64> = explicit
        .iter()
        .copied()
        .filter(|&t| in_range(t, duration))
        .collect();
    if !beats.is_empty() {
        beats.sort_by(f64::total_cmp);
        return Ok(beats);
    }
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(PixbeatError::missing_input(
            "no beat times and tempoBpm is not a positive number",
        ));
    }
    tracing::debug!(bpm, "synthesizing uniform beat grid");
    Ok(synthesize_beats(bpm, duration))
}

fn effective_bpm(bpm: f64, beats: &[f64]) -> f64 {
    if bpm.is_finite() && bpm > 0.0 {
        return bpm;
    }
    match (beats.first(), beats.last()) {
        (Some(first), Some(last)) if beats.len() > 1 && last > first => {
            60.0 * ((beats.len() - 1) as f64) / (last - first)
        }
        _ => 0.0,
    }
}

fn in_range(t: f64, duration: f64) -> bool {
    t.is_finite() && t >= 0.0 && t <= duration
}

fn normalize_mode(m: &str) -> String {
    match m.trim().to_ascii_lowercase().as_str() {
        "maj" | "major" => "major".to_string(),
        "min" | "minor" => "minor".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/timeline.rs"]
mod tests;
