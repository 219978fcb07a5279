use crate::{
    analysis::timeline::Timeline,
    animation::ease::Ease,
    mapping::{
        event::{CellCoord, EventKind, GraphicsEvent, Targets, WipeDirection},
        projection::frequency_to_row,
    },
    scene::style::TemplateConfig,
};

pub(crate) const PULSE_DURATION_SECS: f64 = 0.18;
pub(crate) const PULSE_SCALE: f64 = 1.6;
pub(crate) const PULSE_MIN_CELLS: usize = 4;
pub(crate) const PULSE_MAX_CELLS: usize = 8;

pub(crate) const FLASH_MIN_STRENGTH: f64 = 0.7;
pub(crate) const FLASH_DURATION_SECS: f64 = 0.12;
pub(crate) const FLASH_ALPHA: f64 = 1.0;

pub(crate) const WIPE_DURATION_SECS: f64 = 0.6;

pub(crate) const SWELL_MIN_JUMP_LUFS: f64 = 1.5;
pub(crate) const SWELL_DURATION_SECS: f64 = 0.4;
pub(crate) const SWELL_SCALE: f64 = 1.1;

/// How section wipes pick their direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WipeMode {
    /// Even section transitions sweep left to right, odd ones top to bottom.
    Alternate,
    /// Every wipe sweeps left to right.
    FixedLeftRight,
}

impl WipeMode {
    fn direction(self, transition_index: usize) -> WipeDirection {
        match self {
            Self::Alternate if transition_index % 2 == 1 => WipeDirection::TopToBottom,
            Self::Alternate | Self::FixedLeftRight => WipeDirection::LeftToRight,
        }
    }
}

/// Rule set a visual style enables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapperRules {
    /// One pulse per beat on random cells.
    pub beat_pulse: bool,
    /// One row flash per strong onset.
    pub onset_flash: bool,
    /// One wipe per section transition.
    pub wipe: Option<WipeMode>,
    /// One swell per loudness jump.
    pub loudness_swell: bool,
}

impl MapperRules {
    /// Every rule enabled, alternating wipes.
    pub fn all() -> Self {
        Self {
            beat_pulse: true,
            onset_flash: true,
            wipe: Some(WipeMode::Alternate),
            loudness_swell: true,
        }
    }
}

/// Map a timeline to a time-sorted list of graphics events.
///
/// Deterministic in `(timeline, template, seed)`. Rules emit in the order pulse, flash, wipe,
/// swell and the final sort is stable, so events sharing a start time keep that order.
#[tracing::instrument(
    skip(timeline, template),
    fields(style = template.style.template_id(), beats = timeline.beats().len())
)]
pub fn map_events(timeline: &Timeline, template: &TemplateConfig, seed: u64) -> Vec<GraphicsEvent> {
    let rules = template.style.mapper_rules();
    let mut out = Vec::new();

    if rules.beat_pulse {
        beat_pulses(timeline, template, seed, &mut out);
    }
    if rules.onset_flash {
        onset_flashes(timeline, template, &mut out);
    }
    if let Some(mode) = rules.wipe {
        section_wipes(timeline, mode, &mut out);
    }
    if rules.loudness_swell {
        loudness_swells(timeline, &mut out);
    }

    out.sort_by(|a, b| a.time.total_cmp(&b.time));
    tracing::debug!(events = out.len(), "mapped timeline");
    out
}

fn beat_pulses(
    timeline: &Timeline,
    template: &TemplateConfig,
    seed: u64,
    out: &mut Vec<GraphicsEvent>,
) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let rows = template.rows.max(1);
    let cols = template.cols.max(1);
    for &beat in timeline.beats() {
        let count = rng.usize(PULSE_MIN_CELLS..=PULSE_MAX_CELLS);
        let cells = (0..count)
            .map(|_| {
                let row = rng.u32(0..rows);
                let col = rng.u32(0..cols);
                CellCoord::new(row, col)
            })
            .collect();
        out.push(GraphicsEvent {
            time: beat,
            duration: PULSE_DURATION_SECS,
            kind: EventKind::Pulse {
                target_scale: PULSE_SCALE,
                easing: Ease::OutCubic,
            },
            targets: Targets::Cells(cells),
        });
    }
}

fn onset_flashes(timeline: &Timeline, template: &TemplateConfig, out: &mut Vec<GraphicsEvent>) {
    for onset in timeline
        .onsets()
        .iter()
        .filter(|o| o.strength > FLASH_MIN_STRENGTH)
    {
        out.push(GraphicsEvent {
            time: onset.time,
            duration: FLASH_DURATION_SECS,
            kind: EventKind::Flash {
                target_alpha: FLASH_ALPHA,
            },
            targets: Targets::Row(frequency_to_row(onset.frequency_hz, template.rows)),
        });
    }
}

fn section_wipes(timeline: &Timeline, mode: WipeMode, out: &mut Vec<GraphicsEvent>) {
    // The first section opens the song; only transitions wipe.
    for (idx, section) in timeline.sections().iter().skip(1).enumerate() {
        out.push(GraphicsEvent {
            time: section.time,
            duration: WIPE_DURATION_SECS,
            kind: EventKind::Wipe {
                direction: mode.direction(idx),
            },
            targets: Targets::All,
        });
    }
}

fn loudness_swells(timeline: &Timeline, out: &mut Vec<GraphicsEvent>) {
    for pair in timeline.loudness().windows(2) {
        if pair[1].level_lufs - pair[0].level_lufs > SWELL_MIN_JUMP_LUFS {
            out.push(GraphicsEvent {
                time: pair[1].time,
                duration: SWELL_DURATION_SECS,
                kind: EventKind::Swell {
                    target_scale: SWELL_SCALE,
                },
                targets: Targets::All,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/mapper.rs"]
mod tests;
