//! Derivation of onsets, sections and loudness from the coarse energy envelope.
//!
//! The feature contract only carries a normalized energy envelope, so the richer timeline kinds are
//! reconstructed here with the same heuristics the grid analyzer applies to raw RMS.

use crate::analysis::timeline::{LoudnessSample, Onset, Section};

/// Level reported for every loudness sample when no envelope is available.
pub(crate) const FLAT_LUFS: f64 = -20.0;
/// Spacing of the flat loudness samples.
pub(crate) const FLAT_LOUDNESS_STEP_SECS: f64 = 0.4;

const MIN_SECTION_GAP_SECS: f64 = 5.0;
const EARLIEST_SECTION_SECS: f64 = 10.0;
const OUTRO_LEAD_SECS: f64 = 5.0;
const OUTRO_MIN_DURATION_SECS: f64 = 20.0;

const LOW_FREQ_HZ: f64 = 100.0;
const FREQ_SPAN: f64 = 80.0;

pub(crate) fn sample_time(i: usize, n: usize, duration: f64) -> f64 {
    (i as f64) * duration / (n as f64)
}

pub(crate) fn energy_to_lufs(e: f64) -> f64 {
    -0.691 + 10.0 * (e.max(0.0) + 1e-10).log10()
}

/// Dominant-frequency proxy for an envelope peak: louder peaks read as brighter.
pub(crate) fn strength_to_frequency(strength: f64) -> f64 {
    LOW_FREQ_HZ * FREQ_SPAN.powf(strength.clamp(0.0, 1.0))
}

pub(crate) fn derive_loudness(energy: &[f64], duration: f64) -> Vec<LoudnessSample> {
    if energy.is_empty() {
        let mut out = Vec::new();
        let mut k = 0u64;
        loop {
            let time = (k as f64) * FLAT_LOUDNESS_STEP_SECS;
            if time >= duration {
                break;
            }
            out.push(LoudnessSample {
                time,
                level_lufs: FLAT_LUFS,
            });
            k += 1;
        }
        return out;
    }

    let n = energy.len();
    energy
        .iter()
        .enumerate()
        .map(|(i, &e)| LoudnessSample {
            time: sample_time(i, n, duration),
            level_lufs: energy_to_lufs(e),
        })
        .collect()
}

pub(crate) fn derive_onsets(energy: &[f64], duration: f64) -> Vec<Onset> {
    let n = energy.len();
    let mut out = Vec::new();
    for i in 1..n {
        let e = energy[i];
        let rising = e > energy[i - 1];
        let peak = i + 1 == n || e >= energy[i + 1];
        if rising && peak {
            let strength = e.clamp(0.0, 1.0);
            out.push(Onset {
                time: sample_time(i, n, duration),
                strength,
                frequency_hz: strength_to_frequency(strength),
            });
        }
    }
    out
}

pub(crate) fn derive_sections(energy: &[f64], duration: f64) -> Vec<Section> {
    let mut sections = vec![Section {
        time: 0.0,
        label: "intro".to_string(),
    }];

    let n = energy.len();
    if n >= 3 {
        let step = duration / (n as f64);
        let window = ((1.0 / step).round() as usize).max(1);
        let smoothed = moving_average(energy, window);
        let diff: Vec<f64> = smoothed.windows(2).map(|w| w[1] - w[0]).collect();
        let threshold = std_dev(&diff) * 1.5;

        let mut candidates: Vec<(usize, f64)> = Vec::new();
        if threshold > 0.0 {
            for (i, d) in diff.iter().enumerate().skip(1) {
                if d.abs() <= threshold {
                    continue;
                }
                let time = sample_time(i, n, duration);
                let spaced = candidates
                    .last()
                    .is_none_or(|&(_, last)| time - last > MIN_SECTION_GAP_SECS);
                if spaced {
                    candidates.push((i, time));
                }
            }
        }

        let avg = mean(energy);
        let mut current = "intro";
        for (i, time) in candidates {
            if time < EARLIEST_SECTION_SECS {
                continue;
            }
            let lo = i.saturating_sub(window);
            let hi = (i + window).min(n);
            let local = mean(&energy[lo..hi]);
            let label = if local > avg * 1.3 {
                "chorus"
            } else if local < avg * 0.7 {
                if current == "verse" { "bridge" } else { "verse" }
            } else if current != "verse" {
                "verse"
            } else {
                "bridge"
            };
            sections.push(Section {
                time,
                label: label.to_string(),
            });
            current = label;
        }
    }

    let outro = duration - OUTRO_LEAD_SECS;
    let after_last = sections.last().is_none_or(|s| outro > s.time);
    if duration > OUTRO_MIN_DURATION_SECS && after_last {
        sections.push(Section {
            time: outro,
            label: "outro".to_string(),
        });
    }
    sections
}

fn moving_average(xs: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    (0..xs.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(xs.len());
            mean(&xs[lo..hi])
        })
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

fn std_dev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() as f64);
    var.sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/derive.rs"]
mod tests;
