use super::*;
use crate::{
    analysis::features::{AnalysisLoudness, AnalysisOnset, AnalysisSection, AnalysisTimeline},
    scene::style::VisualStyle,
};

fn timeline() -> Timeline {
    let analysis = AnalysisTimeline {
        sr: 44_100,
        duration: 12.0,
        bpm: 120.0,
        beats: vec![],
        onsets: vec![
            AnalysisOnset {
                t: 1.0,
                strength: 0.9,
                freq: 8000.0,
            },
            AnalysisOnset {
                t: 2.0,
                strength: 0.5,
                freq: 440.0,
            },
            AnalysisOnset {
                t: 3.0,
                strength: 0.71,
                freq: 100.0,
            },
        ],
        sections: vec![
            AnalysisSection {
                t: 0.0,
                label: "intro".into(),
            },
            AnalysisSection {
                t: 4.0,
                label: "verse".into(),
            },
            AnalysisSection {
                t: 8.0,
                label: "chorus".into(),
            },
        ],
        loudness: vec![
            AnalysisLoudness { t: 0.0, lufs: -30.0 },
            AnalysisLoudness { t: 1.0, lufs: -29.0 },
            AnalysisLoudness { t: 2.0, lufs: -20.0 },
            AnalysisLoudness { t: 3.0, lufs: -25.0 },
        ],
        key: String::new(),
    };
    Timeline::from_analysis(&analysis).unwrap()
}

fn template(style: VisualStyle) -> TemplateConfig {
    TemplateConfig::new(style)
}

fn count(events: &[GraphicsEvent], name: &str) -> usize {
    events.iter().filter(|e| e.kind.name() == name).count()
}

#[test]
fn same_inputs_same_events() {
    let tl = timeline();
    let t = template(VisualStyle::SquareBoomGrid);
    let a = serde_json::to_string(&map_events(&tl, &t, 7)).unwrap();
    let b = serde_json::to_string(&map_events(&tl, &t, 7)).unwrap();
    assert_eq!(a, b);
    let c = serde_json::to_string(&map_events(&tl, &t, 8)).unwrap();
    assert_ne!(a, c);
}

#[test]
fn square_boom_emits_every_rule() {
    let events = map_events(&timeline(), &template(VisualStyle::SquareBoomGrid), 1);
    assert_eq!(count(&events, "pulse"), 25);
    assert_eq!(count(&events, "flash"), 2);
    assert_eq!(count(&events, "wipe"), 2);
    assert_eq!(count(&events, "swell"), 1);
    assert!(events.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn pulses_target_four_to_eight_cells_inside_the_grid() {
    let t = TemplateConfig {
        style: VisualStyle::Waveform,
        rows: 6,
        cols: 10,
    };
    for e in map_events(&timeline(), &t, 99) {
        if let (EventKind::Pulse { target_scale, easing }, Targets::Cells(cells)) =
            (&e.kind, &e.targets)
        {
            assert_eq!(*target_scale, PULSE_SCALE);
            assert_eq!(*easing, Ease::OutCubic);
            assert_eq!(e.duration, PULSE_DURATION_SECS);
            assert!((PULSE_MIN_CELLS..=PULSE_MAX_CELLS).contains(&cells.len()));
            assert!(cells.iter().all(|c| c.row < 6 && c.col < 10));
        }
    }
}

#[test]
fn flashes_project_frequency_to_rows() {
    let events = map_events(&timeline(), &template(VisualStyle::Equalizer), 3);
    let rows: Vec<_> = events
        .iter()
        .filter_map(|e| match (&e.kind, &e.targets) {
            (EventKind::Flash { target_alpha }, Targets::Row(r)) => {
                assert_eq!(*target_alpha, FLASH_ALPHA);
                Some((e.time, *r))
            }
            _ => None,
        })
        .collect();
    assert_eq!(rows, vec![(1.0, 0), (3.0, 7)]);
}

#[test]
fn wipe_direction_follows_style() {
    let dirs = |style| -> Vec<WipeDirection> {
        map_events(&timeline(), &template(style), 0)
            .into_iter()
            .filter_map(|e| match e.kind {
                EventKind::Wipe { direction } => Some(direction),
                _ => None,
            })
            .collect()
    };
    assert_eq!(
        dirs(VisualStyle::SquareBoomGrid),
        vec![WipeDirection::LeftToRight, WipeDirection::TopToBottom]
    );
    assert_eq!(
        dirs(VisualStyle::PixelRunner),
        vec![WipeDirection::LeftToRight, WipeDirection::LeftToRight]
    );
}

#[test]
fn swell_on_loudness_jump_only() {
    let events = map_events(&timeline(), &template(VisualStyle::PixelRunner), 0);
    let swells: Vec<_> = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Swell { .. }))
        .collect();
    assert_eq!(swells.len(), 1);
    assert_eq!(swells[0].time, 2.0);
    assert_eq!(swells[0].targets, Targets::All);
    assert_eq!(count(&events, "flash"), 0);
    let waveform = map_events(&timeline(), &template(VisualStyle::Waveform), 0);
    assert_eq!(count(&waveform, "swell"), 0);
}

#[test]
fn ties_keep_rule_order() {
    // Beat at 4.0 and the verse wipe at 4.0 share a start time.
    let events = map_events(&timeline(), &template(VisualStyle::SquareBoomGrid), 5);
    let at_four: Vec<_> = events
        .iter()
        .filter(|e| e.time == 4.0)
        .map(|e| e.kind.name())
        .collect();
    assert_eq!(at_four, vec!["pulse", "wipe"]);
    let at_two: Vec<_> = events
        .iter()
        .filter(|e| e.time == 2.0)
        .map(|e| e.kind.name())
        .collect();
    assert_eq!(at_two, vec!["pulse", "swell"]);
}
