use super::*;
use crate::{
    analysis::{features::AudioFeatures, timeline::Timeline},
    pipeline::settings::ProjectSettings,
    scene::style::VisualStyle,
};

fn ctx(style: VisualStyle) -> RenderJobContext {
    let features = AudioFeatures {
        tempo_bpm: 128.0,
        energy_levels: (0..40).map(|i| if i % 3 == 0 { 0.95 } else { 0.2 }).collect(),
        genre: "Electronic".into(),
        mood: "Energetic".into(),
        duration_seconds: 6.0,
        ..AudioFeatures::default()
    };
    let settings = ProjectSettings {
        width: 320,
        height: 180,
        fps: 30,
        ..ProjectSettings::default()
    };
    RenderJobContext::new(Timeline::from_features(&features).unwrap(), style, settings).unwrap()
}

#[test]
fn windowed_replay_matches_sequential_advance() {
    for style in VisualStyle::ALL {
        let ctx = ctx(style);
        let t = ctx.template();
        let mut sequential = SceneState::neutral(t.rows, t.cols);
        for f in 0..ctx.total_frames() {
            let time = ctx.frame_time(FrameIndex(f));
            advance(&mut sequential, ctx.events(), time);
            let snap = snapshot(&ctx, FrameIndex(f));
            assert_eq!(snap.grid, sequential.grid, "{style:?} frame {f}");
            assert_eq!(snap.time, time);
        }
    }
}

#[test]
fn snapshot_is_order_independent() {
    let ctx = ctx(VisualStyle::SquareBoomGrid);
    let late = snapshot(&ctx, FrameIndex(150));
    let _ = snapshot(&ctx, FrameIndex(3));
    assert_eq!(snapshot(&ctx, FrameIndex(150)), late);
}

#[test]
fn snapshot_at_frame_time_equals_frame_snapshot() {
    let ctx = ctx(VisualStyle::Equalizer);
    for f in [0u64, 1, 17, 45, 100] {
        let t = ctx.frame_time(FrameIndex(f));
        assert_eq!(snapshot_at(&ctx, t), snapshot(&ctx, FrameIndex(f)));
    }
}

#[test]
fn first_frame_is_neutral() {
    let ctx = ctx(VisualStyle::SquareBoomGrid);
    let s = snapshot(&ctx, FrameIndex(0));
    assert!(s.grid.cells().iter().all(|c| c.is_visually_neutral()));
    // The synthesized grid starts with a beat at t = 0.
    assert!(s.beat_frame);
}
