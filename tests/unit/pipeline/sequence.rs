use std::sync::Mutex;

use super::*;
use crate::{
    analysis::{features::AudioFeatures, timeline::Timeline},
    pipeline::{progress::NoProgress, settings::ProjectSettings},
    scene::style::VisualStyle,
};

fn ctx(width: u32, height: u32, duration: f64, every: u64) -> RenderJobContext {
    let features = AudioFeatures {
        tempo_bpm: 120.0,
        energy_levels: vec![0.3, 0.9, 0.2, 0.8],
        duration_seconds: duration,
        ..AudioFeatures::default()
    };
    let settings = ProjectSettings {
        width,
        height,
        fps: 10,
        progress_every: every,
        threads: Some(2),
        ..ProjectSettings::default()
    };
    RenderJobContext::new(
        Timeline::from_features(&features).unwrap(),
        VisualStyle::SquareBoomGrid,
        settings,
    )
    .unwrap()
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[test]
fn writes_every_frame_in_index_order() {
    let work = tempfile::tempdir().unwrap();
    let ctx = ctx(64, 36, 2.0, 5);
    let seq = render_sequence(&ctx, work.path(), &CancellationToken::new(), &NoProgress).unwrap();
    assert_eq!(seq.frames.len(), 20);
    for (i, path) in seq.frames.iter().enumerate() {
        assert_eq!(path, &seq.dir.frame_path(i as u64));
        assert!(path.is_file(), "{}", path.display());
    }
    assert_eq!(entries(seq.dir.path()), 20);
    let dir = seq.dir.path().to_path_buf();
    drop(seq);
    assert!(!dir.exists());
    assert_eq!(entries(work.path()), 0);
}

#[test]
fn progress_is_monotonic_and_ends_at_total() {
    let work = tempfile::tempdir().unwrap();
    let ctx = ctx(64, 36, 2.0, 3);
    let seen = Mutex::new(Vec::new());
    let sink = |r: &ProgressReport| seen.lock().unwrap().push(r.clone());
    let _seq = render_sequence(&ctx, work.path(), &CancellationToken::new(), &sink).unwrap();

    let seen = seen.into_inner().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0].current_frame < w[1].current_frame));
    let last = seen.last().unwrap();
    assert_eq!((last.current_frame, last.total_frames), (20, 20));
    assert_eq!(last.stage, Stage::Rendering);
    assert_eq!(last.estimated_remaining, Some(Duration::ZERO));
}

#[test]
fn cancelled_before_start_leaves_nothing() {
    let work = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = render_sequence(&ctx(64, 36, 1.0, 1), work.path(), &cancel, &NoProgress).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(entries(work.path()), 0);
}

#[test]
fn cancelled_mid_run_removes_partial_frames() {
    let work = tempfile::tempdir().unwrap();
    let ctx = ctx(320, 180, 9.0, 1);
    let cancel = CancellationToken::new();
    let trip = cancel.clone();
    let sink = move |_: &ProgressReport| trip.cancel();
    let err = render_sequence(&ctx, work.path(), &cancel, &sink).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(entries(work.path()), 0);
}

#[test]
fn preview_frame_matches_canvas() {
    let ctx = ctx(64, 36, 2.0, 5);
    let frame = render_frame_at(&ctx, 0.75).unwrap();
    assert_eq!((frame.width, frame.height), (64, 36));
    assert!(render_frame_at(&ctx, f64::NAN).is_err());
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert_eq!(build_thread_pool(Some(3)).unwrap().current_num_threads(), 3);
}
