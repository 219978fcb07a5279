use super::*;
use crate::{
    analysis::{features::AudioFeatures, timeline::Timeline},
    foundation::core::FrameIndex,
    pipeline::settings::ProjectSettings,
    scene::{snapshot::snapshot, style::VisualStyle},
};

fn job(style: VisualStyle, watermark: &str) -> RenderJobContext {
    let features = AudioFeatures {
        tempo_bpm: 120.0,
        energy_levels: vec![0.2, 0.9, 0.3, 0.8, 0.2, 0.9],
        genre: "electronic".into(),
        mood: "energetic".into(),
        duration_seconds: 3.0,
        ..AudioFeatures::default()
    };
    let settings = ProjectSettings {
        width: 160,
        height: 90,
        fps: 10,
        watermark_text: watermark.into(),
        ..ProjectSettings::default()
    };
    RenderJobContext::new(Timeline::from_features(&features).unwrap(), style, settings).unwrap()
}

#[test]
fn frame_has_canvas_size_and_is_premultiplied() {
    let job = job(VisualStyle::SquareBoomGrid, "PIXBEAT");
    let frame = FrameRenderer::new()
        .render(&job, &snapshot(&job, FrameIndex(0)))
        .unwrap();
    assert_eq!((frame.width, frame.height), (160, 90));
    assert_eq!(frame.data.len(), 160 * 90 * 4);
    assert!(frame.premultiplied);
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn rendering_is_deterministic_across_renderers() {
    for style in VisualStyle::ALL {
        let job = job(style, "PIXBEAT");
        let scene = snapshot(&job, FrameIndex(7));
        let mut reused = FrameRenderer::new();
        let _ = reused.render(&job, &snapshot(&job, FrameIndex(2))).unwrap();
        let a = reused.render(&job, &scene).unwrap();
        let b = FrameRenderer::new().render(&job, &scene).unwrap();
        assert_eq!(a, b, "{style:?}");
    }
}

#[test]
fn animated_cells_change_the_picture() {
    let job = job(VisualStyle::Equalizer, "");
    let mut r = FrameRenderer::new();
    let neutral = snapshot(&job, FrameIndex(0));
    let mut pulsed = neutral.clone();
    for cell in pulsed.grid.cells_mut() {
        cell.current_scale = 1.5;
        cell.is_animating = true;
    }
    let a = r.render(&job, &neutral).unwrap();
    let b = r.render(&job, &pulsed).unwrap();
    assert_ne!(a.data, b.data);
}

#[test]
fn watermark_only_touches_when_present() {
    let with = job(VisualStyle::Waveform, "PIXBEAT");
    let without = job(VisualStyle::Waveform, "");
    let scene = snapshot(&with, FrameIndex(3));
    let a = FrameRenderer::new().render(&with, &scene).unwrap();
    let b = FrameRenderer::new().render(&without, &scene).unwrap();
    assert_ne!(a.data, b.data);
    // Bottom-left is far from the bottom-right watermark.
    assert_eq!(a.pixel(0, 89), b.pixel(0, 89));
}

#[test]
fn beat_frames_are_tinted() {
    let job = job(VisualStyle::PixelRunner, "");
    let mut scene = snapshot(&job, FrameIndex(0));
    scene.beat_frame = false;
    let plain = FrameRenderer::new().render(&job, &scene).unwrap();
    scene.beat_frame = true;
    let tinted = FrameRenderer::new().render(&job, &scene).unwrap();
    assert_ne!(plain.data, tinted.data);
}
