//! PixBeat turns a song's analyzed features into a beat-synchronized pixel-grid music video.
//!
//! The engine is a straight pipeline:
//!
//! - Normalize analyzer output into a [`Timeline`]
//! - Map it to a time-sorted list of [`GraphicsEvent`]s
//! - Derive each frame's [`SceneState`] independently and rasterize it with a [`FrameRenderer`]
//! - Write numbered frames in parallel and hand them to an [`Encoder`]
//!
//! [`RenderJob`] runs all of it for one [`RenderJobRequest`].
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod analysis;
pub(crate) mod animation;
pub(crate) mod encode;
pub(crate) mod mapping;
pub(crate) mod pipeline;
pub(crate) mod render;
pub(crate) mod scene;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rgba8, Vec2};
pub use crate::foundation::error::{PixbeatError, PixbeatResult, Stage};

pub use crate::analysis::features::{
    AnalysisLoudness, AnalysisOnset, AnalysisSection, AnalysisTimeline, AudioFeatures,
};
pub use crate::analysis::timeline::{
    LoudnessSample, Onset, Section, SongInfo, Timeline, synthesize_beats,
};
pub use crate::animation::ease::Ease;
pub use crate::encode::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::encode::sink::{EncodeRequest, EncodeSettings, Encoder, Quality};
pub use crate::mapping::event::{
    CellCoord, EventKind, EventList, GraphicsEvent, Targets, WipeDirection,
};
pub use crate::mapping::mapper::{MapperRules, WipeMode, map_events};
pub use crate::mapping::projection::frequency_to_row;
pub use crate::pipeline::job::{JobOutcome, JobStats, RenderJob};
pub use crate::pipeline::progress::{
    CancellationToken, LogProgress, NoProgress, ProgressReport, ProgressSink,
};
pub use crate::pipeline::sequence::{FrameDir, RenderedSequence, render_frame_at, render_sequence};
pub use crate::pipeline::settings::{ProjectSettings, RenderJobRequest, SongInput};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::renderer::FrameRenderer;
pub use crate::scene::context::RenderJobContext;
pub use crate::scene::palette::{Palette, PaletteKind};
pub use crate::scene::particles::{ParticleSchedule, ParticleSpawn};
pub use crate::scene::snapshot::{REPLAY_WINDOW_FRAMES, snapshot, snapshot_at};
pub use crate::scene::state::{CellState, Grid, Particle, SceneState};
pub use crate::scene::style::{Motif, TemplateConfig, VisualStyle};
pub use crate::scene::updater::{advance, integrate_particles};
