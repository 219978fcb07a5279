//! Per-frame scene derivation without cross-frame state.
//!
//! The grid relaxes toward neutral by a fixed factor each frame and snaps once close enough, so
//! any cell left alone for [`REPLAY_WINDOW_FRAMES`] frames is exactly neutral. Replaying only that
//! many frames from a neutral grid therefore reproduces the sequentially advanced state bit for
//! bit, and every frame can be derived on its own worker.

use crate::{
    foundation::core::FrameIndex,
    scene::{
        context::RenderJobContext,
        state::SceneState,
        updater::{advance, integrate_particles},
    },
};

/// Frames replayed before the requested one.
pub const REPLAY_WINDOW_FRAMES: u64 = 32;

/// Scene at frame `frame`.
pub fn snapshot(ctx: &RenderJobContext, frame: FrameIndex) -> SceneState {
    let t = ctx.frame_time(frame);
    replay(ctx, frame.0.saturating_sub(REPLAY_WINDOW_FRAMES), frame.0, t)
}

/// Scene at an arbitrary timestamp (previews). Equal to [`snapshot`] when `t` is a frame time.
pub fn snapshot_at(ctx: &RenderJobContext, t: f64) -> SceneState {
    let t = t.max(0.0);
    let last = (t * ctx.fps().as_f64() + 1e-9).floor() as u64;
    replay(ctx, last.saturating_sub(REPLAY_WINDOW_FRAMES), last, t)
}

// Advances frames `first..last` at their frame times, then once more at `t`.
fn replay(ctx: &RenderJobContext, first: u64, last: u64, t: f64) -> SceneState {
    let template = ctx.template();
    let mut state = SceneState::neutral(template.rows, template.cols);
    for k in first..last {
        advance(&mut state, ctx.events(), ctx.frame_time(FrameIndex(k)));
    }
    advance(&mut state, ctx.events(), t);
    integrate_particles(&mut state, ctx.particles(), t);
    state.beat_frame = ctx.is_beat_frame(t);
    state
}

#[cfg(test)]
#[path = "../../tests/unit/scene/snapshot.rs"]
mod tests;
