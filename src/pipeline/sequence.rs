//! Parallel frame sequence rendering.
//!
//! Every frame index maps to `i / fps` and derives its own scene snapshot, so frames are an
//! embarrassingly parallel map over a bounded `rayon` pool. Output files are numbered; ordering for
//! the encoder comes from the filenames, never from completion order.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    foundation::{
        core::FrameIndex,
        error::{PixbeatError, PixbeatResult, Stage},
    },
    pipeline::progress::{CancellationToken, ProgressReport, ProgressSink},
    render::{frame::FrameRGBA, renderer::FrameRenderer},
    scene::{
        context::RenderJobContext,
        snapshot::{snapshot, snapshot_at},
    },
};

/// Job-private directory of rendered frames, removed with everything in it on drop.
#[derive(Debug)]
pub struct FrameDir {
    path: PathBuf,
}

impl FrameDir {
    /// Create a fresh, uniquely named directory under `parent`.
    pub fn create(parent: &Path) -> PixbeatResult<Self> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = parent.join(format!("pixbeat_frames_{}_{nanos}", std::process::id()));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create frame dir '{}'", path.display()))
            .map_err(|e| PixbeatError::io(Stage::Rendering, e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `frame_000042.png` for frame 42.
    pub fn frame_path(&self, frame: u64) -> PathBuf {
        self.path.join(format!("frame_{frame:06}.png"))
    }
}

impl Drop for FrameDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!(dir = %self.path.display(), "removed frame dir"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(dir = %self.path.display(), error = %e, "frame dir cleanup failed")
            }
        }
    }
}

/// Frames written by [`render_sequence`]. Dropping it deletes the files.
#[derive(Debug)]
pub struct RenderedSequence {
    pub dir: FrameDir,
    /// Frame files in ascending index order.
    pub frames: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Render every frame of the job to PNG files in a fresh directory under `work_dir`.
///
/// The cancellation token is checked before each frame. On cancellation or any frame failure the
/// directory is removed before returning.
#[tracing::instrument(skip_all, fields(total_frames = ctx.total_frames()))]
pub fn render_sequence(
    ctx: &RenderJobContext,
    work_dir: &Path,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> PixbeatResult<RenderedSequence> {
    let total = ctx.total_frames();
    if total == 0 {
        return Err(PixbeatError::validation(
            "render duration is shorter than one frame",
        ));
    }
    cancel.check()?;

    let dir = FrameDir::create(work_dir)?;
    let pool = build_thread_pool(ctx.settings().threads)?;
    let every = ctx.settings().progress_every.max(1);
    let started = Instant::now();
    let done = AtomicU64::new(0);
    tracing::debug!(
        dir = %dir.path().display(),
        threads = pool.current_num_threads(),
        "rendering frames"
    );

    let rendered = std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<ProgressReport>();
        scope.spawn(move || {
            // Workers race to send, so drop reports that arrive behind a later one.
            let mut last = 0;
            for r in rx {
                if r.current_frame > last {
                    last = r.current_frame;
                    progress.report(&r);
                }
            }
        });

        let out = pool.install(|| {
            (0..total)
                .into_par_iter()
                .map_init(FrameRenderer::new, |renderer, i| -> PixbeatResult<PathBuf> {
                    cancel.check()?;
                    let path = dir.frame_path(i);
                    write_frame(ctx, renderer, FrameIndex(i), &path)
                        .map_err(|e| e.at_frame(i))?;
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if n % every == 0 || n == total {
                        let _ = tx.send(ProgressReport::new(
                            Stage::Rendering,
                            n,
                            total,
                            started.elapsed(),
                        ));
                    }
                    Ok(path)
                })
                .collect::<PixbeatResult<Vec<_>>>()
        });
        drop(tx);
        out
    });
    // A cancel that lands after the last frame started still discards the sequence.
    let rendered = rendered.and_then(|frames| cancel.check().map(|()| frames));

    match rendered {
        Ok(frames) => {
            let elapsed = started.elapsed();
            tracing::info!(
                frames = frames.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "frames rendered"
            );
            Ok(RenderedSequence {
                dir,
                frames,
                elapsed,
            })
        }
        Err(e) => {
            if e.is_cancelled() {
                tracing::warn!(
                    finished = done.load(Ordering::Relaxed),
                    "render cancelled, discarding partial frames"
                );
            } else {
                tracing::warn!(error = %e, "render failed, discarding partial frames");
            }
            drop(dir);
            Err(e)
        }
    }
}

/// Render a single frame at `time` seconds (previews).
pub fn render_frame_at(ctx: &RenderJobContext, time: f64) -> PixbeatResult<FrameRGBA> {
    if !time.is_finite() {
        return Err(PixbeatError::validation("frame time must be finite"));
    }
    let scene = snapshot_at(ctx, time);
    FrameRenderer::new().render(ctx, &scene)
}

fn write_frame(
    ctx: &RenderJobContext,
    renderer: &mut FrameRenderer,
    frame: FrameIndex,
    path: &Path,
) -> PixbeatResult<()> {
    let scene = snapshot(ctx, frame);
    renderer.render(ctx, &scene)?.write_png(path)
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> PixbeatResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PixbeatError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("pixbeat-frame-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PixbeatError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/sequence.rs"]
mod tests;
