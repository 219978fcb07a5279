use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::foundation::error::{PixbeatError, PixbeatResult, Stage};

/// Snapshot of job progress.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressReport {
    /// Frames finished so far.
    pub current_frame: u64,
    pub total_frames: u64,
    pub stage: Stage,
    pub elapsed: Duration,
    /// Linear extrapolation from the frames finished so far; `None` before the first frame.
    pub estimated_remaining: Option<Duration>,
}

impl ProgressReport {
    pub fn new(stage: Stage, current_frame: u64, total_frames: u64, elapsed: Duration) -> Self {
        let estimated_remaining = (current_frame > 0).then(|| {
            let left = total_frames.saturating_sub(current_frame);
            elapsed.mul_f64(left as f64 / current_frame as f64)
        });
        Self {
            current_frame,
            total_frames,
            stage,
            elapsed,
            estimated_remaining,
        }
    }

    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            return 1.0;
        }
        (self.current_frame as f64 / self.total_frames as f64).min(1.0)
    }
}

/// Receives progress reports. Called from a dedicated reporting thread, never from a worker.
pub trait ProgressSink: Send + Sync {
    fn report(&self, report: &ProgressReport);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressReport) + Send + Sync,
{
    fn report(&self, report: &ProgressReport) {
        self(report)
    }
}

/// Sink that drops every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _report: &ProgressReport) {}
}

/// Sink that logs each report through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, r: &ProgressReport) {
        tracing::info!(
            stage = %r.stage,
            frame = r.current_frame,
            total = r.total_frames,
            elapsed_ms = r.elapsed.as_millis() as u64,
            eta_ms = r.estimated_remaining.map(|d| d.as_millis() as u64),
            "progress"
        );
    }
}

/// Cooperative cancellation flag shared between the caller and the workers.
///
/// Workers check it before starting a frame; a frame already in flight runs to completion.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancelled.
    pub fn check(&self) -> PixbeatResult<()> {
        if self.is_cancelled() {
            Err(PixbeatError::Cancelled)
        } else {
            Ok(())
        }
    }
}
