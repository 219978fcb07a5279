use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{
    encode::{
        ffmpeg::ensure_parent_dir,
        sink::{EncodeRequest, EncodeSettings, Encoder},
    },
    foundation::error::{PixbeatError, PixbeatResult, Stage},
    pipeline::{
        progress::{CancellationToken, ProgressReport, ProgressSink},
        sequence::render_sequence,
        settings::RenderJobRequest,
    },
    scene::context::RenderJobContext,
};

/// Result of [`RenderJob::run`]. Cancellation is an outcome, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum JobOutcome {
    Completed { output: PathBuf, stats: JobStats },
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JobStats {
    pub frames: u64,
    pub render_elapsed: Duration,
    pub encode_elapsed: Duration,
    pub total_elapsed: Duration,
}

/// One request turned into a video: context setup, parallel frame rendering, encoding and
/// cleanup of the intermediate frames.
#[derive(Clone, Debug)]
pub struct RenderJob {
    request: RenderJobRequest,
    audio: Option<PathBuf>,
    output: PathBuf,
    work_dir: PathBuf,
    overwrite: bool,
}

impl RenderJob {
    /// Output defaults to `pixbeat_<template>.mp4` in the request's directory hint (or the
    /// current directory); frames go to the system temp directory.
    pub fn new(request: RenderJobRequest) -> Self {
        let dir = request
            .output_directory_hint
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let output = dir.join(format!("pixbeat_{}.mp4", request.template_id));
        Self {
            request,
            audio: None,
            output,
            work_dir: std::env::temp_dir(),
            overwrite: true,
        }
    }

    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Relative paths resolve against the request's directory hint when it has one.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        self.output = match &self.request.output_directory_hint {
            Some(hint) if output.is_relative() => hint.join(output),
            _ => output,
        };
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn request(&self) -> &RenderJobRequest {
        &self.request
    }

    #[tracing::instrument(skip_all, fields(template = %self.request.template_id))]
    pub fn run(
        &self,
        encoder: &dyn Encoder,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> PixbeatResult<JobOutcome> {
        let started = Instant::now();
        if let Some(audio) = &self.audio
            && !audio.is_file()
        {
            return Err(PixbeatError::missing_input(format!(
                "audio file '{}' not found",
                audio.display()
            )));
        }

        let style = self.request.style()?;
        let timeline = self.request.timeline()?;
        let ctx = RenderJobContext::new(timeline, style, self.request.settings.clone())?;
        tracing::info!(frames = ctx.total_frames(), "starting render job");

        let sequence = match render_sequence(&ctx, &self.work_dir, cancel, progress) {
            Ok(seq) => seq,
            Err(e) if e.is_cancelled() => {
                tracing::info!("render job cancelled");
                return Ok(JobOutcome::Cancelled);
            }
            Err(e) => return Err(e),
        };
        if cancel.is_cancelled() {
            tracing::info!("render job cancelled before encoding");
            return Ok(JobOutcome::Cancelled);
        }

        let total = ctx.total_frames();
        progress.report(&ProgressReport::new(
            Stage::Encoding,
            total,
            total,
            started.elapsed(),
        ));
        ensure_parent_dir(&self.output)?;
        let canvas = ctx.canvas();
        let request = EncodeRequest {
            frames: sequence.frames.clone(),
            audio: self.audio.clone(),
            settings: EncodeSettings {
                width: canvas.width,
                height: canvas.height,
                fps: ctx.fps(),
                quality: ctx.settings().quality,
            },
            output: self.output.clone(),
            overwrite: self.overwrite,
        };
        let encode_started = Instant::now();
        let encoded = encoder.encode(&request);
        let encode_elapsed = encode_started.elapsed();
        let render_elapsed = sequence.elapsed;
        // Frames are removed whether or not encoding succeeded.
        drop(sequence);
        let output = encoded?;

        let stats = JobStats {
            frames: total,
            render_elapsed,
            encode_elapsed,
            total_elapsed: started.elapsed(),
        };
        tracing::info!(
            output = %output.display(),
            total_ms = stats.total_elapsed.as_millis() as u64,
            "render job complete"
        );
        Ok(JobOutcome::Completed { output, stats })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
