use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    encode::sink::{EncodeRequest, Encoder},
    foundation::error::{PixbeatError, PixbeatResult},
};

/// Encoder that shells out to the system `ffmpeg` binary.
///
/// Frames are fed through an `ffconcat` list written next to the output, so the encode order is
/// exactly the order of [`EncodeRequest::frames`]. Video is h264/yuv420p; audio, when present, is
/// AAC cut to the shorter of the two streams.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `ffmpeg` executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, request: &EncodeRequest, list: &Path) -> Command {
        let fps = request.settings.fps.0;
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if request.overwrite { "-y" } else { "-n" });
        cmd.args(["-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(list);
        if let Some(audio) = request.audio.as_ref() {
            cmd.arg("-i").arg(audio);
        }
        cmd.args([
            "-r",
            &fps.to_string(),
            "-c:v",
            "libx264",
            "-crf",
            &request.settings.quality.x264_crf().to_string(),
            "-pix_fmt",
            "yuv420p",
        ]);
        if request.audio.is_some() {
            cmd.args(["-c:a", "aac", "-shortest"]);
        } else {
            cmd.arg("-an");
        }
        cmd.args(["-movflags", "+faststart"]).arg(&request.output);
        cmd
    }
}

impl Encoder for FfmpegEncoder {
    #[tracing::instrument(
        skip(self, request),
        fields(frames = request.frames.len(), output = %request.output.display())
    )]
    fn encode(&self, request: &EncodeRequest) -> PixbeatResult<PathBuf> {
        if request.frames.is_empty() {
            return Err(PixbeatError::encode("no frames to encode"));
        }
        let s = &request.settings;
        let even = s.width.is_multiple_of(2) && s.height.is_multiple_of(2);
        if s.width == 0 || s.height == 0 || !even {
            return Err(PixbeatError::validation(format!(
                "ffmpeg output size must be non-zero and even (got {}x{})",
                s.width, s.height
            )));
        }
        ensure_parent_dir(&request.output)?;
        if !request.overwrite && request.output.exists() {
            return Err(PixbeatError::validation(format!(
                "output file '{}' already exists",
                request.output.display()
            )));
        }
        if let Some(audio) = request.audio.as_ref()
            && !audio.is_file()
        {
            return Err(PixbeatError::encode(format!(
                "audio track '{}' does not exist",
                audio.display()
            )));
        }

        let list = ConcatList::write(request)?;
        let mut child = self
            .command(request, list.path())
            .spawn()
            .map_err(|e| {
                PixbeatError::encode(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.program.display()
                ))
            })?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PixbeatError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok::<_, std::io::Error>(bytes)
        });

        let status = child
            .wait()
            .map_err(|e| PixbeatError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = drain
            .join()
            .map_err(|_| PixbeatError::encode("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| PixbeatError::encode(format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(PixbeatError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        tracing::info!(output = %request.output.display(), "encoded video");
        Ok(request.output.clone())
    }
}

// `ffconcat` input list; removed when dropped.
struct ConcatList(PathBuf);

impl ConcatList {
    fn write(request: &EncodeRequest) -> PixbeatResult<Self> {
        let dir = request
            .frames
            .first()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let path = dir.join(format!("pixbeat_concat_{}.ffconcat", std::process::id()));
        let body = concat_list_body(&request.frames, request.settings.fps.frame_duration_secs());
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write concat list '{}'", path.display()))
            .map_err(|e| PixbeatError::encode(format!("{e:#}")))?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ConcatList {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn concat_list_body(frames: &[PathBuf], frame_secs: f64) -> String {
    let mut body = String::from("ffconcat version 1.0\n");
    for frame in frames {
        body.push_str(&format!(
            "file '{}'\nduration {frame_secs:.6}\n",
            escape_concat_path(frame)
        ));
    }
    // The concat demuxer ignores the duration of the final entry unless it is repeated.
    if let Some(last) = frames.last() {
        body.push_str(&format!("file '{}'\n", escape_concat_path(last)));
    }
    body
}

fn escape_concat_path(path: &Path) -> String {
    path.display().to_string().replace('\'', "'\\''")
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> PixbeatResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))
            .map_err(|e| PixbeatError::encode(format!("{e:#}")))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
