use std::path::PathBuf;

use crate::foundation::{core::Fps, error::PixbeatResult};

/// Output quality tier. Only the ordering matters; encoders map it to their own knobs.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Fast, small, visibly compressed.
    Draft,
    #[default]
    Standard,
    /// Near-transparent compression.
    High,
}

impl Quality {
    /// x264 constant rate factor for this tier (lower is better).
    pub fn x264_crf(self) -> u8 {
        match self {
            Self::Draft => 30,
            Self::Standard => 23,
            Self::High => 18,
        }
    }
}

/// Video parameters handed to an [`Encoder`].
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeSettings {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub quality: Quality,
}

/// One encode invocation: still frames in strict ascending index order plus an optional audio
/// track.
#[derive(Clone, Debug)]
pub struct EncodeRequest {
    /// Frame image paths, index order.
    pub frames: Vec<PathBuf>,
    /// Audio track muxed alongside the frames.
    pub audio: Option<PathBuf>,
    pub settings: EncodeSettings,
    /// Container file to produce.
    pub output: PathBuf,
    /// Overwrite `output` if it already exists.
    pub overwrite: bool,
}

/// Muxes an ordered image sequence (plus audio) into a container file.
///
/// Implementations must consume `frames` in the given order and return the path actually written.
/// Failures surface as [`PixbeatError::Encode`](crate::PixbeatError::Encode) carrying the
/// collaborator's raw message.
pub trait Encoder: Send + Sync {
    fn encode(&self, request: &EncodeRequest) -> PixbeatResult<PathBuf>;
}
