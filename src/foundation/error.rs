use std::fmt;

/// Convenience result type used across PixBeat.
pub type PixbeatResult<T> = Result<T, PixbeatError>;

/// Phase of a render job, used to tell analysis, rendering and encoding failures apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Input loading, feature intake and timeline construction.
    Analysis,
    /// Per-frame state derivation and rasterization.
    Rendering,
    /// Handing frames and audio to the muxing collaborator.
    Encoding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Analysis => "analysis",
            Self::Rendering => "rendering",
            Self::Encoding => "encoding",
        };
        f.write_str(s)
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PixbeatError {
    /// Audio features are missing a required field (zero duration, no tempo and no beats).
    #[error("analysis failed: missing input: {0}")]
    MissingInput(String),

    /// Invalid user-provided settings or request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A frame's draw or write routine failed; fatal to the whole job.
    #[error("rendering failed at frame {frame}: {message}")]
    RenderFrame {
        /// Index of the failing frame.
        frame: u64,
        /// Original cause.
        message: String,
    },

    /// The muxing collaborator reported a failure.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// The job was cancelled; in-flight work stopped at a frame boundary.
    #[error("render cancelled")]
    Cancelled,

    /// Lower-level IO or dependency failure, tagged with the phase it happened in.
    ///
    /// Displays the whole context chain so the OS cause survives.
    #[error("{stage} failed: {cause:#}")]
    Io {
        /// Phase the failure happened in.
        stage: Stage,
        /// Context chain down to the original cause.
        cause: anyhow::Error,
    },
}

impl PixbeatError {
    /// Build a [`PixbeatError::MissingInput`] value.
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    /// Build a [`PixbeatError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PixbeatError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`PixbeatError::RenderFrame`] value.
    pub fn render_frame(frame: u64, msg: impl Into<String>) -> Self {
        Self::RenderFrame {
            frame,
            message: msg.into(),
        }
    }

    /// Build a [`PixbeatError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PixbeatError::Io`] value for `stage`.
    pub fn io(stage: Stage, cause: impl Into<anyhow::Error>) -> Self {
        Self::Io {
            stage,
            cause: cause.into(),
        }
    }

    /// Re-tag a draw or write failure of `frame` as [`PixbeatError::RenderFrame`], keeping the
    /// full cause.
    pub fn at_frame(self, frame: u64) -> Self {
        match self {
            Self::Cancelled => Self::Cancelled,
            Self::RenderFrame { .. } => self,
            Self::Io { cause, .. } => Self::render_frame(frame, format!("{cause:#}")),
            other => Self::render_frame(frame, other.to_string()),
        }
    }

    /// Job phase this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MissingInput(_) | Self::Serde(_) | Self::Validation(_) => Stage::Analysis,
            Self::RenderFrame { .. } | Self::Cancelled => Stage::Rendering,
            Self::Encode(_) => Stage::Encoding,
            Self::Io { stage, .. } => *stage,
        }
    }

    /// `true` for the cancellation signal, which callers do not surface as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for PixbeatError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
