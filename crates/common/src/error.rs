//! Error types shared across Shotcraft crates.

use std::path::PathBuf;

/// Top-level error type for Shotcraft operations.
///
/// Only [`ShotcraftError::CaptureUnavailable`] and [`ShotcraftError::Sink`]
/// are meant to reach the user; the selection and composition variants are
/// absorbed by their callers with a fallback.
#[derive(Debug, thiserror::Error)]
pub enum ShotcraftError {
    #[error("Capture unavailable for display {display}: {reason}")]
    CaptureUnavailable { display: String, reason: String },

    #[error("Selection too small or cancelled")]
    DegenerateSelection,

    #[error("Selection does not intersect the captured frame")]
    CropOutOfBounds,

    #[error("Composition error: {message}")]
    Composition { message: String },

    #[error("Output sink error: {message}")]
    Sink { message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ShotcraftError.
pub type ShotcraftResult<T> = Result<T, ShotcraftError>;

impl ShotcraftError {
    pub fn capture_unavailable(display: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CaptureUnavailable {
            display: display.into(),
            reason: reason.into(),
        }
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this failure should be surfaced to the user with a cue.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::CaptureUnavailable { .. } | Self::Sink { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_capture_and_sink_failures_are_user_visible() {
        assert!(ShotcraftError::capture_unavailable("1", "denied").is_user_visible());
        assert!(ShotcraftError::sink("disk full").is_user_visible());
        assert!(!ShotcraftError::DegenerateSelection.is_user_visible());
        assert!(!ShotcraftError::CropOutOfBounds.is_user_visible());
        assert!(!ShotcraftError::composition("alloc").is_user_visible());
    }

    #[test]
    fn capture_unavailable_message_names_display() {
        let err = ShotcraftError::capture_unavailable("display-2", "permission denied");
        assert_eq!(
            err.to_string(),
            "Capture unavailable for display display-2: permission denied"
        );
    }
}
