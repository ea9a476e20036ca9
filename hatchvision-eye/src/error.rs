//! Error types for hatchvision-eye

use hatchvision_core::{ConfigError, Error as CoreError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Segmentation degenerate: left target found={left_found}, right target found={right_found}")]
    SegmentationDegenerate { left_found: bool, right_found: bool },

    #[error("Interpolation error: {0}")]
    Interpolation(String),

    #[error("Sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Frame deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Frame is {actual:?}, expected {expected:?}")]
    FrameSize { expected: (u32, u32), actual: (u32, u32) },

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Core error: {0}")]
    Core(CoreError),
}

impl VisionError {
    /// Whether the loop can skip the current frame and keep going
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VisionError::SegmentationDegenerate { .. }
                | VisionError::Interpolation(_)
                | VisionError::SinkUnavailable(_)
                | VisionError::DeadlineExceeded(_)
                | VisionError::FrameSize { .. }
                | VisionError::Processing(_)
        )
    }
}

impl From<CoreError> for VisionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SinkUnavailable(msg) => VisionError::SinkUnavailable(msg),
            CoreError::SinkTimeout(ms) => {
                VisionError::SinkUnavailable(format!("timed out after {} ms", ms))
            }
            CoreError::Configuration(msg) => VisionError::Config(msg),
            other => VisionError::Core(other),
        }
    }
}

impl From<ConfigError> for VisionError {
    fn from(err: ConfigError) -> Self {
        VisionError::Config(err.to_string())
    }
}

impl From<VisionError> for CoreError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::SinkUnavailable(msg) => CoreError::SinkUnavailable(msg),
            VisionError::Config(msg) => CoreError::Configuration(msg),
            other => CoreError::InvalidValue(format!("Vision error: {}", other)),
        }
    }
}
