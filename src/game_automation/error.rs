use super::broadcast::{PublishError, WaitError};
use super::match_image::VisionError;
use crate::adb::AdbError;
use std::path::PathBuf;
use thiserror::Error;

pub type AutomationResult<T> = Result<T, AutomationError>;

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Frame channel completed")]
    ChannelCompleted,

    #[error("Device error: {0}")]
    Device(#[from] AdbError),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Template asset missing: {path:?}")]
    MissingTemplate { path: PathBuf },
}

impl AutomationError {
    /// Cancellation and channel completion are how supervisors stop; they are not failures.
    pub fn is_cancellation(&self) -> bool {
        match self {
            AutomationError::Cancelled | AutomationError::ChannelCompleted => true,
            AutomationError::Join(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

impl From<WaitError> for AutomationError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Cancelled => AutomationError::Cancelled,
            WaitError::Completed => AutomationError::ChannelCompleted,
        }
    }
}

impl From<PublishError> for AutomationError {
    fn from(_: PublishError) -> Self {
        AutomationError::ChannelCompleted
    }
}
