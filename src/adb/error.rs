use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all device bridge operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'adb' binary not found in PATH. Install Android Platform Tools (https://developer.android.com/tools/adb) or add 'adb' to PATH."
    )]
    AdbNotFound,

    #[error("Failed to run '{command}': {source}")]
    CommandFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Failed to decode screencap PNG ({bytes} bytes): {source}")]
    FrameDecodeFailed {
        bytes: usize,
        source: image::ImageError,
    },

    #[error("No devices found after {attempts} attempts")]
    NoDevices { attempts: u32 },
}

impl AdbError {
    pub(crate) fn from_spawn(command: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            AdbError::AdbNotFound
        } else {
            AdbError::CommandFailed {
                command: command.to_string(),
                source,
            }
        }
    }

    /// Transport errors are recoverable: the controller logs them and polls again.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AdbError::CommandFailed { .. }
                | AdbError::NonZeroExit { .. }
                | AdbError::FrameDecodeFailed { .. }
        )
    }
}
