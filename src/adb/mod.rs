// ADB module - device bridge for the automation controller
// Frames are captured with `screencap` and taps issued with `input tap`
// through the external `adb` binary.

pub mod error;
pub mod shell;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export the main types and functions for easy access
pub use error::{AdbError, AdbResult};
pub use shell::AdbShell;
pub use types::{Device, DeviceController};
