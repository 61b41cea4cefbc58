pub mod adb;
pub mod args;
pub mod game_automation;

pub use adb::{AdbShell, DeviceController};
pub use game_automation::{AutomationConfig, GameAutomation, GameState};

#[cfg(test)]
pub(crate) mod test_support;
