// Types and enums for game automation
use image::RgbImage;
use std::fmt;
use std::sync::Arc;

/// One decoded screen capture, shared read-only with every waiting handler.
pub type Frame = Arc<RgbImage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Unknown,
    MainMenu,
    InBattle,
    Defeat,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Unknown => "Unknown",
            GameState::MainMenu => "MainMenu",
            GameState::InBattle => "InBattle",
            GameState::Defeat => "Defeat",
        };
        f.write_str(name)
    }
}
