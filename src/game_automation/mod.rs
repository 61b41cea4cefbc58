// Game automation module
// Polls the device, classifies the screen and runs one supervisor per game state.

pub mod broadcast;
pub mod config;
pub mod context;
pub mod error;
pub mod fsm;
mod handlers;
pub mod match_image;
pub mod types;
pub mod upgrades;


// Re-export the main types for easy access
pub use broadcast::{Broadcast, PublishError, WaitError};
pub use config::{AutomationConfig, Zone};
pub use context::AutomationContext;
pub use error::{AutomationError, AutomationResult};
pub use fsm::GameAutomation;
pub use match_image::{GameStateDetector, MatchConfig, StateClassifier, Template, TemplateMatch, Vision};
pub use types::{Frame, GameState};
pub use upgrades::{Upgrade, UpgradeOption, UpgradeTracker, UpgradeWindow};
