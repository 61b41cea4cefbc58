//! Game state classification from indicator templates

use super::error::VisionResult;
use super::template::Template;
use super::vision::Vision;
use crate::game_automation::types::GameState;
use image::RgbImage;
use std::sync::Arc;

/// States tested in priority order; the first state with any matching indicator wins.
/// MainMenu must precede Defeat, which must precede InBattle: battle HUD buttons stay
/// visible behind the defeat dialog.
pub const DETECTION_ORDER: [(GameState, &[Template]); 3] = [
    (GameState::MainMenu, &[Template::BattleStart]),
    (GameState::Defeat, &[Template::Retry]),
    (
        GameState::InBattle,
        &[Template::SuperOff, Template::EcoOff, Template::DefenseOff],
    ),
];

pub trait StateClassifier: Send + Sync + 'static {
    fn classify(&self, frame: &RgbImage) -> VisionResult<GameState>;
}

/// Classifies frames by template matching against known state indicators.
pub struct GameStateDetector {
    vision: Arc<Vision>,
    threshold: f32,
}

impl GameStateDetector {
    pub fn new(vision: Arc<Vision>) -> Self {
        let threshold = vision.match_config().confidence_threshold;
        Self { vision, threshold }
    }
}

impl StateClassifier for GameStateDetector {
    fn classify(&self, frame: &RgbImage) -> VisionResult<GameState> {
        for (state, indicators) in DETECTION_ORDER {
            for template in indicators {
                if self
                    .vision
                    .find_template(frame, *template, self.threshold, true)?
                    .is_some()
                {
                    return Ok(state);
                }
            }
        }
        Ok(GameState::Unknown)
    }
}
