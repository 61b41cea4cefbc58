//! Image matching module for Android game automation
//!
//! This module provides the vision engine: template matching, color-based radial
//! search, upgrade panel segmentation with OCR, and game state detection.

pub mod color;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod ocr;
pub mod panels;
pub mod template;
pub mod vision;


// Re-export main types and functions
pub use config::{ColorSearchConfig, HsvRange, MatchConfig, PanelConfig, create_gem_config};
pub use detector::{DETECTION_ORDER, GameStateDetector, StateClassifier};
pub use error::{VisionError, VisionResult};
pub use ocr::{PageLayout, TesseractCli, TextRecognizer};
pub use panels::PanelText;
pub use template::{Template, TemplateLibrary, TemplateMatch};
pub use vision::Vision;
