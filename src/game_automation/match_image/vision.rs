//! Vision engine facade: pure queries over one captured frame

use super::color::detect_by_color;
use super::config::{ColorSearchConfig, MatchConfig, PanelConfig};
use super::error::VisionResult;
use super::ocr::TextRecognizer;
use super::panels::{PanelText, detect_upgrades};
use super::template::{Template, TemplateLibrary, TemplateMatch, best_match};
use image::RgbImage;
use image::imageops;
use std::sync::Arc;

pub struct Vision {
    templates: TemplateLibrary,
    match_config: MatchConfig,
    color_config: ColorSearchConfig,
    panel_config: PanelConfig,
    recognizer: Arc<dyn TextRecognizer>,
}

impl Vision {
    pub fn new(templates: TemplateLibrary, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            templates,
            match_config: MatchConfig::default(),
            color_config: ColorSearchConfig::default(),
            panel_config: PanelConfig::default(),
            recognizer,
        }
    }

    pub fn with_match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    pub fn with_panel_config(mut self, config: PanelConfig) -> Self {
        self.panel_config = config;
        self
    }

    pub fn match_config(&self) -> &MatchConfig {
        &self.match_config
    }

    /// Search `frame` for `template` using the configured threshold and centering.
    pub fn locate(&self, frame: &RgbImage, template: Template) -> VisionResult<Option<TemplateMatch>> {
        self.find_template(
            frame,
            template,
            self.match_config.confidence_threshold,
            self.match_config.center,
        )
    }

    /// Template search: load the template from disk, correlate it against the frame
    /// and keep the global maximum if it clears `threshold`.
    pub fn find_template(
        &self,
        frame: &RgbImage,
        template: Template,
        threshold: f32,
        center: bool,
    ) -> VisionResult<Option<TemplateMatch>> {
        let template_gray = self.templates.load(template)?;
        let frame_gray = imageops::grayscale(frame);
        let found = best_match(&frame_gray, &template_gray, threshold, center);
        if let Some(m) = &found {
            log::debug!("🎯 {template} at ({}, {}) conf={:.3}", m.x, m.y, m.confidence);
        }
        Ok(found)
    }

    pub fn detect_by_color(&self, frame: &RgbImage, origin: (u32, u32), orbit_radius: u32) -> Option<(u32, u32)> {
        detect_by_color(frame, origin, orbit_radius, &self.color_config)
    }

    pub fn detect_upgrades(&self, frame: &RgbImage) -> VisionResult<Vec<PanelText>> {
        detect_upgrades(frame, self.recognizer.as_ref(), &self.panel_config)
    }
}
