// Shared fixtures for unit tests: synthetic textures, template directories,
// a scripted recognizer and a scripted device.

use crate::adb::{AdbError, AdbResult, DeviceController};
use crate::game_automation::match_image::{
    PageLayout, Template, TemplateLibrary, TextRecognizer, VisionResult,
};
use image::{Rgb, RgbImage};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Deterministic noise texture; different seeds give uncorrelated images.
pub fn texture(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    RgbImage::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let bytes = (state >> 24).to_le_bytes();
        Rgb([bytes[0], bytes[1], bytes[2]])
    })
}

pub fn paste(frame: &mut RgbImage, patch: &RgbImage, x: u32, y: u32) {
    image::imageops::replace(frame, patch, i64::from(x), i64::from(y));
}

pub const TEMPLATE_SIZE: (u32, u32) = (24, 16);

/// Texture written to disk for `template`.
pub fn template_image(template: Template) -> RgbImage {
    let seed = Template::ALL
        .iter()
        .position(|t| *t == template)
        .unwrap_or_default() as u64
        + 100;
    texture(TEMPLATE_SIZE.0, TEMPLATE_SIZE.1, seed)
}

/// Directory of template PNGs, removed when dropped.
pub struct TempTemplates {
    pub dir: TempDir,
}

impl TempTemplates {
    pub fn new(label: &str, templates: &[Template]) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("tower_farmer_{label}_"))
            .tempdir()
            .unwrap();
        for template in templates {
            template_image(*template)
                .save(dir.path().join(template.file_name()))
                .unwrap();
        }
        Self { dir }
    }

    pub fn all(label: &str) -> Self {
        Self::new(label, &Template::ALL)
    }

    pub fn library(&self) -> TemplateLibrary {
        TemplateLibrary::new(self.dir.path())
    }
}

/// Recognizer returning fixed text per layout.
pub struct ScriptedRecognizer {
    pub column: String,
    pub block: String,
    pub calls: Mutex<Vec<(PageLayout, u32, u32)>>,
    delay: Duration,
}

impl ScriptedRecognizer {
    pub fn new(column: &str, block: &str) -> Self {
        Self {
            column: column.to_string(),
            block: block.to_string(),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Block the calling thread this long per call, like a slow tesseract run.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&self, image: &image::GrayImage, layout: PageLayout) -> VisionResult<String> {
        std::thread::sleep(self.delay);
        self.calls
            .lock()
            .unwrap()
            .push((layout, image.width(), image.height()));
        Ok(match layout {
            PageLayout::SingleColumn => self.column.clone(),
            PageLayout::SingleBlock => self.block.clone(),
        })
    }
}

/// Device that serves whatever frame the test installs and records every tap.
pub struct MockDevice {
    frame: Mutex<Option<RgbImage>>,
    pub taps: Mutex<Vec<(u32, u32)>>,
    tap_delay: Duration,
}

impl MockDevice {
    pub fn new(frame: RgbImage) -> Self {
        Self {
            frame: Mutex::new(Some(frame)),
            taps: Mutex::new(Vec::new()),
            tap_delay: Duration::from_millis(5),
        }
    }

    pub fn set_frame(&self, frame: RgbImage) {
        *self.frame.lock().unwrap() = Some(frame);
    }

    /// Subsequent captures fail like a dropped transport.
    pub fn disconnect(&self) {
        *self.frame.lock().unwrap() = None;
    }

    pub fn taps(&self) -> Vec<(u32, u32)> {
        self.taps.lock().unwrap().clone()
    }
}

impl DeviceController for MockDevice {
    fn serial(&self) -> &str {
        "mock-device"
    }

    async fn capture_frame(&self) -> AdbResult<RgbImage> {
        let frame = self.frame.lock().unwrap().clone();
        frame.ok_or_else(|| AdbError::NonZeroExit {
            command: "adb exec-out screencap -p".to_string(),
            status: std::process::ExitStatus::default(),
            stderr: "device offline".to_string(),
        })
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        tokio::time::sleep(self.tap_delay).await;
        self.taps.lock().unwrap().push((x, y));
        Ok(())
    }
}
