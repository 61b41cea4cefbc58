//! Optical character recognition through the Tesseract command line tool

use super::error::{VisionError, VisionResult};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

/// Layout hint passed to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// One column of text of variable sizes (upgrade names wrap over lines)
    SingleColumn,
    /// One uniform block of text (level / amount / cost)
    SingleBlock,
}

impl PageLayout {
    fn psm(self) -> &'static str {
        match self {
            PageLayout::SingleColumn => "4",
            PageLayout::SingleBlock => "6",
        }
    }
}

pub trait TextRecognizer: Send + Sync {
    /// Extract text from a monochrome region. Recognition quality is opaque to the
    /// caller; the returned text is trimmed.
    fn recognize(&self, image: &GrayImage, layout: PageLayout) -> VisionResult<String>;
}

pub const OCR_WHITELIST: &str =
    "0123456789.$/%abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Recognizer backed by the `tesseract` binary (LSTM engine, English model).
pub struct TesseractCli {
    binary: String,
    scratch_dir: PathBuf,
    counter: AtomicU64,
}

impl TesseractCli {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
            scratch_dir: std::env::temp_dir().join("tower_farmer_ocr"),
            counter: AtomicU64::new(0),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::new()
        }
    }

    /// Check if the binary is installed and accessible
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn scratch_path(&self) -> PathBuf {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        self.scratch_dir
            .join(format!("region-{}-{id}.png", std::process::id()))
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, image: &GrayImage, layout: PageLayout) -> VisionResult<String> {
        std::fs::create_dir_all(&self.scratch_dir).map_err(|source| VisionError::OcrScratch {
            path: self.scratch_dir.clone(),
            source,
        })?;
        let path = self.scratch_path();
        image.save(&path).map_err(|e| VisionError::Ocr {
            description: format!("could not write {}: {e}", path.display()),
        })?;

        let output = Command::new(&self.binary)
            .arg(&path)
            .arg("stdout")
            .args(["-l", "eng", "--oem", "1", "--psm", layout.psm()])
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={OCR_WHITELIST}"))
            .output();
        let _ = std::fs::remove_file(&path);

        let output = output.map_err(|e| VisionError::Ocr {
            description: format!("failed to run {}: {e}", self.binary),
        })?;
        if !output.status.success() {
            return Err(VisionError::Ocr {
                description: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        log::debug!("OCR ({layout:?}) result: {text:?}");
        Ok(text)
    }
}
