use std::path::PathBuf;
use thiserror::Error;

pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Failed to load template {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("OCR engine failed: {description}")]
    Ocr { description: String },

    #[error("OCR scratch file error at {path:?}: {source}")]
    OcrScratch {
        path: PathBuf,
        source: std::io::Error,
    },
}
