//! OCR backend abstraction.
//!
//! Extraction code talks to OCR engines only through [`OcrBackend`].

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use tempfile::TempDir;
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the engine should segment the image it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSegMode {
    /// Fully automatic page segmentation (whole pages).
    #[default]
    Auto,
    /// Treat the image as a single text line (table cells).
    SingleLine,
}

impl PageSegMode {
    /// Tesseract `--psm` value.
    pub fn psm(&self) -> u8 {
        match self {
            PageSegMode::Auto => 3,
            PageSegMode::SingleLine => 7,
        }
    }
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Extracted text content.
    pub text: String,
    /// Which backend produced this result.
    pub backend: &'static str,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Configuration for OCR backends.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Language for OCR (e.g., "eng", "deu+eng").
    pub language: String,
    /// Executable to invoke (name on PATH or absolute path).
    pub command: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            command: "tesseract".to_string(),
        }
    }
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (dependencies installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn ocr_image(&self, image_path: &Path, mode: PageSegMode) -> Result<OcrResult, OcrError>;

    /// Run OCR on an in-memory image.
    ///
    /// The default implementation writes the image to a scratch PNG and
    /// calls [`OcrBackend::ocr_image`].
    fn ocr_buffer(&self, image: &DynamicImage, mode: PageSegMode) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("region.png");
        image.save(&path)?;

        let mut result = self.ocr_image(&path, mode)?;
        result.processing_time_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psm_values() {
        assert_eq!(PageSegMode::Auto.psm(), 3);
        assert_eq!(PageSegMode::SingleLine.psm(), 7);
        assert_eq!(PageSegMode::default(), PageSegMode::Auto);
    }

    struct EchoBackend;

    impl OcrBackend for EchoBackend {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            String::new()
        }

        fn ocr_image(&self, image_path: &Path, mode: PageSegMode) -> Result<OcrResult, OcrError> {
            let img = image::open(image_path)?;
            Ok(OcrResult {
                text: format!("{}x{} psm{}", img.width(), img.height(), mode.psm()),
                backend: self.name(),
                processing_time_ms: 0,
            })
        }
    }

    #[test]
    fn test_ocr_buffer_round_trips_through_scratch_file() {
        let img = DynamicImage::new_luma8(12, 7);
        let result = EchoBackend
            .ocr_buffer(&img, PageSegMode::SingleLine)
            .unwrap();
        assert_eq!(result.text, "12x7 psm7");
        assert_eq!(result.backend, "echo");
    }
}
