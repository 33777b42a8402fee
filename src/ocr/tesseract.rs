//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract via its command line, writing recognized text to stdout.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrBackend, OcrConfig, OcrError, OcrResult, PageSegMode};
use crate::process::check_binary;

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Arguments passed after the executable.
    fn args(&self, image_path: &Path, mode: PageSegMode) -> Vec<String> {
        vec![
            image_path.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
            "--psm".to_string(),
            mode.psm().to_string(),
        ]
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path, mode: PageSegMode) -> Result<String, OcrError> {
        tracing::debug!(
            "Running {} on {} (psm {})",
            self.config.command,
            image_path.display(),
            mode.psm()
        );
        let output = Command::new(&self.config.command)
            .args(self.args(image_path, mode))
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr.trim())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.config.command
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.config.command)
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    fn ocr_image(&self, image_path: &Path, mode: PageSegMode) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let text = self.run_tesseract(image_path, mode)?;

        Ok(OcrResult {
            text,
            backend: self.name(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
