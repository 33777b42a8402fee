//! Errors shared by the extraction pipelines.

use std::path::PathBuf;

use thiserror::Error;

use crate::ocr::OcrError;

/// Errors that can occur while extracting tables or text.
///
/// Only hard failures live here. Outcomes such as "no cells detected" or
/// "no tables found" are reported through the pipelines' `Ok` values.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unable to read image at {path}: {source}")]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Whether this error means the input image could not be loaded.
    pub fn is_unreadable_image(&self) -> bool {
        matches!(self, ExtractionError::UnreadableImage { .. })
    }
}
