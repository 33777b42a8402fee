//! OCR module.
//!
//! Recognizes text in page images and table cells. Tesseract (via its
//! command line) is the engine; callers depend on the [`OcrBackend`] trait.

mod backend;
mod tesseract;

pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult, PageSegMode};
pub use tesseract::TesseractBackend;
