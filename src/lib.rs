//! docextract - table and text extraction from PDFs and scanned images.
//!
//! Two pipelines share this library:
//! - table extraction: stream/lattice detection on PDFs, ruling-line grid
//!   detection plus per-cell OCR on images, written as CSV
//! - OCR text extraction: PDF pages rasterized and recognized into one
//!   text file with per-page headers

pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod ocr;
pub mod pdf;
pub mod process;
pub mod table;
pub mod text;

pub use error::ExtractionError;
