//! PDF table extraction.
//!
//! Word boxes come from Poppler's `pdftotext -bbox`; tables are inferred
//! either from whitespace (stream) or from ruling lines on rasterized pages
//! (lattice). Each detected table is written to its own CSV file.

mod lattice;
mod pages;
mod poppler;
mod stream;
mod words;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::error::ExtractionError;
use crate::grid::{load_image, GridParams};
use crate::table::{Quoting, Table};

pub use pages::PageSelection;
pub use poppler::{page_count, rasterize, words};
pub use stream::StreamParams;
pub use words::{parse_bbox_html, PageWords, Word};

/// Table detection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFlavor {
    /// Infer tables from whitespace between words.
    #[default]
    Stream,
    /// Infer tables from ruling lines drawn on the page.
    Lattice,
}

impl fmt::Display for TableFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFlavor::Stream => write!(f, "stream"),
            TableFlavor::Lattice => write!(f, "lattice"),
        }
    }
}

/// Options for [`extract_tables_from_pdf`].
#[derive(Debug, Clone)]
pub struct PdfTableOptions {
    pub flavor: TableFlavor,
    pub pages: PageSelection,
    pub stream: StreamParams,
    pub grid: GridParams,
    /// Rasterization resolution for lattice detection.
    pub dpi: u32,
}

impl Default for PdfTableOptions {
    fn default() -> Self {
        Self {
            flavor: TableFlavor::default(),
            pages: PageSelection::default(),
            stream: StreamParams::default(),
            grid: GridParams::default(),
            dpi: crate::text::DEFAULT_DPI,
        }
    }
}

/// A table and the page it was found on.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    pub page: u32,
    pub table: Table,
}

/// Result of a PDF table extraction.
#[derive(Debug, Clone, Default)]
pub struct PdfTablesOutcome {
    /// Tables in page order.
    pub tables: Vec<DetectedTable>,
    /// CSV files written, parallel to `tables`.
    pub files: Vec<PathBuf>,
}

/// Detect tables on already-extracted pages (stream flavor).
pub fn detect_stream_tables(pages: &[PageWords], params: &StreamParams) -> Vec<DetectedTable> {
    pages
        .iter()
        .flat_map(|page| {
            stream::detect_tables(page, params)
                .into_iter()
                .map(|table| DetectedTable {
                    page: page.page,
                    table,
                })
        })
        .collect()
}

fn detect_lattice_tables(
    pdf_path: &Path,
    pages: &[PageWords],
    options: &PdfTableOptions,
) -> Result<Vec<DetectedTable>, ExtractionError> {
    let dpi = options.dpi;
    let temp_dir = TempDir::new()?;
    let images = rasterize(pdf_path, dpi, &options.pages, temp_dir.path())?;

    let mut tables = Vec::new();
    for (page_number, image_path) in images {
        let Some(page) = pages.iter().find(|p| p.page == page_number) else {
            tracing::warn!("No text layer for page {}, skipping", page_number);
            continue;
        };
        let image = load_image(&image_path)?;
        tables.extend(
            lattice::detect_tables(&image, page, dpi, &options.grid)
                .into_iter()
                .map(|table| DetectedTable {
                    page: page_number,
                    table,
                }),
        );
    }
    Ok(tables)
}

/// Reject selections that start past the last page.
fn check_selection(pdf_path: &Path, selection: &PageSelection) -> Result<(), ExtractionError> {
    let Some((first, _)) = selection.bounds() else {
        return Ok(());
    };
    let total = page_count(pdf_path)?;
    if first > total {
        return Err(ExtractionError::InvalidPageSelection(format!(
            "{} starts past the last page of {} ({} page(s))",
            selection,
            pdf_path.display(),
            total
        )));
    }
    Ok(())
}

/// Detect every table in a PDF without writing anything.
pub fn detect_pdf_tables(
    pdf_path: &Path,
    options: &PdfTableOptions,
) -> Result<Vec<DetectedTable>, ExtractionError> {
    check_selection(pdf_path, &options.pages)?;

    let pages = words(pdf_path, &options.pages)?;
    tracing::debug!(
        "Read {} page(s) of {} ({} flavor, pages {})",
        pages.len(),
        pdf_path.display(),
        options.flavor,
        options.pages
    );

    match options.flavor {
        TableFlavor::Stream => Ok(detect_stream_tables(&pages, &options.stream)),
        TableFlavor::Lattice => detect_lattice_tables(pdf_path, &pages, options),
    }
}

/// Extract every table in a PDF and save each as `table_<i>.csv` in
/// `output_folder` (created if missing). Tables are numbered from 0 across
/// all pages.
pub fn extract_tables_from_pdf(
    pdf_path: &Path,
    output_folder: &Path,
    options: &PdfTableOptions,
) -> Result<PdfTablesOutcome, ExtractionError> {
    std::fs::create_dir_all(output_folder)?;
    let tables = detect_pdf_tables(pdf_path, options)?;
    let files = write_tables(&tables, output_folder)?;
    Ok(PdfTablesOutcome { tables, files })
}

/// Write one table as `output_folder/table_<index>.csv`, quoting all fields.
pub fn write_table(
    index: usize,
    table: &Table,
    output_folder: &Path,
) -> Result<PathBuf, ExtractionError> {
    let csv_path = output_folder.join(format!("table_{}.csv", index));
    table.write_csv(&csv_path, Quoting::All)?;
    Ok(csv_path)
}

/// Write `table_<i>.csv` for every table.
pub fn write_tables(
    tables: &[DetectedTable],
    output_folder: &Path,
) -> Result<Vec<PathBuf>, ExtractionError> {
    tables
        .iter()
        .enumerate()
        .map(|(i, detected)| write_table(i, &detected.table, output_folder))
        .collect()
}
