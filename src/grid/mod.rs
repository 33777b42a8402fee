//! Grid-based table extraction from raster images.
//!
//! Ruling lines are isolated with morphology, their union forms a grid mask,
//! contours of the mask give cell rectangles, and each cell is OCRed as a
//! single line of text.

mod cells;
mod mask;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::ocr::{OcrBackend, OcrError, PageSegMode};
use crate::table::{Quoting, Table};

pub use cells::{find_cell_candidates, group_rows, passes_size_filter, CellCandidate, CellRect};
pub use mask::{adaptive_threshold, dilate, erode, inverted_gray, isolate_lines, union, Orientation};

/// Tunable thresholds for grid detection.
///
/// These are fixed pixel values, not derived from the image resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Cells narrower than this are noise.
    pub min_cell_width: u32,
    /// Cells shorter than this are noise.
    pub min_cell_height: u32,
    /// Maximum top-coordinate difference (exclusive) within a row.
    pub row_tolerance: u32,
    /// Line elements are `dimension / line_scale` pixels long.
    pub line_scale: u32,
    /// Adaptive threshold neighbourhood size.
    pub block_size: u32,
    /// Adaptive threshold offset subtracted from the local mean.
    pub threshold_offset: i32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            min_cell_width: 50,
            min_cell_height: 20,
            row_tolerance: 10,
            line_scale: 30,
            block_size: 15,
            threshold_offset: -2,
        }
    }
}

/// Outcome of a successful image table extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTableOutcome {
    /// The table was recognized and written.
    Written {
        path: PathBuf,
        rows: usize,
        cells: usize,
    },
    /// No cell survived filtering; nothing was written.
    NoCells,
}

/// Binary mask holding only the horizontal and vertical ruling lines.
pub fn grid_mask(image: &DynamicImage, params: &GridParams) -> image::GrayImage {
    let gray = inverted_gray(image);
    let binary = adaptive_threshold(&gray, params.block_size, params.threshold_offset);

    let horizontal_size = mask::line_length(binary.width(), params.line_scale);
    let vertical_size = mask::line_length(binary.height(), params.line_scale);
    tracing::debug!(
        "Line elements: horizontal {}x1, vertical 1x{}",
        horizontal_size,
        vertical_size
    );

    let horizontal = isolate_lines(&binary, horizontal_size, Orientation::Horizontal);
    let vertical = isolate_lines(&binary, vertical_size, Orientation::Vertical);
    union(&horizontal, &vertical)
}

/// Cell candidates of every grid in the image.
pub fn detect_cells(image: &DynamicImage, params: &GridParams) -> Vec<CellCandidate> {
    let grid = grid_mask(image, params);
    find_cell_candidates(&grid, params.min_cell_width, params.min_cell_height)
}

/// Detected cells of the image as row groups, top to bottom.
pub fn detect_table_cells(image: &DynamicImage, params: &GridParams) -> Vec<Vec<CellRect>> {
    let cells = detect_cells(image, params)
        .into_iter()
        .map(|c| c.rect)
        .collect();
    group_rows(cells, params.row_tolerance)
}

/// OCR every cell as a single text line, row-major.
pub fn recognize_cells(
    image: &DynamicImage,
    rows: &[Vec<CellRect>],
    backend: &dyn OcrBackend,
) -> Result<Table, OcrError> {
    let mut table = Vec::with_capacity(rows.len());
    for row in rows {
        let mut row_data = Vec::with_capacity(row.len());
        for cell in row {
            let crop = image.crop_imm(cell.x, cell.y, cell.width, cell.height);
            let result = backend.ocr_buffer(&crop, PageSegMode::SingleLine)?;
            row_data.push(result.text.trim().to_string());
        }
        table.push(row_data);
    }
    Ok(Table::new(table))
}

/// Load an image, turning decode failures into [`ExtractionError::UnreadableImage`].
pub fn load_image(image_path: &Path) -> Result<DynamicImage, ExtractionError> {
    image::open(image_path).map_err(|source| ExtractionError::UnreadableImage {
        path: image_path.to_path_buf(),
        source,
    })
}

/// Extract a ruled table from an image and save it as CSV.
///
/// Returns [`ImageTableOutcome::NoCells`] without touching `output_csv` when
/// no cell is detected. The CSV is written only after every cell has been
/// recognized.
pub fn extract_table_from_image(
    image_path: &Path,
    output_csv: &Path,
    backend: &dyn OcrBackend,
    params: &GridParams,
) -> Result<ImageTableOutcome, ExtractionError> {
    let image = load_image(image_path)?;

    let rows = detect_table_cells(&image, params);
    if rows.is_empty() {
        tracing::info!("No table cells detected in {}", image_path.display());
        return Ok(ImageTableOutcome::NoCells);
    }

    let cells: usize = rows.iter().map(Vec::len).sum();
    tracing::info!(
        "Detected {} cells in {} rows in {}",
        cells,
        rows.len(),
        image_path.display()
    );

    let table = recognize_cells(&image, &rows, backend)?;
    table.write_csv(output_csv, Quoting::Minimal)?;

    Ok(ImageTableOutcome::Written {
        path: output_csv.to_path_buf(),
        rows: table.row_count(),
        cells,
    })
}
