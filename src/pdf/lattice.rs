//! Ruling-line ("lattice") table inference.
//!
//! Cells come from the grid detector run on a rasterized page; their text
//! comes from the PDF text layer instead of OCR.

use std::collections::BTreeMap;

use image::DynamicImage;

use super::words::PageWords;
use crate::grid::{detect_cells, group_rows, CellRect, GridParams};
use crate::table::Table;

/// PDF points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Text of the words whose centre lies inside `cell`, in reading order.
fn cell_text(cell: &CellRect, page: &PageWords, px_per_point: f64) -> String {
    page.words
        .iter()
        .filter(|word| {
            let (cx, cy) = word.center();
            cell.contains_point(cx * px_per_point, cy * px_per_point)
        })
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detect lattice tables on one page rendered at `dpi`, top to bottom.
pub fn detect_tables(
    page_image: &DynamicImage,
    page: &PageWords,
    dpi: u32,
    params: &GridParams,
) -> Vec<Table> {
    let mut grids: BTreeMap<usize, Vec<CellRect>> = BTreeMap::new();
    for candidate in detect_cells(page_image, params) {
        grids.entry(candidate.grid).or_default().push(candidate.rect);
    }

    let mut grids: Vec<Vec<CellRect>> = grids.into_values().collect();
    grids.sort_by_key(|cells| cells.iter().map(|c| (c.y, c.x)).min());

    let px_per_point = f64::from(dpi) / POINTS_PER_INCH;
    let tables: Vec<Table> = grids
        .into_iter()
        .map(|cells| {
            let rows = group_rows(cells, params.row_tolerance);
            Table::new(
                rows.iter()
                    .map(|row| {
                        row.iter()
                            .map(|cell| cell_text(cell, page, px_per_point))
                            .collect()
                    })
                    .collect(),
            )
        })
        .collect();

    tracing::debug!("Page {}: {} lattice table(s)", page.page, tables.len());
    tables
}
