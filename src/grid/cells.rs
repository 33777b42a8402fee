//! Cell rectangles: contour extraction, filtering, and row grouping.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};

/// Axis-aligned cell rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the point lies within this rectangle.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= f64::from(self.x)
            && x < f64::from(self.right())
            && y >= f64::from(self.y)
            && y < f64::from(self.bottom())
    }
}

/// A cell rectangle plus the index of the outermost contour enclosing it,
/// which identifies the grid (table) the cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCandidate {
    pub rect: CellRect,
    pub grid: usize,
}

/// Smallest rectangle covering every contour point.
fn bounding_rect(contour: &Contour<u32>) -> Option<CellRect> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(CellRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Index of the top-level contour that (transitively) contains `index`.
fn root_of(contours: &[Contour<u32>], mut index: usize) -> usize {
    while let Some(parent) = contours[index].parent {
        index = parent;
    }
    index
}

/// Noise filter: cells narrower than `min_width` or shorter than
/// `min_height` are discarded.
pub fn passes_size_filter(rect: &CellRect, min_width: u32, min_height: u32) -> bool {
    rect.width >= min_width && rect.height >= min_height
}

/// Extract candidate cells from a grid mask.
///
/// Every contour contributes its bounding rectangle, and rectangles below the
/// size thresholds are dropped. An outer border is also dropped when one of
/// its own holes survives the size filter: the holes are the cells and the
/// outer border is only the ruling around them. A ruled box drawn inside a
/// cell is a separate outer border nested in the cell's hole, so the cell
/// stays.
pub fn find_cell_candidates(grid: &GrayImage, min_width: u32, min_height: u32) -> Vec<CellCandidate> {
    let contours = find_contours::<u32>(grid);
    tracing::debug!("Found {} contours in grid mask", contours.len());

    let rects: Vec<Option<CellRect>> = contours
        .iter()
        .map(|contour| {
            bounding_rect(contour).filter(|rect| passes_size_filter(rect, min_width, min_height))
        })
        .collect();

    let mut has_cell_hole = vec![false; contours.len()];
    for (contour, rect) in contours.iter().zip(&rects) {
        if let (BorderType::Hole, Some(_), Some(parent)) = (contour.border_type, rect, contour.parent) {
            has_cell_hole[parent] = true;
        }
    }

    let mut candidates: Vec<CellCandidate> = Vec::new();
    for (i, contour) in contours.iter().enumerate() {
        let Some(rect) = rects[i] else {
            continue;
        };
        if contour.border_type == BorderType::Outer && has_cell_hole[i] {
            continue;
        }
        if candidates.iter().any(|c| c.rect == rect) {
            continue;
        }
        candidates.push(CellCandidate {
            rect,
            grid: root_of(&contours, i),
        });
    }
    candidates
}

/// Partition cells into rows.
///
/// Cells are visited by `(y, x)`. A cell joins the current row when its top
/// is less than `tolerance` pixels away from the reference top, which is the
/// top of the last cell visited. Otherwise it starts a new row. Each row is
/// sorted left to right.
pub fn group_rows(mut cells: Vec<CellRect>, tolerance: u32) -> Vec<Vec<CellRect>> {
    cells.sort_by_key(|c| (c.y, c.x));

    let mut rows: Vec<Vec<CellRect>> = Vec::new();
    let mut reference_top = None;
    for cell in cells {
        if let (Some(top), Some(row)) = (reference_top, rows.last_mut()) {
            if cell.y.abs_diff(top) < tolerance {
                reference_top = Some(cell.y);
                row.push(cell);
                continue;
            }
        }
        reference_top = Some(cell.y);
        rows.push(vec![cell]);
    }

    for row in &mut rows {
        row.sort_by_key(|c| c.x);
    }
    rows
}
