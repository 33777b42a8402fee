//! Binary masks for ruling-line detection.
//!
//! Pixels are either 0 (background) or 255 (foreground). Morphology is done
//! with one-dimensional rectangular structuring elements, which is all the
//! grid detector needs.

use image::{imageops, DynamicImage, GrayImage, Luma};
use imageproc::map::map_colors2;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Direction of a line structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `k × 1` element.
    Horizontal,
    /// `1 × k` element.
    Vertical,
}

#[derive(Debug, Clone, Copy)]
enum Morph {
    Erode,
    Dilate,
}

/// Single-channel intensity with inverted polarity, so dark strokes on a
/// light background become bright.
pub fn inverted_gray(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    imageops::invert(&mut gray);
    gray
}

/// Local adaptive mean thresholding.
///
/// A pixel becomes foreground when it is brighter than the mean of its
/// `block_size × block_size` neighbourhood minus `offset`. The neighbourhood
/// is clipped at the image border.
pub fn adaptive_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = block_size / 2;
    let stride = width as usize + 1;
    let integral = summed_area_table(image);

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(radius) as usize;
        let y0 = y.saturating_sub(radius) as usize;
        let x1 = (x + radius + 1).min(width) as usize;
        let y1 = (y + radius + 1).min(height) as usize;

        let sum = (integral[y1 * stride + x1] + integral[y0 * stride + x0])
            - (integral[y0 * stride + x1] + integral[y1 * stride + x0]);
        let count = ((x1 - x0) * (y1 - y0)) as u64;
        let mean = ((sum + count / 2) / count) as i32;

        if i32::from(image.get_pixel(x, y)[0]) > mean - offset {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// `(width + 1) × (height + 1)` table where entry `(x, y)` is the sum of all
/// pixels above and left of `(x, y)`.
fn summed_area_table(image: &GrayImage) -> Vec<u64> {
    let (width, height) = image.dimensions();
    let stride = width as usize + 1;
    let mut table = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += u64::from(image.get_pixel(x as u32, y as u32)[0]);
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }
    table
}

/// Size of the line structuring element for an image dimension.
pub fn line_length(dimension: u32, scale: u32) -> u32 {
    (dimension / scale.max(1)).max(1)
}

/// Binary erosion with a line element of `length` pixels.
pub fn erode(mask: &GrayImage, length: u32, orientation: Orientation) -> GrayImage {
    morph_line(mask, length, orientation, Morph::Erode)
}

/// Binary dilation with a line element of `length` pixels.
pub fn dilate(mask: &GrayImage, length: u32, orientation: Orientation) -> GrayImage {
    morph_line(mask, length, orientation, Morph::Dilate)
}

/// Erode then dilate: removes every foreground run shorter than `length`
/// along `orientation`, keeping the long strokes.
pub fn isolate_lines(mask: &GrayImage, length: u32, orientation: Orientation) -> GrayImage {
    dilate(&erode(mask, length, orientation), length, orientation)
}

/// Pixel-wise saturating sum of two masks.
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p: Luma<u8>, q: Luma<u8>| Luma([p[0].saturating_add(q[0])]))
}

/// Window of `length` samples anchored at `length / 2`, applied along every
/// row (horizontal) or column (vertical). Samples outside the image do not
/// take part, so erosion never eats into strokes touching the border.
fn morph_line(mask: &GrayImage, length: u32, orientation: Orientation, op: Morph) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    let (lines, samples) = match orientation {
        Orientation::Horizontal => (height, width),
        Orientation::Vertical => (width, height),
    };
    if samples == 0 {
        return out;
    }

    let k = length.max(1) as usize;
    let anchor = k / 2;
    let n = samples as usize;
    let mut prefix = vec![0usize; n + 1];

    for line in 0..lines {
        let coord = |i: usize| match orientation {
            Orientation::Horizontal => (i as u32, line),
            Orientation::Vertical => (line, i as u32),
        };

        for i in 0..n {
            let (x, y) = coord(i);
            prefix[i + 1] = prefix[i] + usize::from(mask.get_pixel(x, y)[0] != BACKGROUND);
        }

        for i in 0..n {
            let lo = i.saturating_sub(anchor);
            let hi = (i + k - 1 - anchor).min(n - 1);
            let set = prefix[hi + 1] - prefix[lo];
            let on = match op {
                Morph::Erode => set == hi - lo + 1,
                Morph::Dilate => set > 0,
            };
            if on {
                let (x, y) = coord(i);
                out.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> GrayImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        GrayImage::from_fn(width, height, |x, y| {
            if rows[y as usize].as_bytes()[x as usize] == b'#' {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }

    fn rows_of(mask: &GrayImage) -> Vec<String> {
        (0..mask.height())
            .map(|y| {
                (0..mask.width())
                    .map(|x| if mask.get_pixel(x, y)[0] != 0 { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_line_length() {
        assert_eq!(line_length(900, 30), 30);
        assert_eq!(line_length(29, 30), 1);
        assert_eq!(line_length(0, 30), 1);
    }

    #[test]
    fn test_isolate_lines_drops_short_runs() {
        let mask = mask_from_rows(&["..#####..##", "...........", ".###......."]);
        let lines = isolate_lines(&mask, 5, Orientation::Horizontal);
        assert_eq!(rows_of(&lines), ["..#####....", "...........", "..........."]);
    }

    #[test]
    fn test_isolate_lines_vertical() {
        let mask = mask_from_rows(&["#.#", "#..", "#.#", "#.."]);
        let lines = isolate_lines(&mask, 3, Orientation::Vertical);
        assert_eq!(rows_of(&lines), ["#..", "#..", "#..", "#.."]);
    }

    #[test]
    fn test_erode_keeps_border_runs() {
        let mask = mask_from_rows(&["####......"]);
        let eroded = erode(&mask, 3, Orientation::Horizontal);
        assert_eq!(rows_of(&eroded), ["###......."]);
    }

    #[test]
    fn test_adaptive_threshold_marks_strokes_only() {
        // Dark line on white paper, already inverted: the line is bright.
        let mut gray = GrayImage::from_pixel(40, 40, Luma([255]));
        for x in 0..40 {
            gray.put_pixel(x, 20, Luma([0]));
        }
        imageops::invert(&mut gray);

        let mask = adaptive_threshold(&gray, 15, -2);
        for x in 0..40 {
            assert_eq!(mask.get_pixel(x, 20)[0], FOREGROUND);
            assert_eq!(mask.get_pixel(x, 5)[0], BACKGROUND);
            assert_eq!(mask.get_pixel(x, 21)[0], BACKGROUND);
        }
    }

    #[test]
    fn test_adaptive_threshold_flat_image_is_background() {
        let gray = GrayImage::from_pixel(10, 10, Luma([128]));
        let mask = adaptive_threshold(&gray, 15, -2);
        assert!(mask.pixels().all(|p| p[0] == BACKGROUND));
    }

    #[test]
    fn test_union_saturates() {
        let a = mask_from_rows(&["#.", ".."]);
        let b = mask_from_rows(&["#.", ".#"]);
        assert_eq!(rows_of(&union(&a, &b)), ["#.", ".#"]);
        assert_eq!(union(&a, &b).get_pixel(0, 0)[0], FOREGROUND);
    }

    #[test]
    fn test_inverted_gray() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([10])));
        assert_eq!(inverted_gray(&img).get_pixel(1, 1)[0], 245);
    }
}
