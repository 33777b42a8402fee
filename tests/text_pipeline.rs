//! OCR text assembly over page images, with a deterministic backend.

use std::path::{Path, PathBuf};

use docextract::ocr::{OcrBackend, OcrError, OcrResult, PageSegMode};
use docextract::text::{ocr_image, ocr_pages, page_image_name, save_text};
use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;

/// Reports the size of the image it sees and whether it was grayscale.
struct SizeOcr;

impl OcrBackend for SizeOcr {
    fn name(&self) -> &'static str {
        "size"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn ocr_image(&self, _image_path: &Path, _mode: PageSegMode) -> Result<OcrResult, OcrError> {
        unreachable!("pages are recognized from memory")
    }

    fn ocr_buffer(&self, image: &DynamicImage, mode: PageSegMode) -> Result<OcrResult, OcrError> {
        let kind = match image {
            DynamicImage::ImageLuma8(_) => "gray",
            _ => "color",
        };
        Ok(OcrResult {
            text: format!("{}x{} {} psm{}", image.width(), image.height(), kind, mode.psm()),
            backend: self.name(),
            processing_time_ms: 0,
        })
    }
}

/// Write `sizes.len()` page images named like the rasterizer output.
fn pages(dir: &Path, sizes: &[(u32, u32)]) -> Vec<PathBuf> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, (w, h))| {
            let path = dir.join(page_image_name(i));
            RgbImage::from_pixel(*w, *h, Rgb([200, 180, 160]))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

#[test]
fn test_pages_concatenated_in_order_with_headers() {
    let dir = TempDir::new().unwrap();
    let paths = pages(dir.path(), &[(10, 20), (30, 40), (50, 60)]);

    let mut seen = Vec::new();
    let text = ocr_pages(&paths, &SizeOcr, |idx, path| seen.push((idx, path.to_path_buf())))
        .unwrap();

    let expected: String = paths
        .iter()
        .zip(["10x20", "30x40", "50x60"])
        .enumerate()
        .map(|(i, (path, size))| {
            format!("\n--- Page {} ({}) ---\n{} gray psm3\n", i, path.display(), size)
        })
        .collect();
    assert_eq!(text, expected);
    assert_eq!(text.matches("--- Page ").count(), 3);
    assert_eq!(
        seen,
        paths.iter().cloned().enumerate().collect::<Vec<_>>()
    );
}

#[test]
fn test_no_pages_gives_empty_text() {
    let text = ocr_pages(&[], &SizeOcr, |_, _| {}).unwrap();
    assert!(text.is_empty());
}

#[test]
fn test_unreadable_page_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut paths = pages(dir.path(), &[(10, 10)]);
    let broken = dir.path().join(page_image_name(1));
    std::fs::write(&broken, b"not a png").unwrap();
    paths.push(broken.clone());

    let err = ocr_pages(&paths, &SizeOcr, |_, _| {}).unwrap_err();
    assert!(err.is_unreadable_image());
    assert!(err.to_string().contains(&broken.display().to_string()));
}

#[test]
fn test_ocr_image_uses_full_page_mode() {
    let dir = TempDir::new().unwrap();
    let paths = pages(dir.path(), &[(64, 48)]);
    assert_eq!(ocr_image(&paths[0], &SizeOcr).unwrap(), "64x48 gray psm3");
}

#[test]
fn test_saved_text_round_trips() {
    let dir = TempDir::new().unwrap();
    let paths = pages(dir.path(), &[(8, 8), (16, 16)]);
    let text = ocr_pages(&paths, &SizeOcr, |_, _| {}).unwrap();

    let out = dir.path().join("extracted_text.txt");
    save_text("stale", &out).unwrap();
    save_text(&text, &out).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), text);
}
