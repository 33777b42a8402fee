//! PDF-to-text via OCR: rasterize every page, OCR each page image, and
//! concatenate the results under per-page headers.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tempfile::TempDir;

use crate::error::ExtractionError;
use crate::grid::load_image;
use crate::ocr::{OcrBackend, PageSegMode};
use crate::pdf::{rasterize, PageSelection};

/// Rasterization resolution used when none is configured.
pub const DEFAULT_DPI: u32 = 300;

/// Name of the image stored for page `index` (0-based).
pub fn page_image_name(index: usize) -> String {
    format!("output_page_{}.png", index)
}

/// Convert each page of a PDF to `output_folder/output_page_<i>.png`.
///
/// The folder is created if missing. Paths are returned in page order.
pub fn pdf_to_images(
    pdf_path: &Path,
    output_folder: &Path,
    dpi: u32,
) -> Result<Vec<PathBuf>, ExtractionError> {
    std::fs::create_dir_all(output_folder)?;

    // Render next to the destination so the final move is a rename.
    let scratch = TempDir::new_in(output_folder)?;
    let pages = rasterize(pdf_path, dpi, &PageSelection::All, scratch.path())?;

    let mut image_paths = Vec::with_capacity(pages.len());
    for (index, (page, rendered)) in pages.into_iter().enumerate() {
        let image_path = output_folder.join(page_image_name(index));
        std::fs::rename(&rendered, &image_path)?;
        tracing::debug!("Page {} -> {}", page, image_path.display());
        image_paths.push(image_path);
    }
    Ok(image_paths)
}

/// OCR a whole page image after converting it to grayscale.
pub fn ocr_image(image_path: &Path, backend: &dyn OcrBackend) -> Result<String, ExtractionError> {
    let image = load_image(image_path)?;
    let gray = DynamicImage::ImageLuma8(image.to_luma8());
    let result = backend.ocr_buffer(&gray, PageSegMode::Auto)?;
    tracing::debug!(
        "{} recognized {} chars in {}ms",
        result.backend,
        result.text.len(),
        result.processing_time_ms
    );
    Ok(result.text)
}

/// Header-prefixed block for one page.
pub fn page_block(index: usize, image_path: &Path, text: &str) -> String {
    format!("\n--- Page {} ({}) ---\n{}\n", index, image_path.display(), text)
}

/// OCR page images in order and concatenate their blocks.
///
/// `on_page` is called after each page is recognized.
pub fn ocr_pages<F>(
    image_paths: &[PathBuf],
    backend: &dyn OcrBackend,
    mut on_page: F,
) -> Result<String, ExtractionError>
where
    F: FnMut(usize, &Path),
{
    let mut full_text = String::new();
    for (index, image_path) in image_paths.iter().enumerate() {
        let text = ocr_image(image_path, backend)?;
        full_text.push_str(&page_block(index, image_path, &text));
        on_page(index, image_path);
    }
    Ok(full_text)
}

/// Rasterize a PDF into `output_folder` and OCR every page.
pub fn extract_text_from_pdf(
    pdf_path: &Path,
    output_folder: &Path,
    dpi: u32,
    backend: &dyn OcrBackend,
) -> Result<String, ExtractionError> {
    let image_paths = pdf_to_images(pdf_path, output_folder, dpi)?;
    ocr_pages(&image_paths, backend, |_, _| {})
}

/// Write text to a file, replacing any existing content.
pub fn save_text(text: &str, filename: &Path) -> Result<(), ExtractionError> {
    std::fs::write(filename, text)?;
    Ok(())
}
