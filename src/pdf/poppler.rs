//! Poppler command-line tools: `pdfinfo`, `pdftoppm`, `pdftotext`.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::pages::PageSelection;
use super::words::{parse_bbox_html, PageWords};
use crate::error::ExtractionError;
use crate::process::{check_cmd_status, handle_cmd_output};

/// Get the page count of a PDF.
pub fn page_count(pdf_path: &Path) -> Result<u32, ExtractionError> {
    let output = Command::new("pdfinfo").arg(pdf_path).output();
    let stdout = handle_cmd_output(output, "pdfinfo")?;

    stdout
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ExtractionError::ToolFailed {
            tool: "pdfinfo".to_string(),
            message: format!("no page count reported for {}", pdf_path.display()),
        })
}

/// Page number encoded in a pdftoppm output name (`page-07.png` -> 7).
fn page_number_of(path: &Path, prefix: &str) -> Option<u32> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .parse()
        .ok()
}

/// Rasterize pages to PNG files in `output_dir`.
///
/// Returns `(page, path)` pairs in page order.
pub fn rasterize(
    pdf_path: &Path,
    dpi: u32,
    pages: &PageSelection,
    output_dir: &Path,
) -> Result<Vec<(u32, PathBuf)>, ExtractionError> {
    const PREFIX: &str = "page";

    let mut cmd = Command::new("pdftoppm");
    cmd.args(["-png", "-r", &dpi.to_string()]);
    if let Some((first, last)) = pages.bounds() {
        cmd.args(["-f", &first.to_string(), "-l", &last.to_string()]);
    }
    let status = cmd.arg(pdf_path).arg(output_dir.join(PREFIX)).status();
    check_cmd_status(status, "pdftoppm", "pdftoppm failed to convert PDF")?;

    let mut images: Vec<(u32, PathBuf)> = std::fs::read_dir(output_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
        .filter_map(|p| page_number_of(&p, PREFIX).map(|n| (n, p)))
        .filter(|(n, _)| pages.contains(*n))
        .collect();
    images.sort_by_key(|(n, _)| *n);

    if images.is_empty() {
        return Err(ExtractionError::ToolFailed {
            tool: "pdftoppm".to_string(),
            message: "No images generated from PDF".to_string(),
        });
    }
    tracing::debug!("Rasterized {} page(s) of {}", images.len(), pdf_path.display());
    Ok(images)
}

/// Word boxes of the selected pages.
pub fn words(pdf_path: &Path, pages: &PageSelection) -> Result<Vec<PageWords>, ExtractionError> {
    let mut cmd = Command::new("pdftotext");
    cmd.args(["-bbox", "-enc", "UTF-8"]);
    let first = match pages.bounds() {
        Some((first, last)) => {
            cmd.args(["-f", &first.to_string(), "-l", &last.to_string()]);
            first
        }
        None => 1,
    };
    let output = cmd.arg(pdf_path).arg("-").output();
    let html = handle_cmd_output(output, "pdftotext")?;

    Ok(parse_bbox_html(&html, first)
        .into_iter()
        .filter(|p| pages.contains(p.page))
        .collect())
}
