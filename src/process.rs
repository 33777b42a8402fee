//! Helpers for driving external command-line tools (Poppler, Tesseract).

use std::io::ErrorKind;
use std::process::{ExitStatus, Output};

use crate::error::ExtractionError;

/// External tools the pipelines shell out to, with install hints.
pub const EXTERNAL_TOOLS: &[(&str, &str)] = &[
    ("pdftoppm", "poppler-utils"),
    ("pdftotext", "poppler-utils"),
    ("pdfinfo", "poppler-utils"),
    ("tesseract", "tesseract-ocr"),
];

/// Check if a binary is available in PATH (or is an existing path).
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Availability of every external tool, in [`EXTERNAL_TOOLS`] order.
pub fn check_tools() -> Vec<(&'static str, bool)> {
    EXTERNAL_TOOLS
        .iter()
        .map(|(tool, _)| (*tool, check_binary(tool)))
        .collect()
}

/// Package that provides `tool`, for error messages.
pub fn install_hint(tool: &str) -> String {
    let package = EXTERNAL_TOOLS
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, package)| *package)
        .unwrap_or(tool);
    format!("{} (install {})", tool, package)
}

/// Handle command output, extracting stdout on success or returning the
/// appropriate error.
pub fn handle_cmd_output(
    result: std::io::Result<Output>,
    tool: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                Err(ExtractionError::ToolFailed {
                    tool: tool.to_string(),
                    message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(install_hint(tool)))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Check command status, returning the appropriate error on failure.
pub fn check_cmd_status(
    result: std::io::Result<ExitStatus>,
    tool: &str,
    error_msg: &str,
) -> Result<(), ExtractionError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => Err(ExtractionError::ToolFailed {
            tool: tool.to_string(),
            message: format!("{} ({})", error_msg, s),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(install_hint(tool)))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}
