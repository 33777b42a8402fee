//! Command-line front ends for the `extract-tables` and `ocr-pdf` binaries.

pub mod ocr;
pub mod tables;

use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::ocr::OcrBackend;
use crate::process::{check_tools, install_hint};

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Initialize logging based on verbosity. `RUST_LOG` takes precedence.
pub fn init_logging() {
    let default_filter = if is_verbose() {
        "docextract=info"
    } else {
        "docextract=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Print availability of the external tools and the OCR backend.
///
/// Returns true when everything needed is installed.
pub fn print_tool_status(backend: &dyn OcrBackend) -> bool {
    println!("\n{}", style("External Tool Status").bold());
    println!("{}", "-".repeat(50));

    let mut all_found = true;
    for (tool, available) in check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
        if !available {
            println!("                  {}", style(install_hint(tool)).dim());
        }
    }

    println!("\n{}", style("OCR Backend:").cyan());
    let available = backend.is_available();
    let status = if available {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<15} {}", backend.name(), status);
    if !available {
        println!("                  {}", style(backend.availability_hint()).dim());
    }
    println!();

    all_found && available
}
