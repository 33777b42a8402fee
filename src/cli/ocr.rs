//! `ocr-pdf`: rasterize a PDF and OCR every page into one text file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::print_tool_status;
use crate::config::Config;
use crate::ocr::TesseractBackend;
use crate::text::{ocr_pages, pdf_to_images, save_text};

#[derive(Parser, Debug)]
#[command(name = "ocr-pdf")]
#[command(about = "OCR every page of a PDF into a single text file")]
#[command(version)]
pub struct Cli {
    /// PDF to process
    #[arg(short, long, default_value = "sample_document.pdf")]
    pub input: PathBuf,

    /// Folder receiving one PNG per page
    #[arg(long, default_value = "output_images")]
    pub images: PathBuf,

    /// Text file to write
    #[arg(short, long, default_value = "extracted_text.txt")]
    pub output: PathBuf,

    /// Rasterization resolution (overrides config)
    #[arg(long)]
    pub dpi: Option<u32>,

    /// OCR language (overrides config and DOCEXTRACT_LANG)
    #[arg(long)]
    pub lang: Option<String>,

    /// Config file (otherwise discovered)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print external tool availability and exit
    #[arg(long)]
    pub check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn page_progress(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let bar_style =
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
    progress.set_style(bar_style);
    progress.set_message("Running OCR...");
    progress
}

/// Parse arguments and run.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_discover(cli.config.as_deref())
        .await
        .map_err(anyhow::Error::msg)?;
    if let Some(ref lang) = cli.lang {
        config.ocr.language = lang.clone();
    }
    let backend = TesseractBackend::with_config(config.ocr_config());

    if cli.check {
        if !print_tool_status(&backend) {
            println!("{}", style("Some tools are missing.").yellow());
        }
        return Ok(());
    }

    let dpi = cli.dpi.unwrap_or(config.pdf.dpi);
    tracing::info!("Rasterizing {} at {} dpi", cli.input.display(), dpi);
    let image_paths = pdf_to_images(&cli.input, &cli.images, dpi)
        .with_context(|| format!("Failed to convert {} to images", cli.input.display()))?;
    for path in &image_paths {
        println!("Saved image: {}", path.display());
    }

    let progress = (!cli.verbose).then(|| page_progress(image_paths.len()));
    let text = ocr_pages(&image_paths, &backend, |_, path| {
        let line = format!("OCR complete for: {}", path.display());
        match &progress {
            Some(pb) => {
                pb.println(line);
                pb.inc(1);
            }
            None => println!("{}", line),
        }
    })
    .context("OCR failed")?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    save_text(&text, &cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    println!("Extracted text saved to: {}", style(cli.output.display()).cyan());
    println!("Processing complete.");
    Ok(())
}
