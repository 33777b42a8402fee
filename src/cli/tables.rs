//! `extract-tables`: PDF and image table extraction.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use console::style;

use crate::config::Config;
use crate::grid::{extract_table_from_image, ImageTableOutcome};
use crate::ocr::TesseractBackend;
use crate::pdf::{
    detect_pdf_tables, write_table, DetectedTable, PageSelection, PdfTableOptions, TableFlavor,
};

/// Folder receiving `table_<i>.csv` files for PDF input.
pub const DEFAULT_PDF_OUTPUT: &str = "extracted_tables_pdf";
/// CSV file written for image input.
pub const DEFAULT_IMAGE_OUTPUT: &str = "extracted_table_image.csv";

#[derive(Parser, Debug)]
#[command(name = "extract-tables")]
#[command(about = "Extract tables from a PDF or an image into CSV files")]
#[command(version)]
pub struct Cli {
    /// PDF or image (.png, .jpg, .jpeg) to extract tables from
    pub input_file: PathBuf,

    /// Output folder for PDFs, output CSV file for images
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// PDF table detection strategy
    #[arg(long, value_enum)]
    pub flavor: Option<TableFlavor>,

    /// PDF pages to scan, e.g. "all", "3" or "1,3-5"
    #[arg(long)]
    pub pages: Option<PageSelection>,

    /// OCR language for image cells (overrides config and DOCEXTRACT_LANG)
    #[arg(long)]
    pub lang: Option<String>,

    /// Config file (otherwise discovered)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the input file is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image,
    Unsupported,
}

impl InputKind {
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => InputKind::Pdf,
            "png" | "jpg" | "jpeg" => InputKind::Image,
            _ => InputKind::Unsupported,
        }
    }
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

    match InputKind::of(&cli.input_file) {
        InputKind::Pdf => run_pdf(&cli, &config),
        InputKind::Image => run_image(&cli, &config),
        InputKind::Unsupported => {
            println!("Unsupported file type. Please provide a PDF or an image file.");
            Ok(())
        }
    }
}

/// Options for the PDF pipeline: flags first, then config.
pub fn pdf_options(cli: &Cli, config: &Config) -> PdfTableOptions {
    PdfTableOptions {
        flavor: cli.flavor.unwrap_or(config.pdf.flavor),
        pages: cli.pages.clone().unwrap_or_default(),
        stream: config.pdf.stream.clone(),
        grid: config.grid.clone(),
        dpi: config.pdf.dpi,
    }
}

fn run_pdf(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let output_folder = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PDF_OUTPUT));
    let options = pdf_options(cli, config);
    tracing::info!(
        "Extracting {} tables from {}",
        options.flavor,
        cli.input_file.display()
    );

    std::fs::create_dir_all(&output_folder)
        .with_context(|| format!("Failed to create {}", output_folder.display()))?;
    let tables = detect_pdf_tables(&cli.input_file, &options)
        .with_context(|| format!("Failed to extract tables from {}", cli.input_file.display()))?;

    report_pdf_tables(&mut std::io::stdout().lock(), &cli.input_file, &tables, &output_folder)?;
    Ok(())
}

/// Announce how many tables were found, then save each one into the
/// existing `output_folder` and print it.
pub fn report_pdf_tables<W: Write>(
    out: &mut W,
    input: &Path,
    tables: &[DetectedTable],
    output_folder: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    writeln!(out, "Found {} table(s) in {}", tables.len(), input.display())?;

    let mut files = Vec::with_capacity(tables.len());
    for (i, detected) in tables.iter().enumerate() {
        let path = write_table(i, &detected.table, output_folder)
            .with_context(|| format!("Failed to save table {}", i))?;
        writeln!(out, "Table {} saved as CSV to {}", i, style(path.display()).cyan())?;
        writeln!(out, "Extracted Table DataFrame:")?;
        writeln!(out, "{}", detected.table)?;
        files.push(path);
    }
    Ok(files)
}

fn run_image(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let output_csv = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_OUTPUT));
    let backend = TesseractBackend::with_config(config.ocr_config());

    match extract_table_from_image(&cli.input_file, &output_csv, &backend, &config.grid) {
        Ok(ImageTableOutcome::Written { path, rows, cells }) => {
            tracing::info!("{} cell(s) in {} row(s)", cells, rows);
            println!("Extracted table saved to {}", style(path.display()).cyan());
        }
        Ok(ImageTableOutcome::NoCells) => println!("No table cells detected."),
        Err(e) if e.is_unreadable_image() => {
            tracing::debug!("{}", e);
            println!("Unable to read image: {}", cli.input_file.display());
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to extract table from {}", cli.input_file.display())
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use tempfile::TempDir;

    fn detected(page: u32, cells: &[&str]) -> DetectedTable {
        DetectedTable {
            page,
            table: Table::new(vec![cells.iter().map(|c| c.to_string()).collect()]),
        }
    }

    #[test]
    fn test_table_count_printed_before_tables_are_saved() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path();
        let tables = vec![detected(1, &["a", "b"]), detected(3, &["c"])];

        let mut out = Vec::new();
        let files = report_pdf_tables(&mut out, Path::new("doc.pdf"), &tables, folder).unwrap();
        let printed = String::from_utf8(out).unwrap();

        let found = printed.find("Found 2 table(s) in doc.pdf").unwrap();
        let first = printed.find("Table 0 saved as CSV to ").unwrap();
        let second = printed.find("Table 1 saved as CSV to ").unwrap();
        assert!(found < first && first < second, "{}", printed);
        assert_eq!(printed.matches("Extracted Table DataFrame:").count(), 2);

        assert_eq!(files, [folder.join("table_0.csv"), folder.join("table_1.csv")]);
        assert_eq!(std::fs::read_to_string(&files[1]).unwrap(), "\"c\"\n");
    }

    #[test]
    fn test_no_tables_prints_count_only() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let files = report_pdf_tables(&mut out, Path::new("doc.pdf"), &[], dir.path()).unwrap();

        assert!(files.is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "Found 0 table(s) in doc.pdf\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_input_kind_by_extension() {
        assert_eq!(InputKind::of(Path::new("report.pdf")), InputKind::Pdf);
        assert_eq!(InputKind::of(Path::new("REPORT.PDF")), InputKind::Pdf);
        assert_eq!(InputKind::of(Path::new("scan.Jpeg")), InputKind::Image);
        assert_eq!(InputKind::of(Path::new("scan.png")), InputKind::Image);
        assert_eq!(InputKind::of(Path::new("notes.txt")), InputKind::Unsupported);
        assert_eq!(InputKind::of(Path::new("no_extension")), InputKind::Unsupported);
    }

    #[test]
    fn test_input_file_is_required() {
        assert!(Cli::try_parse_from(["extract-tables"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "extract-tables",
            "doc.pdf",
            "--flavor",
            "lattice",
            "--pages",
            "2-3",
        ])
        .unwrap();
        let mut config = Config::default();
        config.pdf.dpi = 150;

        let options = pdf_options(&cli, &config);
        assert_eq!(options.flavor, TableFlavor::Lattice);
        assert_eq!(options.pages, "2-3".parse::<PageSelection>().unwrap());
        assert_eq!(options.dpi, 150);
    }

    #[test]
    fn test_invalid_pages_rejected() {
        assert!(Cli::try_parse_from(["extract-tables", "doc.pdf", "--pages", "5-3"]).is_err());
    }

    #[test]
    fn test_defaults_from_config() {
        let cli = Cli::try_parse_from(["extract-tables", "doc.pdf"]).unwrap();
        let options = pdf_options(&cli, &Config::default());
        assert_eq!(options.flavor, TableFlavor::Stream);
        assert_eq!(options.pages, PageSelection::All);
    }
}
