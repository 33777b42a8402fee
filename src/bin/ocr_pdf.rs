//! OCR every page of a PDF into a single text file.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    docextract::cli::init_logging();
    docextract::cli::ocr::run().await
}
