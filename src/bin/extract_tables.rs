//! Extract tables from a PDF or an image into CSV files.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    docextract::cli::init_logging();
    docextract::cli::tables::run().await
}
