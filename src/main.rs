use anyhow::Result;
use std::path::PathBuf;
use tracing::info;
use xcstrings_translator::{config::Config, pipeline};

const USAGE: &str = "Usage: xcstrings-translator [CONFIG_FILE]

Translates every missing localization in an Xcode string catalog with Gemini.

With CONFIG_FILE, settings are read from `key = value` lines (xcstrings_file_path,
gemini_api_key, language_codes, ...). Without it they come from the environment
(XCSTRINGS_FILE_PATH, GEMINI_API_KEY, LANGUAGE_CODES, ...).";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("xcstrings_translator=info".parse()?),
        )
        .init();

    let config_path = match std::env::args().nth(1) {
        Some(arg) if arg == "-h" || arg == "--help" => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(arg) => Some(PathBuf::from(arg)),
        None => None,
    };

    let config = match &config_path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::from_env()?,
    };

    info!(
        "Translating {} into {}",
        config.catalog_path.display(),
        config.target_languages.join(", ")
    );

    let report = pipeline::run(&config).await?;

    info!("Run report: {}", serde_json::to_string(&report)?);
    Ok(())
}
