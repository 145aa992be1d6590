//! Driver's licence recognition server and CLI.
//!
//! # Usage
//!
//! ## CLI Mode
//! ```bash
//! license-ocr-server recognize --config configs/license.toml --file license.jpg
//! license-ocr-server recognize --config configs/license.toml --guid 7f4a…
//! ```
//!
//! ## Server Mode
//! ```bash
//! license-ocr-server serve --config configs/license.toml
//! ```

mod cli;
mod config;
mod engine;
mod metrics;
mod server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::ServiceConfig;

#[derive(Parser)]
#[command(name = "license-ocr-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Driver's licence recognition via CLI or HTTP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize a single document via CLI
    Recognize {
        /// Path to the service configuration file
        #[arg(long, env = "LICENSE_OCR_CONFIG")]
        config: PathBuf,

        /// Local image file to recognize
        #[arg(long, conflicts_with = "guid")]
        file: Option<PathBuf>,

        /// Storage guid of the image to fetch and recognize
        #[arg(long, conflicts_with = "file")]
        guid: Option<String>,

        /// Output format (json, pretty)
        #[arg(long, default_value = "pretty")]
        output: String,
    },
    /// Start the HTTP server
    Serve {
        /// Path to the service configuration file
        #[arg(long, env = "LICENSE_OCR_CONFIG")]
        config: PathBuf,

        /// Override the configured listen port
        #[arg(long, short, env = "LICENSE_OCR_PORT")]
        port: Option<u16>,

        /// Override the configured bind host
        #[arg(long, env = "LICENSE_OCR_HOST")]
        host: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    license_ocr::utils::init_tracing("info,license_ocr=info");

    let cli = Cli::parse();

    match cli.command {
        Commands::Recognize {
            config,
            file,
            guid,
            output,
        } => {
            let config = ServiceConfig::load(&config)?;
            if let Some(file) = file {
                info!("processing file: {}", file.display());
                cli::process_file(&file, &config, &output)?;
            } else if let Some(guid) = guid {
                info!("processing guid: {guid}");
                cli::process_guid(&guid, &config, &output).await?;
            } else {
                eprintln!("error: either --file or --guid must be provided");
                std::process::exit(1);
            }
        }
        Commands::Serve { config, port, host } => {
            let mut config = ServiceConfig::load(&config)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            info!("starting server on {}:{}", config.server.host, config.server.port);
            server::run_server(config).await?;
        }
    }

    Ok(())
}
