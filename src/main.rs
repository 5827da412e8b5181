//! Document extraction server and CLI.
//!
//! `doc-extract` (or `doc-extract serve`) runs the HTTP API.
//! `doc-extract extract <PATHS>` processes local files once and exits.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing::error;

use doc_extract::cli::{ExtractOptions, run_extract};
use doc_extract::config::{AppConfig, Cli, Command};
use doc_extract::export::DirectorySink;
use doc_extract::extraction::GatewayFactory;
use doc_extract::pipeline::Pipeline;
use doc_extract::store::FileStore;
use doc_extract::{server, telemetry};

#[tokio::main]
async fn main() {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = match AppConfig::from_cli(&cli) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    telemetry::init(config.log.format);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::start_server(config).await,
        Command::Extract {
            paths,
            out,
            aggregate,
            copy,
        } => {
            let options = ExtractOptions {
                paths,
                out,
                aggregate,
                copy,
            };
            extract(&config, &options).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Fatal error");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn extract(config: &AppConfig, options: &ExtractOptions) -> anyhow::Result<()> {
    let gateway = GatewayFactory::create(&config.gateway);
    let pipeline = Pipeline::new(FileStore::new(), gateway);
    let sink = DirectorySink::new(&options.out);

    let summary = run_extract(&pipeline, &sink, options).await?;
    if !summary.is_success() {
        anyhow::bail!("{} of {} files failed", summary.failed, summary.failed + summary.completed);
    }
    Ok(())
}
