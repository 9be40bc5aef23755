// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use clap::Parser;
use scrape_orchestrator::app::{create_router, AppState, VERSION};
use scrape_orchestrator::models::class::ScrapeClass;
use scrape_orchestrator::models::config::Settings;
use scrape_orchestrator::services::engine::{Engine, ProcessEngine};
use scrape_orchestrator::services::logging::init_tracing;
use scrape_orchestrator::services::orchestrator::Orchestrator;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "scrape-orchestrator",
    about = "Fans scrape batches out to the scraping engine per egress class",
    version
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Log filter used when RUST_LOG is not set (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing default .env is normal; an explicitly requested one must exist
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    init_tracing(&cli.log_level);

    let settings = Settings::from_env().context("invalid configuration")?;

    let engine = Arc::new(ProcessEngine::new(&settings.engine));
    if !engine.is_available() {
        tracing::warn!(
            path = %settings.engine.path.display(),
            "engine executable not found or not executable, scrape requests will fail until it is installed"
        );
    }

    for class in ScrapeClass::ALL {
        tracing::info!(
            %class,
            proxies = settings.proxy_pools.get(class).len(),
            "proxy pool configured"
        );
    }

    let orchestrator = Arc::new(Orchestrator::new(&settings, engine));
    let app = create_router(AppState { orchestrator });

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    tracing::info!(
        version = VERSION,
        addr = %cli.bind,
        engine = %settings.engine.path.display(),
        dispatch = %settings.dispatch_mode,
        deadline_secs = settings.engine.deadline.map(|d| d.as_secs()),
        "scrape-orchestrator listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
