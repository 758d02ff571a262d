use anyhow::{Context, Result};
use axum::Server;
use sentry::{
    integrations::{anyhow::capture_anyhow, tracing as sentry_tracing},
    ClientOptions, IntoDsn,
};
use std::{net::SocketAddr, sync::Arc};
use structopt::StructOpt;
use tokio::{
    fs,
    signal::unix::{signal, SignalKind},
};
use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use args::Args;

mod args;
mod config;
mod content;
mod deployment;
mod giphy;
mod http;

use config::SharedConfig;
use content::SledStore;
use giphy::Giphy;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the cli
    let cli = Args::from_args();

    // Get the configuration
    let configuration = config::parse(cli.config)
        .await
        .context("Failed to load configuration")?;
    let address = cli.address.unwrap_or(configuration.server.address);

    // Ensure the content directory exists
    if !configuration.content.path.exists() {
        fs::create_dir_all(&configuration.content.path)
            .await
            .context("Failed to create content directory")?;
    }

    // Setup logging
    init_tracing(
        cli.log_level
            .unwrap_or_else(|| configuration.server.log.clone()),
    );

    // Initialize sentry
    let _guard = sentry::init(sentry_config(&configuration.server.sentry)?);

    match run_server(address, configuration).await {
        Ok(()) => Ok(()),
        Err(e) => {
            capture_anyhow(&e);
            Err(e)
        }
    }
}

/// Open the content store and start the server
async fn run_server(address: SocketAddr, configuration: SharedConfig) -> Result<()> {
    // Open the content store
    let store = SledStore::open(&configuration.content.path)
        .context("failed to open content database")?;
    if let Some(seed) = &configuration.content.seed {
        store
            .import_file(seed)
            .await
            .with_context(|| format!("failed to seed content from {}", seed.display()))?;
    }

    // Setup the GIPHY client
    let giphy = Giphy::connect(&configuration.giphy).context("failed to create GIPHY client")?;
    if configuration.giphy.api_key.is_none() {
        info!("no GIPHY API key configured, the widget will render nothing");
    }

    let state = http::State {
        config: configuration.clone(),
        content: Arc::new(store),
        giphy: Arc::new(giphy),
    };

    // Bind the server
    let server = Server::try_bind(&address)
        .with_context(|| format!("failed to bind to {}", address))?
        .serve(http::routes(state).into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = wait_for_exit().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("signal received, shutting down...");
        });

    info!("listening on {}", address);
    server.await.context("server error")?;

    info!("successfully shutdown, good bye!");
    Ok(())
}

/// Wait for a SIGINT or SIGTERM and then exit
async fn wait_for_exit() -> Result<()> {
    let mut int = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = int.recv() => Ok(()),
        _ = term.recv() => Ok(()),
    }
}

/// Generate a registry for tracing
fn init_tracing(raw_filter: String) {
    let filter = EnvFilter::builder().parse_lossy(raw_filter);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(filter),
        )
        .with(sentry_tracing::layer())
        .init();
}

/// Generate configuration for Sentry
fn sentry_config(url: &Option<String>) -> Result<ClientOptions> {
    let dsn = url
        .as_deref()
        .map(IntoDsn::into_dsn)
        .transpose()
        .context("failed to parse Sentry DSN")?
        .flatten();

    let options = ClientOptions {
        dsn,
        release: sentry::release_name!(),
        attach_stacktrace: true,
        ..Default::default()
    };

    Ok(options)
}
