//! mediashelf -- browse an S3-compatible bucket as a music library.
//!
//! The server is stateless: every request lists the bucket afresh.
//! SIGTERM/SIGINT stop accepting connections and wait for in-flight
//! requests, bounded by the configured shutdown timeout.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use mediashelf::classifier::MediaClassifier;
use mediashelf::config::LoggingConfig;
use mediashelf::library::MediaLibrary;
use mediashelf::storage::aws::AwsBackend;
use mediashelf::storage::backend::StorageBackend;
use mediashelf::storage::bucket::BucketStore;
use mediashelf::storage::keys::KeyMapper;

/// Command-line arguments for the mediashelf server.
#[derive(Parser, Debug)]
#[command(
    name = "mediashelf",
    version,
    about = "Browse an S3-compatible bucket as a music library"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "mediashelf.yaml")]
    config: String,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

/// Initialize tracing. `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = mediashelf::config::load_config(&cli.config)?;
    init_tracing(&config.logging);
    info!("Loaded configuration from {}", cli.config);

    let bind_addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    if config.observability.metrics {
        mediashelf::metrics::init_metrics()?;
        mediashelf::metrics::describe_metrics();
        info!("Prometheus metrics initialized");
    }

    let s3 = &config.storage.s3;
    let backend: Arc<dyn StorageBackend> = Arc::new(AwsBackend::new(s3).await?);
    let store = BucketStore::new(backend, KeyMapper::new(&s3.base_prefix), s3.presign_expiry());
    let library = MediaLibrary::new(store, MediaClassifier::new(&config.library));
    info!(
        "Media library ready: bucket='{}' base_prefix='{}'",
        s3.bucket, s3.base_prefix
    );

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let state = Arc::new(mediashelf::AppState::new(config, library));
    let app = mediashelf::server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("mediashelf listening on {}", bind_addr);

    // One signal drives both the graceful drain and the drain deadline.
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut drain_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = drain_rx.wait_for(|stop| *stop).await;
    });
    tokio::select! {
        result = server => result?,
        _ = async {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!("Shutdown timeout of {}s elapsed, exiting", shutdown_timeout.as_secs());
        }
    }

    info!("mediashelf shut down");

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
