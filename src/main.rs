use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use urlinbox::buffer::PendingBuffer;
use urlinbox::config::{Cli, Config, default_config_dir, default_config_path};
use urlinbox::handler::{AppState, router};
use urlinbox::intake::ShareIntake;
use urlinbox::store::SqlStore;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("urlinbox.svc starting");

    // An explicit --config puts the database next to it; otherwise both live in ~/.urlinbox/
    let (config_path, data_dir, explicit) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir, true)
        }
        None => (default_config_path(), default_config_dir(), false),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(error = %e, path = ?data_dir, "failed to create data directory");
        std::process::exit(1);
    }

    let cfg = if !explicit && !config_path.exists() {
        tracing::info!(path = ?config_path, "no config file, using defaults");
        Config::default()
    } else {
        Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
            tracing::error!(error = %e, path = ?config_path, "failed to load config file");
            std::process::exit(1);
        })
    };

    let store = SqlStore::open(&data_dir.join(cfg.app.get_db()))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %urlinbox::unpack_error(&e), "failed to open store");
            std::process::exit(1);
        });

    let intake = ShareIntake::new(PendingBuffer::new(store, cfg.app.get_slot()))
        .with_titles(cfg.titles.clone())
        .with_callbacks(cfg.intake.callbacks())
        .with_attachment_timeout(cfg.intake.attachment_timeout());

    let app = router(AppState {
        intake: Arc::new(intake),
    });

    let address = format!("127.0.0.1:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("urlinbox.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server stopped unexpectedly");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, shutting down");
        }
    }

    tracing::info!("urlinbox.svc going off");
}
