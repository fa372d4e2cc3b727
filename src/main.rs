//! Sandbox edge - proxy service entry point
//!
//! Serves the frontend and proxies `/api/*` to the backend API origin.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::signal;
use tracing::{error, info, warn};

use sandbox_edge::{config::TlsPaths, error::install_panic_hook, metrics, routes, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();
    install_panic_hook();

    info!("Starting sandbox edge proxy");

    let config = Config::from_env()?;
    info!(
        environment = config.environment.as_str(),
        static_dir = %config.static_dir.display(),
        "Configuration loaded"
    );

    metrics::init_metrics(config.metrics_addr.as_deref())?;

    let state = Arc::new(AppState::new(config.clone())?);
    if state.backend.is_configured() {
        info!("Backend API origin configured");
    } else {
        warn!("API_ENDPOINT is not set; /api requests will return 500 until it is configured");
    }

    let app = routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST/PORT")?;

    match &config.tls {
        Some(tls) => serve_tls(addr, app, tls).await?,
        None => {
            warn!("TLS_CERT_PATH/TLS_KEY_PATH not set; listener is HTTP only");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    info!("Sandbox edge proxy shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sandbox_edge=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    }
}

async fn serve_tls(addr: SocketAddr, app: Router, tls: &TlsPaths) -> Result<()> {
    // Both ring and aws-lc-rs end up in the dependency graph; pick one explicitly
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .with_context(|| {
            format!(
                "Failed to load TLS certificate {} / key {}",
                tls.cert_path.display(),
                tls.key_path.display()
            )
        })?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        // None: wait for every in-flight request to finish
        shutdown_handle.graceful_shutdown(None);
    });

    info!("Listening on https://{}", addr);
    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown");
        }
    }
}
