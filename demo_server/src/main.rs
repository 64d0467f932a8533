//! Demonstration server wiring the toolkit helpers into HTTP routes

mod routes;

use anyhow::Result;
use routes::{create_routes, DemoState};
use std::{net::SocketAddr, path::PathBuf};
use tokio::signal;
use toolkit_core::{Toolkit, ToolkitConfig};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(LogFormat::from_env());

    let config = ToolkitConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Upload limit: {} bytes", config.upload_limit());
    info!("JSON limit: {} bytes", config.json_limit());
    if config.allowed_content_types.is_empty() {
        info!("Accepting uploads of any content type");
    } else {
        info!("Allowed upload types: {}", config.allowed_content_types.join(", "));
    }

    let addr: SocketAddr = env_or("DEMO_BIND_ADDRESS", DEFAULT_BIND_ADDRESS)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let toolkit = Toolkit::new(config);
    let upload_dir = PathBuf::from(env_or("DEMO_UPLOAD_DIR", "./uploads"));
    let static_dir = PathBuf::from(env_or("DEMO_STATIC_DIR", "./static"));

    toolkit
        .create_dir_if_not_exist(&upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create upload directory: {}", e))?;

    let state = DemoState {
        toolkit,
        upload_dir,
        static_dir,
    };

    let app = create_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting demo server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn shutdown_signal() {
    let received = wait_for_signal().await;
    info!(signal = received, "Shutting down demo server");
}

async fn wait_for_ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Ctrl+C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    match unix_signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            _ = wait_for_ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        },
        Err(e) => {
            warn!("SIGTERM handler unavailable: {}", e);
            wait_for_ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    wait_for_ctrl_c().await;
    "Ctrl+C"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{crate_name}={level},toolkit_core={level},tower_http=info",
            crate_name = env!("CARGO_CRATE_NAME"),
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().compact().with_target(true))
            .init(),
    }
}
