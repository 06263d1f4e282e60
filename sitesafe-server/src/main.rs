// SiteSafe inspection server

use anyhow::Context;
use clap::Parser;
use sitesafe_eye::{InspectionPipeline, YoloModel};
use sitesafe_server::{create_router, ApiState, LoggingConfig, ServerConfig};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitesafe-server")]
#[command(about = "Construction safety equipment detection server", long_about = None)]
#[command(version)]
struct Args {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// ONNX model exported by Ultralytics
    #[arg(long, short)]
    model: Option<PathBuf>,

    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_tracing(&config.logging)?;
    info!("Starting SiteSafe server v{}", env!("CARGO_PKG_VERSION"));

    // The model is loaded once and handed to the router
    info!("Loading model from {:?}", config.vision.model_path);
    let model = YoloModel::load(&config.vision).context("failed to load detection model")?;
    let pipeline = InspectionPipeline::new(Box::new(model))
        .with_annotation(config.vision.annotate, config.vision.box_thickness);
    info!(
        "Detector ready: {} ({} classes)",
        pipeline.detector_name(),
        pipeline.catalog().len()
    );

    let state = ApiState::new(pipeline, config.http.max_upload_bytes);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.http.bind_address.as_str(), config.http.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.http.bind_address, config.http.port
            )
        })?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("HTTP server error")?;

    info!("SiteSafe server stopped");
    Ok(())
}

/// Defaults, then config file, then environment, then flags
fn load_config(args: &Args) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    config.apply_env()?;

    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(host) = &args.host {
        config.http.bind_address = host.clone();
    }
    if let Some(model) = &args.model {
        config.vision.model_path = model.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.log_json {
        config.logging.json = true;
    }

    config.validate()?;
    Ok(config)
}

/// RUST_LOG, when set, takes precedence over the configured level
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
