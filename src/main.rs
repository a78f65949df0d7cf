//! qrcam service entry point
//!
//! ```text
//! qrcam                    Run with ./qrcam.toml (defaults if missing)
//! qrcam --config <path>    Load a custom config TOML
//! qrcam --gen-config       Write default config to stdout
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use qrcam::{
    CaptureLoop, ClientRegistry, ConfigSource, ConsumerServer, DeviceSyncController, HttpCamera,
    QrDetector, ServiceConfig,
};

#[derive(Parser, Debug)]
#[command(name = "qrcam", version, about = "Streams QR codes seen by a network camera to TCP consumers")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(short, long, default_value = "qrcam.toml")]
    config: PathBuf,

    /// Print the default configuration to stdout and exit
    #[arg(long)]
    gen_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ServiceConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let (config, source) = ServiceConfig::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("qrcam={}", config.log_level))),
        )
        .init();

    if source == ConfigSource::Defaults {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    config.validate()?;
    tracing::info!(
        camera = %config.camera_url,
        frame_size = %config.frame_size,
        led_intensity = config.led_intensity,
        port = config.port,
        "Starting qrcam"
    );

    let camera = Arc::new(HttpCamera::new(&config.camera_url, config.device_timeout())?);
    let server_config = config.server_config();
    let registry = Arc::new(ClientRegistry::with_config(server_config.registry_config()));
    let broadcaster = server_config.broadcaster();

    // Listener failure is the one fatal error
    let server = ConsumerServer::bind(server_config, Arc::clone(&registry)).await?;

    let shutdown = CancellationToken::new();
    let acceptor = server.spawn(shutdown.clone());

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Shutting down");
        signal.cancel();
    });

    let capture = CaptureLoop::new(
        config.capture_config(),
        DeviceSyncController::new(camera, config.desired()),
        Arc::new(QrDetector::new()),
        Arc::clone(&registry),
        broadcaster,
    );
    let stats = capture.run(shutdown.clone()).await;

    shutdown.cancel();
    acceptor.await?;

    tracing::info!(
        frames = stats.frames,
        codes = stats.codes,
        lines = stats.lines_sent,
        uptime_secs = stats.uptime().as_secs(),
        "Stopped"
    );
    Ok(())
}
