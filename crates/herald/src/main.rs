//! # herald
//!
//! Notification server binary: loads settings, starts the hub, the heartbeat
//! and the HTTP server, and shuts them down on Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use herald_hub::{HeartbeatConfig, Hub, HubConfig, run_heartbeat};
use herald_logging::LoggingConfig;
use herald_server::config::ServerConfig;
use herald_server::server::HeraldServer;
use herald_settings::HeraldSettings;

/// Server-sent event notification hub.
#[derive(Parser, Debug)]
#[command(name = "herald", about = "Server-sent event notification hub")]
struct Cli {
    /// Settings file (missing file means defaults).
    #[arg(long, default_value_os_t = herald_settings::settings_path())]
    settings: PathBuf,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Directory of static assets; empty disables them (overrides settings).
    #[arg(long)]
    static_dir: Option<String>,

    /// Do not run the heartbeat producer.
    #[arg(long)]
    no_heartbeat: bool,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut HeraldSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            settings.server.static_dir.clone_from(dir);
        }
        if self.no_heartbeat {
            settings.heartbeat.enabled = false;
        }
    }
}

fn load_settings(args: &Cli) -> Result<HeraldSettings> {
    let mut settings = herald_settings::load_settings_from_path(&args.settings)
        .with_context(|| format!("Failed to load settings from {}", args.settings.display()))?;
    args.apply(&mut settings);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = load_settings(&args)?;

    herald_logging::init_subscriber(&LoggingConfig {
        level: settings.logging.level,
        format: settings.logging.format,
    })
    .context("Failed to initialize logging")?;

    let metrics = herald_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    let (hub, hub_handle) = Hub::new(HubConfig {
        client_queue_capacity: settings.hub.client_queue_capacity,
        event_buffer: settings.hub.event_buffer,
    });
    let server = HeraldServer::new(
        ServerConfig::from(&settings.server),
        hub_handle.clone(),
        metrics,
    );
    let shutdown = server.shutdown().clone();

    let mut tasks = vec![tokio::spawn(hub.run(shutdown.token()))];
    if settings.heartbeat.enabled {
        let config = HeartbeatConfig {
            interval: Duration::from_millis(settings.heartbeat.interval_ms),
        };
        let token = shutdown.token();
        tasks.push(tokio::spawn(async move {
            let exit = run_heartbeat(hub_handle, config, token).await;
            tracing::debug!(?exit, "heartbeat exited");
        }));
    } else {
        tracing::info!("heartbeat disabled");
    }

    let (addr, serve) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("herald listening on http://{addr}");
    tasks.push(serve);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    let drained = shutdown.graceful_shutdown(tasks, None).await;
    tracing::info!(drained, "Shutdown complete");
    Ok(())
}
