//! lb-reloader
//!
//! Regenerates a load balancer configuration whenever the cluster topology
//! changes and tells the load balancer to reload it.
//!
//! # Architecture Overview
//!
//! ```text
//!   snapshot file / watcher ──▶ SnapshotStore ──┐
//!            │                                  │
//!            ▼                                  ▼
//!     UpdateHandle::signal ──▶ Updater ──▶ TemplateFile::execute ──▶ output file
//!            ▲              (debounce)          │
//!          SIGHUP                               ▼
//!                                        ReloadNotifier (pidfile + signal)
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use lb_reloader::config::loader::read_config;
use lb_reloader::config::{validate_config, AppConfig, ConfigError};
use lb_reloader::lifecycle::startup;
use lb_reloader::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lb-reloader")]
#[command(about = "Render load balancer configuration from cluster topology", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Configuration template.
    #[arg(long, global = true)]
    template: Option<String>,

    /// Rendered configuration path.
    #[arg(long, global = true)]
    output: Option<String>,

    /// Comma-separated list of server name templates.
    #[arg(long, global = true)]
    server_name_templates: Option<String>,

    /// JSON cluster snapshot.
    #[arg(long, global = true)]
    snapshot: Option<String>,

    /// Pidfile of the load balancer to notify after each render.
    #[arg(long, global = true)]
    pidfile: Option<String>,

    /// Quiet time before a pending update runs, in milliseconds.
    #[arg(long, global = true)]
    quiescence_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch for changes, render and reload continuously
    Run,
    /// Render the snapshot once and exit
    Render,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = &self.template {
            config.renderer.template_path = v.clone();
        }
        if let Some(v) = &self.output {
            config.renderer.output_path = v.clone();
        }
        if let Some(v) = &self.server_name_templates {
            config.renderer.server_name_templates = v.clone();
        }
        if let Some(v) = &self.snapshot {
            config.snapshot.path = Some(v.clone());
        }
        if let Some(v) = &self.pidfile {
            config.reload.pidfile = Some(v.clone());
        }
        if let Some(v) = self.quiescence_ms {
            config.coordinator.quiescence_ms = v;
        }
        if let Some(v) = &self.log_level {
            config.observability.log_level = v.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);

    tracing::info!(
        template = %config.renderer.template_path,
        output = %config.renderer.output_path,
        quiescence_ms = config.coordinator.quiescence_ms,
        "lb-reloader v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    match cli.command {
        Commands::Run => startup::run(config).await?,
        Commands::Render => {
            let snapshot = config
                .snapshot
                .path
                .clone()
                .ok_or("render requires --snapshot or snapshot.path")?;
            startup::render_once(&config, Path::new(&snapshot))?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
