// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use bind9_sync::{
    backend::Bind9Backend,
    config::Settings,
    constants::{TOKIO_THREAD_NAME, TOKIO_WORKER_THREADS},
    directory::{FileDirectory, Zone},
    metrics::gather_metrics,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keep BIND9 zone files and rndc state in sync with a zone directory.
#[derive(Debug, Parser)]
#[command(name = "bind9-sync", version, about)]
struct Cli {
    /// Settings file (YAML)
    #[arg(short, long, env = "BIND9_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Zone directory document (YAML or JSON)
    #[arg(short, long, env = "BIND9_SYNC_DIRECTORY")]
    directory: PathBuf,

    /// Override `rndc-host`
    #[arg(long)]
    rndc_host: Option<String>,

    /// Override `rndc-port`
    #[arg(long)]
    rndc_port: Option<u16>,

    /// Override `state-path`
    #[arg(long)]
    state_path: Option<PathBuf>,

    /// Print Prometheus metrics to stdout before exiting
    #[arg(long)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reload every zone, recreating zones BIND9 no longer has
    Start,
    /// Write a zone file and add the zone with `rndc addzone`
    CreateZone {
        /// Zone name as it appears in the directory
        name: String,
    },
    /// Rewrite a zone file and reload the zone
    UpdateZone {
        /// Zone name as it appears in the directory
        name: String,
    },
    /// Remove a zone file and delete the zone with `rndc delzone`
    DeleteZone {
        /// Zone name as it appears in the directory
        name: String,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(host) = &self.rndc_host {
            settings.rndc_host.clone_from(host);
        }
        if let Some(port) = self.rndc_port {
            settings.rndc_port = port;
        }
        if let Some(state_path) = &self.state_path {
            settings.state_path.clone_from(state_path);
        }

        settings.resolve()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(TOKIO_THREAD_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_logging() {
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (json|text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();
    info!("Starting bind9-sync");

    let settings = cli.settings()?;
    debug!(?settings, "Settings resolved");

    let directory = Arc::new(
        FileDirectory::load(&cli.directory)
            .with_context(|| format!("Failed to load directory {}", cli.directory.display()))?,
    );
    let backend = Bind9Backend::from_settings(&settings, directory.clone());

    let result = tokio::select! {
        result = run_command(&cli.command, &backend, &directory) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, exiting");
            Ok(())
        }
    };

    if cli.print_metrics {
        print!("{}", gather_metrics()?);
    }

    result
}

async fn run_command(
    command: &Command,
    backend: &Bind9Backend,
    directory: &FileDirectory,
) -> Result<()> {
    match command {
        Command::Start => {
            let report = backend.start().await?;
            info!(
                reloaded = report.reloaded.len(),
                recreated = report.recreated.len(),
                "Startup complete"
            );
        }
        Command::CreateZone { name } => {
            backend.create_domain(&lookup_zone(directory, name)?).await?;
        }
        Command::UpdateZone { name } => {
            backend.update_domain(&lookup_zone(directory, name)?).await?;
        }
        Command::DeleteZone { name } => {
            backend.delete_domain(&lookup_zone(directory, name)?).await?;
        }
    }
    Ok(())
}

fn lookup_zone(directory: &FileDirectory, name: &str) -> Result<Zone> {
    directory
        .zone_by_name(name)
        .with_context(|| format!("Zone '{name}' not found in directory"))
}
