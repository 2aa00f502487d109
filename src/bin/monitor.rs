use chrono::Local;
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gem_monitor::config::MonitorConfig;
use gem_monitor::db::{DbStore, MonitorStore};
use gem_monitor::monitor::checkers::command::SystemCommandRunner;
use gem_monitor::monitor::checkers::partner::PartnerClient;
use gem_monitor::monitor::population::{populate_cloud_services, populate_ocean_services};
use gem_monitor::monitor::{HealthChecker, Scheduler};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Run the monitoring daemon (default)
    Run,
    /// Check one service now and record the result
    Check { id: i32 },
    /// Check every active service once and record the results
    CheckAll,
    /// Register services for ocean portal datasets that are not monitored yet
    PopulateOcean,
    /// Mirror the cloud inventory into `Server Cloud` services using the cached token
    PopulateCloud,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "monitor.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

/// Flips `shutdown` to true on SIGINT or SIGTERM.
fn spawn_signal_listener(shutdown: watch::Sender<bool>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to install SIGTERM handler.");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Received SIGINT."),
            _ = terminate => info!("Received SIGTERM."),
        }
        let _ = shutdown.send(true);
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = match MonitorConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load monitor configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&config.log_dir);
    info!("Starting monitor, version: {}", env!("CARGO_PKG_VERSION"));

    // --- Database Pool Setup ---
    let mut opt = ConnectOptions::new(config.database_url.to_owned());
    opt.max_connections(config.db_max_connections)
        .sqlx_logging(false);
    let db = match Database::connect(opt).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to create database connection.");
            return Err(e.into());
        }
    };
    let store = DbStore::new(db);
    let shared_store: Arc<dyn MonitorStore> = Arc::new(store.clone());

    let partner = PartnerClient::new()?;
    let checker = HealthChecker::new(
        shared_store.clone(),
        Arc::new(SystemCommandRunner),
        partner.clone(),
        config.clone(),
    );
    let mut scheduler = Scheduler::new(shared_store.clone(), checker);

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            spawn_signal_listener(shutdown_tx);
            scheduler = scheduler.with_ocean_population(config.ocean_population_interval());
            scheduler.run(shutdown_rx).await;
        }
        Command::Check { id } => {
            let outcome = scheduler.check_service_now(id).await?;
            info!(service_id = id, status = %outcome.status, message = %outcome.message, "Service checked.");
        }
        Command::CheckAll => {
            let results = scheduler.run_full_cycle_now().await?;
            info!(checked = results.len(), "Full cycle finished.");
        }
        Command::PopulateOcean => {
            let today = Local::now().date_naive();
            let inserted = populate_ocean_services(shared_store.as_ref(), &partner, &config, today).await?;
            info!(inserted, "Ocean task population finished.");
        }
        Command::PopulateCloud => {
            let summary = populate_cloud_services(shared_store.as_ref(), &partner, &config).await?;
            info!(
                inserted = summary.inserted,
                updated = summary.updated,
                skipped = summary.skipped,
                "Cloud inventory sync finished."
            );
        }
    }

    drop(scheduler);
    drop(shared_store);
    store.close().await?;
    info!("Database pool closed. Bye.");
    Ok(())
}
