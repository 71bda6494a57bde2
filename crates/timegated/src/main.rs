//! timegated - time-window access enforcement service
//!
//! Wires together:
//! - Configuration loading
//! - The SQLite access record store
//! - `AccessManager` and the login gate
//! - The TCP session host
//! - The 1-second enforcement loop

mod resolver;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use resolver::HttpResolver;
use std::path::PathBuf;
use std::sync::Arc;
use timegate_config::{Settings, load_config};
use timegate_core::{AccessManager, AccessStatus, EnforcementLoop, GateDecision, Messages};
use timegate_host_api::IdentityResolver;
use timegate_host_tcp::TcpSessionHost;
use timegate_store::SqliteStore;
use timegate_util::{IdentityId, format_datetime, now, parse_datetime, parse_duration_multi};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// timegated - time-window access enforcement service
#[derive(Parser, Debug)]
#[command(name = "timegated")]
#[command(about = "Time-window access enforcement service", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "timegate.toml", env = "TIMEGATE_CONFIG")]
    config: PathBuf,

    /// Database path override (or set TIMEGATE_DB env var)
    #[arg(short, long, env = "TIMEGATE_DB")]
    db: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the enforcement service
    Run,

    /// Grant access to an identity
    Grant {
        /// Name or UUID of the identity
        target: String,

        /// Window length from start, e.g. "2h", "1d12h30m"
        #[arg(long, conflicts_with = "permanent")]
        duration: Option<String>,

        /// Window start as "YYYY-MM-DD HH:MM:SS" (default: now)
        #[arg(long)]
        from: Option<String>,

        /// Grant access with no expiry
        #[arg(long)]
        permanent: bool,

        /// Display name to store when the target is a UUID
        #[arg(long)]
        name: Option<String>,
    },

    /// Revoke an identity's access
    Revoke {
        /// Name or UUID of the identity
        target: String,
    },

    /// Show an identity's current access status
    Status {
        /// Name or UUID of the identity
        target: String,
    },

    /// Delete every record whose window has already closed
    Purge,
}

/// Main service state
struct Service {
    manager: Arc<AccessManager>,
    host: Arc<TcpSessionHost>,
    sweep: EnforcementLoop,
}

impl Service {
    async fn new(settings: &Settings) -> Result<Self> {
        let store = Arc::new(
            SqliteStore::open(&settings.db_path)
                .with_context(|| format!("Failed to open database {:?}", settings.db_path))?,
        );
        info!(db_path = %settings.db_path.display(), "Store initialized");

        let manager = Arc::new(AccessManager::new(store));

        // Startup janitor pass; lazy per-check deletes handle the rest
        let purged = manager.purge_expired();
        if purged > 0 {
            info!(purged, "Expired records purged at startup");
        }

        let messages = Messages::new(settings.support_contact.clone());
        let gate = Arc::new(GateDecision::new(
            manager.clone(),
            settings.bypass_identity,
            messages.clone(),
        ));

        let mut host = TcpSessionHost::new(settings.listen_addr, gate);
        host.start().await?;
        let host = Arc::new(host);

        let sweep = EnforcementLoop::new(
            manager.clone(),
            host.clone(),
            settings.bypass_identity,
            messages,
        );

        Ok(Self {
            manager,
            host,
            sweep,
        })
    }

    async fn run(mut self) -> Result<()> {
        let accept = self.host.clone();
        tokio::spawn(async move {
            if let Err(e) = accept.run().await {
                error!(error = %e, "TCP host error");
            }
        });

        self.sweep.start();

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        info!("Service running");

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
            _ = sighup.recv() => info!("Received SIGHUP, shutting down gracefully"),
        }

        self.sweep.cancel();

        // One final reconciliation so restarts begin from a clean table
        self.manager.purge_expired();

        info!("Shutdown complete");
        Ok(())
    }
}

/// Resolve a CLI target to an identity. A UUID is used directly; anything
/// else goes through the HTTP directory.
async fn resolve_target(settings: &Settings, target: &str) -> Result<(IdentityId, String)> {
    if let Ok(identity) = target.parse::<IdentityId>() {
        return Ok((identity, target.to_string()));
    }

    let resolver = HttpResolver::new(settings.resolver_base_url.clone());
    let identity = resolver
        .resolve(target)
        .await
        .with_context(|| format!("Failed to resolve name {:?}", target))?;
    Ok((identity, target.to_string()))
}

fn open_manager(settings: &Settings) -> Result<AccessManager> {
    let store = Arc::new(
        SqliteStore::open(&settings.db_path)
            .with_context(|| format!("Failed to open database {:?}", settings.db_path))?,
    );
    Ok(AccessManager::new(store))
}

async fn cmd_grant(
    settings: &Settings,
    target: &str,
    duration: Option<&str>,
    from: Option<&str>,
    permanent: bool,
    name: Option<&str>,
) -> Result<()> {
    let (identity, resolved_name) = resolve_target(settings, target).await?;
    let display_name = name.unwrap_or(&resolved_name).to_string();

    let window_start = match from {
        Some(s) => parse_datetime(s).with_context(|| format!("Invalid start time {:?}", s))?,
        None => now(),
    };

    let window_end = if permanent {
        window_start
    } else {
        let duration = duration.context("Either --duration or --permanent is required")?;
        let parsed =
            parse_duration_multi(duration).with_context(|| format!("Invalid duration {:?}", duration))?;
        let delta = chrono::Duration::from_std(parsed).context("Duration out of range")?;
        window_start + delta
    };

    let manager = open_manager(settings)?;
    let record = manager.create_access(identity, display_name, window_start, window_end, permanent)?;

    if record.permanent {
        println!("Granted permanent access to {} ({})", record.display_name, record.identity);
    } else {
        println!(
            "Granted access to {} ({}) from {} until {}",
            record.display_name,
            record.identity,
            format_datetime(&record.window_start),
            format_datetime(&record.window_end),
        );
    }
    Ok(())
}

async fn cmd_revoke(settings: &Settings, target: &str) -> Result<()> {
    let (identity, _) = resolve_target(settings, target).await?;
    let manager = open_manager(settings)?;

    if manager.remove_access(&identity) {
        println!("Access revoked for {}", identity);
        Ok(())
    } else {
        bail!("No access record for {}", identity);
    }
}

async fn cmd_status(settings: &Settings, target: &str) -> Result<()> {
    let (identity, _) = resolve_target(settings, target).await?;
    let manager = open_manager(settings)?;

    let (status, record) = manager.check_access(&identity);
    match (&status, record) {
        (AccessStatus::NoAccess, _) => println!("{}: no access on record", identity),
        (_, Some(record)) if record.permanent => {
            println!("{} ({}): {} (permanent)", identity, record.display_name, status);
        }
        (_, Some(record)) => {
            println!(
                "{} ({}): {}, window {} .. {}",
                identity,
                record.display_name,
                status,
                format_datetime(&record.window_start),
                format_datetime(&record.window_end),
            );
        }
        (_, None) => println!("{}: {}", identity, status),
    }
    Ok(())
}

fn cmd_purge(settings: &Settings) -> Result<()> {
    let manager = open_manager(settings)?;
    println!("Purged {} expired access records", manager.purge_expired());
    Ok(())
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = if args.config.exists() {
        load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?
    } else {
        info!(config_path = %args.config.display(), "Config file not found, using defaults");
        Settings::default()
    };

    if let Some(db) = &args.db {
        settings.db_path = db.clone();
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let settings = load_settings(&args)?;

    match &args.command {
        Cmd::Run => {
            info!(version = env!("CARGO_PKG_VERSION"), "timegated starting");
            let service = Service::new(&settings).await?;
            service.run().await
        }
        Cmd::Grant {
            target,
            duration,
            from,
            permanent,
            name,
        } => {
            cmd_grant(
                &settings,
                target,
                duration.as_deref(),
                from.as_deref(),
                *permanent,
                name.as_deref(),
            )
            .await
        }
        Cmd::Revoke { target } => cmd_revoke(&settings, target).await,
        Cmd::Status { target } => cmd_status(&settings, target).await,
        Cmd::Purge => cmd_purge(&settings),
    }
}
