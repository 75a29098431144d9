use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

use cb_domain::config::{Config, ConfigSeverity};
use cb_gateway::cli::{load_config, Cli, Command, ConfigCommand};
use cb_gateway::outbound::{HttpOutboundGateway, OutboundGateway};
use cb_gateway::runtime::session_lock::SenderLockMap;
use cb_gateway::state::AppState;
use cb_gateway::{api, cli};
use cb_registry::TenantRegistry;
use cb_sessions::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = Cli::parse();

    match parsed.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let (config, _config_path) = load_config()?;
            init_tracing(&config);
            run_server(Arc::new(config)).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = load_config()?;
            let valid = cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = load_config()?;
            cli::config::show(&config);
            Ok(())
        }
        Some(Command::Version) => {
            println!("clubbot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured `tracing`, honoring the configured format/filter
/// but deferring to `RUST_LOG` when it's set (A2).
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.observability.log_filter.clone()));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.observability.log_format == "pretty" {
        subscriber.init();
    } else {
        subscriber.json().init();
    }
}

/// Start the gateway: load every club named in the registry manifest,
/// build the shared runtime state, and serve `/v1/inbound` (§4.3, §6).
async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    tracing::info!("clubbot gateway starting");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count()
        );
    }

    // ── Tenant registry (C3) ─────────────────────────────────────────
    let registry = Arc::new(
        TenantRegistry::load(&config.registry.manifest_path, &config.registry.clubs_dir)
            .context("loading tenant registry")?,
    );
    tracing::info!(clubs = registry.contexts().count(), "tenant registry loaded");

    // ── Sessions + per-sender locks ──────────────────────────────────
    let sessions = Arc::new(SessionStore::new());
    let sender_locks = Arc::new(SenderLockMap::new());

    // ── Outbound gateway adapter (A3) ────────────────────────────────
    let outbound: Arc<dyn OutboundGateway> = Arc::new(HttpOutboundGateway::new(&config.gateway));
    tracing::info!(base_url = %config.gateway.base_url, "outbound gateway adapter ready");

    // ── Admin token (read once, hash for constant-time comparison) ──
    let admin_token_hash = match std::env::var("CB_ADMIN_TOKEN") {
        Ok(token) if !token.is_empty() => {
            tracing::info!("admin bearer-token auth enabled");
            Some(Sha256::digest(token.as_bytes()).to_vec())
        }
        _ => {
            tracing::warn!("admin bearer-token auth DISABLED — set CB_ADMIN_TOKEN to enable");
            None
        }
    };

    let state = AppState { config: config.clone(), registry, sessions, sender_locks, outbound, admin_token_hash };

    // ── Periodic sender-lock pruning ─────────────────────────────────
    {
        let sender_locks = state.sender_locks.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                sender_locks.prune_idle();
            }
        });
    }

    let app = api::router(state.clone())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "clubbot gateway listening");

    axum::serve(listener, app).await.context("axum server error")?;

    Ok(())
}
