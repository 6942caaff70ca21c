// ABOUTME: Binary entrypoint — wires configuration, repositories, services, and the HTTP router together
// ABOUTME: Also carries the admin `scope import` bootstrap subcommand for a brand-new deployment's first boot

#![forbid(unsafe_code)]

//! # Registry Gateway Daemon
//!
//! Boots the registry and discovery gateway: loads configuration, selects the
//! storage backend, runs the ordered startup sequence, and serves the HTTP API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use registry_gateway::config::Config;
use registry_gateway::http::{self, AppState};
use registry_gateway::models::Scope;
use registry_gateway::repository::{self, ScopeRepository as _};
use registry_gateway::search::embeddings::build_embedding_client;
use registry_gateway::search::SearchEngine;
use registry_gateway::services::{
    federation_sync::HttpUpstreamClient, AgentService, FederationSync, HealthMonitor, Lifecycle,
    ProxyConfigEmitter, SecurityAdmission, ServerService, TaskManager,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "registry-gatewayd")]
#[command(about = "Registry and discovery gateway for MCP servers and A2A agents")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default when no subcommand is given).
    Serve,
    /// Load scopes from a JSON file into the configured backend, for a
    /// brand-new deployment that otherwise has no caller able to pass the
    /// admin check.
    ScopeImport {
        /// Path to a JSON file containing an array of scopes.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = parse_args_or_default();
    match args.command {
        Some(Command::ScopeImport { path }) => scope_import(&path).await,
        Some(Command::Serve) | None => serve().await,
    }
}

fn parse_args_or_default() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("argument parsing failed: {e}");
            eprintln!("falling back to serving with default configuration");
            Args { command: None }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}

/// Read a JSON array of [`Scope`] from `path` and upsert each into the
/// configured scope backend.
async fn scope_import(path: &PathBuf) -> Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let repositories = repository::factory::build(&config).await.context("building repositories")?;

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let scopes: Vec<Scope> = serde_json::from_str(&raw).context("parsing scopes file")?;

    for scope in scopes {
        let name = scope.name.clone();
        match repositories.scopes.update(scope.clone()).await {
            Ok(_) => info!(scope = %name, "scope updated"),
            Err(_) => {
                repositories.scopes.create(scope).await.with_context(|| format!("creating scope {name}"))?;
                info!(scope = %name, "scope created");
            }
        }
    }

    info!("scope import complete");
    Ok(())
}

async fn serve() -> Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let bind_address = config.http_bind_address.clone();
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_seconds);

    let repositories = Arc::new(repository::factory::build(&config).await.context("building repositories")?);
    let embeddings = build_embedding_client(&config);
    let task_manager = Arc::new(TaskManager::new());

    let server_security = SecurityAdmission::new(config.server_security.clone());
    let agent_security = SecurityAdmission::new(config.agent_security.clone());

    let proxy = Arc::new(ProxyConfigEmitter::new(config.reverse_proxy_config_path.clone()));
    let servers = Arc::new(ServerService::new(
        repositories.servers.clone(),
        repositories.search.clone(),
        embeddings.clone(),
        server_security,
        proxy.clone(),
    ));
    let agents = Arc::new(AgentService::new(
        repositories.agents.clone(),
        repositories.search.clone(),
        embeddings.clone(),
        agent_security,
    ));

    let health_monitor = Arc::new(HealthMonitor::new(
        repositories.servers.clone(),
        Duration::from_secs(config.health_check_timeout_seconds),
    ));
    let federation = Arc::new(FederationSync::new(
        repositories.federation.clone(),
        Arc::new(HttpUpstreamClient::default()),
    ));

    let lifecycle = Lifecycle {
        repositories: repositories.clone(),
        embeddings: embeddings.clone(),
        task_manager: task_manager.clone(),
        servers: servers.clone(),
        agents: agents.clone(),
        health_monitor: health_monitor.clone(),
        federation: federation.clone(),
        proxy: proxy.clone(),
    };
    let scope_resolver = lifecycle.startup().await.context("running startup sequence")?;

    let search_engine = Arc::new(SearchEngine::new(repositories.search.clone(), embeddings.clone()));

    let state = AppState {
        config: Arc::new(config.clone()),
        repositories: repositories.clone(),
        servers: servers.clone(),
        agents: agents.clone(),
        search_engine,
        health_monitor: health_monitor.clone(),
        federation: federation.clone(),
        proxy,
        task_manager: task_manager.clone(),
        embeddings,
        scope_resolver: Arc::new(RwLock::new(scope_resolver)),
    };

    spawn_background_tasks(&state, &config);

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    info!(address = %bind_address, "registry gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("shutting down");
    lifecycle.shutdown(shutdown_timeout).await;
    Ok(())
}

/// Schedule the periodic background subsystems: health
/// probing on `health_check_interval_seconds` and upstream federation sync on
/// `federation_sync_interval_seconds`. Both run until `TaskManager::shutdown`
/// cancels them.
fn spawn_background_tasks(state: &AppState, config: &Config) {
    let health_interval = Duration::from_secs(config.health_check_interval_seconds);
    let health_timeout = Duration::from_secs(config.health_check_timeout_seconds);
    let health_monitor = state.health_monitor.clone();
    state.task_manager.create_task("health-probe", move |cancel| async move {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(health_interval) => {
                    if let Err(e) = health_monitor.probe_all_enabled(health_timeout).await {
                        error!(error = %e, "periodic health probe failed");
                    }
                }
            }
        }
    });

    let federation_interval = Duration::from_secs(config.federation_sync_interval_seconds);
    let federation = state.federation.clone();
    let servers = state.servers.clone();
    let agents = state.agents.clone();
    state.task_manager.create_task("federation-sync", move |cancel| async move {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(federation_interval) => {
                    match federation.sync_all(&servers, &agents).await {
                        Ok(outcomes) => {
                            for outcome in outcomes.iter().filter(|o| o.result.is_err()) {
                                tracing::warn!(upstream = %outcome.upstream_name, "federation item failed to sync");
                            }
                        }
                        Err(e) => error!(error = %e, "periodic federation sync failed"),
                    }
                }
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut signal) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            signal.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
