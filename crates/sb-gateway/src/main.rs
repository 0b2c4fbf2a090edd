use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use sb_context::ContextManager;
use sb_domain::config::ConfigSeverity;
use sb_domain::Config;
use sb_gateway::api;
use sb_gateway::bootstrap;
use sb_gateway::cli::{Cli, Command, ConfigCommand};
use sb_gateway::state::AppState;
use sb_registry::{AgentCardClient, AgentRegistry};
use sb_routing::RoutingEngine;
use sb_transport::TaskTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_path) = sb_gateway::cli::load_config()?;
    if let Some(host) = cli.host.clone() {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        None | Some(Command::Serve) => {
            init_tracing(&config);
            if let Err(e) = run_server(Arc::new(config)).await {
                tracing::error!(error = %e, "fatal startup failure");
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            if !sb_gateway::cli::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            sb_gateway::cli::show(&config);
            Ok(())
        }
        Some(Command::Version) => {
            println!("switchboard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.observability.level.clone()));

    if config.observability.log_format == "pretty" {
        tracing_subscriber::fmt().with_env_filter(filter).pretty().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    }
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    tracing::info!("Switchboard starting");

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

    // ── Registry + discovery ──────────────────────────────────────────
    let registry = Arc::new(AgentRegistry::new());
    let card_client = Arc::new(AgentCardClient::new(config.transport.card_fetch_timeout_secs)?);
    tracing::info!("agent registry ready");

    // ── Routing ──────────────────────────────────────────────────────
    let router = Arc::new(RoutingEngine::new());
    tracing::info!("routing engine ready");

    // ── Transport ────────────────────────────────────────────────────
    let transport = Arc::new(TaskTransport::new(config.transport.send_timeout_secs)?);
    tracing::info!("task transport ready");

    // ── Context manager ──────────────────────────────────────────────
    let context = Arc::new(ContextManager::new(config.sessions.clone()));
    tracing::info!("context manager ready");

    let state = AppState {
        config: config.clone(),
        registry,
        card_client,
        router,
        transport,
        context: context.clone(),
        rpc_tasks: Arc::new(Mutex::new(HashMap::new())),
    };

    // ── Bootstrap agents ──────────────────────────────────────────────
    bootstrap::run(&state).await;

    // ── Periodic session eviction sweep ────────────────────────────────
    {
        let context = context.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
            loop {
                interval.tick().await;
                let evicted = context.cleanup_expired();
                if evicted > 0 {
                    tracing::info!(evicted, "session sweep evicted expired sessions");
                }
            }
        });
    }
    tracing::info!("session sweep started (10 min tick)");

    // ── CORS layer ───────────────────────────────────────────────────
    let cors_layer = api::build_cors_layer(&config.server.cors);

    // ── Concurrency limit (backpressure, not a product rate-limit) ───
    let max_concurrent = std::env::var("SWITCHBOARD_MAX_CONCURRENT_REQUESTS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(256);
    tracing::info!(max_concurrent, "concurrency limit set");

    let app = api::router()
        .layer(cors_layer)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent))
        .with_state(state);

    // ── Bind ─────────────────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "Switchboard listening");

    axum::serve(listener, app).await.context("axum server error")?;

    Ok(())
}
