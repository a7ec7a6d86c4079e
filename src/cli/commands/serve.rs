use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;

use crate::auth::JwtKeys;
use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Listening port (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Store backend: postgres or memory (overrides STORE_BACKEND)")]
    pub store: Option<StoreBackend>,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(store) = args.store {
        config.database.backend = store;
    }

    let _log_guards = crate::logging::init(&config)?;
    tracing::info!("Starting notes-api in {:?} mode", config.environment);

    if config.uses_fallback_secret() {
        if config.is_production() {
            tracing::warn!("JWT_SECRET is not set; using the development fallback secret in production");
        } else {
            tracing::info!("JWT_SECRET is not set; using the development fallback secret");
        }
    }

    let keys = JwtKeys::from_config(&config.security).context("invalid JWT configuration")?;
    let store = DatabaseManager::open_store(&config)
        .await
        .context("failed to open record store")?;

    let state = AppState::new(
        store.clone(),
        keys,
        config.api.resource.clone(),
        config.security.enforce_writes,
    );
    let app = crate::routes::app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(
        "Serving /{} on http://{} ({} store)",
        config.api.resource,
        bind_addr,
        store.backend()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, draining requests");
}
