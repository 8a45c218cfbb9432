use std::sync::Arc;

use anyhow::Context;
use common::FragmentStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fragments_server::auth::Authenticator;
use fragments_server::backend::init_backend;
use fragments_server::config::AppConfig;
use fragments_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .init();

    let backend = init_backend(&config.storage)
        .await
        .context("Failed to initialize fragment backend")?;
    let auth = Authenticator::from_config(&config.auth).context("Failed to set up authentication")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        store: FragmentStore::new(backend),
        auth: Arc::new(auth),
        config,
    };
    let app = fragments_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
