//! cerebrod - relays chat commands and audio transcription to a hosted model API

use cerebro::providers::openai::OpenAiProvider;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod configuration;
mod error;
mod routes;
mod state;

use configuration::{Settings, LEGACY_API_KEY_VAR};
use error::to_env_var;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A local .env is optional
    let _ = dotenv::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cerebro=debug,cerebro_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new()?;

    if !settings.provider.has_api_key() {
        error!(
            "CRITICAL: no provider API key configured (set {} or {}); requests will fail",
            to_env_var("provider.api_key"),
            LEGACY_API_KEY_VAR
        );
    }

    info!("Provider host: {}", settings.provider.host);
    info!(
        "Chat model: {}, transcription model: {} ({})",
        settings.models.chat, settings.models.transcription, settings.models.language
    );

    let provider = OpenAiProvider::new(settings.provider.into_config())?;
    let state = AppState::new(
        Arc::new(provider),
        settings.models,
        settings.commands,
        settings.audio,
    );

    let app = routes::configure(state);

    let addr = settings.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
