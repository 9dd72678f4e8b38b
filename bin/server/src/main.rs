use chatai_llm::{OpenAiBackend, Relay};
use chatai_server::{AppState, config::ServerConfig, create_router};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!(
        model = %config.relay.model,
        upstream = %config.relay.upstream_url,
        organization = config.organization.is_some(),
        "Loaded configuration"
    );

    let backend =
        OpenAiBackend::new(config.openai_config()).expect("failed to create completion backend");
    let relay = Relay::new(Arc::new(backend)).with_system_prompt(config.relay.system_prompt.clone());
    let app = create_router(AppState::new(relay));

    let addr = config.bind_addr().expect("invalid listen address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
