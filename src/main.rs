use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use todo_api_rust::{
    app,
    auth::JwtVerifier,
    config::AppConfig,
    database::{self, PgTodoStore},
    services::TodoService,
    with_http_layers, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_PUBLIC_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_api_rust=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    database::migrate(&pool)
        .await
        .context("failed to migrate database")?;

    let verifier = JwtVerifier::from_config(&config.security.jwt)
        .context("failed to create token verifier")?;

    let service = TodoService::new(Arc::new(PgTodoStore::new(pool.clone())));
    let state = AppState::new(service, Arc::new(verifier));
    let app = with_http_layers(app(state), &config.api, &config.security);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Todo API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database::close(pool).await;
    tracing::info!("Todo API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
