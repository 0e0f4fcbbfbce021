use std::sync::Arc;

use anyhow::Context;

use agility_api_rust::app::app;
use agility_api_rust::config;
use agility_api_rust::database::manager::DatastoreManager;
use agility_api_rust::identity::GoogleTokenVerifier;
use agility_api_rust::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, IDENTITY_AUDIENCE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Agility API in {:?} mode", config.environment);

    let store = DatastoreManager::connect()
        .await
        .context("failed to connect to datastore")?;

    let verifier = Arc::new(GoogleTokenVerifier::new(&config.identity));
    let state = AppState::new(Arc::new(store), verifier);

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("AGILITY_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Agility API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
