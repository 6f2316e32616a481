//! services/api/src/bin/api.rs

use api_lib::{
    adapters::JsonFileStore,
    config::Config,
    error::ApiError,
    mutation::MutationSerializer,
    web::{self, state::AppState, SessionTokens},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Ensure the Storage Directories Exist ---
    tokio::fs::create_dir_all(config.images_dir()).await?;

    // --- 3. Build the Shared AppState ---
    let store = Arc::new(JsonFileStore::new(config.db_path()));
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
        sessions: SessionTokens::new(),
        mutations: MutationSerializer::new(),
    });

    // --- 4. Create the Web Router ---
    let app = web::app(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
