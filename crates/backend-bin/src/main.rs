use backend_lib::{config::Settings, routes, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize configuration, falling back to the packaged default file
    let config = Settings::load().or_else(|_| Settings::load_from("config/default.toml"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    // Create application state over the in-memory reference backends
    let state = Arc::new(AppState::new(config.clone()));

    // Create the router
    let app = routes::create_router(state);

    // Start the server
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
