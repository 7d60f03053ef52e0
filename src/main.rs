mod config;
mod error;
mod handlers;
mod images;
mod models;
mod router;
mod service;
mod storage;

use config::Config;
use handlers::AppState;
use images::ImageStore;
use service::ItemService;
use std::net::SocketAddr;
use std::sync::Arc;
use storage::create_store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listing_service=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting listing service");
    tracing::info!("Store type: {:?}", config.store_type);
    tracing::info!("Image directory: {}", config.image_dir.display());

    // Open the item store and create its schema
    let store = create_store(&config).await?;

    // Initialize image storage
    let images = Arc::new(ImageStore::new(
        config.image_dir.clone(),
        config.default_image.clone(),
    ));
    tokio::fs::create_dir_all(images.image_dir()).await?;

    // Build application state
    let state = AppState {
        service: ItemService::new(store, images),
        config: config.clone(),
    };

    let app = router::build_router(state)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
