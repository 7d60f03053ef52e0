use crate::handlers::{self, AppState};
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Room for the multipart framing and text fields around the image
const FORM_OVERHEAD: usize = 64 * 1024;

/// Build the axum router with all listing endpoints
pub fn build_router(state: AppState) -> Result<Router> {
    let front_url = HeaderValue::from_str(&state.config.front_url)
        .map_err(|e| anyhow::anyhow!("Invalid FRONT_URL: {}", e))?;
    let body_limit = state.config.max_image_size + FORM_OVERHEAD;

    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/items", get(handlers::list_items).post(handlers::add_item))
        .route("/items/:item_id", get(handlers::get_item))
        .route("/search", get(handlers::search_items))
        .route("/categories", get(handlers::list_categories))
        .route("/image/:imageFilename", get(handlers::get_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(front_url)
                .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
