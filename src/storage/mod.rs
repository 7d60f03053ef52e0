pub mod backend;
pub mod json;
pub mod sqlite;

pub use backend::ItemStore;
pub use json::JsonStore;
pub use sqlite::SqliteStore;

use crate::config::{Config, StoreType};
use anyhow::Result;
use std::sync::Arc;

/// Factory function to create the configured item store, with its schema initialized
pub async fn create_store(config: &Config) -> Result<Arc<dyn ItemStore>> {
    let store: Arc<dyn ItemStore> = match config.store_type {
        StoreType::Sqlite => Arc::new(SqliteStore::connect(&config.database_url).await?),
        StoreType::Json => Arc::new(JsonStore::new(config.items_json_path.clone())),
    };

    store.init().await?;
    tracing::info!("Item store ready: {:?}", config.store_type);

    Ok(store)
}
