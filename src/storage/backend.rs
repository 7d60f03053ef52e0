use crate::models::{Category, Item, NewItem};
use anyhow::Result;
use async_trait::async_trait;

/// Trait defining the interface for item storage backends
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Prepare the backing store (tables, empty document). Called once at startup.
    async fn init(&self) -> Result<()>;

    /// Insert an item, creating its category on first use, and return it with its id
    async fn insert_item(&self, item: NewItem) -> Result<Item>;

    /// All items in id order, each with its category name
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// Get a single item by id
    async fn get_item(&self, id: i64) -> Result<Option<Item>> {
        Ok(self
            .list_items()
            .await?
            .into_iter()
            .find(|item| item.id == Some(id)))
    }

    /// Items whose category name equals `category` exactly
    async fn items_in_category(&self, category: &str) -> Result<Vec<Item>> {
        Ok(self
            .list_items()
            .await?
            .into_iter()
            .filter(|item| item.category == category)
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>>;
}
