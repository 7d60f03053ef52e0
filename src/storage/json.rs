use super::backend::ItemStore;
use crate::models::{Category, Item, ItemsResponse, NewItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Flat-file backend: one JSON document `{ "items": [...] }` rewritten on every insert
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<ItemsResponse> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let mut document: ItemsResponse = serde_json::from_slice(&raw)
            .with_context(|| format!("Invalid items document {}", self.path.display()))?;

        // Items written without ids are numbered after the highest existing id
        let mut next_id = document.items.iter().filter_map(|item| item.id).max().unwrap_or(0);
        for item in document.items.iter_mut().filter(|item| item.id.is_none()) {
            next_id += 1;
            item.id = Some(next_id);
        }

        Ok(document)
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self.path.file_name().unwrap_or_default().to_os_string();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    async fn write_document(&self, document: &ItemsResponse) -> Result<()> {
        let raw = serde_json::to_vec_pretty(document)?;

        // Write a sibling file first so the document is never left truncated
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, raw)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }
}

#[async_trait]
impl ItemStore for JsonStore {
    async fn init(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path).await? {
            self.read_document().await?;
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tracing::info!("Creating items document {}", self.path.display());
        self.write_document(&ItemsResponse::default()).await
    }

    async fn insert_item(&self, item: NewItem) -> Result<Item> {
        let _guard = self.lock.lock().await;

        let mut document = self.read_document().await?;
        let id = document
            .items
            .iter()
            .filter_map(|item| item.id)
            .max()
            .unwrap_or(0)
            + 1;

        let item = item.with_id(id);
        document.items.push(item.clone());
        self.write_document(&document).await?;

        Ok(item)
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_document().await?.items;
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = Vec::new();
        for item in self.list_items().await? {
            if !categories.iter().any(|category| category.name == item.category) {
                categories.push(Category {
                    id: categories.len() as i64 + 1,
                    name: item.category,
                });
            }
        }
        Ok(categories)
    }
}
