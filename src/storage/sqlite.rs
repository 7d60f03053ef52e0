use super::backend::ItemStore;
use crate::models::{Category, Item, NewItem};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::str::FromStr;

const SELECT_ITEMS: &str = r#"
    SELECT items.id, items.name, category.name AS category, items.image_name AS image
    FROM items
    JOIN category ON items.category_id = category.id
"#;

/// Relational backend: `category` and `items` tables joined by foreign key
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let pool = SqlitePool::connect_with(options).await?;
        tracing::info!("Connected to database {}", database_url);

        Ok(SqliteStore { pool })
    }

    async fn category_id(&self, name: &str) -> Result<i64> {
        let inserted =
            sqlx::query("INSERT INTO category (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
                .bind(name)
                .execute(&self.pool)
                .await?;

        if inserted.rows_affected() > 0 {
            tracing::debug!("Created category {}", name);
        }

        let id: i64 = sqlx::query_scalar("SELECT id FROM category WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                image_name TEXT NOT NULL,
                FOREIGN KEY (category_id) REFERENCES category(id)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_item(&self, item: NewItem) -> Result<Item> {
        let category_id = self.category_id(&item.category).await?;

        let id = sqlx::query("INSERT INTO items (name, category_id, image_name) VALUES (?, ?, ?)")
            .bind(&item.name)
            .bind(category_id)
            .bind(&item.image)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(item.with_id(id))
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!("{} ORDER BY items.id", SELECT_ITEMS))
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn get_item(&self, id: i64) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!("{} WHERE items.id = ?", SELECT_ITEMS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    async fn items_in_category(&self, category: &str) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "{} WHERE category.name = ? ORDER BY items.id",
            SELECT_ITEMS
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM category ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }
}
