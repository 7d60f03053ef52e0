use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub front_url: String,
    pub store_type: StoreType,
    pub database_url: String,
    pub items_json_path: PathBuf,
    pub image_dir: PathBuf,
    pub default_image: String,
    pub max_image_size: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum StoreType {
    Sqlite,
    Json,
}

impl std::str::FromStr for StoreType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreType::Sqlite),
            "json" => Ok(StoreType::Json),
            _ => Err(anyhow::anyhow!("Invalid store type: {}", s)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "9000".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT: {}", e))?,
            front_url: env::var("FRONT_URL")
                .ok()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            store_type: env::var("STORE_TYPE")
                .unwrap_or_else(|_| "sqlite".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:db/mercari.sqlite3".to_string()),
            items_json_path: env::var("ITEMS_JSON_PATH")
                .unwrap_or_else(|_| "items.json".to_string())
                .into(),
            image_dir: env::var("IMAGE_DIR")
                .unwrap_or_else(|_| "images".to_string())
                .into(),
            default_image: env::var("DEFAULT_IMAGE")
                .unwrap_or_else(|_| "default.jpg".to_string()),
            max_image_size: env::var("MAX_IMAGE_SIZE")
                .unwrap_or_else(|_| "8388608".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_IMAGE_SIZE: {}", e))?,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !crate::images::has_image_suffix(&self.default_image) {
            return Err(anyhow::anyhow!(
                "DEFAULT_IMAGE must end with {}",
                crate::images::IMAGE_SUFFIX
            ));
        }
        if self.max_image_size == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE must be greater than zero"));
        }
        axum::http::HeaderValue::from_str(&self.front_url)
            .map_err(|e| anyhow::anyhow!("Invalid FRONT_URL {}: {}", self.front_url, e))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config(root: &std::path::Path) -> Config {
    Config {
        server_port: 0,
        front_url: "http://localhost:3000".to_string(),
        store_type: StoreType::Sqlite,
        database_url: format!("sqlite:{}", root.join("db").join("items.sqlite3").display()),
        items_json_path: root.join("items.json"),
        image_dir: root.join("images"),
        default_image: "default.jpg".to_string(),
        max_image_size: 1024 * 1024,
    }
}
