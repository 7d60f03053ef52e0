use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A listed item as served to clients, with its category resolved to a name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Item data accepted by a store; the id is assigned on insert
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub image: String,
}

impl NewItem {
    pub fn with_id(self, id: i64) -> Item {
        Item {
            id: Some(id),
            name: self.name,
            category: self.category,
            image: self.image,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}
