use crate::error::{ApiError, ApiResult};
use crate::images::{hashed_image_name, ImageStore};
use crate::models::{Category, Item, NewItem};
use crate::storage::ItemStore;
use std::sync::Arc;

/// An uploaded image as received from the client
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Submitted item fields; presence is checked by [`ItemService::create`]
#[derive(Debug, Default)]
pub struct ItemSubmission {
    pub name: Option<String>,
    pub category: Option<String>,
    pub image: Option<UploadedImage>,
}

#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    images: Arc<ImageStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, images: Arc<ImageStore>) -> Self {
        ItemService { store, images }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Store the image under its hashed name and insert the item.
    /// Nothing is written unless every field is present.
    pub async fn create(&self, submission: ItemSubmission) -> ApiResult<Item> {
        let name = required(submission.name, "name")?;
        let category = required(submission.category, "category")?;
        let image = submission
            .image
            .ok_or_else(|| ApiError::bad_request("No image provided"))?;

        tracing::info!("Receive item: {}", name);
        tracing::info!("Receive category: {}", category);
        tracing::info!("Receive image: {}", image.file_name);

        let image_name = hashed_image_name(&image.file_name);
        self.images
            .store_file(&image_name, &image.bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store image {}: {}", image_name, e);
                ApiError::Internal(e)
            })?;

        let item = self
            .store
            .insert_item(NewItem {
                name,
                category,
                image: image_name,
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to save item: {}", e);
                ApiError::Internal(e)
            })?;

        Ok(item)
    }

    pub async fn list(&self) -> ApiResult<Vec<Item>> {
        self.store.list_items().await.map_err(|e| {
            tracing::error!("Failed to list items: {}", e);
            ApiError::Internal(e)
        })
    }

    /// Look up an item by the id taken from the request path.
    /// Unknown ids and anything other than a canonical positive number are not found.
    pub async fn get(&self, item_id: &str) -> ApiResult<Item> {
        let Some(id) = parse_item_id(item_id) else {
            tracing::debug!("Invalid item id: {}", item_id);
            return Err(ApiError::not_found());
        };

        self.store
            .get_item(id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get item {}: {}", id, e);
                ApiError::Internal(e)
            })?
            .ok_or_else(ApiError::not_found)
    }

    /// Items whose category equals the keyword exactly; may be empty
    pub async fn search(&self, keyword: &str) -> ApiResult<Vec<Item>> {
        self.store.items_in_category(keyword).await.map_err(|e| {
            tracing::error!("Failed to search items: {}", e);
            ApiError::Internal(e)
        })
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        self.store.list_categories().await.map_err(|e| {
            tracing::error!("Failed to list categories: {}", e);
            ApiError::Internal(e)
        })
    }
}

/// Ids are written exactly as they are rendered: digits only, no sign, no leading zero
fn parse_item_id(item_id: &str) -> Option<i64> {
    if item_id.starts_with('0') || !item_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    item_id.parse::<i64>().ok().filter(|id| *id > 0)
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::bad_request(format!("No {} provided", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonStore, SqliteStore};

    async fn sqlite_service(dir: &tempfile::TempDir) -> ItemService {
        let url = format!("sqlite:{}", dir.path().join("items.sqlite3").display());
        let store = SqliteStore::connect(&url).await.unwrap();
        store.init().await.unwrap();
        ItemService::new(
            Arc::new(store),
            Arc::new(ImageStore::new(dir.path().join("images"), "default.jpg")),
        )
    }

    async fn json_service(dir: &tempfile::TempDir) -> ItemService {
        let store = JsonStore::new(dir.path().join("items.json"));
        store.init().await.unwrap();
        ItemService::new(
            Arc::new(store),
            Arc::new(ImageStore::new(dir.path().join("images"), "default.jpg")),
        )
    }

    fn submission(name: &str, category: &str, file_name: &str) -> ItemSubmission {
        ItemSubmission {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            image: Some(UploadedImage {
                file_name: file_name.to_string(),
                bytes: format!("bytes of {}", name).into_bytes(),
            }),
        }
    }

    #[tokio::test]
    async fn create_writes_image_under_hashed_name() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir).await;

        let item = service
            .create(submission("jacket", "fashion", "local_image.jpg"))
            .await
            .unwrap();

        assert_eq!(item.image, hashed_image_name("local_image.jpg"));
        let stored = std::fs::read(dir.path().join("images").join(&item.image)).unwrap();
        assert_eq!(stored, b"bytes of jacket");
    }

    #[tokio::test]
    async fn json_backend_persists_images_too() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(&dir).await;

        let item = service
            .create(submission("jacket", "fashion", "jacket.jpg"))
            .await
            .unwrap();

        assert!(dir.path().join("images").join(&item.image).exists());
    }

    #[tokio::test]
    async fn same_file_name_gives_same_stored_name() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir).await;

        let first = service
            .create(submission("jacket", "fashion", "photo.jpg"))
            .await
            .unwrap();
        let second = service
            .create(submission("phone", "electronics", "photo.jpg"))
            .await
            .unwrap();

        assert_eq!(first.image, second.image);
    }

    #[tokio::test]
    async fn missing_image_is_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir).await;

        let mut missing_image = submission("jacket", "fashion", "jacket.jpg");
        missing_image.image = None;

        let err = service.create(missing_image).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(service.list().await.unwrap().is_empty());
        assert!(service.categories().await.unwrap().is_empty());
        assert!(!dir.path().join("images").exists());
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(&dir).await;

        let blank_name = submission("  ", "fashion", "jacket.jpg");
        assert!(matches!(
            service.create(blank_name).await.unwrap_err(),
            ApiError::BadRequest(_)
        ));

        let mut no_category = submission("jacket", "fashion", "jacket.jpg");
        no_category.category = None;
        assert!(matches!(
            service.create(no_category).await.unwrap_err(),
            ApiError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn get_reports_unknown_and_non_numeric_ids_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir).await;
        service
            .create(submission("jacket", "fashion", "jacket.jpg"))
            .await
            .unwrap();

        assert_eq!(service.get("1").await.unwrap().name, "jacket");
        assert!(matches!(service.get("2").await.unwrap_err(), ApiError::NotFound(_)));
        assert!(matches!(service.get("abc").await.unwrap_err(), ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_rejects_non_canonical_ids() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(&dir).await;
        service
            .create(submission("jacket", "fashion", "jacket.jpg"))
            .await
            .unwrap();

        for item_id in ["+1", "01", "0", "-1", " 1", ""] {
            assert!(
                matches!(service.get(item_id).await.unwrap_err(), ApiError::NotFound(_)),
                "{:?} should not resolve",
                item_id
            );
        }
        assert_eq!(service.get("1").await.unwrap().name, "jacket");
    }

    #[test]
    fn item_ids_parse_only_in_canonical_form() {
        assert_eq!(parse_item_id("1"), Some(1));
        assert_eq!(parse_item_id("120"), Some(120));
        assert_eq!(parse_item_id("01"), None);
        assert_eq!(parse_item_id("+1"), None);
        assert_eq!(parse_item_id("0"), None);
        assert_eq!(parse_item_id("99999999999999999999"), None);
    }

    #[tokio::test]
    async fn search_returns_only_exact_category_matches() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(&dir).await;
        service
            .create(submission("jacket", "fashion", "jacket.jpg"))
            .await
            .unwrap();
        service
            .create(submission("phone", "electronics", "phone.jpg"))
            .await
            .unwrap();

        let found = service.search("fashion").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "jacket");
        assert!(service.search("toys").await.unwrap().is_empty());
    }
}
