use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::images::{has_image_suffix, is_plain_file_name};
use crate::models::{Category, Item, ItemsResponse, MessageResponse, SearchQuery};
use crate::service::{ItemService, ItemSubmission, UploadedImage};
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};

#[derive(Clone)]
pub struct AppState {
    pub service: ItemService,
    pub config: Config,
}

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello, world!"))
}

/// POST /items - Submit an item as multipart form data (name, category, image file)
pub async fn add_item(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    let mut submission = ItemSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "name" | "category" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read {}: {}", name, e))
                })?;
                if name == "name" {
                    submission.name = Some(value);
                } else {
                    submission.category = Some(value);
                }
            }
            "image" => {
                // Only file parts carry image bytes
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::bad_request("Image must be uploaded as a file"))?;

                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read image: {}", e))
                })?;

                // Validate file size
                if data.len() > state.config.max_image_size {
                    return Err(ApiError::bad_request(format!(
                        "Image size {} bytes exceeds maximum allowed size of {} bytes",
                        data.len(),
                        state.config.max_image_size
                    )));
                }

                submission.image = Some(UploadedImage {
                    file_name,
                    bytes: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    // Presence checks happen before anything is stored
    let item = state.service.create(submission).await?;

    Ok(Json(MessageResponse::new(format!(
        "item received: {}",
        item.name
    ))))
}

/// GET /items - List all items
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Json<ItemsResponse>> {
    let items = state.service.list().await?;
    Ok(Json(ItemsResponse { items }))
}

/// GET /items/:item_id - Get a single item
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<Item>> {
    let item = state.service.get(&item_id).await?;
    Ok(Json(item))
}

/// GET /search?keyword= - Items whose category equals the keyword
pub async fn search_items(
    State(state): State<AppState>,
    query: Option<Query<SearchQuery>>,
) -> ApiResult<Json<ItemsResponse>> {
    let Query(query) = query.ok_or_else(|| ApiError::bad_request("No keyword provided"))?;

    let items = state.service.search(&query.keyword).await?;
    Ok(Json(ItemsResponse { items }))
}

/// GET /categories - List all categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.service.categories().await?;
    Ok(Json(categories))
}

/// GET /image/:imageFilename - Serve a stored image, or the default image when it is missing
pub async fn get_image(
    State(state): State<AppState>,
    Path(image_filename): Path<String>,
) -> ApiResult<Response<Body>> {
    if !has_image_suffix(&image_filename) {
        return Err(ApiError::bad_request("Image path does not end with .jpg"));
    }
    if !is_plain_file_name(&image_filename) {
        return Err(ApiError::bad_request("Invalid image file name"));
    }

    let bytes = state
        .service
        .images()
        .read_or_default(&image_filename)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read image {}: {}", image_filename, e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}
