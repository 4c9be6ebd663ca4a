pub mod delete;
pub mod list;
pub mod set_hero;
pub mod upload;

use crate::api::ApiError;
use crate::models::Photo;
use crate::schema::{photos, recipes};
use crate::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Returns the router for /api/photos endpoints (mounted at /api/photos)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload::upload_photo))
        .route("/recipe/{recipe_id}", get(list::list_recipe_photos))
        .route("/{id}", delete(delete::delete_photo))
        .route("/{id}/hero", put(set_hero::set_hero))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub is_hero: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        PhotoResponse {
            id: photo.id,
            recipe_id: photo.recipe_id,
            user_id: photo.user_id,
            url: photo.url,
            caption: photo.caption,
            is_hero: photo.is_hero,
            created_at: photo.created_at,
        }
    }
}

/// Fetch a photo whose recipe belongs to `user_id`.
pub(crate) fn load_owned_photo(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
) -> Result<Photo, ApiError> {
    photos::table
        .inner_join(recipes::table)
        .filter(photos::id.eq(id))
        .filter(recipes::user_id.eq(user_id))
        .select(Photo::as_select())
        .first(conn)
        .optional()
        .map_err(ApiError::internal("Failed to fetch photo"))?
        .ok_or(ApiError::NotFound("Photo not found"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        upload::upload_photo,
        list::list_recipe_photos,
        delete::delete_photo,
        set_hero::set_hero,
    ),
    components(schemas(PhotoResponse, upload::UploadPhotoRequest))
)]
pub struct ApiDoc;
