use super::load_owned_photo;
use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::photos::{self, PhotoStore};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/photos/{id}",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 200, description = "Photo deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Photo not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_photo(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(store): State<Arc<PhotoStore>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let photo = {
        let mut conn = get_conn!(pool);
        let photo = load_owned_photo(&mut conn, user.id, id)?;
        photos::delete_photo(&mut conn, &photo)
            .map_err(ApiError::internal("Failed to delete photo"))?;
        photo
    };

    store.delete(&photo.url).await;
    tracing::info!(photo_id = %photo.id, recipe_id = %photo.recipe_id, "deleted photo");

    Ok(MessageResponse::new("Photo deleted"))
}
