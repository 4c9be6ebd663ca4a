use super::{load_owned_photo, PhotoResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::photos::set_hero_photo;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    put,
    path = "/api/photos/{id}/hero",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 200, description = "Photo is now the recipe's hero", body = PhotoResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Photo not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_hero(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let mut photo = load_owned_photo(&mut conn, user.id, id)?;
    set_hero_photo(&mut conn, &photo).map_err(ApiError::internal("Failed to set hero photo"))?;
    photo.is_hero = true;

    Ok(Json(photo.into()))
}
