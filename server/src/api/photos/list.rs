use super::PhotoResponse;
use crate::api::recipes::load_owned_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::photos::photos_for_recipe;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/photos/recipe/{recipe_id}",
    tag = "photos",
    params(
        ("recipe_id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Photos in upload order", body = Vec<PhotoResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipe_photos(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<Vec<PhotoResponse>>, ApiError> {
    let mut conn = get_conn!(pool);

    load_owned_recipe(&mut conn, user.id, recipe_id)?;
    let photos = photos_for_recipe(&mut conn, recipe_id)
        .map_err(ApiError::internal("Failed to list photos"))?;

    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}
