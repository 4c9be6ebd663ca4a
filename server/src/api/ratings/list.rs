use super::RatingResponse;
use crate::api::recipes::load_owned_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Rating;
use crate::schema::ratings;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/ratings/recipe/{recipe_id}",
    tag = "ratings",
    params(
        ("recipe_id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Ratings, newest first", body = Vec<RatingResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipe_ratings(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<Vec<RatingResponse>>, ApiError> {
    let mut conn = get_conn!(pool);

    load_owned_recipe(&mut conn, user.id, recipe_id)?;

    let rows = ratings::table
        .filter(ratings::recipe_id.eq(recipe_id))
        .order((ratings::created_at.desc(), ratings::id.desc()))
        .select(Rating::as_select())
        .load(&mut conn)
        .map_err(ApiError::internal("Failed to list ratings"))?;

    Ok(Json(rows.into_iter().map(RatingResponse::from).collect()))
}
