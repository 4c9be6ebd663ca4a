use super::{validate_score, RatingResponse};
use crate::api::recipes::load_owned_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRating, Rating};
use crate::schema::ratings;
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRatingRequest {
    pub recipe_id: Uuid,
    /// 1 to 5
    pub score: f64,
    pub notes: Option<String>,
    pub cooked_date: Option<DateTime<Utc>>,
}

#[utoipa::path(
    post,
    path = "/api/ratings",
    tag = "ratings",
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating created", body = RatingResponse),
        (status = 400, description = "Invalid score", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_rating(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), ApiError> {
    let score = validate_score(request.score)?;
    let mut conn = get_conn!(pool);

    load_owned_recipe(&mut conn, user.id, request.recipe_id)?;

    let rating: Rating = diesel::insert_into(ratings::table)
        .values(&NewRating {
            recipe_id: request.recipe_id,
            user_id: user.id,
            score,
            notes: request.notes.as_deref(),
            cooked_date: request.cooked_date,
        })
        .returning(Rating::as_returning())
        .get_result(&mut conn)
        .map_err(ApiError::internal("Failed to create rating"))?;

    tracing::info!(rating_id = %rating.id, recipe_id = %rating.recipe_id, score, "rated recipe");

    Ok((StatusCode::CREATED, Json(rating.into())))
}
