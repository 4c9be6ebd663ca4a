use super::{load_owned_rating, validate_score, RatingResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Rating, RatingChangeset};
use crate::schema::ratings;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRatingRequest {
    pub score: Option<f64>,
    pub notes: Option<String>,
}

impl UpdateRatingRequest {
    /// `None` when the body changes nothing.
    fn changeset(&self) -> Result<Option<RatingChangeset<'_>>, ApiError> {
        let score = self.score.map(validate_score).transpose()?;
        if score.is_none() && self.notes.is_none() {
            return Ok(None);
        }
        Ok(Some(RatingChangeset {
            score,
            notes: self.notes.as_deref(),
        }))
    }
}

#[utoipa::path(
    put,
    path = "/api/ratings/{id}",
    tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Rating ID")
    ),
    request_body = UpdateRatingRequest,
    responses(
        (status = 200, description = "Rating updated", body = RatingResponse),
        (status = 400, description = "Invalid score", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Rating not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_rating(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRatingRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    let changeset = request.changeset()?;
    let mut conn = get_conn!(pool);

    let rating = load_owned_rating(&mut conn, user.id, id)?;
    let Some(changeset) = changeset else {
        return Ok(Json(rating.into()));
    };

    let updated: Rating = diesel::update(ratings::table.find(rating.id))
        .set(&changeset)
        .returning(Rating::as_returning())
        .get_result(&mut conn)
        .map_err(ApiError::internal("Failed to update rating"))?;

    Ok(Json(updated.into()))
}
