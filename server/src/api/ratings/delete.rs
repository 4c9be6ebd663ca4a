use super::load_owned_rating;
use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::ratings;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/ratings/{id}",
    tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Rating ID")
    ),
    responses(
        (status = 200, description = "Rating deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Rating not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_rating(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let rating = load_owned_rating(&mut conn, user.id, id)?;
    diesel::delete(ratings::table.find(rating.id))
        .execute(&mut conn)
        .map_err(ApiError::internal("Failed to delete rating"))?;

    Ok(MessageResponse::new("Rating deleted"))
}
