use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::tags;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    tag = "tags",
    params(
        ("id" = Uuid, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag deleted; recipe links are removed with it", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_tag(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let deleted = diesel::delete(tags::table.find(id))
        .execute(&mut conn)
        .map_err(ApiError::internal("Failed to delete tag"))?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Tag not found"));
    }

    tracing::info!(tag_id = %id, user_id = %user.id, "deleted tag");
    Ok(MessageResponse::new("Tag deleted"))
}
