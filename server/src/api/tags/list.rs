use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::enrichment::TagResponse;
use crate::get_conn;
use crate::models::Tag;
use crate::schema::tags;
use axum::{
    extract::{Query, State},
    Json,
};
use brinebook_core::TagType;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTagsParams {
    /// Only tags of this type
    #[serde(rename = "type")]
    #[param(value_type = Option<TagType>)]
    pub tag_type: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    params(ListTagsParams),
    responses(
        (status = 200, description = "Tags ordered by name", body = Vec<TagResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_tags(
    AuthUser(_user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListTagsParams>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let mut conn = get_conn!(pool);

    let mut query = tags::table.select(Tag::as_select()).into_boxed();
    if let Some(tag_type) = params.tag_type.filter(|t| !t.is_empty()) {
        query = query.filter(tags::tag_type.eq(tag_type));
    }

    let rows: Vec<Tag> = query
        .order(tags::name.asc())
        .load(&mut conn)
        .map_err(ApiError::internal("Failed to list tags"))?;

    Ok(Json(rows.into_iter().map(TagResponse::from).collect()))
}
