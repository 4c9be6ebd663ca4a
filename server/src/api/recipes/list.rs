use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::enrichment::RecipeResponse;
use crate::get_conn;
use crate::search::{clamp_limit, search_recipes, SearchParams};
use axum::{
    extract::{Query, State},
    Json,
};
use brinebook_core::RecipeSource;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Number of items to skip (default: 0)
    pub skip: Option<i64>,
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Only recipes from this source
    pub source: Option<RecipeSource>,
    /// Comma-separated tag ids; recipes with any of them match
    pub tag_ids: Option<String>,
}

fn parse_tag_ids(raw: Option<&str>) -> Result<Vec<Uuid>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part)
                .map_err(|_| ApiError::bad_request(format!("Invalid tag id: {}", part)))
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "The caller's recipes, newest first", body = Vec<RecipeResponse>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    if params.skip.is_some_and(|skip| skip < 0) {
        return Err(ApiError::bad_request("skip cannot be negative"));
    }

    let search = SearchParams {
        tag_ids: parse_tag_ids(params.tag_ids.as_deref())?,
        source: params.source,
        limit: clamp_limit(params.limit)
            .ok_or_else(|| ApiError::bad_request("limit must be at least 1"))?,
        offset: params.skip.unwrap_or(0),
        ..SearchParams::default()
    };

    let mut conn = get_conn!(pool);
    let recipes = search_recipes(&mut conn, user.id, &search)
        .map_err(ApiError::internal("Failed to list recipes"))?;

    Ok(Json(recipes))
}
