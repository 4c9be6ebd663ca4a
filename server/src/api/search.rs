//! `POST /api/search`: recipe search with an optional AI fallback.

use crate::api::recipes::generate::DEFAULT_STYLE;
use crate::api::recipes::DEFAULT_SERVINGS;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::enrichment::RecipeResponse;
use crate::get_conn;
use crate::search::{clamp_limit, search_recipes, SearchParams, DEFAULT_LIMIT};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use brinebook_core::ai::{generate_recipe, AiClient, GenerationRequest};
use brinebook_core::{should_suggest_llm, GeneratedRecipe, RecipeSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Below this many internal hits a suggested search also generates a recipe.
const PROACTIVE_GENERATION_THRESHOLD: usize = 3;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(search))
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SearchFilters {
    /// Match recipes carrying any of these tags
    #[serde(default)]
    pub tags: Vec<Uuid>,
    pub source: Option<String>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    pub filters: Option<SearchFilters>,
    #[serde(default = "default_limit")]
    #[schema(default = 20)]
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub internal_results: Vec<RecipeResponse>,
    pub suggest_llm: bool,
    pub llm_result: Option<GeneratedRecipe>,
}

impl SearchRequest {
    fn into_params(self) -> Result<SearchParams, ApiError> {
        let filters = self.filters.unwrap_or_default();
        let source = filters
            .source
            .as_deref()
            .map(|s| {
                RecipeSource::from_str(s)
                    .ok_or_else(|| ApiError::bad_request(format!("Invalid source: {}", s)))
            })
            .transpose()?;
        if let Some(min) = filters.min_rating {
            if !min.is_finite() {
                return Err(ApiError::bad_request("Invalid min_rating"));
            }
        }

        Ok(SearchParams {
            query: self.query.trim().to_string(),
            tag_ids: filters.tags,
            source,
            min_rating: filters.min_rating,
            limit: clamp_limit(Some(self.limit))
                .ok_or_else(|| ApiError::bad_request("limit must be at least 1"))?,
            offset: 0,
        })
    }
}

/// Generate a recipe for `query` when the search came up short. Failures are
/// logged and reported as no result.
async fn proactive_generation(
    ai: Option<&dyn AiClient>,
    query: &str,
    suggest_llm: bool,
    result_count: usize,
) -> Option<GeneratedRecipe> {
    if !suggest_llm || result_count >= PROACTIVE_GENERATION_THRESHOLD || query.is_empty() {
        return None;
    }
    let ai = ai?;

    let request = GenerationRequest {
        prompt: query,
        style: DEFAULT_STYLE,
        servings: DEFAULT_SERVINGS,
    };
    match generate_recipe(ai, &request).await {
        Ok(recipe) => Some(recipe),
        Err(e) => {
            tracing::warn!(query = %query, "proactive recipe generation failed: {}", e);
            None
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/search",
    tag = "search",
    request_body(content = SearchRequest, example = json!({"query": "salmon", "filters": {"min_rating": 4}, "limit": 20})),
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn search(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(ai): State<Option<Arc<dyn AiClient>>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = request.into_params()?;

    let internal_results = {
        let mut conn = get_conn!(pool);
        search_recipes(&mut conn, user.id, &params)
            .map_err(ApiError::internal("Failed to search recipes"))?
    };

    let suggest_llm = should_suggest_llm(&internal_results, &params.query);
    let llm_result = proactive_generation(
        ai.as_deref(),
        &params.query,
        suggest_llm,
        internal_results.len(),
    )
    .await;

    tracing::info!(
        user_id = %user.id,
        results = internal_results.len(),
        suggest_llm,
        generated = llm_result.is_some(),
        "search"
    );

    Ok(Json(SearchResponse {
        internal_results,
        suggest_llm,
        llm_result,
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(search),
    components(schemas(SearchRequest, SearchFilters, SearchResponse))
)]
pub struct ApiDoc;
