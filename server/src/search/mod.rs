//! Recipe search over the caller's own recipes.
//!
//! Text matching is a case-insensitive substring test on title, description
//! and instructions. Tag filters match ANY listed tag. With a query, title
//! prefix matches rank first; ties and query-less searches are newest first.

use brinebook_core::RecipeSource;
use diesel::prelude::*;
use uuid::Uuid;

use crate::enrichment::{enrich_recipes, RecipeResponse};
use crate::min_average_rating;
use crate::models::Recipe;
use crate::raw_sql::escape_like;
use crate::schema::{recipe_tags, recipes};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub tag_ids: Vec<Uuid>,
    pub source: Option<RecipeSource>,
    pub min_rating: Option<f64>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            query: String::new(),
            tag_ids: Vec::new(),
            source: None,
            min_rating: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Cap a client-supplied page size at `MAX_LIMIT`. `None` for sizes below 1.
pub fn clamp_limit(limit: Option<i64>) -> Option<i64> {
    match limit.unwrap_or(DEFAULT_LIMIT) {
        n if n < 1 => None,
        n => Some(n.min(MAX_LIMIT)),
    }
}

/// Matching recipe rows for `user_id`, ordered and paged, not yet enriched.
pub fn find_recipes(
    conn: &mut PgConnection,
    user_id: Uuid,
    params: &SearchParams,
) -> QueryResult<Vec<Recipe>> {
    let text = params.query.trim();

    let mut query = recipes::table
        .filter(recipes::user_id.eq(user_id))
        .select(Recipe::as_select())
        .into_boxed();

    if !text.is_empty() {
        let pattern = format!("%{}%", escape_like(text));
        query = query.filter(
            recipes::title
                .ilike(pattern.clone())
                .or(recipes::description.ilike(pattern.clone()))
                .or(recipes::instructions.ilike(pattern)),
        );
    }

    if !params.tag_ids.is_empty() {
        // Subselect rather than a join so a recipe matching several tags appears once.
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq_any(params.tag_ids.clone()))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if let Some(source) = params.source {
        query = query.filter(recipes::source.eq(source.as_str()));
    }

    if let Some(min_rating) = params.min_rating {
        query = query.filter(min_average_rating!(min_rating));
    }

    query = if text.is_empty() {
        query.order((recipes::created_at.desc(), recipes::id.desc()))
    } else {
        let prefix = format!("{}%", escape_like(text));
        query.order((
            recipes::title.ilike(prefix).desc(),
            recipes::created_at.desc(),
            recipes::id.desc(),
        ))
    };

    query
        .offset(params.offset.max(0))
        .limit(params.limit)
        .load(conn)
}

/// Search and enrich.
pub fn search_recipes(
    conn: &mut PgConnection,
    user_id: Uuid,
    params: &SearchParams,
) -> QueryResult<Vec<RecipeResponse>> {
    let rows = find_recipes(conn, user_id, params)?;
    tracing::debug!(
        query = %params.query,
        results = rows.len(),
        "recipe search"
    );
    enrich_recipes(conn, rows)
}
