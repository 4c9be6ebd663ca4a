use super::{check_tag_ids, replace_recipe_tags, validate_quantities, DEFAULT_SERVINGS};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::enrichment::{enrich_recipe, RecipeResponse};
use crate::get_conn;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, Json};
use brinebook_core::{Ingredient, RecipeSource};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `manual`
    #[serde(default)]
    pub source: RecipeSource,
    pub base_prompt: Option<String>,
    /// Raw model output this recipe was saved from
    #[schema(value_type = Option<Object>)]
    pub llm_response: Option<serde_json::Value>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Defaults to 4
    pub servings: Option<i32>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub plating_notes: Option<String>,
    pub hero_photo: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    let servings = request.servings.unwrap_or(DEFAULT_SERVINGS);
    validate_quantities(Some(servings), request.prep_time, request.cook_time)?;

    let ingredients = serde_json::to_value(&request.ingredients)
        .map_err(ApiError::internal("Failed to encode ingredients"))?;

    let mut conn = get_conn!(pool);
    let tag_ids = check_tag_ids(&mut conn, &request.tag_ids)?;

    let new_recipe = NewRecipe {
        user_id: user.id,
        title,
        description: request.description.as_deref(),
        source: request.source.as_str(),
        base_prompt: request.base_prompt.as_deref(),
        llm_response: request.llm_response.clone(),
        instructions: request.instructions.as_deref(),
        ingredients,
        servings,
        prep_time: request.prep_time,
        cook_time: request.cook_time,
        equipment: request.equipment.iter().cloned().map(Some).collect(),
        plating_notes: request.plating_notes.as_deref(),
        hero_photo: request.hero_photo.as_deref(),
        is_public: request.is_public,
    };

    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)?;
        replace_recipe_tags(conn, recipe.id, &tag_ids)?;
        Ok(recipe)
    });
    let recipe = result.map_err(ApiError::internal("Failed to create recipe"))?;

    tracing::info!(recipe_id = %recipe.id, source = %recipe.source, "created recipe");

    let view =
        enrich_recipe(&mut conn, recipe).map_err(ApiError::internal("Failed to load recipe"))?;
    Ok((StatusCode::CREATED, Json(view)))
}
