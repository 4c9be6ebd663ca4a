use super::{load_owned_recipe, AI_UNAVAILABLE};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use axum::{
    extract::{Path, State},
    Json,
};
use brinebook_core::ai::{revise_recipe as revise, AiClient, RevisionSource};
use brinebook_core::{ingredients_from_value, GeneratedRecipe};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReviseRecipeRequest {
    /// What to change, e.g. "less salt, crispier skin"
    pub notes: String,
}

fn revision_source(recipe: Recipe) -> RevisionSource {
    RevisionSource {
        ingredients: ingredients_from_value(Some(&recipe.ingredients)),
        title: recipe.title,
        description: recipe.description,
        instructions: recipe.instructions,
        equipment: recipe.equipment.into_iter().flatten().collect(),
        plating_notes: recipe.plating_notes,
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/revise",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = ReviseRecipeRequest,
    responses(
        (status = 200, description = "Revised recipe, not yet saved", body = GeneratedRecipe),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Revision failed", body = ErrorResponse),
        (status = 503, description = "AI not configured", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn revise_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(ai): State<Option<Arc<dyn AiClient>>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviseRecipeRequest>,
) -> Result<Json<GeneratedRecipe>, ApiError> {
    let ai = ai.ok_or(ApiError::Unavailable(AI_UNAVAILABLE))?;

    let notes = request.notes.trim();
    if notes.is_empty() {
        return Err(ApiError::bad_request("Notes cannot be empty"));
    }

    let recipe = {
        let mut conn = get_conn!(pool);
        load_owned_recipe(&mut conn, user.id, id)?
    };

    let revised = revise(ai.as_ref(), &revision_source(recipe), notes)
        .await
        .map_err(ApiError::internal("Failed to revise recipe"))?;

    Ok(Json(revised))
}
