use super::{check_tag_ids, load_owned_recipe, replace_recipe_tags, validate_quantities};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::enrichment::{enrich_recipe, RecipeResponse};
use crate::get_conn;
use crate::models::{Recipe, RecipeChangeset};
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    Json,
};
use brinebook_core::Ingredient;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Partial update. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub servings: Option<i32>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub equipment: Option<Vec<String>>,
    pub plating_notes: Option<String>,
    pub hero_photo: Option<String>,
    pub is_public: Option<bool>,
    /// Replaces the recipe's whole tag set when present
    pub tag_ids: Option<Vec<Uuid>>,
}

impl UpdateRecipeRequest {
    fn into_changeset(self) -> Result<RecipeChangeset, ApiError> {
        let title = match self.title {
            Some(title) if title.trim().is_empty() => {
                return Err(ApiError::bad_request("Title cannot be empty"))
            }
            title => title.map(|t| t.trim().to_string()),
        };
        validate_quantities(self.servings, self.prep_time, self.cook_time)?;

        let ingredients = self
            .ingredients
            .map(|items| serde_json::to_value(&items))
            .transpose()
            .map_err(ApiError::internal("Failed to encode ingredients"))?;

        Ok(RecipeChangeset {
            title,
            description: self.description,
            instructions: self.instructions,
            ingredients,
            servings: self.servings,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            equipment: self
                .equipment
                .map(|items| items.into_iter().map(Some).collect()),
            plating_notes: self.plating_notes,
            hero_photo: self.hero_photo,
            is_public: self.is_public,
            updated_at: Utc::now(),
        })
    }
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(mut request): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let tag_ids = request.tag_ids.take();
    let changeset = request.into_changeset()?;

    let mut conn = get_conn!(pool);
    load_owned_recipe(&mut conn, user.id, id)?;

    let tag_ids = match tag_ids {
        Some(ids) => Some(check_tag_ids(&mut conn, &ids)?),
        None => None,
    };

    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let recipe: Recipe = diesel::update(recipes::table.find(id))
            .set(&changeset)
            .returning(Recipe::as_returning())
            .get_result(conn)?;
        if let Some(tag_ids) = &tag_ids {
            replace_recipe_tags(conn, recipe.id, tag_ids)?;
        }
        Ok(recipe)
    });
    let recipe = result.map_err(ApiError::internal("Failed to update recipe"))?;

    let view =
        enrich_recipe(&mut conn, recipe).map_err(ApiError::internal("Failed to load recipe"))?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changeset_keeps_omitted_fields_unset() {
        let changeset = UpdateRecipeRequest {
            title: Some("  Better Ribs ".to_string()),
            servings: Some(6),
            ..Default::default()
        }
        .into_changeset()
        .unwrap();

        assert_eq!(changeset.title.as_deref(), Some("Better Ribs"));
        assert_eq!(changeset.servings, Some(6));
        assert!(changeset.description.is_none());
        assert!(changeset.ingredients.is_none());
        assert!(changeset.equipment.is_none());
    }

    #[test]
    fn test_changeset_rejects_invalid_values() {
        let blank_title = UpdateRecipeRequest {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank_title.into_changeset().is_err());

        let no_servings = UpdateRecipeRequest {
            servings: Some(0),
            ..Default::default()
        };
        assert!(no_servings.into_changeset().is_err());
    }
}
