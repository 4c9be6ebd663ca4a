pub mod create;
pub mod delete;
pub mod generate;
pub mod get;
pub mod list;
pub mod revise;
pub mod update;

use crate::api::ApiError;
use crate::models::{NewRecipeTag, Recipe};
use crate::schema::{recipe_tags, recipes, tags};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use utoipa::OpenApi;
use uuid::Uuid;

pub const DEFAULT_SERVINGS: i32 = 4;
pub const AI_UNAVAILABLE: &str = "AI generation is not configured";

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/generate", post(generate::generate_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/revise", post(revise::revise_recipe))
}

/// Fetch a recipe owned by `user_id`. Other users' recipes are reported as missing.
pub(crate) fn load_owned_recipe(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
) -> Result<Recipe, ApiError> {
    recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::user_id.eq(user_id))
        .select(Recipe::as_select())
        .first(conn)
        .optional()
        .map_err(ApiError::internal("Failed to fetch recipe"))?
        .ok_or(ApiError::NotFound("Recipe not found"))
}

/// De-duplicate `ids` and reject any that don't name an existing tag.
pub(crate) fn check_tag_ids(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, ApiError> {
    let mut unique: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    if unique.is_empty() {
        return Ok(unique);
    }

    let found: i64 = tags::table
        .filter(tags::id.eq_any(&unique))
        .count()
        .get_result(conn)
        .map_err(ApiError::internal("Failed to check tags"))?;

    if found != unique.len() as i64 {
        return Err(ApiError::bad_request("Unknown tag id"));
    }
    Ok(unique)
}

/// Make `tag_ids` the complete tag set of the recipe.
pub(crate) fn replace_recipe_tags(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)?;

    let links: Vec<NewRecipeTag> = tag_ids
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();
    if !links.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&links)
            .execute(conn)?;
    }
    Ok(())
}

pub(crate) fn validate_quantities(
    servings: Option<i32>,
    prep_time: Option<i32>,
    cook_time: Option<i32>,
) -> Result<(), ApiError> {
    if servings.is_some_and(|s| s < 1) {
        return Err(ApiError::bad_request("Servings must be at least 1"));
    }
    if prep_time.is_some_and(|t| t < 0) || cook_time.is_some_and(|t| t < 0) {
        return Err(ApiError::bad_request("Times cannot be negative"));
    }
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        generate::generate_recipe,
        revise::revise_recipe,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
        generate::GenerateRecipeRequest,
        revise::ReviseRecipeRequest,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantities() {
        assert!(validate_quantities(Some(4), Some(0), Some(30)).is_ok());
        assert!(validate_quantities(None, None, None).is_ok());
        assert!(validate_quantities(Some(0), None, None).is_err());
        assert!(validate_quantities(Some(2), Some(-5), None).is_err());
        assert!(validate_quantities(Some(2), None, Some(-1)).is_err());
    }

    #[test]
    #[ignore = "requires TEST_DATABASE_URL"]
    fn test_check_tag_ids() {
        let mut conn = crate::test_support::connection();
        let tag = crate::test_support::insert_tag(&mut conn, "check-tags-test");

        let ids = check_tag_ids(&mut conn, &[tag.id, tag.id]).unwrap();
        assert_eq!(ids, vec![tag.id]);

        let err = check_tag_ids(&mut conn, &[tag.id, Uuid::new_v4()]).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
