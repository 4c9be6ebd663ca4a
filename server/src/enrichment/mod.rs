//! Read-time enrichment of recipe rows.
//!
//! Every endpoint that returns a recipe goes through [`enrich_recipes`], which
//! batch-loads tags, photos and rating scores for the whole page (three
//! queries regardless of page size) and hands each recipe to [`assemble`].

mod assemble;

use assemble::assemble;

use brinebook_core::{Ingredient, RecipeSource};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Photo, Recipe, Tag};
use crate::schema::{photos, ratings, recipe_tags, tags};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub tag_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        TagResponse {
            id: tag.id,
            name: tag.name,
            tag_type: tag.tag_type,
            created_at: tag.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub source: RecipeSource,
    pub base_prompt: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub llm_response: Option<serde_json::Value>,
    pub instructions: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub servings: i32,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub equipment: Vec<String>,
    pub plating_notes: Option<String>,
    /// Resolved cover image URL
    pub hero_photo: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<TagResponse>,
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

/// Enrich `recipes`, preserving their order.
pub fn enrich_recipes(
    conn: &mut PgConnection,
    recipes: Vec<Recipe>,
) -> QueryResult<Vec<RecipeResponse>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();

    let tag_rows: Vec<(Uuid, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&ids))
        .order(tags::name.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;

    let photo_rows: Vec<Photo> = photos::table
        .filter(photos::recipe_id.eq_any(&ids))
        .select(Photo::as_select())
        .load(conn)?;

    let score_rows: Vec<(Uuid, f64)> = ratings::table
        .filter(ratings::recipe_id.eq_any(&ids))
        .select((ratings::recipe_id, ratings::score))
        .load(conn)?;

    let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }
    let mut photos_by_recipe: HashMap<Uuid, Vec<Photo>> = HashMap::new();
    for photo in photo_rows {
        photos_by_recipe.entry(photo.recipe_id).or_default().push(photo);
    }
    let mut scores_by_recipe: HashMap<Uuid, Vec<f64>> = HashMap::new();
    for (recipe_id, score) in score_rows {
        scores_by_recipe.entry(recipe_id).or_default().push(score);
    }

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let id = recipe.id;
            assemble(
                recipe,
                tags_by_recipe.remove(&id).unwrap_or_default(),
                photos_by_recipe.get(&id).map(Vec::as_slice).unwrap_or(&[]),
                scores_by_recipe.get(&id).map(Vec::as_slice).unwrap_or(&[]),
            )
        })
        .collect())
}

pub fn enrich_recipe(conn: &mut PgConnection, recipe: Recipe) -> QueryResult<RecipeResponse> {
    enrich_recipes(conn, vec![recipe])?
        .pop()
        .ok_or(diesel::result::Error::NotFound)
}
