use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub base_prompt: Option<String>,
    pub llm_response: Option<serde_json::Value>,
    pub instructions: Option<String>,
    pub ingredients: serde_json::Value,
    pub servings: i32,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub equipment: Vec<Option<String>>,
    pub plating_notes: Option<String>,
    pub hero_photo: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub source: &'a str,
    pub base_prompt: Option<&'a str>,
    pub llm_response: Option<serde_json::Value>,
    pub instructions: Option<&'a str>,
    pub ingredients: serde_json::Value,
    pub servings: i32,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub equipment: Vec<Option<String>>,
    pub plating_notes: Option<&'a str>,
    pub hero_photo: Option<&'a str>,
    pub is_public: bool,
}

/// Partial recipe update. `None` fields are left untouched.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
pub struct RecipeChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub ingredients: Option<serde_json::Value>,
    pub servings: Option<i32>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub equipment: Option<Vec<Option<String>>>,
    pub plating_notes: Option<String>,
    pub hero_photo: Option<String>,
    pub is_public: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub tag_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag<'a> {
    pub name: &'a str,
    pub tag_type: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_tags)]
pub struct NewRecipeTag {
    pub recipe_id: Uuid,
    pub tag_id: Uuid,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Photo {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub is_hero: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::photos)]
pub struct NewPhoto<'a> {
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub url: &'a str,
    pub caption: Option<&'a str>,
    pub is_hero: bool,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Rating {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub score: f64,
    pub notes: Option<String>,
    pub cooked_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ratings)]
pub struct NewRating<'a> {
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub score: f64,
    pub notes: Option<&'a str>,
    pub cooked_date: Option<DateTime<Utc>>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::ratings)]
pub struct RatingChangeset<'a> {
    pub score: Option<f64>,
    pub notes: Option<&'a str>,
}
