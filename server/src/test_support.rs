//! Fixtures for tests that need a real Postgres.
//!
//! Tests using [`connection`] are `#[ignore]`d and run with
//! `cargo test -- --ignored` against `TEST_DATABASE_URL`. Each connection
//! runs inside a test transaction that is never committed.

use crate::db::MIGRATIONS;
use crate::models::{NewPhoto, NewRating, NewRecipe, NewUser, Photo, Rating, Recipe, Tag, User};
use crate::schema::{photos, ratings, recipe_tags, recipes, tags, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use std::sync::Once;
use uuid::Uuid;

static MIGRATE: Once = Once::new();

/// Panics when `TEST_DATABASE_URL` is unset so a skipped database is never
/// mistaken for a passing test.
pub fn connection() -> PgConnection {
    let url = require_database_url(std::env::var("TEST_DATABASE_URL").ok());

    MIGRATE.call_once(|| {
        let mut conn = PgConnection::establish(&url).expect("connect to test database");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("run migrations");
    });

    let mut conn = PgConnection::establish(&url).expect("connect to test database");
    conn.begin_test_transaction().expect("begin test transaction");
    conn
}

fn require_database_url(raw: Option<String>) -> String {
    raw.filter(|url| !url.trim().is_empty())
        .expect("TEST_DATABASE_URL must be set for database tests")
}

pub fn insert_user(conn: &mut PgConnection, email: &str) -> User {
    diesel::insert_into(users::table)
        .values(&NewUser {
            email,
            name: "Test Cook",
            password_hash: "unused",
        })
        .returning(User::as_returning())
        .get_result(conn)
        .expect("insert user")
}

pub fn insert_recipe(
    conn: &mut PgConnection,
    user_id: Uuid,
    title: &str,
    created_at: DateTime<Utc>,
) -> Recipe {
    let recipe: Recipe = diesel::insert_into(recipes::table)
        .values(&NewRecipe {
            user_id,
            title,
            description: None,
            source: "manual",
            base_prompt: None,
            llm_response: None,
            instructions: None,
            ingredients: serde_json::json!([]),
            servings: 4,
            prep_time: None,
            cook_time: None,
            equipment: vec![],
            plating_notes: None,
            hero_photo: None,
            is_public: false,
        })
        .returning(Recipe::as_returning())
        .get_result(conn)
        .expect("insert recipe");

    // NOW() is fixed for the whole test transaction, so ordering needs explicit times.
    diesel::update(recipes::table.find(recipe.id))
        .set(recipes::created_at.eq(created_at))
        .returning(Recipe::as_returning())
        .get_result(conn)
        .expect("set recipe created_at")
}

pub fn insert_tag(conn: &mut PgConnection, name: &str) -> Tag {
    diesel::insert_into(tags::table)
        .values((tags::name.eq(name), tags::tag_type.eq(None::<String>)))
        .returning(Tag::as_returning())
        .get_result(conn)
        .expect("insert tag")
}

pub fn link_tag(conn: &mut PgConnection, recipe_id: Uuid, tag_id: Uuid) {
    diesel::insert_into(recipe_tags::table)
        .values((
            recipe_tags::recipe_id.eq(recipe_id),
            recipe_tags::tag_id.eq(tag_id),
        ))
        .execute(conn)
        .expect("link tag");
}

pub fn insert_photo(
    conn: &mut PgConnection,
    recipe: &Recipe,
    url: &str,
    is_hero: bool,
    created_at: DateTime<Utc>,
) -> Photo {
    let photo: Photo = diesel::insert_into(photos::table)
        .values(&NewPhoto {
            recipe_id: recipe.id,
            user_id: recipe.user_id,
            url,
            caption: None,
            is_hero,
        })
        .returning(Photo::as_returning())
        .get_result(conn)
        .expect("insert photo");

    diesel::update(photos::table.find(photo.id))
        .set(photos::created_at.eq(created_at))
        .returning(Photo::as_returning())
        .get_result(conn)
        .expect("set photo created_at")
}

pub fn insert_rating(conn: &mut PgConnection, recipe: &Recipe, score: f64) -> Rating {
    diesel::insert_into(ratings::table)
        .values(&NewRating {
            recipe_id: recipe.id,
            user_id: recipe.user_id,
            score,
            notes: None,
            cooked_date: None,
        })
        .returning(Rating::as_returning())
        .get_result(conn)
        .expect("insert rating")
}

/// `minutes` after a fixed base time.
pub fn at(minutes: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
        + chrono::Duration::minutes(minutes)
}

mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "TEST_DATABASE_URL must be set")]
    fn test_missing_database_url_fails_loudly() {
        require_database_url(None);
    }

    #[test]
    #[should_panic(expected = "TEST_DATABASE_URL must be set")]
    fn test_blank_database_url_fails_loudly() {
        require_database_url(Some("  ".to_string()));
    }

    #[test]
    fn test_database_url_passed_through() {
        assert_eq!(
            require_database_url(Some("postgres://localhost/brinebook_test".to_string())),
            "postgres://localhost/brinebook_test"
        );
    }
}
