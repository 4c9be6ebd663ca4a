//! Recipe photo rows and the hero-photo invariant.
//!
//! At most one photo per recipe has `is_hero` set. The flag is always moved
//! with a single UPDATE over the recipe's photos, and `recipes.hero_photo` is
//! synced in the same transaction.

pub mod storage;

pub use storage::PhotoStore;

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::{NewPhoto, Photo};
use crate::schema::{photos, recipes};

/// Photos of a recipe in upload order.
pub fn photos_for_recipe(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<Vec<Photo>> {
    photos::table
        .filter(photos::recipe_id.eq(recipe_id))
        .order((photos::created_at.asc(), photos::id.asc()))
        .select(Photo::as_select())
        .load(conn)
}

/// Insert a photo row. A hero upload takes the flag from any sibling.
pub fn insert_photo(conn: &mut PgConnection, new_photo: &NewPhoto) -> QueryResult<Photo> {
    conn.transaction(|conn| {
        let photo: Photo = diesel::insert_into(photos::table)
            .values(new_photo)
            .returning(Photo::as_returning())
            .get_result(conn)?;

        if photo.is_hero {
            make_hero(conn, &photo)?;
        }
        Ok(photo)
    })
}

pub fn set_hero_photo(conn: &mut PgConnection, photo: &Photo) -> QueryResult<()> {
    conn.transaction(|conn| make_hero(conn, photo))
}

fn make_hero(conn: &mut PgConnection, photo: &Photo) -> QueryResult<()> {
    diesel::update(photos::table.filter(photos::recipe_id.eq(photo.recipe_id)))
        .set(photos::is_hero.eq(photos::id.eq(photo.id)))
        .execute(conn)?;

    diesel::update(recipes::table.find(photo.recipe_id))
        .set((
            recipes::hero_photo.eq(&photo.url),
            recipes::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

    Ok(())
}

/// Delete the row and clear the recipe's direct hero field if it named this photo.
pub fn delete_photo(conn: &mut PgConnection, photo: &Photo) -> QueryResult<()> {
    conn.transaction(|conn| {
        diesel::delete(photos::table.find(photo.id)).execute(conn)?;

        diesel::update(
            recipes::table
                .find(photo.recipe_id)
                .filter(recipes::hero_photo.eq(&photo.url)),
        )
        .set(recipes::hero_photo.eq(None::<String>))
        .execute(conn)?;

        Ok(())
    })
}
