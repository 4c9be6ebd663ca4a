use super::load_owned_recipe;
use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::photos::PhotoStore;
use crate::schema::{photos, recipes};
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

/// Delete the recipe row (links, photos and ratings cascade) and return the
/// URLs of the photos that were attached.
pub fn delete_recipe_rows(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<Vec<String>> {
    conn.transaction(|conn| {
        let urls: Vec<String> = photos::table
            .filter(photos::recipe_id.eq(recipe_id))
            .select(photos::url)
            .load(conn)?;
        diesel::delete(recipes::table.find(recipe_id)).execute(conn)?;
        Ok(urls)
    })
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(store): State<Arc<PhotoStore>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let urls = {
        let mut conn = get_conn!(pool);
        load_owned_recipe(&mut conn, user.id, id)?;
        delete_recipe_rows(&mut conn, id)
            .map_err(ApiError::internal("Failed to delete recipe"))?
    };

    for url in &urls {
        store.delete(url).await;
    }

    tracing::info!(recipe_id = %id, photos = urls.len(), "deleted recipe");
    Ok(MessageResponse::new("Recipe deleted"))
}
