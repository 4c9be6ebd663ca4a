pub mod create;
pub mod delete;
pub mod list;
pub mod update;

use crate::api::ApiError;
use crate::models::Rating;
use crate::schema::ratings;
use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Returns the router for /api/ratings endpoints (mounted at /api/ratings)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create::create_rating))
        .route("/recipe/{recipe_id}", get(list::list_recipe_ratings))
        .route(
            "/{id}",
            put(update::update_rating).delete(delete::delete_rating),
        )
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RatingResponse {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub score: f64,
    pub notes: Option<String>,
    pub cooked_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        RatingResponse {
            id: rating.id,
            recipe_id: rating.recipe_id,
            user_id: rating.user_id,
            score: rating.score,
            notes: rating.notes,
            cooked_date: rating.cooked_date,
            created_at: rating.created_at,
        }
    }
}

pub(crate) fn validate_score(score: f64) -> Result<f64, ApiError> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(ApiError::bad_request("Score must be between 1 and 5"))
    }
}

/// Fetch a rating written by `user_id`.
pub(crate) fn load_owned_rating(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
) -> Result<Rating, ApiError> {
    ratings::table
        .filter(ratings::id.eq(id))
        .filter(ratings::user_id.eq(user_id))
        .select(Rating::as_select())
        .first(conn)
        .optional()
        .map_err(ApiError::internal("Failed to fetch rating"))?
        .ok_or(ApiError::NotFound("Rating not found"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_rating,
        list::list_recipe_ratings,
        update::update_rating,
        delete::delete_rating,
    ),
    components(schemas(
        RatingResponse,
        create::CreateRatingRequest,
        update::UpdateRatingRequest,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, at};

    #[test]
    fn test_validate_score() {
        assert_eq!(validate_score(1.0).unwrap(), 1.0);
        assert_eq!(validate_score(4.5).unwrap(), 4.5);
        assert_eq!(validate_score(5.0).unwrap(), 5.0);
        assert!(validate_score(0.5).is_err());
        assert!(validate_score(5.1).is_err());
        assert!(validate_score(f64::NAN).is_err());
        assert!(validate_score(f64::INFINITY).is_err());
    }

    #[test]
    #[ignore = "requires TEST_DATABASE_URL"]
    fn test_load_owned_rating_hides_other_users() {
        let mut conn = test_support::connection();
        let owner = test_support::insert_user(&mut conn, "owner@example.com");
        let other = test_support::insert_user(&mut conn, "other@example.com");
        let recipe = test_support::insert_recipe(&mut conn, owner.id, "Gravlax", at(0));
        let rating = test_support::insert_rating(&mut conn, &recipe, 4.0);

        assert_eq!(
            load_owned_rating(&mut conn, owner.id, rating.id).unwrap().id,
            rating.id
        );
        assert!(matches!(
            load_owned_rating(&mut conn, other.id, rating.id),
            Err(ApiError::NotFound(_))
        ));
    }
}
