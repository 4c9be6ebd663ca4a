use super::{AI_UNAVAILABLE, DEFAULT_SERVINGS};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use axum::{extract::State, Json};
use brinebook_core::ai::{generate_recipe as generate, AiClient, GenerationRequest};
use brinebook_core::GeneratedRecipe;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub const DEFAULT_STYLE: &str = "restaurant-style";

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

fn default_servings() -> i32 {
    DEFAULT_SERVINGS
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateRecipeRequest {
    /// What to cook, in free text
    pub prompt: String,
    #[serde(default = "default_style")]
    #[schema(default = "restaurant-style")]
    pub style: String,
    #[serde(default = "default_servings")]
    #[schema(default = 4)]
    pub servings: i32,
}

#[utoipa::path(
    post,
    path = "/api/recipes/generate",
    tag = "recipes",
    request_body(content = GenerateRecipeRequest, example = json!({"prompt": "crispy pork belly", "style": "restaurant-style", "servings": 4})),
    responses(
        (status = 200, description = "Generated recipe, not yet saved", body = GeneratedRecipe),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse),
        (status = 503, description = "AI not configured", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn generate_recipe(
    AuthUser(user): AuthUser,
    State(ai): State<Option<Arc<dyn AiClient>>>,
    Json(request): Json<GenerateRecipeRequest>,
) -> Result<Json<GeneratedRecipe>, ApiError> {
    let ai = ai.ok_or(ApiError::Unavailable(AI_UNAVAILABLE))?;

    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Prompt cannot be empty"));
    }
    if request.servings < 1 {
        return Err(ApiError::bad_request("Servings must be at least 1"));
    }

    tracing::info!(user_id = %user.id, style = %request.style, "generating recipe");

    let recipe = generate(
        ai.as_ref(),
        &GenerationRequest {
            prompt,
            style: &request.style,
            servings: request.servings,
        },
    )
    .await
    .map_err(ApiError::internal("Failed to generate recipe"))?;

    Ok(Json(recipe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use brinebook_core::ai::FakeAiClient;
    use chrono::Utc;
    use uuid::Uuid;

    fn auth_user() -> AuthUser {
        AuthUser(User {
            id: Uuid::new_v4(),
            email: "cook@example.com".to_string(),
            name: "Cook".to_string(),
            password_hash: String::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    fn request(prompt: &str) -> GenerateRecipeRequest {
        serde_json::from_value(serde_json::json!({ "prompt": prompt })).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let request = request("pork belly");
        assert_eq!(request.style, "restaurant-style");
        assert_eq!(request.servings, 4);
    }

    #[tokio::test]
    async fn test_unconfigured_ai_is_unavailable() {
        let err = generate_recipe(auth_user(), State(None), Json(request("pork belly")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_generates_with_client() {
        let fake = FakeAiClient::with_response(
            "pork belly",
            r#"{"title": "Lacquered Pork Belly", "prep_time": 30}"#,
        );
        let ai: Option<Arc<dyn AiClient>> = Some(Arc::new(fake));

        let Json(recipe) = generate_recipe(auth_user(), State(ai), Json(request("pork belly")))
            .await
            .unwrap();
        assert_eq!(recipe.title, "Lacquered Pork Belly");
        assert_eq!(recipe.prep_time, Some(30));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_internal_error() {
        let ai: Option<Arc<dyn AiClient>> = Some(Arc::new(FakeAiClient::new()));
        let err = generate_recipe(auth_user(), State(ai), Json(request("pork belly")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected() {
        let ai: Option<Arc<dyn AiClient>> = Some(Arc::new(FakeAiClient::new()));
        let err = generate_recipe(auth_user(), State(ai), Json(request("  ")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
