pub mod auth;
pub mod photos;
pub mod ratings;
pub mod recipes;
pub mod search;
pub mod service;
pub mod tags;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use brinebook_core::{GeneratedRecipe, Ingredient, RecipeSource, TagType};
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

use crate::enrichment::{RecipeResponse, TagResponse};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Acknowledgement body for deletes
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(MessageResponse {
            message: message.to_string(),
        })
    }
}

/// Handler error. The display string becomes the `error` field of the body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(&'static str),
    #[error("{0}")]
    Unavailable(&'static str),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Log `err` with `message` as context and hide it behind a 500.
    pub fn internal<E: std::fmt::Display>(message: &'static str) -> impl FnOnce(E) -> ApiError {
        move |err| {
            tracing::error!("{}: {}", message, err);
            ApiError::Internal(message)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "BrineBook API", description = "Recipe management with AI generation"),
        components(schemas(
            ErrorResponse,
            MessageResponse,
            Ingredient,
            RecipeSource,
            TagType,
            GeneratedRecipe,
            RecipeResponse,
            TagResponse,
        ))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        service::ApiDoc::openapi(),
        auth::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        photos::ApiDoc::openapi(),
        ratings::ApiDoc::openapi(),
        search::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unavailable("x").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_openapi_lists_every_module() {
        let spec = openapi();
        for path in [
            "/",
            "/health",
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/me",
            "/api/recipes",
            "/api/recipes/{id}",
            "/api/recipes/generate",
            "/api/recipes/{id}/revise",
            "/api/tags",
            "/api/tags/{id}",
            "/api/photos",
            "/api/photos/recipe/{recipe_id}",
            "/api/photos/{id}",
            "/api/photos/{id}/hero",
            "/api/ratings",
            "/api/ratings/recipe/{recipe_id}",
            "/api/ratings/{id}",
            "/api/search",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = spec.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("RecipeResponse"));
    }
}
