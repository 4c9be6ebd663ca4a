use super::UserResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::hash_password;
use crate::db::{is_unique_violation, DbPool};
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

const DUPLICATE_EMAIL: &str = "Email already registered";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(ApiError::bad_request("Invalid email address")),
        }
        if self.name.trim().is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(ApiError::bad_request("Password cannot be empty"));
        }
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body(content = RegisterRequest, example = json!({"email": "cook@example.com", "name": "Cook", "password": "password"})),
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request or email taken", body = ErrorResponse)
    )
)]
pub async fn register(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.validate()?;
    let email = req.email.trim();

    let mut conn = get_conn!(pool);

    let taken = diesel::select(diesel::dsl::exists(
        users::table.filter(
            diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(email) = LOWER(")
                .bind::<diesel::sql_types::Text, _>(email)
                .sql(")"),
        ),
    ))
    .get_result::<bool>(&mut conn)
    .map_err(ApiError::internal("Failed to check existing user"))?;

    if taken {
        return Err(ApiError::bad_request(DUPLICATE_EMAIL));
    }

    let password_hash =
        hash_password(&req.password).map_err(ApiError::internal("Failed to hash password"))?;

    let new_user = NewUser {
        email,
        name: req.name.trim(),
        password_hash: &password_hash,
    };

    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::bad_request(DUPLICATE_EMAIL)
            } else {
                ApiError::internal("Failed to create user")(e)
            }
        })?;

    tracing::info!(user_id = %user.id, "registered user");
    Ok((StatusCode::CREATED, Json(user.into())))
}
