use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::{is_unique_violation, DbPool};
use crate::enrichment::TagResponse;
use crate::get_conn;
use crate::models::{NewTag, Tag};
use crate::schema::tags;
use axum::{extract::State, http::StatusCode, Json};
use brinebook_core::TagType;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
    /// One of the tag types; omitted for free-form tags
    #[serde(rename = "type")]
    #[schema(value_type = Option<TagType>)]
    pub tag_type: Option<String>,
}

fn parse_tag_type(raw: Option<&str>) -> Result<Option<TagType>, ApiError> {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(value) => TagType::from_str(value)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid tag type: {}", value))),
    }
}

fn find_by_name(conn: &mut PgConnection, name: &str) -> QueryResult<Option<Tag>> {
    tags::table
        .filter(tags::name.eq(name))
        .select(Tag::as_select())
        .first(conn)
        .optional()
}

/// Tags are a shared vocabulary: posting an existing name returns that tag.
#[utoipa::path(
    post,
    path = "/api/tags",
    tag = "tags",
    request_body(content = CreateTagRequest, example = json!({"name": "smoked", "type": "style"})),
    responses(
        (status = 200, description = "Tag already existed", body = TagResponse),
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_tag(
    AuthUser(_user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Tag name cannot be empty"));
    }
    let tag_type = parse_tag_type(request.tag_type.as_deref())?;

    let mut conn = get_conn!(pool);

    if let Some(existing) =
        find_by_name(&mut conn, name).map_err(ApiError::internal("Failed to look up tag"))?
    {
        return Ok((StatusCode::OK, Json(existing.into())));
    }

    let inserted = diesel::insert_into(tags::table)
        .values(&NewTag {
            name,
            tag_type: tag_type.map(|t| t.as_str()),
        })
        .returning(Tag::as_returning())
        .get_result(&mut conn);

    match inserted {
        Ok(tag) => Ok((StatusCode::CREATED, Json(tag.into()))),
        // Lost a race with a concurrent create of the same name.
        Err(e) if is_unique_violation(&e) => find_by_name(&mut conn, name)
            .map_err(ApiError::internal("Failed to look up tag"))?
            .map(|tag| (StatusCode::OK, Json(tag.into())))
            .ok_or(ApiError::Internal("Failed to create tag")),
        Err(e) => Err(ApiError::internal("Failed to create tag")(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_type() {
        assert_eq!(parse_tag_type(None).unwrap(), None);
        assert_eq!(parse_tag_type(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_tag_type(Some("cuisine")).unwrap(),
            Some(TagType::Cuisine)
        );
        assert!(parse_tag_type(Some("flavor")).is_err());
    }

    #[test]
    fn test_request_reads_type_field() {
        let request: CreateTagRequest =
            serde_json::from_value(serde_json::json!({"name": "smoked", "type": "style"}))
                .unwrap();
        assert_eq!(request.tag_type.as_deref(), Some("style"));
    }
}
