use super::PhotoResponse;
use crate::api::recipes::load_owned_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewPhoto;
use crate::photos::{insert_photo, PhotoStore};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotoRequest {
    pub recipe_id: Uuid,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub caption: Option<String>,
    /// Make this the recipe's hero photo
    pub is_hero: Option<bool>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct UploadForm {
    recipe_id: Option<Uuid>,
    caption: Option<String>,
    is_hero: bool,
    file: Option<UploadedFile>,
}

fn multipart_error(e: MultipartError) -> ApiError {
    tracing::warn!("Multipart read error: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("File too large".to_string())
    } else {
        ApiError::bad_request(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "recipe_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                let id = Uuid::parse_str(text.trim())
                    .map_err(|_| ApiError::bad_request("Invalid recipe_id"))?;
                form.recipe_id = Some(id);
            }
            "caption" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.caption = Some(text).filter(|c| !c.trim().is_empty());
            }
            "is_hero" => {
                form.is_hero = parse_bool(&field.text().await.map_err(multipart_error)?);
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/photos",
    tag = "photos",
    request_body(content_type = "multipart/form-data", content = UploadPhotoRequest),
    responses(
        (status = 201, description = "Photo uploaded", body = PhotoResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_photo(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(store): State<Arc<PhotoStore>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PhotoResponse>), ApiError> {
    let form = read_form(multipart).await?;

    let recipe_id = form
        .recipe_id
        .ok_or_else(|| ApiError::bad_request("recipe_id is required"))?;
    let file = form
        .file
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;
    if !file.content_type.starts_with("image/") {
        return Err(ApiError::bad_request("File must be an image"));
    }
    if file.data.is_empty() {
        return Err(ApiError::bad_request("File is empty"));
    }

    {
        let mut conn = get_conn!(pool);
        load_owned_recipe(&mut conn, user.id, recipe_id)?;
    }

    let url = store
        .upload(file.data, &file.filename, &file.content_type)
        .await
        .map_err(ApiError::internal("Failed to upload photo"))?;

    let new_photo = NewPhoto {
        recipe_id,
        user_id: user.id,
        url: &url,
        caption: form.caption.as_deref(),
        is_hero: form.is_hero,
    };

    let inserted = {
        let mut conn = get_conn!(pool);
        insert_photo(&mut conn, &new_photo)
    };

    match inserted {
        Ok(photo) => {
            tracing::info!(photo_id = %photo.id, recipe_id = %recipe_id, "uploaded photo");
            Ok((StatusCode::CREATED, Json(photo.into())))
        }
        Err(e) => {
            store.delete(&url).await;
            Err(ApiError::internal("Failed to save photo")(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    async fn multipart(body: String) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .uri("/api/photos")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            name, value
        )
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" TRUE "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[tokio::test]
    async fn test_read_form() {
        let recipe_id = Uuid::new_v4();
        let body = format!(
            "{}{}{}--XBOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"dish.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nJPEGBYTES\r\n--XBOUNDARY--\r\n",
            text_part("recipe_id", &recipe_id.to_string()),
            text_part("caption", "Plated"),
            text_part("is_hero", "true"),
        );

        let form = read_form(multipart(body).await).await.unwrap();
        assert_eq!(form.recipe_id, Some(recipe_id));
        assert_eq!(form.caption.as_deref(), Some("Plated"));
        assert!(form.is_hero);

        let file = form.file.unwrap();
        assert_eq!(file.filename, "dish.jpg");
        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.data, b"JPEGBYTES".to_vec());
    }

    #[tokio::test]
    async fn test_read_form_rejects_bad_recipe_id() {
        let body = format!("{}--XBOUNDARY--\r\n", text_part("recipe_id", "seven"));
        let err = read_form(multipart(body).await).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
