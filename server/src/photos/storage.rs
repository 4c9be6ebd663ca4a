//! Photo blobs in S3-compatible object storage.

use opendal::{services, Operator};
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to configure object storage: {0}")]
    Configure(String),
    #[error("failed to write object {key}: {message}")]
    Write { key: String, message: String },
}

/// Uploads and deletes recipe photos, addressing them by public URL.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    operator: Operator,
    bucket: String,
    public_base_url: String,
}

impl PhotoStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut builder = services::S3::default()
            .bucket(&config.bucket)
            .region(&config.region);

        builder = match &config.endpoint_url {
            Some(endpoint) => builder.endpoint(endpoint),
            None => builder.endpoint(&format!("https://s3.{}.amazonaws.com", config.region)),
        };
        if let Some(key_id) = &config.access_key_id {
            builder = builder.access_key_id(key_id);
        }
        if let Some(secret) = &config.secret_access_key {
            builder = builder.secret_access_key(secret);
        }

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| StorageError::Configure(e.to_string()))?;

        Ok(Self::with_operator(operator, &config.bucket, public_base_url(config)))
    }

    pub fn with_operator(operator: Operator, bucket: &str, public_base_url: String) -> Self {
        PhotoStore {
            operator,
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store `data` under a fresh key and return its public URL.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(filename);
        let size = data.len();

        let supports_content_type = self
            .operator
            .info()
            .full_capability()
            .write_with_content_type;

        let written = if supports_content_type {
            self.operator
                .write_with(&key, data)
                .content_type(content_type)
                .await
                .map(|_| ())
        } else {
            self.operator.write(&key, data).await.map(|_| ())
        };
        written.map_err(|e| StorageError::Write {
            key: key.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!(key = %key, size, "stored photo");
        Ok(self.url_for(&key))
    }

    /// Remove the blob behind `url`. Failures are logged, never returned.
    pub async fn delete(&self, url: &str) {
        let Some(key) = self.key_from_url(url) else {
            tracing::warn!(url = %url, "photo URL does not point into the bucket, skipping delete");
            return;
        };

        if let Err(e) = self.operator.delete(&key).await {
            tracing::warn!(key = %key, "failed to delete photo blob: {}", e);
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/", self.public_base_url);
        if let Some(key) = url.strip_prefix(&prefix) {
            return Some(key.to_string()).filter(|k| !k.is_empty());
        }

        let marker = format!("{}/", self.bucket);
        url.rsplit_once(&marker)
            .map(|(_, key)| key.to_string())
            .filter(|k| !k.is_empty())
    }

    #[cfg(test)]
    pub fn operator(&self) -> &Operator {
        &self.operator
    }
}

/// Path-style URL for custom endpoints, virtual-hosted style for AWS.
pub fn public_base_url(config: &StorageConfig) -> String {
    match &config.endpoint_url {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region),
    }
}

/// `photos/<uuid>.<ext>`, keeping a short alphanumeric extension from `filename`.
pub fn object_key(filename: &str) -> String {
    let id = Uuid::new_v4();
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("photos/{}.{}", id, ext),
        None => format!("photos/{}", id),
    }
}

#[cfg(test)]
pub fn memory_store() -> PhotoStore {
    let operator = Operator::new(services::Memory::default())
        .expect("memory operator")
        .finish();
    PhotoStore::with_operator(
        operator,
        "brinebook-photos",
        "http://minio:9000/brinebook-photos".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_config(endpoint: Option<&str>) -> StorageConfig {
        StorageConfig {
            endpoint_url: endpoint.map(str::to_string),
            access_key_id: None,
            secret_access_key: None,
            bucket: "brinebook-photos".to_string(),
            region: "eu-west-1".to_string(),
        }
    }

    #[test]
    fn test_public_base_url() {
        assert_eq!(
            public_base_url(&storage_config(None)),
            "https://brinebook-photos.s3.eu-west-1.amazonaws.com"
        );
        assert_eq!(
            public_base_url(&storage_config(Some("http://minio:9000/"))),
            "http://minio:9000/brinebook-photos"
        );
    }

    #[test]
    fn test_object_key() {
        let key = object_key("Plated Dish.JPG");
        assert!(key.starts_with("photos/"));
        assert!(key.ends_with(".jpg"));

        assert!(!object_key("no-extension").contains('.'));
        assert!(!object_key("weird.ex/t").ends_with("ex/t"));
    }

    #[test]
    fn test_key_from_url() {
        let store = memory_store();
        assert_eq!(
            store
                .key_from_url("http://minio:9000/brinebook-photos/photos/a.jpg")
                .as_deref(),
            Some("photos/a.jpg")
        );
        assert_eq!(
            store
                .key_from_url("https://cdn.example.com/brinebook-photos/photos/b.png")
                .as_deref(),
            Some("photos/b.png")
        );
        assert_eq!(store.key_from_url("https://elsewhere.example.com/x.jpg"), None);
    }

    #[tokio::test]
    async fn test_upload_then_delete() {
        let store = memory_store();
        let url = store
            .upload(b"fake-jpeg".to_vec(), "dish.jpg", "image/jpeg")
            .await
            .unwrap();
        assert!(url.starts_with("http://minio:9000/brinebook-photos/photos/"));

        let key = store.key_from_url(&url).unwrap();
        let stored = store.operator().read(&key).await.unwrap();
        assert_eq!(stored.to_vec(), b"fake-jpeg".to_vec());

        store.delete(&url).await;
        assert!(!store.operator().exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_url_is_harmless() {
        let store = memory_store();
        store.delete("https://elsewhere.example.com/x.jpg").await;
        store
            .delete("http://minio:9000/brinebook-photos/photos/missing.jpg")
            .await;
    }

    #[tokio::test]
    async fn test_from_config_builds_operator() {
        let store = PhotoStore::from_config(&storage_config(Some("http://minio:9000"))).unwrap();
        assert_eq!(
            store.url_for("photos/x.jpg"),
            "http://minio:9000/brinebook-photos/photos/x.jpg"
        );
    }
}
