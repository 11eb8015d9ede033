use super::storage_repository::ObjectStorageRepository;
use super::tts_repository::BackendError;
use crate::infrastructure::oauth::GoogleAuth;
use async_trait::async_trait;
use std::sync::Arc;

/// Google Cloud Storage JSON API, scoped to one bucket.
pub struct GcsStorageRepository {
    http_client: reqwest::Client,
    auth: Arc<GoogleAuth>,
    storage_api_url: String,
    bucket: String,
}

impl GcsStorageRepository {
    pub fn new(
        http_client: reqwest::Client,
        auth: Arc<GoogleAuth>,
        storage_api_url: &str,
        bucket: String,
    ) -> Self {
        Self {
            http_client,
            auth,
            storage_api_url: storage_api_url.trim_end_matches('/').to_string(),
            bucket,
        }
    }

    fn object_url(&self, object: &str) -> String {
        format!(
            "{}/b/{}/o/{}",
            self.storage_api_url,
            urlencoding::encode(&self.bucket),
            urlencoding::encode(object)
        )
    }
}

#[async_trait]
impl ObjectStorageRepository for GcsStorageRepository {
    fn object_uri(&self, object: &str) -> String {
        format!("gs://{}/{}", self.bucket, object)
    }

    async fn download(&self, object: &str) -> Result<Vec<u8>, BackendError> {
        let request = self
            .http_client
            .get(self.object_url(object))
            .query(&[("alt", "media")]);
        let response = self.auth.authorize(request).await?.send().await?;
        let response = BackendError::ensure_success(response).await?;

        let bytes = response.bytes().await?;
        tracing::info!(bucket = %self.bucket, object, size_bytes = bytes.len(), "Downloaded object");
        Ok(bytes.to_vec())
    }

    async fn delete(&self, object: &str) -> Result<(), BackendError> {
        let request = self.http_client.delete(self.object_url(object));
        let response = self.auth.authorize(request).await?.send().await?;
        BackendError::ensure_success(response).await?;

        tracing::debug!(bucket = %self.bucket, object, "Deleted object");
        Ok(())
    }
}
