use super::tts_repository::BackendError;
use async_trait::async_trait;

/// Object store holding long-running synthesis output.
#[async_trait]
pub trait ObjectStorageRepository: Send + Sync {
    /// The `gs://`-style URI the synthesis backend should write `object` to.
    fn object_uri(&self, object: &str) -> String;

    async fn download(&self, object: &str) -> Result<Vec<u8>, BackendError>;

    async fn delete(&self, object: &str) -> Result<(), BackendError>;
}
