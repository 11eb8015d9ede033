use crate::domain::tts::{SpeechDocument, Voice};
use async_trait::async_trait;

/// Failure talking to a speech or storage backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response carried no audio content")]
    MissingAudio,

    #[error("malformed backend response: {0}")]
    Decode(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

impl BackendError {
    /// Whether the same call may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Transport(_) | BackendError::MissingAudio => true,
            BackendError::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..=599).contains(status)
            }
            BackendError::Decode(_) | BackendError::Auth(_) | BackendError::NotConfigured(_) => {
                false
            }
        }
    }
}

impl BackendError {
    /// Pass successful responses through; turn the rest into `Status` errors carrying the body.
    pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => BackendError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => BackendError::Decode(err.to_string()),
            None => BackendError::Transport(err.to_string()),
        }
    }
}

/// Everything a backend needs to voice one document.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub document: SpeechDocument,
    pub voice: Voice,
}

impl SynthesisRequest {
    pub fn new(document: SpeechDocument, voice: Voice) -> Self {
        Self { document, voice }
    }
}

/// State of a long-running synthesis operation as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationStatus {
    pub done: bool,
    pub error: Option<String>,
}

/// Repository for speech synthesis calls.
/// Abstracts the REST backend; strategy selection, chunking and retries live in the domain.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Short-form synthesis. Returns MP3 bytes.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError>;

    /// Submit a long-running synthesis writing LINEAR16 audio to `output_uri`.
    ///
    /// Returns the operation name to poll.
    async fn start_long_audio(
        &self,
        request: &SynthesisRequest,
        output_uri: &str,
    ) -> Result<String, BackendError>;

    async fn get_operation(&self, name: &str) -> Result<OperationStatus, BackendError>;
}
