use crate::error::AppError;
use crate::infrastructure::repositories::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("long audio backend unavailable: {0}")]
    Unavailable(String),
    #[error("long audio job failed: {0}")]
    JobFailed(String),
    #[error("long audio job {operation} not done after {polls} polls")]
    Timeout { operation: String, polls: u32 },
}

impl From<BackendError> for TtsServiceError {
    fn from(err: BackendError) -> Self {
        TtsServiceError::Dependency(err.to_string())
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::Dependency(msg) => AppError::ExternalService(msg),
            TtsServiceError::Unavailable(msg) => AppError::ExternalService(msg),
            TtsServiceError::JobFailed(msg) => AppError::ExternalService(msg),
            err @ TtsServiceError::Timeout { .. } => AppError::Timeout(err.to_string()),
        }
    }
}
