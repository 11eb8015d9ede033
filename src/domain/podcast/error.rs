use crate::domain::tts::TtsServiceError;
use crate::error::AppError;
use crate::infrastructure::repositories::ScriptRepositoryError;
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum PodcastServiceError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),
    #[error("no script for {team} on {date}")]
    ScriptNotFound { team: String, date: NaiveDate },
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Synthesis(#[from] TtsServiceError),
}

impl From<ScriptRepositoryError> for PodcastServiceError {
    fn from(err: ScriptRepositoryError) -> Self {
        match err {
            ScriptRepositoryError::ScriptNotFound { team, date } => {
                PodcastServiceError::ScriptNotFound { team, date }
            }
            err @ ScriptRepositoryError::Io { .. } => PodcastServiceError::Storage(err.to_string()),
        }
    }
}

impl From<PodcastServiceError> for AppError {
    fn from(err: PodcastServiceError) -> Self {
        match err {
            PodcastServiceError::UnknownTeam(code) => AppError::NotFound(format!("team {}", code)),
            err @ PodcastServiceError::ScriptNotFound { .. } => AppError::NotFound(err.to_string()),
            PodcastServiceError::Storage(msg) => AppError::Internal(msg),
            PodcastServiceError::Synthesis(e) => AppError::from(e),
        }
    }
}
