pub mod error;
pub mod service;
pub mod teams;

pub use error::PodcastServiceError;
pub use service::{PodcastAudioService, PodcastAudioServiceApi, TtsServiceFactory};
pub use teams::{find_team, Team, MLB_TEAMS};

use crate::domain::tts::StrategyKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of one team's audio pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAudioResult {
    pub team_code: String,
    pub team_name: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TeamAudioResult {
    pub fn failed(team: Team, date: NaiveDate, error: String) -> Self {
        Self {
            team_code: team.code.to_string(),
            team_name: team.name.to_string(),
            date,
            audio_file: None,
            strategy: None,
            chunk_count: None,
            success: false,
            error: Some(error),
        }
    }
}

/// Request for POST /api/podcasts/audio
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BatchAudioRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub teams: Option<Vec<String>>,
}

/// Request for POST /api/podcasts/:team/audio
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TeamAudioRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Response for POST /api/podcasts/audio
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchAudioResponse {
    pub date: NaiveDate,
    pub success_count: usize,
    pub team_count: usize,
    pub results: Vec<TeamAudioResult>,
}
