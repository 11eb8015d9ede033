use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

use crate::{
    domain::podcast::{
        BatchAudioRequest, BatchAudioResponse, PodcastAudioServiceApi, TeamAudioRequest,
        TeamAudioResult,
    },
    error::{AppError, AppResult},
};

pub struct PodcastController {
    podcast_service: Arc<dyn PodcastAudioServiceApi>,
}

impl PodcastController {
    pub fn new(podcast_service: Arc<dyn PodcastAudioServiceApi>) -> Self {
        Self { podcast_service }
    }

    /// POST /api/podcasts/audio - Generate audio for many teams
    pub async fn generate_all(
        State(controller): State<Arc<PodcastController>>,
        Json(request): Json<BatchAudioRequest>,
    ) -> AppResult<Json<BatchAudioResponse>> {
        let date = request.date.unwrap_or_else(today);

        let results = controller
            .podcast_service
            .generate_all(request.teams, date)
            .await
            .map_err(AppError::from)?;

        Ok(Json(BatchAudioResponse {
            date,
            success_count: results.iter().filter(|r| r.success).count(),
            team_count: results.len(),
            results,
        }))
    }

    /// POST /api/podcasts/:team/audio - Generate audio for one team
    pub async fn generate_team(
        State(controller): State<Arc<PodcastController>>,
        Path(team): Path<String>,
        Json(request): Json<TeamAudioRequest>,
    ) -> AppResult<Json<TeamAudioResult>> {
        let date = request.date.unwrap_or_else(today);

        let result = controller
            .podcast_service
            .generate_team_audio(&team, date)
            .await
            .map_err(AppError::from)?;

        Ok(Json(result))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
