use super::error::PodcastServiceError;
use super::teams::{find_team, Team, MLB_TEAMS};
use super::TeamAudioResult;
use crate::domain::tts::TtsServiceApi;
use crate::infrastructure::repositories::ScriptRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Builds an independent synthesis service (own HTTP client and credentials) per pipeline.
pub type TtsServiceFactory = Arc<dyn Fn() -> Arc<dyn TtsServiceApi> + Send + Sync>;

pub struct PodcastAudioService {
    scripts: Arc<ScriptRepository>,
    tts_factory: TtsServiceFactory,
    max_workers: usize,
}

impl PodcastAudioService {
    pub fn new(scripts: Arc<ScriptRepository>, tts_factory: TtsServiceFactory, max_workers: usize) -> Self {
        Self {
            scripts,
            tts_factory,
            max_workers: max_workers.max(1),
        }
    }
}

#[async_trait]
pub trait PodcastAudioServiceApi: Send + Sync {
    /// Load the team's script for `date`, synthesize it, and store the audio.
    async fn generate_team_audio(
        &self,
        team_code: &str,
        date: NaiveDate,
    ) -> Result<TeamAudioResult, PodcastServiceError>;

    /// Run one pipeline per team (all teams when `teams` is `None`) on a bounded pool.
    ///
    /// Per-team failures are reported in the results; only unknown team codes fail the batch.
    async fn generate_all(
        &self,
        teams: Option<Vec<String>>,
        date: NaiveDate,
    ) -> Result<Vec<TeamAudioResult>, PodcastServiceError>;
}

#[async_trait]
impl PodcastAudioServiceApi for PodcastAudioService {
    async fn generate_team_audio(
        &self,
        team_code: &str,
        date: NaiveDate,
    ) -> Result<TeamAudioResult, PodcastServiceError> {
        let team = find_team(team_code)
            .ok_or_else(|| PodcastServiceError::UnknownTeam(team_code.to_string()))?;

        run_pipeline(&self.scripts, (self.tts_factory)(), team, date).await
    }

    async fn generate_all(
        &self,
        teams: Option<Vec<String>>,
        date: NaiveDate,
    ) -> Result<Vec<TeamAudioResult>, PodcastServiceError> {
        let teams: Vec<Team> = match teams {
            Some(codes) => codes
                .iter()
                .map(|code| find_team(code).ok_or_else(|| PodcastServiceError::UnknownTeam(code.clone())))
                .collect::<Result<_, _>>()?,
            None => MLB_TEAMS.to_vec(),
        };

        tracing::info!(
            team_count = teams.len(),
            max_workers = self.max_workers,
            date = %date,
            "Starting batch audio generation"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for team in teams.iter().copied() {
            let semaphore = semaphore.clone();
            let scripts = self.scripts.clone();
            let tts_factory = self.tts_factory.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = run_pipeline(&scripts, tts_factory(), team, date).await;
                match result {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(team = team.code, error = %e, "Team audio generation failed");
                        TeamAudioResult::failed(team, date, e.to_string())
                    }
                }
            });
        }

        let mut results = Vec::with_capacity(teams.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    tracing::info!(
                        team = %result.team_code,
                        success = result.success,
                        "Completed team audio generation"
                    );
                    results.push(result);
                }
                Err(e) => tracing::error!(error = %e, "Team audio task aborted"),
            }
        }

        // Teams whose task died without reporting still get a result
        for team in &teams {
            if !results.iter().any(|r| r.team_code == team.code) {
                results.push(TeamAudioResult::failed(*team, date, "task aborted".to_string()));
            }
        }

        results.sort_by_key(|r| teams.iter().position(|t| t.code == r.team_code));

        let success_count = results.iter().filter(|r| r.success).count();
        tracing::info!(
            success_count,
            team_count = teams.len(),
            "Batch audio generation complete"
        );

        Ok(results)
    }
}

async fn run_pipeline(
    scripts: &ScriptRepository,
    tts: Arc<dyn TtsServiceApi>,
    team: Team,
    date: NaiveDate,
) -> Result<TeamAudioResult, PodcastServiceError> {
    tracing::info!(team = team.code, date = %date, "Generating team audio");

    let script = scripts.load_script(team.code, date).await?;
    let outcome = tts.synthesize(script, None).await?;
    let path = scripts.save_audio(team.code, date, &outcome.audio).await?;

    Ok(TeamAudioResult {
        team_code: team.code.to_string(),
        team_name: team.name.to_string(),
        date,
        audio_file: Some(path.display().to_string()),
        strategy: Some(outcome.strategy),
        chunk_count: Some(outcome.chunk_count),
        success: true,
        error: None,
    })
}
