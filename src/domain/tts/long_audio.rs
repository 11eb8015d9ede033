//! Long-running synthesis: submit, poll, download from object storage, clean up.

use super::error::TtsServiceError;
use super::model::{
    AudioBlob, AudioEncoding, NormalizeTarget, SpeechDocument, StrategyKind, SynthesisOutcome, Voice,
};
use super::normalizer::normalize_markup;
use super::strategy::{SynthesisContext, SynthesisStrategy};
use crate::infrastructure::repositories::{ObjectStorageRepository, SynthesisRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Done,
    Failed(String),
}

/// A submitted long-running synthesis and where its output will land.
#[derive(Debug, Clone)]
pub struct SynthesisJob {
    pub operation: String,
    pub object: String,
    pub state: JobState,
    pub polls: u32,
}

pub struct LongAudioStrategy {
    context: Arc<SynthesisContext>,
    storage: Arc<dyn ObjectStorageRepository>,
    poll_interval: Duration,
    max_polls: u32,
}

impl LongAudioStrategy {
    pub fn new(
        context: Arc<SynthesisContext>,
        storage: Arc<dyn ObjectStorageRepository>,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Self {
        Self {
            context,
            storage,
            poll_interval,
            max_polls,
        }
    }

    /// Submit the job. Failures here are `Unavailable` so callers can choose another path.
    pub async fn submit(
        &self,
        document: &SpeechDocument,
        voice: &Voice,
    ) -> Result<SynthesisJob, TtsServiceError> {
        let document = if document.is_ssml() {
            let normalized = normalize_markup(document.content(), NormalizeTarget::LongAudio);
            SpeechDocument::ssml(normalized.ssml)
        } else {
            document.clone()
        };

        let object = format!("audio-{}.wav", Uuid::new_v4());
        let output_uri = self.storage.object_uri(&object);
        let request = SynthesisRequest::new(document, voice.clone());

        let operation = self
            .context
            .retry
            .run("start_long_audio", || {
                self.context.tts_repo.start_long_audio(&request, &output_uri)
            })
            .await
            .map_err(|e| TtsServiceError::Unavailable(e.to_string()))?;

        tracing::info!(operation = %operation, object = %object, "Long audio job started");

        Ok(SynthesisJob {
            operation,
            object,
            state: JobState::Pending,
            polls: 0,
        })
    }

    /// Poll at a fixed interval until the job is done, reports an error, or the poll cap is hit.
    pub async fn wait(&self, job: &mut SynthesisJob) -> Result<(), TtsServiceError> {
        while job.polls < self.max_polls {
            tokio::time::sleep(self.poll_interval).await;
            job.polls += 1;

            let status = self
                .context
                .retry
                .run("get_operation", || self.context.tts_repo.get_operation(&job.operation))
                .await;

            match status {
                Ok(status) => {
                    if let Some(error) = status.error {
                        tracing::error!(operation = %job.operation, poll = job.polls, error = %error, "Long audio job failed");
                        job.state = JobState::Failed(error.clone());
                        return Err(TtsServiceError::JobFailed(error));
                    }
                    if status.done {
                        tracing::info!(operation = %job.operation, poll = job.polls, "Long audio job done");
                        job.state = JobState::Done;
                        return Ok(());
                    }
                    tracing::debug!(
                        operation = %job.operation,
                        poll = job.polls,
                        max_polls = self.max_polls,
                        "Long audio job still running"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        operation = %job.operation,
                        poll = job.polls,
                        error = %e,
                        "Polling long audio job failed"
                    );
                }
            }
        }

        tracing::error!(operation = %job.operation, polls = job.polls, "Long audio job timed out");
        Err(TtsServiceError::Timeout {
            operation: job.operation.clone(),
            polls: job.polls,
        })
    }

    /// Download the finished audio, then delete the remote object whatever the download did.
    pub async fn collect(&self, job: SynthesisJob) -> Result<AudioBlob, TtsServiceError> {
        let downloaded = self
            .context
            .retry
            .run("download", || self.storage.download(&job.object))
            .await;

        if let Err(e) = self.storage.delete(&job.object).await {
            tracing::warn!(object = %job.object, error = %e, "Failed to delete long audio output");
        }

        Ok(AudioBlob::new(downloaded?, AudioEncoding::Linear16))
    }
}

#[async_trait]
impl SynthesisStrategy for LongAudioStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LongAudio
    }

    async fn synthesize(
        &self,
        document: &SpeechDocument,
        voice: &Voice,
    ) -> Result<SynthesisOutcome, TtsServiceError> {
        let mut job = self.submit(document, voice).await?;
        self.wait(&mut job).await?;
        let audio = self.collect(job).await?;

        Ok(SynthesisOutcome {
            audio,
            strategy: StrategyKind::LongAudio,
            chunk_count: 1,
        })
    }
}
