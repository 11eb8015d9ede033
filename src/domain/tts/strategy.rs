use super::assembler::assemble;
use super::chunker::chunk_markup;
use super::error::TtsServiceError;
use super::model::{AudioBlob, AudioEncoding, SpeechDocument, StrategyKind, SynthesisOutcome, Voice};
use super::retry::RetryPolicy;
use super::text_splitter::split_text;
use crate::infrastructure::repositories::{SynthesisRequest, TtsRepository};
use async_trait::async_trait;
use std::sync::Arc;

/// Pick the synthesis path for a document. Decided once per request.
pub fn select_strategy(
    document: &SpeechDocument,
    max_request_bytes: usize,
    long_text_threshold_bytes: usize,
    long_audio_available: bool,
) -> StrategyKind {
    let length = document.byte_len();

    if length <= max_request_bytes {
        return StrategyKind::Direct;
    }

    if long_audio_available && (document.is_ssml() || length > long_text_threshold_bytes) {
        return StrategyKind::LongAudio;
    }

    StrategyKind::Chunked
}

/// What every strategy needs to make short-form synthesis calls.
pub struct SynthesisContext {
    pub tts_repo: Arc<dyn TtsRepository>,
    pub retry: RetryPolicy,
    pub max_request_bytes: usize,
}

impl SynthesisContext {
    /// One short-form call under the retry policy.
    pub async fn synthesize_once(
        &self,
        document: SpeechDocument,
        voice: &Voice,
    ) -> Result<AudioBlob, TtsServiceError> {
        let request = SynthesisRequest::new(document, voice.clone());
        let bytes = self
            .retry
            .run("synthesize", || self.tts_repo.synthesize(&request))
            .await?;
        Ok(AudioBlob::new(bytes, AudioEncoding::Mp3))
    }
}

#[async_trait]
pub trait SynthesisStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn synthesize(
        &self,
        document: &SpeechDocument,
        voice: &Voice,
    ) -> Result<SynthesisOutcome, TtsServiceError>;
}

/// The whole document in one call.
pub struct DirectStrategy {
    context: Arc<SynthesisContext>,
}

impl DirectStrategy {
    pub fn new(context: Arc<SynthesisContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SynthesisStrategy for DirectStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    async fn synthesize(
        &self,
        document: &SpeechDocument,
        voice: &Voice,
    ) -> Result<SynthesisOutcome, TtsServiceError> {
        let audio = self.context.synthesize_once(document.clone(), voice).await?;
        Ok(SynthesisOutcome {
            audio,
            strategy: StrategyKind::Direct,
            chunk_count: 1,
        })
    }
}

/// Split into request-sized pieces, voice each in order, concatenate.
pub struct ChunkedStrategy {
    context: Arc<SynthesisContext>,
}

impl ChunkedStrategy {
    pub fn new(context: Arc<SynthesisContext>) -> Self {
        Self { context }
    }

    fn pieces(&self, document: &SpeechDocument) -> Vec<SpeechDocument> {
        let max_bytes = self.context.max_request_bytes;
        if document.is_ssml() {
            chunk_markup(document.content(), max_bytes)
                .into_iter()
                .map(|chunk| SpeechDocument::ssml(chunk.ssml))
                .collect()
        } else {
            split_text(document.content(), max_bytes)
                .into_iter()
                .map(SpeechDocument::text)
                .collect()
        }
    }
}

#[async_trait]
impl SynthesisStrategy for ChunkedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Chunked
    }

    async fn synthesize(
        &self,
        document: &SpeechDocument,
        voice: &Voice,
    ) -> Result<SynthesisOutcome, TtsServiceError> {
        let pieces = self.pieces(document);
        let chunk_count = pieces.len();
        let mut fragments = Vec::with_capacity(chunk_count);

        for (chunk_index, piece) in pieces.into_iter().enumerate() {
            tracing::debug!(
                chunk_index,
                chunk_count,
                chunk_length = piece.byte_len(),
                "Synthesizing chunk"
            );
            let fragment = self.context.synthesize_once(piece, voice).await.map_err(|e| {
                tracing::error!(chunk_index, chunk_count, error = %e, "Chunk synthesis failed");
                TtsServiceError::Dependency(format!("chunk {} of {}: {}", chunk_index + 1, chunk_count, e))
            })?;
            fragments.push(fragment);
        }

        let audio = assemble(fragments)
            .ok_or_else(|| TtsServiceError::Invalid("nothing to synthesize".to_string()))?;

        Ok(SynthesisOutcome {
            audio,
            strategy: StrategyKind::Chunked,
            chunk_count,
        })
    }
}
