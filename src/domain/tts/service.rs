use super::error::TtsServiceError;
use super::long_audio::LongAudioStrategy;
use super::model::{
    NormalizationResult, NormalizeTarget, SpeechDocument, StrategyKind, SynthesisOutcome, Voice,
};
use super::normalizer::normalize_markup;
use super::strategy::{
    select_strategy, ChunkedStrategy, DirectStrategy, SynthesisContext, SynthesisStrategy,
};
use crate::infrastructure::config::{Config, SynthesisConfig};
use crate::infrastructure::oauth::{GoogleAuth, ServiceAccountKey};
use crate::infrastructure::repositories::{
    GcsStorageRepository, GoogleTtsRepository, ObjectStorageRepository, TtsRepository,
};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct TtsService {
    default_voice: Voice,
    direct: DirectStrategy,
    chunked: ChunkedStrategy,
    long_audio: Option<LongAudioStrategy>,
    max_request_bytes: usize,
    long_text_threshold_bytes: usize,
    auth_mode: &'static str,
    cache: Option<Cache<String, SynthesisOutcome>>,
}

impl TtsService {
    /// `storage` enables the long-audio strategy; pass `None` when it is not configured.
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        storage: Option<Arc<dyn ObjectStorageRepository>>,
        default_voice: Voice,
        synthesis: &SynthesisConfig,
        cache_enabled: bool,
    ) -> Self {
        let context = Arc::new(SynthesisContext {
            tts_repo,
            retry: synthesis.retry,
            max_request_bytes: synthesis.max_request_bytes,
        });

        let long_audio = storage.map(|storage| {
            LongAudioStrategy::new(
                context.clone(),
                storage,
                synthesis.poll_interval,
                synthesis.max_polls,
            )
        });

        // Initialize cache if enabled
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self {
            default_voice,
            direct: DirectStrategy::new(context.clone()),
            chunked: ChunkedStrategy::new(context),
            long_audio,
            max_request_bytes: synthesis.max_request_bytes,
            long_text_threshold_bytes: synthesis.long_text_threshold_bytes,
            auth_mode: "custom",
            cache,
        }
    }

    /// Wire the Google backends with a fresh HTTP client and credential session.
    ///
    /// `service_account` is the already-loaded key; nothing here touches the filesystem.
    pub fn from_config(config: &Config, service_account: Option<&ServiceAccountKey>) -> Self {
        let http_client = reqwest::Client::new();
        let auth = Arc::new(GoogleAuth::new(&config.google, service_account));
        let auth_mode = auth.mode();

        let tts_repo: Arc<dyn TtsRepository> = Arc::new(GoogleTtsRepository::new(
            http_client.clone(),
            auth.clone(),
            &config.google,
        ));

        let missing = config.google.long_audio_missing();
        let storage: Option<Arc<dyn ObjectStorageRepository>> = match &config.google.bucket {
            Some(bucket) if missing.is_empty() && auth.is_service_account() => {
                Some(Arc::new(GcsStorageRepository::new(
                    http_client,
                    auth.clone(),
                    &config.google.storage_api_url,
                    bucket.clone(),
                )))
            }
            _ => {
                if missing.is_empty() {
                    tracing::warn!(
                        "Long audio synthesis unavailable: service account credentials could not be loaded"
                    );
                } else {
                    tracing::warn!(
                        missing = %missing.join(", "),
                        "Long audio synthesis unavailable, long scripts will be chunked"
                    );
                }
                None
            }
        };

        let voice = Voice::new(&config.google.language_code, &config.google.voice_name);
        let mut service = Self::new(
            tts_repo,
            storage,
            voice,
            &config.synthesis,
            config.tts_cache_enabled,
        );
        service.auth_mode = auth_mode;
        service
    }

    fn strategy(&self, kind: StrategyKind) -> &dyn SynthesisStrategy {
        match kind {
            StrategyKind::Direct => &self.direct,
            StrategyKind::Chunked => &self.chunked,
            StrategyKind::LongAudio => match &self.long_audio {
                Some(long_audio) => long_audio,
                None => &self.chunked,
            },
        }
    }

    fn cache_key(document: &SpeechDocument, voice: &Voice) -> String {
        format!(
            "{}|{}|{}|{}",
            voice.language_code,
            voice.name,
            document.is_ssml(),
            document.content()
        )
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize a script to a single audio blob
    ///
    /// This operation:
    /// - Picks direct, chunked or long-audio synthesis by size, type and availability
    /// - Falls back to chunked synthesis if a long-audio job cannot be submitted
    /// - Never returns partial audio
    ///
    /// `voice` overrides the configured voice name for this request.
    async fn synthesize(
        &self,
        document: SpeechDocument,
        voice: Option<String>,
    ) -> Result<SynthesisOutcome, TtsServiceError>;

    /// Rewrite markup for the given backend's validator. Never fails.
    fn normalize(&self, markup: &str, target: NormalizeTarget) -> NormalizationResult;

    fn long_audio_available(&self) -> bool;

    /// How requests to the backend are authenticated.
    fn auth_mode(&self) -> &'static str;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize(
        &self,
        document: SpeechDocument,
        voice: Option<String>,
    ) -> Result<SynthesisOutcome, TtsServiceError> {
        if document.content().trim().is_empty() {
            return Err(TtsServiceError::Invalid("content cannot be empty".to_string()));
        }

        let voice = match voice {
            Some(name) => Voice::new(&self.default_voice.language_code, name),
            None => self.default_voice.clone(),
        };

        let cache_key = self.cache.as_ref().map(|_| Self::cache_key(&document, &voice));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(cached) = cache.get(key).await {
                tracing::info!(
                    strategy = %cached.strategy,
                    cached_audio_size = cached.audio.len(),
                    "TTS cache hit - returning cached audio"
                );
                return Ok(cached);
            }
        }

        let start_time = Instant::now();
        let kind = select_strategy(
            &document,
            self.max_request_bytes,
            self.long_text_threshold_bytes,
            self.long_audio_available(),
        );

        tracing::info!(
            strategy = %kind,
            voice = %voice.name,
            is_ssml = document.is_ssml(),
            content_length = document.byte_len(),
            "TTS synthesis request"
        );

        let outcome = match self.strategy(kind).synthesize(&document, &voice).await {
            Err(TtsServiceError::Unavailable(reason)) => {
                tracing::warn!(
                    reason = %reason,
                    "Long audio submission failed, falling back to chunked synthesis"
                );
                self.chunked.synthesize(&document, &voice).await?
            }
            result => result?,
        };

        tracing::info!(
            provider = "google",
            strategy = %outcome.strategy,
            chunk_count = outcome.chunk_count,
            audio_size_bytes = outcome.audio.len(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "TTS synthesis completed"
        );

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.insert(key, outcome.clone()).await;
        }

        Ok(outcome)
    }

    fn normalize(&self, markup: &str, target: NormalizeTarget) -> NormalizationResult {
        normalize_markup(markup, target)
    }

    fn long_audio_available(&self) -> bool {
        self.long_audio.is_some()
    }

    fn auth_mode(&self) -> &'static str {
        self.auth_mode
    }
}
