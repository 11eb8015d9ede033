use super::tts_repository::{BackendError, OperationStatus, SynthesisRequest, TtsRepository};
use crate::domain::tts::AudioEncoding;
use crate::infrastructure::config::GoogleConfig;
use crate::infrastructure::oauth::GoogleAuth;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const SAMPLE_RATE_HERTZ: u32 = 24_000;

#[derive(Debug, Serialize)]
struct Input<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ssml: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl<'a> Input<'a> {
    fn from_request(request: &'a SynthesisRequest) -> Self {
        let content = request.document.content();
        if request.document.is_ssml() {
            Self { ssml: Some(content), text: None }
        } else {
            Self { ssml: None, text: Some(content) }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceParams<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
    speaking_rate: f32,
    pitch: f32,
    sample_rate_hertz: u32,
}

impl AudioConfig {
    fn new(audio_encoding: AudioEncoding) -> Self {
        Self {
            audio_encoding,
            speaking_rate: 1.0,
            pitch: 0.0,
            sample_rate_hertz: SAMPLE_RATE_HERTZ,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: Input<'a>,
    voice: VoiceParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LongAudioBody<'a> {
    parent: String,
    input: Input<'a>,
    voice: VoiceParams<'a>,
    audio_config: AudioConfig,
    output_gcs_uri: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
}

impl OperationError {
    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{} (code {})", message, code),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => format!("code {}", code),
            (None, None) => "unknown error".to_string(),
        }
    }
}

/// Google Cloud Text-to-Speech over REST: `text:synthesize` and `synthesizeLongAudio`.
pub struct GoogleTtsRepository {
    http_client: reqwest::Client,
    auth: Arc<GoogleAuth>,
    tts_api_url: String,
    long_audio_api_url: String,
    project_id: Option<String>,
    location: String,
}

impl GoogleTtsRepository {
    pub fn new(http_client: reqwest::Client, auth: Arc<GoogleAuth>, config: &GoogleConfig) -> Self {
        Self {
            http_client,
            auth,
            tts_api_url: config.tts_api_url.clone(),
            long_audio_api_url: config.long_audio_api_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            location: config.location.clone(),
        }
    }

    fn parent(&self) -> Result<String, BackendError> {
        let project_id = self
            .project_id
            .as_deref()
            .ok_or_else(|| BackendError::NotConfigured("GOOGLE_CLOUD_PROJECT_ID".to_string()))?;
        Ok(format!("projects/{}/locations/{}", project_id, self.location))
    }
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        let start_time = Instant::now();
        let body = SynthesizeBody {
            input: Input::from_request(request),
            voice: VoiceParams {
                language_code: &request.voice.language_code,
                name: &request.voice.name,
            },
            audio_config: AudioConfig::new(AudioEncoding::Mp3),
        };

        let http_request = self.http_client.post(&self.tts_api_url).json(&body);
        let response = self.auth.authorize(http_request).await?.send().await?;
        let response = BackendError::ensure_success(response).await?;

        let payload: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        let encoded = payload
            .audio_content
            .filter(|content| !content.is_empty())
            .ok_or(BackendError::MissingAudio)?;

        let audio = STANDARD
            .decode(encoded)
            .map_err(|e| BackendError::Decode(format!("audio content is not base64: {}", e)))?;

        tracing::debug!(
            provider = "google",
            voice = %request.voice.name,
            is_ssml = request.document.is_ssml(),
            content_length = request.document.byte_len(),
            audio_size_bytes = audio.len(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Synthesis call completed"
        );

        Ok(audio)
    }

    async fn start_long_audio(
        &self,
        request: &SynthesisRequest,
        output_uri: &str,
    ) -> Result<String, BackendError> {
        let parent = self.parent()?;
        let url = format!("{}/{}:synthesizeLongAudio", self.long_audio_api_url, parent);
        let body = LongAudioBody {
            parent,
            input: Input::from_request(request),
            voice: VoiceParams {
                language_code: &request.voice.language_code,
                name: &request.voice.name,
            },
            audio_config: AudioConfig::new(AudioEncoding::Linear16),
            output_gcs_uri: output_uri,
        };

        let http_request = self.http_client.post(&url).json(&body);
        let response = self.auth.authorize(http_request).await?.send().await?;
        let response = BackendError::ensure_success(response).await?;

        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        let name = operation
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| BackendError::Decode("operation response has no name".to_string()))?;

        tracing::info!(operation = %name, output_uri, "Long audio synthesis submitted");
        Ok(name)
    }

    async fn get_operation(&self, name: &str) -> Result<OperationStatus, BackendError> {
        let url = format!("{}/{}", self.long_audio_api_url, name);
        let response = self
            .auth
            .authorize(self.http_client.get(&url))
            .await?
            .send()
            .await?;
        let response = BackendError::ensure_success(response).await?;

        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(OperationStatus {
            done: operation.done,
            error: operation.error.map(|e| e.describe()),
        })
    }
}
