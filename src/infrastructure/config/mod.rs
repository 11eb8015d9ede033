use crate::domain::tts::RetryPolicy;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TTS_API_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";
pub const DEFAULT_LONG_AUDIO_API_URL: &str = "https://texttospeech.googleapis.com/v1beta1";
pub const DEFAULT_STORAGE_API_URL: &str = "https://storage.googleapis.com/storage/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub google: GoogleConfig,
    pub synthesis: SynthesisConfig,
    pub podcast: PodcastConfig,
    // TTS Cache
    pub tts_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Credentials, voice and endpoints for the Google speech and storage APIs.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    pub voice_name: String,
    pub language_code: String,
    pub project_id: Option<String>,
    pub location: String,
    pub bucket: Option<String>,
    pub service_account_file: Option<PathBuf>,
    pub tts_api_url: String,
    pub long_audio_api_url: String,
    pub storage_api_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            voice_name: "en-US-Chirp3-HD-Orus".to_string(),
            language_code: "en-US".to_string(),
            project_id: None,
            location: "us-central1".to_string(),
            bucket: None,
            service_account_file: None,
            tts_api_url: DEFAULT_TTS_API_URL.to_string(),
            long_audio_api_url: DEFAULT_LONG_AUDIO_API_URL.to_string(),
            storage_api_url: DEFAULT_STORAGE_API_URL.to_string(),
        }
    }
}

impl GoogleConfig {
    /// Environment variables that must be set before long-audio synthesis can run.
    pub fn long_audio_missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.service_account_file.is_none() {
            missing.push("GOOGLE_CLOUD_SERVICE_ACCOUNT_FILE");
        }
        if self.project_id.is_none() {
            missing.push("GOOGLE_CLOUD_PROJECT_ID");
        }
        if self.bucket.is_none() {
            missing.push("GOOGLE_CLOUD_BUCKET");
        }
        missing
    }
}

/// Limits and timings for strategy selection, polling and retries.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    pub max_request_bytes: usize,
    pub long_text_threshold_bytes: usize,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub retry: RetryPolicy,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_request_bytes: 5000,
            long_text_threshold_bytes: 50_000,
            poll_interval: Duration::from_secs(30),
            max_polls: 60,
            retry: RetryPolicy::default(),
        }
    }
}

/// Where daily scripts are read from and produced audio is written to.
#[derive(Debug, Clone, PartialEq)]
pub struct PodcastConfig {
    pub scripts_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub batch_max_workers: usize,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("scripts"),
            audio_dir: PathBuf::from("audio"),
            batch_max_workers: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let google_defaults = GoogleConfig::default();
        let synthesis_defaults = SynthesisConfig::default();
        let podcast_defaults = PodcastConfig::default();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            google: GoogleConfig {
                api_key: optional_var("GOOGLE_CLOUD_API_KEY"),
                voice_name: optional_var("GOOGLE_WAVENET_VOICE")
                    .unwrap_or(google_defaults.voice_name),
                language_code: optional_var("GOOGLE_WAVENET_LANGUAGE_CODE")
                    .unwrap_or(google_defaults.language_code),
                project_id: optional_var("GOOGLE_CLOUD_PROJECT_ID"),
                location: optional_var("GOOGLE_CLOUD_LOCATION")
                    .unwrap_or(google_defaults.location),
                bucket: optional_var("GOOGLE_CLOUD_BUCKET"),
                service_account_file: optional_var("GOOGLE_CLOUD_SERVICE_ACCOUNT_FILE")
                    .map(PathBuf::from),
                tts_api_url: optional_var("GOOGLE_TTS_API_URL")
                    .unwrap_or(google_defaults.tts_api_url),
                long_audio_api_url: optional_var("GOOGLE_LONG_AUDIO_API_URL")
                    .unwrap_or(google_defaults.long_audio_api_url),
                storage_api_url: optional_var("GOOGLE_STORAGE_API_URL")
                    .unwrap_or(google_defaults.storage_api_url),
            },
            synthesis: SynthesisConfig {
                max_request_bytes: parsed_var(
                    "TTS_MAX_REQUEST_BYTES",
                    synthesis_defaults.max_request_bytes,
                )?,
                long_text_threshold_bytes: parsed_var(
                    "TTS_LONG_TEXT_THRESHOLD_BYTES",
                    synthesis_defaults.long_text_threshold_bytes,
                )?,
                poll_interval: Duration::from_secs(parsed_var(
                    "LONG_AUDIO_POLL_INTERVAL_SECS",
                    synthesis_defaults.poll_interval.as_secs(),
                )?),
                max_polls: parsed_var("LONG_AUDIO_MAX_POLLS", synthesis_defaults.max_polls)?,
                retry: synthesis_defaults.retry,
            },
            podcast: PodcastConfig {
                scripts_dir: optional_var("SCRIPTS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(podcast_defaults.scripts_dir),
                audio_dir: optional_var("AUDIO_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(podcast_defaults.audio_dir),
                batch_max_workers: parsed_var(
                    "BATCH_MAX_WORKERS",
                    podcast_defaults.batch_max_workers,
                )?,
            },
            tts_cache_enabled: env::var("TTS_CACHE_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Unset and blank variables both count as absent.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| format!("invalid value for {name}: {e}").into()),
        None => Ok(default),
    }
}
