use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use podcast_tts_backend::infrastructure::config::{Config, LogFormat};
use podcast_tts_backend::infrastructure::http::{create_app, start_http_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Podcast TTS Backend on {}:{}",
        config.host,
        config.port
    );

    if config.is_development() {
        tracing::info!("Running in development mode");
    }

    tracing::info!(
        voice = %config.google.voice_name,
        language_code = %config.google.language_code,
        has_api_key = config.google.api_key.is_some(),
        has_service_account = config.google.service_account_file.is_some(),
        "Google TTS configuration loaded"
    );

    let missing = config.google.long_audio_missing();
    if missing.is_empty() {
        tracing::info!(bucket = ?config.google.bucket, "Long audio synthesis configured");
    } else {
        tracing::warn!(missing = ?missing, "Long audio synthesis not configured, long scripts will be chunked");
    }

    let config = Arc::new(config);
    let app = create_app(config.clone()).await;

    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "podcast_tts_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "podcast_tts_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
