mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    controllers::{health, podcast::PodcastController, tts::TtsController},
    domain::{
        podcast::{PodcastAudioService, TtsServiceFactory},
        tts::{TtsService, TtsServiceApi},
    },
    infrastructure::{config::Config, oauth::ServiceAccountKey, repositories::ScriptRepository},
};

/// JSON bodies carry scripts up to 1,000,000 bytes plus escaping.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Wire services and controllers from config and build the router
pub async fn create_app(config: Arc<Config>) -> Router {
    // Read once; every service built below starts its own session from it
    let service_account = ServiceAccountKey::load_configured(&config.google).await;

    tracing::info!("Instantiating services...");
    let tts_service: Arc<dyn TtsServiceApi> = Arc::new(TtsService::from_config(
        &config,
        service_account.as_ref(),
    ));

    let scripts = Arc::new(ScriptRepository::new(
        config.podcast.scripts_dir.clone(),
        config.podcast.audio_dir.clone(),
    ));
    let factory_config = config.clone();
    let tts_factory: TtsServiceFactory = Arc::new(move || {
        Arc::new(TtsService::from_config(&factory_config, service_account.as_ref()))
            as Arc<dyn TtsServiceApi>
    });
    let podcast_service = Arc::new(PodcastAudioService::new(
        scripts,
        tts_factory,
        config.podcast.batch_max_workers,
    ));

    tracing::info!("Instantiating controllers...");
    let tts_controller = Arc::new(TtsController::new(tts_service.clone()));
    let podcast_controller = Arc::new(PodcastController::new(podcast_service));

    build_router(tts_service, tts_controller, podcast_controller)
}

/// Assemble routes and layers around already-built controllers
pub fn build_router(
    tts_service: Arc<dyn TtsServiceApi>,
    tts_controller: Arc<TtsController>,
    podcast_controller: Arc<PodcastController>,
) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(tts_service);

    let tts_routes = Router::new()
        .route("/api/tts/synthesize", post(TtsController::synthesize))
        .route("/api/tts/normalize", post(TtsController::normalize))
        .with_state(tts_controller);

    let podcast_routes = Router::new()
        .route("/api/podcasts/audio", post(PodcastController::generate_all))
        .route("/api/podcasts/:team/audio", post(PodcastController::generate_team))
        .with_state(podcast_controller);

    Router::new()
        .merge(health_routes)
        .merge(tts_routes)
        .merge(podcast_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
