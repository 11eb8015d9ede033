use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::tts::TtsServiceApi;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(tts_service): State<Arc<dyn TtsServiceApi>>) -> impl IntoResponse {
    let long_audio = if tts_service.long_audio_available() {
        "available"
    } else {
        "unavailable"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "tts": "available",
            "long_audio": long_audio,
            "auth": tts_service.auth_mode()
        })),
    )
}
