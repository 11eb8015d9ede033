use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::tts::{
        NormalizeRequest, NormalizeResponse, SpeechDocument, SynthesizeRequest, TtsServiceApi,
    },
    error::{AppError, AppResult},
};

/// Largest script accepted over HTTP, in bytes.
pub const MAX_CONTENT_BYTES: usize = 1_000_000;

pub struct TtsController {
    tts_service: Arc<dyn TtsServiceApi>,
}

impl TtsController {
    pub fn new(tts_service: Arc<dyn TtsServiceApi>) -> Self {
        Self { tts_service }
    }

    /// POST /api/tts/synthesize - Convert a script to speech
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<SynthesizeRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let content_length = request.content.len();

        if request.content.trim().is_empty() {
            return Err(AppError::BadRequest("Content cannot be empty".to_string()));
        }

        if content_length > MAX_CONTENT_BYTES {
            return Err(AppError::PayloadTooLarge(
                "Content must be 1,000,000 bytes or less".to_string(),
            ));
        }

        let document = SpeechDocument::new(request.content.as_str(), request.is_ssml());
        let outcome = controller
            .tts_service
            .synthesize(document, request.voice)
            .await
            .map_err(AppError::from)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(outcome.audio.encoding.content_type()),
        );
        headers.insert(
            "X-Synthesis-Strategy",
            HeaderValue::from_static(outcome.strategy.as_str()),
        );
        headers.insert("X-Chunk-Count", HeaderValue::from(outcome.chunk_count));
        headers.insert("X-Character-Count", HeaderValue::from(content_length));

        Ok((StatusCode::OK, headers, Body::from(outcome.audio.bytes)))
    }

    /// POST /api/tts/normalize - Rewrite markup for a backend's validator
    pub async fn normalize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<NormalizeRequest>,
    ) -> AppResult<Json<NormalizeResponse>> {
        if request.ssml.trim().is_empty() {
            return Err(AppError::BadRequest("SSML cannot be empty".to_string()));
        }

        if request.ssml.len() > MAX_CONTENT_BYTES {
            return Err(AppError::PayloadTooLarge(
                "SSML must be 1,000,000 bytes or less".to_string(),
            ));
        }

        let result = controller.tts_service.normalize(&request.ssml, request.target);

        Ok(Json(NormalizeResponse {
            ssml: result.ssml,
            fell_back: result.fell_back,
        }))
    }
}
