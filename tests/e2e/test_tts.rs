use crate::helpers;

use helpers::assertions::assert_synthesis_headers;
use helpers::google_mocks::{
    mock_long_audio_job, mock_long_audio_refused, mock_synthesize, mock_synthesize_failures,
    mock_token,
};
use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;
use wiremock::MockServer;

async fn synthesize_calls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/v1/text:synthesize")
        .count()
}

fn long_text() -> String {
    (1..=250)
        .map(|i| format!("Inning number {} was scoreless. ", i))
        .collect()
}

fn long_markup() -> String {
    let body: String = (1..=150)
        .map(|i| format!("<p>Play {} went to the warning track.</p><break time=\"500ms\"/>", i))
        .collect();
    format!("<speak>{}</speak>", body)
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_short_text_in_one_call(ctx: &TestContext) {
    mock_synthesize(&ctx.google, b"mp3-audio").await;

    let text = "Good evening, baseball fans.";
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": text }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_synthesis_headers(&response.headers, "audio/mpeg", "direct");
    response.assert_header("x-chunk-count", "1");
    response.assert_header("x-character-count", &text.len().to_string());
    assert_eq!(response.body_bytes, b"mp3-audio".to_vec());
    assert_eq!(synthesize_calls(&ctx.google).await, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_retry_transient_backend_failures(ctx: &TestContext) {
    mock_synthesize_failures(&ctx.google, 503, 2).await;
    mock_synthesize(&ctx.google, b"mp3-after-retry").await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": "Third time lucky." }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body_bytes, b"mp3-after-retry".to_vec());
    assert_eq!(synthesize_calls(&ctx.google).await, 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_bad_gateway_when_retries_are_exhausted(ctx: &TestContext) {
    mock_synthesize_failures(&ctx.google, 503, 10).await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": "Never going to work." }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(synthesize_calls(&ctx.google).await, 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_retry_rejected_requests(ctx: &TestContext) {
    mock_synthesize_failures(&ctx.google, 400, 10).await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": "<speak>bad", "ssml": true }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(synthesize_calls(&ctx.google).await, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_chunk_long_text_without_long_audio(ctx: &TestContext) {
    mock_synthesize(&ctx.google, b"mp3").await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": long_text() }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_synthesis_headers(&response.headers, "audio/mpeg", "chunked");

    let calls = synthesize_calls(&ctx.google).await;
    assert!(calls > 1);
    response.assert_header("x-chunk-count", &calls.to_string());
    assert_eq!(response.body_bytes, b"mp3".repeat(calls));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_chunk_long_markup_into_standalone_documents(ctx: &TestContext) {
    mock_synthesize(&ctx.google, b"mp3").await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": long_markup() }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_synthesis_headers(&response.headers, "audio/mpeg", "chunked");

    let requests = ctx.google.received_requests().await.unwrap_or_default();
    assert!(requests.len() > 1);
    for request in requests {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let ssml = body["input"]["ssml"].as_str().expect("chunk sent as markup");
        assert!(ssml.len() <= ctx.config.synthesis.max_request_bytes);
        assert!(ssml.starts_with("<speak>"));
        assert!(ssml.ends_with("</speak>"));
    }
}

#[tokio::test]
async fn it_should_use_long_audio_for_long_markup() {
    let ctx = TestContext::start(true).await;
    mock_token(&ctx.google).await;
    mock_long_audio_job(&ctx.google, b"RIFF-long-audio").await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": long_markup() }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_synthesis_headers(&response.headers, "audio/wav", "long_audio");
    response.assert_header("x-chunk-count", "1");
    assert_eq!(response.body_bytes, b"RIFF-long-audio".to_vec());
    assert_eq!(synthesize_calls(&ctx.google).await, 0);
}

#[tokio::test]
async fn it_should_fall_back_to_chunks_when_long_audio_is_refused() {
    let ctx = TestContext::start(true).await;
    mock_token(&ctx.google).await;
    mock_long_audio_refused(&ctx.google).await;
    mock_synthesize(&ctx.google, b"mp3").await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": long_markup() }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_synthesis_headers(&response.headers, "audio/mpeg", "chunked");
    assert!(synthesize_calls(&ctx.google).await > 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_content(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": "   " }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("empty");
    assert_eq!(synthesize_calls(&ctx.google).await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_oversized_content(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "content": "a".repeat(1_000_001) }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_error_message("1,000,000");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_normalize_markup_for_long_audio(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts/normalize",
            &json!({
                "ssml": "<speak><speak><prosody rate=\"95%\">Nested</prosody></speak> recap</speak>"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    let ssml = body["ssml"].as_str().unwrap();
    assert_eq!(ssml.matches("<speak").count(), 1);
    assert!(!ssml.contains("<prosody"));
    assert!(ssml.contains("Nested"));
    assert!(ssml.contains("recap"));
    assert_eq!(body["fell_back"].as_bool(), Some(false));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_normalize_markup_for_standard_synthesis(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts/normalize",
            &json!({
                "ssml": "<speak version=\"1.0\"><prosody volume=\"+10%\">Loud</prosody></speak>",
                "target": "standard"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let ssml = response.body.as_ref().unwrap()["ssml"].as_str().unwrap().to_string();
    assert!(ssml.starts_with("<speak>"));
    assert!(ssml.contains(r#"volume="loud""#), "{}", ssml);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_markup_for_normalize(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/normalize", &json!({ "ssml": "" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_echo_caller_request_id(ctx: &TestContext) {
    mock_synthesize(&ctx.google, b"mp3").await;

    let response = ctx
        .client
        .post_with_request_id(
            "/api/tts/synthesize",
            &json!({ "content": "Hello" }),
            "req-from-caller",
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("x-request-id", "req-from-caller");
}
