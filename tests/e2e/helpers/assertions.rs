use serde_json::Value;
use std::collections::HashMap;

pub fn assert_synthesis_headers(
    headers: &HashMap<String, String>,
    content_type: &str,
    strategy: &str,
) {
    assert_eq!(
        headers.get("content-type").map(String::as_str),
        Some(content_type),
        "Content-Type mismatch"
    );
    assert_eq!(
        headers.get("x-synthesis-strategy").map(String::as_str),
        Some(strategy),
        "X-Synthesis-Strategy mismatch"
    );
    assert!(
        headers.contains_key("x-chunk-count"),
        "Missing X-Chunk-Count header"
    );
    assert!(
        headers.contains_key("x-character-count"),
        "Missing X-Character-Count header"
    );
}

pub fn assert_team_result(result: &Value, team_code: &str, success: bool) {
    assert_eq!(
        result.get("team_code").and_then(|v| v.as_str()),
        Some(team_code)
    );
    assert!(result.get("team_name").and_then(|v| v.as_str()).is_some());
    assert_eq!(
        result.get("success").and_then(|v| v.as_bool()),
        Some(success),
        "Unexpected success flag for {}: {}",
        team_code,
        result
    );

    if success {
        assert!(result.get("audio_file").and_then(|v| v.as_str()).is_some());
        assert!(result.get("strategy").and_then(|v| v.as_str()).is_some());
        assert!(result.get("error").is_none());
    } else {
        assert!(result.get("error").and_then(|v| v.as_str()).is_some());
        assert!(result.get("audio_file").is_none());
    }
}
