use super::model::NormalizeTarget;
use serde::{Deserialize, Serialize};

/// Request for POST /api/tts/synthesize
#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesizeRequest {
    pub content: String,
    /// Treat `content` as speech markup. When absent, a leading `<speak` or `<?xml` decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssml: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl SynthesizeRequest {
    pub fn is_ssml(&self) -> bool {
        let head = self.content.trim_start();
        self.ssml
            .unwrap_or_else(|| head.starts_with("<speak") || head.starts_with("<?xml"))
    }
}

/// Request for POST /api/tts/normalize
#[derive(Debug, Serialize, Deserialize)]
pub struct NormalizeRequest {
    pub ssml: String,
    #[serde(default)]
    pub target: NormalizeTarget,
}

/// Response for POST /api/tts/normalize
#[derive(Debug, Serialize, Deserialize)]
pub struct NormalizeResponse {
    pub ssml: String,
    pub fell_back: bool,
}
