pub mod podcast;
pub mod tts;
