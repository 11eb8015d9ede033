pub mod health;
pub mod podcast;
pub mod tts;
