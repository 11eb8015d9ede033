// End-to-end tests for the Podcast TTS Backend API
//
// Each test boots the full router on an ephemeral port. Google's speech,
// storage and token endpoints are replaced by a per-test wiremock server,
// and scripts/audio live in a per-test temporary directory, so tests run
// in parallel without sharing state.

mod helpers;
mod test_health;
mod test_tts;
