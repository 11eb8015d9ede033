pub mod assembler;
pub mod chunker;
pub mod dto;
pub mod error;
pub mod long_audio;
pub mod model;
pub mod normalizer;
pub mod retry;
pub mod service;
pub mod strategy;
pub mod text_splitter;

#[cfg(test)]
pub(crate) mod test_support;

pub use assembler::assemble;
pub use chunker::chunk_markup;
pub use dto::{NormalizeRequest, NormalizeResponse, SynthesizeRequest};
pub use error::TtsServiceError;
pub use long_audio::{JobState, LongAudioStrategy, SynthesisJob};
pub use model::{
    AudioBlob, AudioEncoding, Chunk, NormalizationResult, NormalizeTarget, SpeechDocument,
    StrategyKind, SynthesisOutcome, Voice,
};
pub use normalizer::normalize_markup;
pub use retry::RetryPolicy;
pub use service::{TtsService, TtsServiceApi};
pub use strategy::{select_strategy, ChunkedStrategy, DirectStrategy, SynthesisContext, SynthesisStrategy};
pub use text_splitter::split_text;
