use serde::{Deserialize, Serialize};
use std::fmt;

/// A script handed to the synthesis pipeline: markup or plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpeechDocument {
    content: String,
    is_ssml: bool,
}

impl SpeechDocument {
    pub fn ssml(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_ssml: true,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_ssml: false,
        }
    }

    pub fn new(content: impl Into<String>, is_ssml: bool) -> Self {
        Self {
            content: content.into(),
            is_ssml,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_ssml(&self) -> bool {
        self.is_ssml
    }

    /// Length in UTF-8 bytes, which is what the backend limits are expressed in.
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }
}

/// Which validator the markup is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeTarget {
    /// The long-audio backend, which rejects any styling wrapper it cannot balance.
    #[default]
    LongAudio,
    /// The short-form backend; styling wrappers are kept when balanced.
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationResult {
    pub ssml: String,
    /// True when normalization faulted and `ssml` is the untouched input.
    pub fell_back: bool,
}

/// A standalone, single-root fragment of a larger markup document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub ssml: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Mp3,
    Linear16,
}

impl AudioEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "audio/mpeg",
            AudioEncoding::Linear16 => "audio/wav",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::Linear16 => "wav",
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioEncoding::Mp3 => write!(f, "MP3"),
            AudioEncoding::Linear16 => write!(f, "LINEAR16"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub encoding: AudioEncoding,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>, encoding: AudioEncoding) -> Self {
        Self { bytes, encoding }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The synthesis path chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Direct,
    LongAudio,
    Chunked,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Direct => "direct",
            StrategyKind::LongAudio => "long_audio",
            StrategyKind::Chunked => "chunked",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub audio: AudioBlob,
    pub strategy: StrategyKind,
    pub chunk_count: usize,
}

/// Voice selection sent with every synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voice {
    pub language_code: String,
    pub name: String,
}

impl Voice {
    pub fn new(language_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            name: name.into(),
        }
    }
}
