//! Error types for Podcaster.

use thiserror::Error;

/// Library-level error type for Podcaster operations.
#[derive(Error, Debug)]
pub enum PodcastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persona error: {0}")]
    Persona(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Speech synthesis failed: {0}")]
    Tts(String),

    #[error("Audio processing failed: {0}")]
    Audio(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Podcaster operations.
pub type Result<T> = std::result::Result<T, PodcastError>;
