//! Configuration settings for Podcaster.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub conversation: ConversationSettings,
    pub audio: AudioSettings,
    pub personas: PersonaSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files (TTS clips, concat lists).
    pub temp_dir: String,
    /// Directory where finished transcripts and MP3s are written.
    pub output_dir: String,
    /// Append-only log of every transcript line across sessions.
    pub transcript_log: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.podcaster".to_string(),
            temp_dir: "/tmp/podcast_audio".to_string(),
            output_dir: ".".to_string(),
            transcript_log: "podcast_transcript.log".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Language model backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Local Ollama server (default).
    #[default]
    Ollama,
    /// OpenAI chat completions.
    OpenAI,
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" | "local" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAI),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Ollama => write!(f, "ollama"),
            LlmProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Timeout for a single model call, in seconds.
    pub timeout_seconds: u64,
    /// Model used for personas that don't name one.
    pub default_model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            base_url: "http://localhost:11434".to_string(),
            timeout_seconds: 180,
            default_model: "llama3:8b".to_string(),
        }
    }
}

/// Conversation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    /// Default number of turns.
    pub turns: usize,
    /// Minimum bid importance required to interrupt.
    pub interruption_threshold: i64,
    /// Number of trailing history lines included in prompts.
    pub history_window: usize,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            turns: 10,
            interruption_threshold: 6,
            history_window: 15,
        }
    }
}

/// Text-to-speech and mixing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Provisioned TTS environment; the executable lives at `bin/tts`.
    pub tts_env_dir: String,
    /// Coqui TTS model name.
    pub tts_model: String,
    /// Language passed to the TTS model.
    pub language: String,
    /// Pause inserted between clips, in seconds.
    pub silence_seconds: f64,
    /// Sample rate of the generated silence clip.
    pub sample_rate: u32,
    /// Maximum concurrent TTS processes.
    pub max_concurrent: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            tts_env_dir: "~/podcast_env".to_string(),
            tts_model: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
            language: "en".to_string(),
            silence_seconds: 0.5,
            sample_rate: 24000,
            max_concurrent: 2,
        }
    }
}

/// Persona source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    /// Path to the personas JSON file.
    pub file: String,
}

impl Default for PersonaSettings {
    fn default() -> Self {
        Self {
            file: "personas.json".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::PodcastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("podcaster")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    pub fn transcript_log_path(&self) -> PathBuf {
        Self::expand_path(&self.general.transcript_log)
    }

    pub fn personas_path(&self) -> PathBuf {
        Self::expand_path(&self.personas.file)
    }

    /// Get the expanded TTS environment directory.
    pub fn tts_env_dir(&self) -> PathBuf {
        Self::expand_path(&self.audio.tts_env_dir)
    }

    /// Path of the TTS executable inside the provisioned environment.
    pub fn tts_executable(&self) -> PathBuf {
        self.tts_env_dir().join("bin").join("tts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.conversation.interruption_threshold, 6);
        assert_eq!(settings.conversation.history_window, 15);
        assert_eq!(settings.llm.timeout_seconds, 180);
        assert_eq!(settings.llm.provider, LlmProvider::Ollama);
        assert!(settings.tts_executable().ends_with("podcast_env/bin/tts"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            provider = "openai"

            [conversation]
            turns = 4
            "#,
        )
        .unwrap();
        assert_eq!(settings.llm.provider, LlmProvider::OpenAI);
        assert_eq!(settings.llm.base_url, "http://localhost:11434");
        assert_eq!(settings.conversation.turns, 4);
        assert_eq!(settings.conversation.interruption_threshold, 6);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.audio.max_concurrent = 5;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.audio.max_concurrent, 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(loaded.conversation.turns, 10);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("Ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert_eq!("openai".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert!("bard".parse::<LlmProvider>().is_err());
    }
}
