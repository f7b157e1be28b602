//! Podcast personas.
//!
//! Personas are loaded from a JSON array. Each persona drives one AI guest: its
//! personality and stance shape the prompt, `model` selects the language model and
//! `speaker_wav_path` points at the reference voice used for cloning.

use crate::error::{PodcastError, Result};
use crate::text::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn default_model() -> String {
    "llama3:8b".to_string()
}

/// A podcast guest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Persona {
    pub name: String,
    pub personality: String,
    pub stance: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub speaker_wav_path: String,
    /// How this persona relates to other guests, keyed by name.
    #[serde(default)]
    pub relationships: HashMap<String, String>,
}

impl Persona {
    /// Create a persona with defaults for optional fields.
    pub fn new(name: &str, personality: &str, stance: &str) -> Self {
        Self {
            name: name.to_string(),
            personality: personality.to_string(),
            stance: stance.to_string(),
            age: 0,
            gender: String::new(),
            model: default_model(),
            background: String::new(),
            speaker_wav_path: String::new(),
            relationships: HashMap::new(),
        }
    }

    /// Relationship description towards another guest, if any.
    pub fn relationship_with(&self, other: &str) -> Option<&str> {
        self.relationships.get(other).map(String::as_str)
    }

    /// Resolve the reference voice file, if it exists on disk.
    pub fn speaker_wav(&self) -> Option<PathBuf> {
        resolve_speaker_wav(&self.speaker_wav_path)
    }
}

/// Resolve a speaker WAV path.
///
/// Paths written for a container layout (`/data/...`) are retried relative to the home
/// directory.
pub fn resolve_speaker_wav(path: &str) -> Option<PathBuf> {
    resolve_speaker_wav_in(path, dirs::home_dir().as_deref())
}

fn resolve_speaker_wav_in(path: &str, home: Option<&Path>) -> Option<PathBuf> {
    if path.trim().is_empty() {
        return None;
    }

    let direct = PathBuf::from(shellexpand::tilde(path).to_string());
    if direct.exists() {
        return Some(direct);
    }

    let rest = Path::new(path).strip_prefix("/data").ok()?;
    let remapped = home?.join(rest);
    debug!("Retrying speaker wav at {}", remapped.display());
    remapped.exists().then_some(remapped)
}

/// Check the persona list is usable for a conversation.
pub fn validate_personas(personas: &[Persona]) -> Result<()> {
    if personas.len() < 2 {
        return Err(PodcastError::Persona(format!(
            "at least two personas are required, found {}",
            personas.len()
        )));
    }

    let mut seen = HashSet::new();
    for persona in personas {
        let key = normalize_name(&persona.name);
        if key.is_empty() {
            return Err(PodcastError::Persona(format!(
                "persona name '{}' has no letters or digits",
                persona.name
            )));
        }
        if !seen.insert(key) {
            return Err(PodcastError::Persona(format!(
                "duplicate persona name '{}'",
                persona.name
            )));
        }
    }

    Ok(())
}

/// Parse and validate personas from JSON text.
pub fn parse_personas(json: &str) -> Result<Vec<Persona>> {
    let personas: Vec<Persona> = serde_json::from_str(json)?;
    validate_personas(&personas)?;
    Ok(personas)
}

/// Load personas from a JSON file.
pub fn load_personas(path: &Path) -> Result<Vec<Persona>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PodcastError::Persona(format!("cannot read {}: {}", path.display(), e))
    })?;
    let personas = parse_personas(&content)?;
    info!("Loaded {} personas from {}", personas.len(), path.display());
    Ok(personas)
}
