//! Transcript entries, persistence and output naming.

use crate::error::{PodcastError, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A single spoken line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    /// Wall-clock time the line was recorded (`HH:MM:SS`).
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub line: String,
}

impl TranscriptEntry {
    /// Create an entry stamped with the current local time.
    pub fn now(speaker: &str, line: &str) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            speaker: speaker.to_string(),
            line: line.to_string(),
        }
    }

    /// Line as it appears in the conversation history fed to the model.
    pub fn history_line(&self) -> String {
        format!("{}: {}", self.speaker, self.line)
    }

    /// Line as it appears in the transcript log file.
    pub fn log_line(&self) -> String {
        format!("[{}] {}: {}", self.timestamp, self.speaker, self.line)
    }
}

/// Write a transcript as pretty-printed JSON.
pub fn save_transcript(entries: &[TranscriptEntry], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a transcript previously written by [`save_transcript`].
pub fn load_transcript(path: &Path) -> Result<Vec<TranscriptEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PodcastError::Transcript(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Append-only log shared by every session.
#[derive(Debug, Clone)]
pub struct TranscriptLog {
    path: PathBuf,
}

impl TranscriptLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &TranscriptEntry) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", entry.log_line()).as_bytes())
            .await?;
        // tokio finishes writes on a blocking task; flush before the handle is dropped.
        file.flush().await?;
        Ok(())
    }
}

/// File stem for a session's outputs: `podcast_<topic>_<YYYYmmdd_HHMMSS>`.
///
/// Whitespace in the topic becomes `_`; path separators are dropped.
pub fn output_stem<Tz: TimeZone>(topic: &str, started: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let topic: String = topic
        .trim()
        .chars()
        .filter(|c| *c != '/' && *c != '\\')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("podcast_{}_{}", topic, started.format("%Y%m%d_%H%M%S"))
}
