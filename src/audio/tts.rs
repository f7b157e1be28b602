//! Speech synthesis through the Coqui TTS command-line tool.

use crate::config::Settings;
use crate::error::{PodcastError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Trait for voice-cloning speech synthesis.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in the voice of `speaker_wav`, writing a WAV file to `output`.
    async fn synthesize(&self, text: &str, speaker_wav: &Path, output: &Path) -> Result<()>;
}

/// XTTS voice cloning via the `tts` executable of a provisioned environment.
#[derive(Debug, Clone)]
pub struct CoquiTts {
    executable: PathBuf,
    model_name: String,
    language: String,
}

impl CoquiTts {
    pub fn new(executable: PathBuf, model_name: &str, language: &str) -> Self {
        Self {
            executable,
            model_name: model_name.to_string(),
            language: language.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.tts_executable(),
            &settings.audio.tts_model,
            &settings.audio.language,
        )
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments passed to the executable. The text is forwarded as a single argument.
    pub fn command_args(&self, text: &str, speaker_wav: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "--text".into(),
            text.into(),
            "--model_name".into(),
            self.model_name.clone().into(),
            "--speaker_wav".into(),
            speaker_wav.as_os_str().to_owned(),
            "--language_idx".into(),
            self.language.clone().into(),
            "--out_path".into(),
            output.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl SpeechSynthesizer for CoquiTts {
    #[instrument(skip(self, text), fields(output = %output.display()))]
    async fn synthesize(&self, text: &str, speaker_wav: &Path, output: &Path) -> Result<()> {
        debug!("Synthesizing {} characters", text.len());

        let result = Command::new(&self.executable)
            .args(self.command_args(text, speaker_wav, output))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let out = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PodcastError::ToolNotFound(self.executable.display().to_string()));
            }
            Err(e) => return Err(PodcastError::Tts(format!("tts execution failed: {e}"))),
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(PodcastError::Tts(format!("tts failed: {}", stderr.trim())));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_forward_text_verbatim() {
        let tts = CoquiTts::new(PathBuf::from("/env/bin/tts"), "xtts", "en");
        let text = "Hello, world! It's --text time.";
        let args = tts.command_args(text, Path::new("/voices/a.wav"), Path::new("/tmp/line_0.wav"));

        assert_eq!(args.len(), 10);
        assert_eq!(args[0], "--text");
        assert_eq!(args[1], text);
        assert_eq!(args[3], "xtts");
        assert_eq!(args[5], "/voices/a.wav");
        assert_eq!(args[7], "en");
        assert_eq!(args[9], "/tmp/line_0.wav");
    }

    #[test]
    fn test_from_settings_uses_env_dir() {
        let mut settings = Settings::default();
        settings.audio.tts_env_dir = "/opt/voice".to_string();
        let tts = CoquiTts::from_settings(&settings);
        assert_eq!(tts.executable(), Path::new("/opt/voice/bin/tts"));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let tts = CoquiTts::new(PathBuf::from("/nonexistent/bin/tts"), "xtts", "en");
        let err = tts
            .synthesize("hi", Path::new("a.wav"), Path::new("b.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, PodcastError::ToolNotFound(_)));
    }
}
