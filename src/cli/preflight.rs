//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools, the TTS environment and credentials are available
//! before starting operations that would otherwise fail midway.

use crate::config::{LlmProvider, Settings};
use crate::error::{PodcastError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Text-only generation needs a language model backend.
    Generate,
    /// Generation with live audio also needs the TTS environment and ffmpeg.
    GenerateWithAudio,
    /// Offline synthesis needs the TTS environment and ffmpeg.
    Synthesize,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Generate => {
            check_llm(settings)?;
        }
        Operation::GenerateWithAudio => {
            check_llm(settings)?;
            check_tts_environment(settings)?;
            check_tool("ffmpeg")?;
        }
        Operation::Synthesize => {
            check_tts_environment(settings)?;
            check_tool("ffmpeg")?;
        }
    }
    Ok(())
}

fn check_llm(settings: &Settings) -> Result<()> {
    match settings.llm.provider {
        // Reachability is checked asynchronously by the generate command.
        LlmProvider::Ollama => Ok(()),
        LlmProvider::OpenAI => check_api_key(),
    }
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(PodcastError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(PodcastError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that the TTS environment has been provisioned.
pub fn check_tts_environment(settings: &Settings) -> Result<()> {
    let env_dir = settings.tts_env_dir();
    if !env_dir.is_dir() {
        return Err(PodcastError::Config(format!(
            "TTS environment {} does not exist. Provision it (e.g. python3 -m venv {} && {}/bin/pip install TTS) or set audio.tts_env_dir.",
            env_dir.display(),
            env_dir.display(),
            env_dir.display()
        )));
    }
    let executable = settings.tts_executable();
    if !executable.is_file() {
        return Err(PodcastError::ToolNotFound(executable.display().to_string()));
    }
    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(PodcastError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PodcastError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(PodcastError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
