//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{LlmProvider, Settings};
use crate::llm::OllamaClient;
use crate::persona::load_personas;
use console::style;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Podcaster Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let tools = vec![
        check_tool("ffmpeg", install_hint_ffmpeg()),
        check_tts_environment(settings),
    ];
    print_section("Audio Tools", &tools);
    checks.extend(tools);

    let llm = vec![check_llm(settings).await];
    print_section("Language Model", &llm);
    checks.extend(llm);

    let dirs = check_directories(settings);
    print_section("Directories", &dirs);
    checks.extend(dirs);

    let config = vec![check_config_file(config_path), check_personas_file(settings)];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before recording.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Podcaster is ready to record.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok(name, &truncate(&version, 50))
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Audio is optional, so a missing environment is only a warning.
fn check_tts_environment(settings: &Settings) -> CheckResult {
    let env_dir = settings.tts_env_dir();
    let hint = format!(
        "Provision with: python3 -m venv {0} && {0}/bin/pip install TTS",
        env_dir.display()
    );
    if !env_dir.is_dir() {
        return CheckResult::warning(
            "TTS environment",
            &format!("{} not found", env_dir.display()),
            &hint,
        );
    }
    let executable = settings.tts_executable();
    if executable.is_file() {
        CheckResult::ok("TTS environment", &format!("{}", executable.display()))
    } else {
        CheckResult::warning(
            "TTS environment",
            &format!("{} has no tts executable", env_dir.display()),
            &hint,
        )
    }
}

async fn check_llm(settings: &Settings) -> CheckResult {
    match settings.llm.provider {
        LlmProvider::Ollama => {
            let client = match OllamaClient::new(&settings.llm.base_url, Duration::from_secs(5)) {
                Ok(client) => client,
                Err(e) => return CheckResult::error("Ollama", &e.to_string(), "Check llm.base_url"),
            };
            if !client.is_available().await {
                return CheckResult::error(
                    "Ollama",
                    &format!("not reachable at {}", client.base_url()),
                    "Start it with: ollama serve",
                );
            }
            match client.list_models().await {
                Ok(models) if models.iter().any(|m| m == &settings.llm.default_model) => {
                    CheckResult::ok("Ollama", &format!("{} model(s) available", models.len()))
                }
                Ok(models) => CheckResult::warning(
                    "Ollama",
                    &format!(
                        "{} model(s) available, default {} missing",
                        models.len(),
                        settings.llm.default_model
                    ),
                    &format!("Pull it with: ollama pull {}", settings.llm.default_model),
                ),
                Err(e) => CheckResult::warning("Ollama", &format!("cannot list models: {}", e), "Check the server logs"),
            }
        }
        LlmProvider::OpenAI => check_openai_api_key(),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    [
        ("Data directory", settings.data_dir()),
        ("Temp directory", settings.temp_dir()),
        ("Output directory", settings.output_dir()),
    ]
    .into_iter()
    .map(|(name, dir)| {
        if dir.is_dir() {
            CheckResult::ok(name, &format!("{}", dir.display()))
        } else {
            CheckResult::warning(
                name,
                &format!("{} (missing)", dir.display()),
                "Create with: podcaster init",
            )
        }
    })
    .collect()
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: podcaster init (or podcaster config edit)",
        )
    }
}

fn check_personas_file(settings: &Settings) -> CheckResult {
    let path = settings.personas_path();
    if !path.exists() {
        return CheckResult::error(
            "Personas",
            &format!("{} not found", path.display()),
            "Create a starter cast with: podcaster init",
        );
    }
    match load_personas(&path) {
        Ok(personas) => {
            let missing_voices = personas.iter().filter(|p| p.speaker_wav().is_none()).count();
            if missing_voices == 0 {
                CheckResult::ok("Personas", &format!("{} personas", personas.len()))
            } else {
                CheckResult::warning(
                    "Personas",
                    &format!(
                        "{} personas, {} without a speaker WAV",
                        personas.len(),
                        missing_voices
                    ),
                    "Lines from these personas will not be voiced",
                )
            }
        }
        Err(e) => CheckResult::error("Personas", &e.to_string(), "Fix the personas JSON file"),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_missing_tts_environment_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.audio.tts_env_dir = dir.path().join("absent").to_string_lossy().to_string();

        let result = check_tts_environment(&settings);
        assert_eq!(result.status, CheckStatus::Warning);
        assert!(result.hint.unwrap().contains("pip install TTS"));
    }

    #[test]
    fn test_invalid_personas_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.json");
        std::fs::write(&path, r#"[{"name": "Solo", "personality": "p", "stance": "s"}]"#).unwrap();
        let mut settings = Settings::default();
        settings.personas.file = path.to_string_lossy().to_string();

        assert_eq!(check_personas_file(&settings).status, CheckStatus::Error);
    }

    #[tokio::test]
    async fn test_unreachable_ollama_is_an_error() {
        let mut settings = Settings::default();
        settings.llm.base_url = "http://127.0.0.1:9".to_string();
        assert_eq!(check_llm(&settings).await.status, CheckStatus::Error);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("ffmpeg version 6", 50), "ffmpeg version 6");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
