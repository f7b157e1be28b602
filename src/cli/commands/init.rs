//! Init command - first-run provisioning.
//!
//! Creates the data, temp and output directories, the configuration file and a starter
//! personas file. Running it again only reports what already exists.

use crate::cli::Output;
use crate::config::Settings;
use crate::persona::Persona;
use console::style;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What provisioning did with one path.
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioned {
    Created(PathBuf),
    Existing(PathBuf),
}

impl Provisioned {
    fn report(&self, label: &str) {
        match self {
            Provisioned::Created(path) => {
                Output::success(&format!("Created {}: {}", label, path.display()))
            }
            Provisioned::Existing(path) => {
                Output::info(&format!("{} exists: {}", label, path.display()))
            }
        }
    }
}

/// Create every directory that does not exist yet. Stops at the first failure.
pub fn provision_directories(dirs: &[PathBuf]) -> std::io::Result<Vec<Provisioned>> {
    let mut results = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if dir.is_dir() {
            results.push(Provisioned::Existing(dir.clone()));
        } else {
            std::fs::create_dir_all(dir)?;
            results.push(Provisioned::Created(dir.clone()));
        }
    }
    Ok(results)
}

/// Write `settings` to `path` unless a config file is already there.
pub fn provision_config(settings: &Settings, path: &Path) -> anyhow::Result<Provisioned> {
    if path.exists() {
        return Ok(Provisioned::Existing(path.to_path_buf()));
    }
    settings.save_to(&path.to_path_buf())?;
    Ok(Provisioned::Created(path.to_path_buf()))
}

/// Write the starter cast to `path` unless a personas file is already there.
pub fn provision_personas(path: &Path) -> anyhow::Result<Provisioned> {
    if path.exists() {
        return Ok(Provisioned::Existing(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&starter_personas())?;
    std::fs::write(path, json)?;
    Ok(Provisioned::Created(path.to_path_buf()))
}

fn starter_personas() -> Vec<Persona> {
    let mut host = Persona::new(
        "Maya",
        "curious and warm, asks sharp follow-up questions",
        "optimistic but wants evidence",
    );
    host.age = 34;
    host.gender = "female".to_string();
    host.background = "science journalist".to_string();
    host.relationships = HashMap::from([(
        "Victor".to_string(),
        "old friend who loves to argue with her".to_string(),
    )]);

    let mut guest = Persona::new(
        "Victor",
        "blunt, dry humour, plays devil's advocate",
        "deeply sceptical",
    );
    guest.age = 52;
    guest.gender = "male".to_string();
    guest.background = "retired engineer".to_string();
    guest.relationships = HashMap::from([(
        "Maya".to_string(),
        "respects her but thinks she is too trusting".to_string(),
    )]);

    vec![host, guest]
}

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Podcaster Setup");
    println!();

    println!("{}", style("Step 1: Directories").bold().cyan());
    let dirs = [settings.data_dir(), settings.temp_dir(), settings.output_dir()];
    let labels = ["data directory", "temp directory", "output directory"];
    for (result, label) in provision_directories(&dirs)?.iter().zip(labels) {
        result.report(label);
    }
    println!();

    println!("{}", style("Step 2: Configuration file").bold().cyan());
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    provision_config(settings, config_path)?.report("config file");
    println!();

    println!("{}", style("Step 3: Personas").bold().cyan());
    provision_personas(&settings.personas_path())?.report("personas file");
    println!();

    println!("{}", style("Step 4: TTS environment").bold().cyan());
    let env_dir = settings.tts_env_dir();
    if env_dir.is_dir() {
        Output::info(&format!("TTS environment exists: {}", env_dir.display()));
    } else {
        Output::warning(&format!(
            "TTS environment {} is missing. Audio generation needs it:",
            env_dir.display()
        ));
        println!(
            "  {}",
            style(format!(
                "python3 -m venv {0} && {0}/bin/pip install TTS",
                env_dir.display()
            ))
            .green()
        );
    }
    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("podcaster doctor").cyan());
    println!("  {} Review the cast", style("podcaster personas").cyan());
    println!(
        "  {} Record your first show",
        style("podcaster generate --topic \"<topic>\"").cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::load_personas;

    #[test]
    fn test_provisioning_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let dirs = vec![root.path().join("data"), root.path().join("tmp/audio")];

        let first = provision_directories(&dirs).unwrap();
        assert!(first.iter().all(|p| matches!(p, Provisioned::Created(_))));

        let second = provision_directories(&dirs).unwrap();
        assert!(second.iter().all(|p| matches!(p, Provisioned::Existing(_))));

        let entries = std::fs::read_dir(root.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_provisioning_stops_at_first_failure() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, "not a dir").unwrap();
        let dirs = vec![blocker.join("sub"), root.path().join("later")];

        assert!(provision_directories(&dirs).is_err());
        assert!(!root.path().join("later").exists());
    }

    #[test]
    fn test_existing_config_is_kept() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").unwrap();

        let result = provision_config(&Settings::default(), &path).unwrap();
        assert_eq!(result, Provisioned::Existing(path.clone()));
        assert!(std::fs::read_to_string(&path).unwrap().contains("debug"));
    }

    #[test]
    fn test_starter_personas_are_loadable() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("personas.json");

        assert!(matches!(provision_personas(&path).unwrap(), Provisioned::Created(_)));
        let personas = load_personas(&path).unwrap();
        assert_eq!(personas.len(), 2);
        assert!(personas[0].relationship_with("Victor").is_some());

        assert!(matches!(provision_personas(&path).unwrap(), Provisioned::Existing(_)));
    }
}
