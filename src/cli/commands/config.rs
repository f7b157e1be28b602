//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = set_value(&settings, key, value)?;
            updated.save_to(&config_path.to_path_buf())?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path.to_path_buf())?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Return a copy of `settings` with the dotted `key` set to `raw`.
///
/// An existing entry keeps its type, so mistyped values are rejected instead of being
/// written to disk. Unset optional keys are inserted as strings and accepted only if
/// they survive a round trip through [`Settings`].
fn set_value(settings: &Settings, key: &str, raw: &str) -> Result<Settings> {
    let mut root = toml::Value::try_from(settings).context("Failed to serialize config")?;

    let (section, leaf) = match key.rsplit_once('.') {
        Some((section, leaf)) => (Some(section), leaf),
        None => (None, key),
    };
    let mut table = &mut root;
    for part in section.into_iter().flat_map(|s| s.split('.')) {
        table = match table.get_mut(part) {
            Some(child) => child,
            None => bail!("Unknown config key: {}", key),
        };
    }
    let Some(table) = table.as_table_mut() else {
        bail!("Unknown config key: {}", key);
    };

    let value = match table.get(leaf) {
        None => toml::Value::String(raw.to_string()),
        Some(toml::Value::String(_)) => toml::Value::String(raw.to_string()),
        Some(toml::Value::Integer(_)) => toml::Value::Integer(
            raw.parse()
                .with_context(|| format!("{} expects an integer", key))?,
        ),
        Some(toml::Value::Float(_)) => toml::Value::Float(
            raw.parse()
                .with_context(|| format!("{} expects a number", key))?,
        ),
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(
            raw.parse()
                .with_context(|| format!("{} expects true or false", key))?,
        ),
        Some(_) => bail!("{} is a section, set one of its keys instead", key),
    };
    table.insert(leaf.to_string(), value);

    let updated: Settings = root
        .try_into()
        .with_context(|| format!("Invalid value for {}: {}", key, raw))?;

    // Keys serde does not know about are silently dropped on the way back.
    let check = toml::Value::try_from(&updated).context("Failed to serialize config")?;
    let mut node = Some(&check);
    for part in key.split('.') {
        node = node.and_then(|n| n.get(part));
    }
    if node.is_none() {
        bail!("Unknown config key: {}", key);
    }

    Ok(updated)
}
