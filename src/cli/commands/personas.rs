//! Personas command - show the configured cast.

use crate::cli::output::content_preview;
use crate::cli::Output;
use crate::persona::load_personas;
use console::style;
use std::path::Path;

/// List every persona with its model, voice and relationships.
pub fn run_personas(path: &Path) -> anyhow::Result<()> {
    let personas = load_personas(path)?;

    Output::header(&format!("Personas ({})", personas.len()));
    Output::kv("File", &path.display().to_string());

    for persona in &personas {
        println!();
        println!("{}", style(&persona.name).bold().cyan());
        Output::kv("Personality", &content_preview(&persona.personality, 80));
        Output::kv("Stance", &content_preview(&persona.stance, 80));
        if !persona.background.is_empty() {
            Output::kv("Background", &content_preview(&persona.background, 80));
        }
        Output::kv("Model", &persona.model);

        let voice = match persona.speaker_wav() {
            Some(wav) => wav.display().to_string(),
            None if persona.speaker_wav_path.is_empty() => {
                style("none (lines will not be voiced)").yellow().to_string()
            }
            None => style(format!("{} (missing)", persona.speaker_wav_path))
                .yellow()
                .to_string(),
        };
        Output::kv("Voice", &voice);

        let mut relationships: Vec<_> = persona.relationships.iter().collect();
        relationships.sort();
        for (other, relation) in relationships {
            Output::list_item(&format!("{}: {}", other, relation));
        }
    }

    Ok(())
}
