//! Generate command - record a podcast.

use crate::audio::{resolve_speaker_wavs, AudioPipeline, CoquiTts};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{LlmProvider, Prompts, Settings};
use crate::conversation::{Podcast, PodcastConfig, PodcastEvent};
use crate::llm::{create_model, OllamaClient};
use crate::persona::load_personas;
use console::style;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Command-line overrides for one recording.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub topic: String,
    pub turns: Option<usize>,
    pub timeout: Option<u64>,
    pub debug_bids: bool,
    pub generate_audio: bool,
    pub personas: Option<String>,
    pub director: bool,
    pub seed: Option<u64>,
}

/// Run the generate command.
pub async fn run_generate(options: GenerateOptions, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(timeout) = options.timeout {
        settings.llm.timeout_seconds = timeout;
    }

    let operation = if options.generate_audio {
        Operation::GenerateWithAudio
    } else {
        Operation::Generate
    };
    preflight::check(operation, &settings)?;

    let personas_path = options
        .personas
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(|| settings.personas_path());
    let personas = load_personas(&personas_path)?;

    if settings.llm.provider == LlmProvider::Ollama {
        let spinner = Output::spinner("Connecting to Ollama...");
        let client = OllamaClient::new(&settings.llm.base_url, Duration::from_secs(5))?;
        let available = client.is_available().await;
        spinner.finish_and_clear();
        if !available {
            anyhow::bail!(
                "Ollama is not reachable at {}. Start it with: ollama serve",
                client.base_url()
            );
        }
    }

    let model = create_model(&settings)?;
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let mut config = PodcastConfig::from_settings(&settings, &options.topic);
    if let Some(turns) = options.turns {
        config.turns = turns;
    }
    config.debug_bids = options.debug_bids;

    Output::header(&format!("Podcast: {}", options.topic));
    Output::kv(
        "Guests",
        &personas
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );
    Output::kv("Turns", &config.turns.to_string());
    Output::kv("Model backend", model.name());
    println!();

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut podcast = Podcast::new(config, personas.clone(), model, prompts)?.with_events(events_tx);

    if let Some(seed) = options.seed {
        podcast = podcast.with_seed(seed);
    }

    if options.generate_audio {
        let synthesizer = Arc::new(CoquiTts::from_settings(&settings));
        let wavs = resolve_speaker_wavs(&personas);
        if wavs.is_empty() {
            Output::warning("No persona has a usable speaker WAV. No audio will be produced.");
        }
        let pipeline = AudioPipeline::in_temp_dir(synthesizer, &settings.temp_dir(), wavs, &settings.audio)?;
        podcast = podcast.with_audio(pipeline);
    }

    if options.director {
        Output::info("Director mode: type a line and press Enter to have the moderator say it.");
        podcast = podcast.with_director(spawn_director_reader());
    }

    let printer = tokio::spawn(print_events(events_rx));
    let outcome = podcast.run().await?;
    // The podcast owned the only sender, so the printer drains and stops.
    let _ = printer.await;

    Output::analytics(&outcome.analytics);
    println!();
    Output::success(&format!(
        "Transcript saved to {}",
        outcome.transcript_path.display()
    ));
    if let Some(audio) = &outcome.audio_path {
        Output::success(&format!("Audio saved to {}", audio.display()));
    } else if options.generate_audio {
        Output::warning("No audio was produced.");
    }

    Ok(())
}

/// Forward stdin lines to the podcast.
///
/// Runs on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_director_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn print_events(mut events: mpsc::UnboundedReceiver<PodcastEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            PodcastEvent::TurnStarted {
                turn,
                total,
                speaker,
            } => {
                println!(
                    "{}",
                    style(format!("--- Turn {}/{}: {} ---", turn, total, speaker)).dim()
                );
            }
            PodcastEvent::DirectorInjection(message) => {
                debug!("Director injected: {}", message);
            }
            PodcastEvent::Line(entry) => Output::transcript_line(&entry),
            PodcastEvent::Interruption {
                interrupter,
                interrupted,
            } => {
                println!(
                    "{}",
                    style(format!("!!! {} interrupts {} !!!", interrupter, interrupted))
                        .yellow()
                        .bold()
                );
            }
            PodcastEvent::Finished => {
                println!("{}", style("--- End of podcast ---").dim());
            }
        }
    }
}
