//! Synthesize command - voice a saved transcript offline.

use crate::audio::{mix_clips, resolve_speaker_wavs, speakable_lines, CoquiTts, SpeechSynthesizer};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::conversation::load_transcript;
use crate::persona::{load_personas, Persona};
use std::path::{Path, PathBuf};
use tracing::warn;

/// MP3 written next to the transcript.
pub fn audio_path_for(transcript: &Path) -> PathBuf {
    transcript.with_extension("mp3")
}

/// Run the synthesize command.
pub async fn run_synthesize(
    transcript: &str,
    personas: Option<&str>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Synthesize, &settings)?;

    let transcript_path = Settings::expand_path(transcript);
    let personas_path = personas
        .map(Settings::expand_path)
        .unwrap_or_else(|| settings.personas_path());
    let personas = load_personas(&personas_path)?;

    let synthesizer = CoquiTts::from_settings(&settings);
    if let Some(output) =
        synthesize_transcript(&synthesizer, &transcript_path, &personas, &settings).await?
    {
        Output::success(&format!("Audio saved to {}", output.display()));
    }
    Ok(())
}

/// Voice every speakable line of the transcript at `transcript_path` and mix the clips.
///
/// An MP3 left over from an earlier run is removed before anything else, so a transcript
/// with nothing to say never keeps stale audio. Returns `None` when no clip was produced.
async fn synthesize_transcript(
    synthesizer: &dyn SpeechSynthesizer,
    transcript_path: &Path,
    personas: &[Persona],
    settings: &Settings,
) -> anyhow::Result<Option<PathBuf>> {
    let entries = load_transcript(transcript_path)?;

    let output = audio_path_for(transcript_path);
    if output.exists() {
        std::fs::remove_file(&output)?;
    }

    let wavs = resolve_speaker_wavs(personas);
    let lines = speakable_lines(&entries, &wavs);
    if lines.is_empty() {
        Output::warning("Nothing to synthesize: no line has a speaker with a voice.");
        return Ok(None);
    }

    std::fs::create_dir_all(settings.temp_dir())?;
    let work_dir = tempfile::Builder::new()
        .prefix("podcaster-")
        .tempdir_in(settings.temp_dir())?;

    let pb = Output::progress_bar(lines.len() as u64, "Synthesizing lines");
    let mut clips = Vec::with_capacity(lines.len());
    for line in &lines {
        let clip = work_dir.path().join(format!("line_{}.wav", line.index));
        match synthesizer.synthesize(&line.text, &line.speaker_wav, &clip).await {
            Ok(()) => clips.push(clip),
            Err(e) => warn!("Skipping line {}: {}", line.index, e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if clips.is_empty() {
        Output::warning("No audio clips were generated.");
        return Ok(None);
    }

    let spinner = Output::spinner("Mixing audio...");
    let mixed = mix_clips(
        &clips,
        work_dir.path(),
        settings.audio.silence_seconds,
        settings.audio.sample_rate,
        &output,
    )
    .await;
    spinner.finish_and_clear();
    mixed?;

    Output::info(&format!("Synthesized {}/{} lines", clips.len(), lines.len()));
    Ok(Some(output))
}
