//! Live audio generation alongside the conversation.
//!
//! Every recorded line is handed to [`AudioPipeline::schedule`], which synthesizes it in the
//! background while the conversation moves on. [`AudioPipeline::finalize`] waits for every
//! clip and mixes them into a single MP3.

use super::mixer::{concat_to_mp3, generate_silence, write_concat_list};
use super::tts::SpeechSynthesizer;
use crate::config::AudioSettings;
use crate::conversation::TranscriptEntry;
use crate::error::Result;
use crate::persona::Persona;
use crate::text::clean_text_for_tts;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// A synthesized line.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Position of the line in the transcript.
    pub index: usize,
    pub path: PathBuf,
}

/// Map persona names to their reference voices, warning about the silent ones.
pub fn resolve_speaker_wavs(personas: &[Persona]) -> HashMap<String, PathBuf> {
    let mut wavs = HashMap::new();
    for persona in personas {
        match persona.speaker_wav() {
            Some(path) => {
                wavs.insert(persona.name.clone(), path);
            }
            None => warn!(
                "WAV path for {} not found or not specified. They will be silent.",
                persona.name
            ),
        }
    }
    wavs
}

/// A transcript line that can be spoken: index, speaker voice and cleaned text.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakableLine {
    pub index: usize,
    pub speaker_wav: PathBuf,
    pub text: String,
}

/// Lines of a saved transcript worth synthesizing.
///
/// Moderator lines, incomplete entries, speakers without a voice and lines that are empty
/// after cleaning are skipped.
pub fn speakable_lines(
    entries: &[TranscriptEntry],
    speaker_wavs: &HashMap<String, PathBuf>,
) -> Vec<SpeakableLine> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.speaker.is_empty() && !e.line.is_empty() && e.speaker != "Moderator")
        .filter_map(|(index, entry)| {
            let Some(wav) = speaker_wavs.get(&entry.speaker) else {
                warn!("No speaker wav found for {}. Skipping line.", entry.speaker);
                return None;
            };
            let text = clean_text_for_tts(&entry.line);
            if text.is_empty() {
                return None;
            }
            Some(SpeakableLine {
                index,
                speaker_wav: wav.clone(),
                text,
            })
        })
        .collect()
}

/// Background TTS for a running podcast.
pub struct AudioPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    work_dir: PathBuf,
    speaker_wavs: HashMap<String, PathBuf>,
    tasks: JoinSet<Option<Clip>>,
    permits: Arc<Semaphore>,
    silence_seconds: f64,
    sample_rate: u32,
    /// Scratch directory removed once the pipeline is dropped.
    _scratch: Option<TempDir>,
}

impl AudioPipeline {
    /// Create a pipeline writing clips into `work_dir`.
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        work_dir: PathBuf,
        speaker_wavs: HashMap<String, PathBuf>,
        settings: &AudioSettings,
    ) -> Result<Self> {
        std::fs::create_dir_all(&work_dir)?;
        Ok(Self {
            synthesizer,
            work_dir,
            speaker_wavs,
            tasks: JoinSet::new(),
            permits: Arc::new(Semaphore::new(settings.max_concurrent.max(1))),
            silence_seconds: settings.silence_seconds,
            sample_rate: settings.sample_rate,
            _scratch: None,
        })
    }

    /// Create a pipeline writing clips into a fresh directory under `parent`.
    ///
    /// The directory and its clips are deleted when the pipeline is dropped, which
    /// [`AudioPipeline::finalize`] does once the MP3 is written.
    pub fn in_temp_dir(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        parent: &Path,
        speaker_wavs: HashMap<String, PathBuf>,
        settings: &AudioSettings,
    ) -> Result<Self> {
        std::fs::create_dir_all(parent)?;
        let scratch = tempfile::Builder::new()
            .prefix("podcaster-")
            .tempdir_in(parent)?;
        debug!("Audio work dir: {}", scratch.path().display());
        let mut pipeline = Self::new(
            synthesizer,
            scratch.path().to_path_buf(),
            speaker_wavs,
            settings,
        )?;
        pipeline._scratch = Some(scratch);
        Ok(pipeline)
    }

    /// Number of clips still being synthesized or waiting to be collected.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Queue synthesis of transcript line `index`. Must be called inside a tokio runtime.
    pub fn schedule(&mut self, index: usize, speaker: &str, line: &str) {
        let Some(wav) = self.speaker_wavs.get(speaker).cloned() else {
            debug!("Skipped: no WAV path for {}", speaker);
            return;
        };
        let text = clean_text_for_tts(line);
        if text.is_empty() {
            debug!("Skipped: line for {} was empty after cleaning", speaker);
            return;
        }

        let output = self.work_dir.join(format!("line_{}.wav", index));
        let synthesizer = self.synthesizer.clone();
        let permits = self.permits.clone();
        let speaker = speaker.to_string();

        self.tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok()?;
            info!("Generating audio for {}", speaker);
            match synthesizer.synthesize(&text, &wav, &output).await {
                Ok(()) => Some(Clip { index, path: output }),
                Err(e) => {
                    warn!("TTS generation failed for {}: {}", speaker, e);
                    None
                }
            }
        });
    }

    /// Wait for every scheduled clip and return the successful ones in transcript order.
    pub async fn collect_clips(&mut self) -> Vec<Clip> {
        let mut clips = Vec::new();
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Some(clip)) => clips.push(clip),
                Ok(None) => {}
                Err(e) => warn!("TTS task failed: {}", e),
            }
        }
        clips.sort_by_key(|c| c.index);
        clips
    }

    /// Wait for all clips and mix them into `output`.
    ///
    /// Returns `None` when no clip was generated.
    pub async fn finalize(mut self, output: &Path) -> Result<Option<PathBuf>> {
        let clips = self.collect_clips().await;
        info!("Finalizing audio: combining {} clips", clips.len());
        if clips.is_empty() {
            warn!("No audio clips were generated");
            return Ok(None);
        }

        let paths: Vec<PathBuf> = clips.into_iter().map(|c| c.path).collect();
        mix_clips(
            &paths,
            &self.work_dir,
            self.silence_seconds,
            self.sample_rate,
            output,
        )
        .await?;
        Ok(Some(output.to_path_buf()))
    }
}

/// Join clips with pauses into an MP3. A failed silence clip only drops the pauses.
pub async fn mix_clips(
    clips: &[PathBuf],
    work_dir: &Path,
    silence_seconds: f64,
    sample_rate: u32,
    output: &Path,
) -> Result<()> {
    let silence_path = work_dir.join("silence.wav");
    let silence = match generate_silence(&silence_path, silence_seconds, sample_rate).await {
        Ok(()) => Some(silence_path),
        Err(e) => {
            warn!("Error generating silence clip: {}. Pauses will not be added.", e);
            None
        }
    };

    let list_path = work_dir.join("file_list.txt");
    write_concat_list(clips, silence.as_deref(), &list_path)?;
    concat_to_mp3(&list_path, output).await?;
    info!("Podcast audio written to {}", output.display());
    Ok(())
}
