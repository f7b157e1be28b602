//! The podcast engine.
//!
//! A podcast is a fixed number of turns. On each turn the floor holder drafts a reply, every
//! other guest bids concurrently to interrupt it, and the floor passes either to the winning
//! interrupter or to whoever the speaker nominated. A director can inject moderator lines
//! between turns, and every recorded line can be voiced in the background.

use super::analytics::Analytics;
use super::bid::{select_winner, InterruptionBid};
use super::character::Character;
use super::transcript::{output_stem, save_transcript, TranscriptEntry, TranscriptLog};
use crate::audio::AudioPipeline;
use crate::config::{Prompts, Settings};
use crate::error::{PodcastError, Result};
use crate::llm::LanguageModel;
use crate::persona::{validate_personas, Persona};
use crate::text::{normalize_name, parse_next_speaker, strip_next_speaker, truncate_after_word};
use chrono::Local;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Speaker name for the opening line and director injections.
pub const MODERATOR: &str = "Moderator";

/// Progress notifications for front ends.
#[derive(Debug, Clone, PartialEq)]
pub enum PodcastEvent {
    TurnStarted {
        turn: usize,
        total: usize,
        speaker: String,
    },
    /// The director's message was read out by the moderator.
    DirectorInjection(String),
    Line(TranscriptEntry),
    Interruption {
        interrupter: String,
        interrupted: String,
    },
    Finished,
}

/// Parameters for one podcast session.
#[derive(Debug, Clone)]
pub struct PodcastConfig {
    pub topic: String,
    pub turns: usize,
    pub interruption_threshold: i64,
    pub history_window: usize,
    pub debug_bids: bool,
    pub output_dir: PathBuf,
    pub transcript_log: Option<PathBuf>,
}

impl PodcastConfig {
    /// Session config from settings, for `topic`.
    pub fn from_settings(settings: &Settings, topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            turns: settings.conversation.turns,
            interruption_threshold: settings.conversation.interruption_threshold,
            history_window: settings.conversation.history_window,
            debug_bids: false,
            output_dir: settings.output_dir(),
            transcript_log: Some(settings.transcript_log_path()),
        }
    }
}

/// Result of a finished session.
#[derive(Debug)]
pub struct PodcastOutcome {
    pub transcript: Vec<TranscriptEntry>,
    pub analytics: Analytics,
    pub transcript_path: PathBuf,
    pub audio_path: Option<PathBuf>,
}

/// A podcast session.
pub struct Podcast {
    config: PodcastConfig,
    characters: Vec<Character>,
    transcript: Vec<TranscriptEntry>,
    history: Vec<String>,
    analytics: Analytics,
    log: Option<TranscriptLog>,
    events: Option<mpsc::UnboundedSender<PodcastEvent>>,
    director: Option<mpsc::Receiver<String>>,
    audio: Option<AudioPipeline>,
    rng: StdRng,
}

impl Podcast {
    pub fn new(
        config: PodcastConfig,
        personas: Vec<Persona>,
        model: Arc<dyn LanguageModel>,
        prompts: Prompts,
    ) -> Result<Self> {
        validate_personas(&personas)?;
        if config.topic.trim().is_empty() {
            return Err(PodcastError::InvalidInput("topic must not be empty".to_string()));
        }

        let prompts = Arc::new(prompts);
        let characters = personas
            .iter()
            .map(|p| {
                Character::new(p.clone(), &personas, &config.topic, model.clone(), prompts.clone())
                    .with_history_window(config.history_window)
                    .with_debug_bids(config.debug_bids)
            })
            .collect();
        let analytics = Analytics::new(personas.iter().map(|p| p.name.clone()));
        let log = config.transcript_log.clone().map(TranscriptLog::new);

        Ok(Self {
            config,
            characters,
            transcript: Vec::new(),
            history: Vec::new(),
            analytics,
            log,
            events: None,
            director: None,
            audio: None,
            rng: StdRng::from_entropy(),
        })
    }

    /// Send progress events to `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<PodcastEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Accept live director injections from `director`.
    pub fn with_director(mut self, director: mpsc::Receiver<String>) -> Self {
        self.director = Some(director);
        self
    }

    /// Voice every line through `audio`.
    pub fn with_audio(mut self, audio: AudioPipeline) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Make speaker fallbacks reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn emit(&self, event: PodcastEvent) {
        if let Some(events) = &self.events {
            // A closed receiver only means nobody is watching.
            let _ = events.send(event);
        }
    }

    async fn record(&mut self, speaker: &str, line: &str) {
        let entry = TranscriptEntry::now(speaker, line);
        let index = self.transcript.len();

        self.history.push(entry.history_line());
        self.analytics.record_line(speaker, line);
        if let Some(log) = &self.log {
            if let Err(e) = log.append(&entry).await {
                warn!("Could not append to {}: {}", log.path().display(), e);
            }
        }
        if let Some(audio) = &mut self.audio {
            audio.schedule(index, speaker, line);
        }

        self.emit(PodcastEvent::Line(entry.clone()));
        self.transcript.push(entry);
    }

    fn next_injection(&mut self) -> Option<String> {
        let director = self.director.as_mut()?;
        while let Ok(message) = director.try_recv() {
            let message = message.trim().to_string();
            if !message.is_empty() {
                return Some(message);
            }
        }
        None
    }

    /// A random guest other than `current`.
    fn random_other(&mut self, current: usize) -> usize {
        let others: Vec<usize> = (0..self.characters.len()).filter(|i| *i != current).collect();
        *others.choose(&mut self.rng).unwrap_or(&current)
    }

    /// Floor holder after an uninterrupted reply.
    fn resolve_nomination(&mut self, current: usize, response: &str) -> usize {
        let Some(candidate) = parse_next_speaker(response) else {
            warn!("No next speaker nominated. Choosing randomly.");
            return self.random_other(current);
        };

        let wanted = normalize_name(&candidate);
        match self
            .characters
            .iter()
            .position(|c| normalize_name(c.name()) == wanted)
        {
            Some(idx) if idx != current => idx,
            _ => {
                warn!("Nominated speaker '{}' invalid. Choosing randomly.", candidate);
                self.random_other(current)
            }
        }
    }

    async fn gather_bids(
        &self,
        current: usize,
        text: &str,
        turn: usize,
    ) -> Vec<InterruptionBid> {
        let speaker = self.characters[current].name();
        let total = self.config.turns;
        let history = &self.history;

        let bids = join_all(
            self.characters
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != current)
                .map(|(_, c)| c.bid_for_interruption(speaker, text, history, turn, total)),
        )
        .await;
        info!("All {} bids received", bids.len());
        bids.into_iter().flatten().collect()
    }

    /// Run the session to completion and save the transcript.
    #[instrument(skip(self), fields(topic = %self.config.topic))]
    pub async fn run(mut self) -> Result<PodcastOutcome> {
        let stem = output_stem(&self.config.topic, &Local::now());
        let total = self.config.turns;

        info!("Podcast starting");
        let welcome = format!("Welcome! Today's topic is: {}.", self.config.topic);
        self.record(MODERATOR, &welcome).await;

        let mut current = 0;
        for turn in 1..=total {
            if let Some(injection) = self.next_injection() {
                info!("Turn {}/{} (director's intervention as moderator)", turn, total);
                self.emit(PodcastEvent::DirectorInjection(injection.clone()));
                self.record(MODERATOR, &injection).await;
            } else {
                info!("Turn {}/{} (floor: {})", turn, total, self.characters[current].name());
            }
            self.emit(PodcastEvent::TurnStarted {
                turn,
                total,
                speaker: self.characters[current].name().to_string(),
            });

            let response = match self.characters[current]
                .generate_full_response(&self.history, turn, total)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!("{} could not speak: {}", self.characters[current].name(), e);
                    current = self.random_other(current);
                    continue;
                }
            };
            let spoken = strip_next_speaker(&response);

            let bids = self.gather_bids(current, &spoken, turn).await;
            let speaker = self.characters[current].name().to_string();

            match select_winner(bids, self.config.interruption_threshold) {
                Some(winner) => {
                    info!("Interruption by {}", winner.interrupter);
                    let cut = truncate_after_word(&spoken, &winner.interrupt_after_word)
                        .unwrap_or(spoken);
                    self.record(&speaker, &cut).await;
                    self.record(&winner.interrupter, &winner.interruption_text).await;
                    self.analytics.record_interruption(&winner.interrupter);
                    self.emit(PodcastEvent::Interruption {
                        interrupter: winner.interrupter.clone(),
                        interrupted: speaker,
                    });
                    current = self
                        .characters
                        .iter()
                        .position(|c| c.name() == winner.interrupter)
                        .unwrap_or(current);
                }
                None => {
                    self.record(&speaker, &spoken).await;
                    current = self.resolve_nomination(current, &response);
                }
            }
        }

        let audio_path = match self.audio.take() {
            Some(audio) => {
                let output = self.config.output_dir.join(format!("{}.mp3", stem));
                match audio.finalize(&output).await {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("Error combining audio files: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        let transcript_path = self.config.output_dir.join(format!("{}.json", stem));
        save_transcript(&self.transcript, &transcript_path)?;
        info!("Transcript saved to {}", transcript_path.display());
        self.emit(PodcastEvent::Finished);

        Ok(PodcastOutcome {
            transcript: self.transcript,
            analytics: self.analytics,
            transcript_path,
            audio_path,
        })
    }
}
