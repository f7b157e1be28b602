//! Podcaster - AI podcast generation
//!
//! A CLI tool that records a podcast between AI personas. Each persona runs on a language
//! model, competes for the floor by bidding to interrupt, and can be voiced with a cloned
//! voice while the conversation is still going.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `persona` - Persona loading and validation
//! - `text` - Cleaning and parsing of model output
//! - `llm` - Language model backends (Ollama, OpenAI)
//! - `conversation` - The turn engine, bids, transcript and analytics
//! - `audio` - Per-line TTS and ffmpeg mixing
//!
//! # Example
//!
//! ```rust,no_run
//! use podcaster::config::{Prompts, Settings};
//! use podcaster::conversation::{Podcast, PodcastConfig};
//! use podcaster::llm::create_model;
//! use podcaster::persona::load_personas;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let personas = load_personas(&settings.personas_path())?;
//!     let model = create_model(&settings)?;
//!     let config = PodcastConfig::from_settings(&settings, "space elevators");
//!
//!     let outcome = Podcast::new(config, personas, model, Prompts::default())?
//!         .run()
//!         .await?;
//!     println!("Saved {}", outcome.transcript_path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod persona;
pub mod text;

pub use error::{PodcastError, Result};
