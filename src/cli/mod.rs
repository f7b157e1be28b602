//! CLI module for Podcaster.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Podcaster - AI podcast generation
///
/// Generates a podcast conversation between AI personas, with optional live
/// voice-cloned audio and a director mode for steering the discussion.
#[derive(Parser, Debug)]
#[command(name = "podcaster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision directories, configuration and a starter personas file
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Generate a podcast conversation
    Generate {
        /// Podcast topic
        #[arg(short, long)]
        topic: String,

        /// Number of turns (defaults to conversation.turns)
        #[arg(short = 'n', long, visible_alias = "num-turns")]
        turns: Option<usize>,

        /// Timeout for AI model calls in seconds (defaults to llm.timeout_seconds)
        #[arg(long)]
        timeout: Option<u64>,

        /// Log raw bid responses for debugging
        #[arg(long)]
        debug_bids: bool,

        /// Generate audio for the podcast while it is being recorded
        #[arg(long)]
        generate_audio: bool,

        /// Personas JSON file (defaults to personas.file)
        #[arg(short, long)]
        personas: Option<String>,

        /// Read director injections from stdin while generating
        #[arg(long)]
        director: bool,

        /// Seed for the random speaker fallback
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Synthesize audio for a saved transcript
    Synthesize {
        /// Transcript JSON file produced by `generate`
        transcript: String,

        /// Personas JSON file (defaults to personas.file)
        #[arg(short, long)]
        personas: Option<String>,
    },

    /// List configured personas
    Personas {
        /// Personas JSON file (defaults to personas.file)
        #[arg(short, long)]
        personas: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "llm.base_url")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
