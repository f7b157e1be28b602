//! Multi-persona conversation engine.

mod analytics;
mod bid;
mod character;
mod podcast;
mod transcript;

pub use analytics::{Analytics, SpeakerStats};
pub use bid::{select_winner, InterruptionBid};
pub use character::Character;
pub use podcast::{Podcast, PodcastConfig, PodcastEvent, PodcastOutcome, MODERATOR};
pub use transcript::{load_transcript, output_stem, save_transcript, TranscriptEntry, TranscriptLog};
