//! Configuration module for Podcaster.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ConversationPrompts, Prompts};
pub use settings::{
    AudioSettings, ConversationSettings, GeneralSettings, LlmProvider, LlmSettings,
    PersonaSettings, PromptSettings, Settings,
};
