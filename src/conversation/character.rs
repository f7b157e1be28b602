//! A persona taking part in the conversation.

use super::bid::InterruptionBid;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::persona::Persona;
use crate::text::{extract_json_object, strip_speaker_prefix};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Name used to address the audience when nobody has spoken yet.
const DEFAULT_ADDRESSEE: &str = "the moderator";

/// Last `window` history lines joined for a prompt.
fn recent_history(history: &[String], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..].join("\n")
}

/// Speaker of the most recent history line.
fn last_speaker(history: &[String]) -> String {
    history
        .last()
        .and_then(|line| line.split(':').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ADDRESSEE.to_string())
}

/// One guest: persona plus the model connection it talks through.
pub struct Character {
    persona: Persona,
    others: Vec<String>,
    topic: String,
    model: Arc<dyn LanguageModel>,
    prompts: Arc<Prompts>,
    history_window: usize,
    debug_bids: bool,
}

impl Character {
    pub fn new(
        persona: Persona,
        all_personas: &[Persona],
        topic: &str,
        model: Arc<dyn LanguageModel>,
        prompts: Arc<Prompts>,
    ) -> Self {
        let others = all_personas
            .iter()
            .filter(|p| p.name != persona.name)
            .map(|p| p.name.clone())
            .collect();
        Self {
            persona,
            others,
            topic: topic.to_string(),
            model,
            prompts,
            history_window: 15,
            debug_bids: false,
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_debug_bids(mut self, debug_bids: bool) -> Self {
        self.debug_bids = debug_bids;
        self
    }

    pub fn name(&self) -> &str {
        &self.persona.name
    }

    /// Prompt for taking the floor on turn `turn` of `total`.
    pub fn turn_prompt(&self, history: &[String], turn: usize, total: usize) -> String {
        let addressee = last_speaker(history);
        let relationship = self
            .persona
            .relationship_with(&addressee)
            .map(|r| {
                format!(
                    "Your defined relationship with {} is: '{}'. Let this influence your tone.",
                    addressee, r
                )
            })
            .unwrap_or_default();
        let background = if self.persona.background.trim().is_empty() {
            String::new()
        } else {
            format!("Your background: {}", self.persona.background.trim())
        };

        let mut vars = HashMap::new();
        vars.insert("name".to_string(), self.persona.name.clone());
        vars.insert("others".to_string(), self.others.join(", "));
        vars.insert("topic".to_string(), self.topic.clone());
        vars.insert("turn".to_string(), turn.to_string());
        vars.insert("total".to_string(), total.to_string());
        vars.insert("personality".to_string(), self.persona.personality.clone());
        vars.insert("stance".to_string(), self.persona.stance.clone());
        vars.insert("background".to_string(), background);
        vars.insert("relationship".to_string(), relationship);
        vars.insert("history".to_string(), recent_history(history, self.history_window));
        vars.insert("last_speaker".to_string(), addressee);

        self.prompts
            .render_with_custom(&self.prompts.conversation.turn, &vars)
    }

    /// Prompt asking whether to interrupt `speaker` before they say `text`.
    pub fn bid_prompt(
        &self,
        speaker: &str,
        text: &str,
        history: &[String],
        turn: usize,
        total: usize,
    ) -> String {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), self.persona.name.clone());
        vars.insert("turn".to_string(), turn.to_string());
        vars.insert("total".to_string(), total.to_string());
        vars.insert("history".to_string(), recent_history(history, self.history_window));
        vars.insert("speaker".to_string(), speaker.to_string());
        vars.insert("text".to_string(), text.to_string());

        self.prompts
            .render_with_custom(&self.prompts.conversation.bid, &vars)
    }

    /// Generate this persona's full reply, including the `NEXT_SPEAKER:` line.
    #[instrument(skip(self, history), fields(persona = %self.persona.name))]
    pub async fn generate_full_response(
        &self,
        history: &[String],
        turn: usize,
        total: usize,
    ) -> Result<String> {
        let prompt = self.turn_prompt(history, turn, total);
        info!("Calling model {} for {}", self.persona.model, self.persona.name);
        let response = self.model.generate(&self.persona.model, &prompt).await?;
        Ok(strip_speaker_prefix(&response, &self.persona.name))
    }

    /// Ask this persona whether it wants to interrupt.
    ///
    /// Model errors and unparseable replies are treated as "no bid".
    #[instrument(skip(self, text, history), fields(persona = %self.persona.name))]
    pub async fn bid_for_interruption(
        &self,
        speaker: &str,
        text: &str,
        history: &[String],
        turn: usize,
        total: usize,
    ) -> Option<InterruptionBid> {
        let prompt = self.bid_prompt(speaker, text, history, turn, total);
        let raw = match self.model.generate(&self.persona.model, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Bid from {} failed: {}", self.persona.name, e);
                return None;
            }
        };

        if self.debug_bids {
            info!("Raw bid from {}: {}", self.persona.name, raw);
        }

        let bid = extract_json_object(&raw)
            .and_then(|value| InterruptionBid::from_value(&value, &self.persona.name));
        if bid.is_none() {
            debug!("Could not parse bid from {}", self.persona.name);
        }
        bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PodcastError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoModel {
        reply: String,
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
            Err(PodcastError::Llm("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn cast() -> Vec<Persona> {
        let mut alice = Persona::new("Alice", "sarcastic", "for");
        alice.relationships.insert("Bob".to_string(), "old rival".to_string());
        alice.model = "alice-model".to_string();
        vec![alice, Persona::new("Bob", "earnest", "against"), Persona::new("Carol", "calm", "neutral")]
    }

    fn character(model: Arc<dyn LanguageModel>) -> Character {
        let personas = cast();
        Character::new(
            personas[0].clone(),
            &personas,
            "electric cars",
            model,
            Arc::new(Prompts::default()),
        )
    }

    #[test]
    fn test_recent_history_window() {
        let history: Vec<String> = (0..20).map(|i| format!("S: line {}", i)).collect();
        let recent = recent_history(&history, 15);
        assert!(recent.starts_with("S: line 5"));
        assert!(recent.ends_with("S: line 19"));
        assert_eq!(recent_history(&[], 15), "");
    }

    #[test]
    fn test_last_speaker() {
        assert_eq!(last_speaker(&[]), "the moderator");
        assert_eq!(last_speaker(&["Bob: hi: there".to_string()]), "Bob");
    }

    #[test]
    fn test_turn_prompt_contents() {
        let model = Arc::new(EchoModel { reply: String::new(), prompts: Mutex::new(Vec::new()) });
        let alice = character(model);
        let history = vec!["Moderator: Welcome!".to_string(), "Bob: Cars are bad.".to_string()];

        let prompt = alice.turn_prompt(&history, 3, 10);
        assert!(prompt.starts_with("You are Alice."));
        assert!(prompt.contains("friends: Bob, Carol"));
        assert!(prompt.contains("turn 3 of 10"));
        assert!(prompt.contains("stance on 'electric cars': for"));
        assert!(prompt.contains("relationship with Bob is: 'old rival'"));
        assert!(prompt.contains("Address Bob"));
        assert!(prompt.contains("Bob: Cars are bad."));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_turn_prompt_without_relationship() {
        let model = Arc::new(EchoModel { reply: String::new(), prompts: Mutex::new(Vec::new()) });
        let alice = character(model);
        let prompt = alice.turn_prompt(&["Carol: Hello".to_string()], 1, 2);
        assert!(!prompt.contains("Your defined relationship"));
        assert!(prompt.contains("Address Carol"));
    }

    #[tokio::test]
    async fn test_generate_strips_own_name_and_uses_persona_model() {
        let model = Arc::new(EchoModel {
            reply: "Alice: Batteries keep improving.\nNEXT_SPEAKER: Bob".to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let alice = character(model.clone());

        let response = alice.generate_full_response(&[], 1, 5).await.unwrap();
        assert_eq!(response, "Batteries keep improving.\nNEXT_SPEAKER: Bob");
        assert_eq!(model.prompts.lock().unwrap()[0].0, "alice-model");
    }

    #[tokio::test]
    async fn test_bid_parsing() {
        let model = Arc::new(EchoModel {
            reply: "{'importance': 8, 'interrupt_after_word': 'cars', 'interruption_text': 'Nope!'}"
                .to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let alice = character(model.clone());

        let bid = alice
            .bid_for_interruption("Bob", "Electric cars are a fad.", &[], 2, 5)
            .await
            .unwrap();
        assert_eq!(bid.importance, 8);
        assert_eq!(bid.interrupter, "Alice");

        let prompt = &model.prompts.lock().unwrap()[0].1;
        assert!(prompt.contains("Bob is about to say:\n\"Electric cars are a fad.\""));
    }

    #[tokio::test]
    async fn test_bid_errors_mean_no_bid() {
        let alice = character(Arc::new(FailingModel));
        assert!(alice.bid_for_interruption("Bob", "text", &[], 1, 1).await.is_none());

        let garbled = Arc::new(EchoModel { reply: "no thanks".to_string(), prompts: Mutex::new(Vec::new()) });
        let alice = character(garbled);
        assert!(alice.bid_for_interruption("Bob", "text", &[], 1, 1).await.is_none());
    }
}
