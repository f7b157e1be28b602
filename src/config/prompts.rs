//! Prompt templates for Podcaster.
//!
//! Prompts can be customized by placing a `conversation.toml` file in the custom prompts
//! directory. Templates use `{{variable}}` placeholders.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub conversation: ConversationPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts driving persona turns and interruption bids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationPrompts {
    /// Prompt for a persona holding the floor.
    ///
    /// Variables: name, others, topic, turn, total, personality, stance, background,
    /// relationship, history, last_speaker.
    pub turn: String,
    /// Prompt asking a listener whether to interrupt.
    ///
    /// Variables: name, turn, total, history, speaker, text.
    pub bid: String,
}

impl Default for ConversationPrompts {
    fn default() -> Self {
        Self {
            turn: r#"You are {{name}}. You are on a casual podcast with your friends: {{others}}. This is turn {{turn}} of {{total}}. Your personality is: {{personality}}. Your stance on '{{topic}}': {{stance}}.
{{background}}
The tone is friendly and informal. Avoid formal pleasantries. Just make your point directly.
{{relationship}}

Review the conversation so far and introduce a NEW argument. Don't repeat old points.
Conversation so far:
{{history}}

It's your turn. Address {{last_speaker}} and keep your response to 1-3 sentences. IMPORTANT: You MUST end your entire response with the line 'NEXT_SPEAKER: [name]', choosing a name from {{others}}. Do not add any other text after this line."#
                .to_string(),

            bid: r#"You are {{name}}. This is turn {{turn}} of {{total}}. Decide if you should interrupt.
Conversation so far:
{{history}}

{{speaker}} is about to say:
"{{text}}"

Respond with ONLY JSON. Example: {'importance': 8, 'interrupt_after_word': 'tech', 'interruption_text': 'Wait!'}
If not interrupting: {'importance': 1, 'interrupt_after_word': '', 'interruption_text': ''}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let conversation_path = custom_path.join("conversation.toml");
            if conversation_path.exists() {
                let content = std::fs::read_to_string(&conversation_path)?;
                prompts.conversation = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass over the template: placeholders inside substituted
    /// values stay as they are, and unknown placeholders are kept verbatim.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.conversation.turn.contains("NEXT_SPEAKER"));
        assert!(prompts.conversation.bid.contains("interrupt_after_word"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("text".to_string(), "I say {{name}}".to_string());
        vars.insert("a".to_string(), "1".to_string());
        vars.insert("b".to_string(), "2".to_string());

        for _ in 0..50 {
            assert_eq!(
                Prompts::render("{{name}}: {{text}} {{missing}}", &vars),
                "Alice: I say {{name}} {{missing}}"
            );
        }
    }

    #[test]
    fn test_render_leaves_json_braces_alone() {
        let prompts = Prompts::default();
        let rendered = prompts.render_with_custom(&prompts.conversation.bid, &HashMap::new());
        assert!(rendered.contains("{'importance': 8"));
    }

    #[test]
    fn test_custom_variables_are_overridden_by_call_site() {
        let mut custom = HashMap::new();
        custom.insert("show".to_string(), "Late Night".to_string());
        custom.insert("name".to_string(), "ignored".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Ada".to_string());
        let rendered = prompts.render_with_custom("{{name}} on {{show}}", &vars);
        assert_eq!(rendered, "Ada on Late Night");
    }

    #[test]
    fn test_load_custom_conversation_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("conversation.toml"),
            "turn = \"Speak, {{name}}.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.conversation.turn, "Speak, {{name}}.");
        // Unspecified templates fall back to defaults
        assert!(prompts.conversation.bid.contains("Decide if you should interrupt"));
    }
}
