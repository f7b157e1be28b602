//! Per-speaker conversation statistics.

use crate::text::word_count;
use serde::Serialize;

/// Counters for one speaker.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SpeakerStats {
    pub name: String,
    pub words: usize,
    pub turns: usize,
    pub interruptions: usize,
}

/// Word, turn and interruption counts, in first-seen order.
///
/// Words are counted for every speaker. Turns are only counted for personas, so moderator
/// and director lines never show up as turns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analytics {
    speakers: Vec<SpeakerStats>,
    #[serde(skip)]
    personas: Vec<String>,
}

impl Analytics {
    /// Start with a zeroed row for every persona.
    pub fn new<I, S>(personas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let personas: Vec<String> = personas.into_iter().map(Into::into).collect();
        Self {
            speakers: personas
                .iter()
                .map(|name| SpeakerStats {
                    name: name.clone(),
                    ..Default::default()
                })
                .collect(),
            personas,
        }
    }

    fn entry(&mut self, speaker: &str) -> &mut SpeakerStats {
        if let Some(pos) = self.speakers.iter().position(|s| s.name == speaker) {
            &mut self.speakers[pos]
        } else {
            self.speakers.push(SpeakerStats {
                name: speaker.to_string(),
                ..Default::default()
            });
            let last = self.speakers.len() - 1;
            &mut self.speakers[last]
        }
    }

    /// Account for a recorded line.
    pub fn record_line(&mut self, speaker: &str, line: &str) {
        let is_persona = self.personas.iter().any(|p| p == speaker);
        let stats = self.entry(speaker);
        stats.words += word_count(line);
        if is_persona {
            stats.turns += 1;
        }
    }

    pub fn record_interruption(&mut self, interrupter: &str) {
        self.entry(interrupter).interruptions += 1;
    }

    pub fn speakers(&self) -> &[SpeakerStats] {
        &self.speakers
    }

    pub fn get(&self, speaker: &str) -> Option<&SpeakerStats> {
        self.speakers.iter().find(|s| s.name == speaker)
    }

    pub fn total_words(&self) -> usize {
        self.speakers.iter().map(|s| s.words).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personas_start_at_zero() {
        let analytics = Analytics::new(["Alice", "Bob"]);
        assert_eq!(analytics.speakers().len(), 2);
        assert_eq!(analytics.get("Bob").unwrap().words, 0);
    }

    #[test]
    fn test_moderator_words_but_no_turns() {
        let mut analytics = Analytics::new(["Alice", "Bob"]);
        analytics.record_line("Moderator", "Welcome to the show");
        analytics.record_line("Alice", "Thanks for having me");
        analytics.record_line("Alice", "Really");

        let moderator = analytics.get("Moderator").unwrap();
        assert_eq!(moderator.words, 4);
        assert_eq!(moderator.turns, 0);

        let alice = analytics.get("Alice").unwrap();
        assert_eq!(alice.words, 5);
        assert_eq!(alice.turns, 2);
        assert_eq!(analytics.total_words(), 9);
    }

    #[test]
    fn test_interruptions() {
        let mut analytics = Analytics::new(["Alice", "Bob"]);
        analytics.record_interruption("Bob");
        analytics.record_interruption("Bob");
        assert_eq!(analytics.get("Bob").unwrap().interruptions, 2);
        assert_eq!(analytics.get("Alice").unwrap().interruptions, 0);
    }
}
