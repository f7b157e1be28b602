//! Text utilities for model responses and TTS input.
//!
//! Model output is loosely structured: persona replies end with a `NEXT_SPEAKER:` line and
//! bids are "JSON-ish" objects. These helpers turn that output into something the
//! conversation engine and the speech synthesizer can rely on.

use regex::Regex;
use std::sync::LazyLock;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("Invalid regex"));
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("Invalid regex"));
static NON_SPEECH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s.,!?-]").expect("Invalid regex"));
static NEXT_SPEAKER_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)NEXT_SPEAKER:.*").expect("Invalid regex"));
static NEXT_SPEAKER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)NEXT_SPEAKER:\s*\[?([^\n]*?)\]?\s*\z").expect("Invalid regex")
});
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("Invalid regex"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("Invalid regex"));

/// Collapse runs of whitespace into single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prepare a transcript line for speech synthesis.
///
/// Stage directions such as `(laughs)` or `[sighs]` are removed, ellipses become a single
/// period and anything outside plain letters, digits and basic punctuation is dropped.
pub fn clean_text_for_tts(text: &str) -> String {
    let text = PARENTHETICAL.replace_all(text, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = text.replace("...", ".");
    let text = collapse_whitespace(&text);
    let text = NON_SPEECH.replace_all(&text, "");
    collapse_whitespace(&text).trim().to_string()
}

/// Normalize a name for comparison: ASCII alphanumerics only, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Remove a leading "Name:" or "Name," that models like to prepend to their reply.
pub fn strip_speaker_prefix(response: &str, name: &str) -> String {
    let pattern = format!(r"(?i)^\s*{}(?:\s*[:,]|\b)\s*", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.replace(response.trim(), "").trim().to_string(),
        Err(_) => response.trim().to_string(),
    }
}

/// Remove the `NEXT_SPEAKER:` nomination and anything after it.
pub fn strip_next_speaker(response: &str) -> String {
    NEXT_SPEAKER_TAIL.replace(response, "").trim().to_string()
}

/// Extract the nominated speaker from the final line of a response.
pub fn parse_next_speaker(response: &str) -> Option<String> {
    let caps = NEXT_SPEAKER_NAME.captures(response)?;
    let candidate = caps.get(1)?.as_str().trim().trim_matches(['[', ']']).trim();
    if candidate.is_empty() {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// Double every backslash that does not start a valid JSON escape.
fn escape_stray_backslashes(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') => {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                _ => out.push_str("\\\\"),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Find and parse the first JSON object embedded in a model response.
///
/// Strict JSON is tried first. Failing that, single quotes are swapped for double quotes,
/// trailing commas are removed and stray backslashes escaped.
pub fn extract_json_object(raw: &str) -> Option<serde_json::Value> {
    let candidate = JSON_OBJECT.find(raw)?.as_str();

    if let Ok(value @ serde_json::Value::Object(_)) = serde_json::from_str(candidate) {
        return Some(value);
    }

    let repaired = candidate.replace('\'', "\"");
    let repaired = TRAILING_COMMA.replace_all(&repaired, "$1");
    let repaired = escape_stray_backslashes(&repaired);

    match serde_json::from_str(&repaired) {
        Ok(value @ serde_json::Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Cut a line right after the first whole-word occurrence of `word`.
///
/// Matching ignores case and punctuation. Returns `None` when the word is empty or absent.
pub fn truncate_after_word(line: &str, word: &str) -> Option<String> {
    let target = normalize_name(word);
    if target.is_empty() {
        return None;
    }

    let mut offset = 0;
    for token in line.split_inclusive(char::is_whitespace) {
        let end = offset + token.trim_end().len();
        if normalize_name(token) == target {
            return Some(line[..end].trim().to_string());
        }
        offset += token.len();
    }
    None
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_removes_stage_directions() {
        let cleaned = clean_text_for_tts("Well (laughs) I think [sighs] you're wrong...");
        assert_eq!(cleaned, "Well I think youre wrong.");
    }

    #[test]
    fn test_clean_text_keeps_text_between_remarks() {
        // Non-greedy: text between two parentheticals survives
        let cleaned = clean_text_for_tts("(a) keep this (b)");
        assert_eq!(cleaned, "keep this");
    }

    #[test]
    fn test_clean_text_strips_symbols_and_whitespace() {
        let cleaned = clean_text_for_tts("  AI & robots\n\tare *great*, right?  ");
        assert_eq!(cleaned, "AI robots are great, right?");
    }

    #[test]
    fn test_clean_text_can_become_empty() {
        assert_eq!(clean_text_for_tts("(laughs) [pause]"), "");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Dr. Jane-Doe"), "drjanedoe");
        assert_eq!(normalize_name("[Bob]"), "bob");
    }

    #[test]
    fn test_strip_speaker_prefix() {
        assert_eq!(strip_speaker_prefix("Alice: I disagree.", "Alice"), "I disagree.");
        assert_eq!(strip_speaker_prefix("  alice, look here", "Alice"), "look here");
        assert_eq!(strip_speaker_prefix("I disagree, Alice.", "Alice"), "I disagree, Alice.");
        assert_eq!(strip_speaker_prefix("Alicent was right", "Alice"), "Alicent was right");
    }

    #[test]
    fn test_strip_next_speaker() {
        let response = "That's my point.\nNEXT_SPEAKER: Bob";
        assert_eq!(strip_next_speaker(response), "That's my point.");
        assert_eq!(strip_next_speaker("No marker here."), "No marker here.");
        assert_eq!(strip_next_speaker("Fine. next_speaker: [Carol]\nextra"), "Fine.");
    }

    #[test]
    fn test_parse_next_speaker() {
        assert_eq!(parse_next_speaker("Point.\nNEXT_SPEAKER: Bob").as_deref(), Some("Bob"));
        assert_eq!(parse_next_speaker("Point.\nNEXT_SPEAKER: [Carol]\n").as_deref(), Some("Carol"));
        assert_eq!(parse_next_speaker("next_speaker:dave").as_deref(), Some("dave"));
        assert_eq!(parse_next_speaker("Point.\nNEXT_SPEAKER:\nBob").as_deref(), Some("Bob"));
        assert_eq!(parse_next_speaker("Point.\nNEXT_SPEAKER:\n  [Carol]").as_deref(), Some("Carol"));
        assert_eq!(parse_next_speaker("Point.\nNEXT_SPEAKER:\n"), None);
        assert_eq!(parse_next_speaker("Point without nomination"), None);
        assert_eq!(parse_next_speaker("NEXT_SPEAKER: []"), None);
        // Trailing text on a following line means the nomination is not final
        assert_eq!(parse_next_speaker("NEXT_SPEAKER: Bob\nAnd one more thing"), None);
    }

    #[test]
    fn test_extract_json_strict() {
        let value = extract_json_object(
            r#"Sure! {"importance": 7, "interrupt_after_word": "tech", "interruption_text": "No way!"} done"#,
        )
        .unwrap();
        assert_eq!(value["importance"], 7);
        assert_eq!(value["interruption_text"], "No way!");
    }

    #[test]
    fn test_extract_json_repairs_single_quotes_and_trailing_comma() {
        let value = extract_json_object(
            "{'importance': 9, 'interrupt_after_word': 'cars', 'interruption_text': 'Hold on',}",
        )
        .unwrap();
        assert_eq!(value["importance"], 9);
        assert_eq!(value["interrupt_after_word"], "cars");
    }

    #[test]
    fn test_extract_json_escapes_stray_backslash() {
        let value = extract_json_object(r#"{"importance": 2, "interruption_text": "a\q"}"#).unwrap();
        assert_eq!(value["interruption_text"], "a\\q");
    }

    #[test]
    fn test_extract_json_none() {
        assert!(extract_json_object("I would rather not interrupt.").is_none());
        assert!(extract_json_object("{not json at all}").is_none());
    }

    #[test]
    fn test_truncate_after_word() {
        let line = "Electric cars are the future, trust me on this.";
        assert_eq!(
            truncate_after_word(line, "future").as_deref(),
            Some("Electric cars are the future,")
        );
        assert_eq!(truncate_after_word(line, "CARS").as_deref(), Some("Electric cars"));
        assert_eq!(truncate_after_word(line, "boats"), None);
        assert_eq!(truncate_after_word(line, ""), None);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count("   "), 0);
    }
}
