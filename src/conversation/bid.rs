//! Interruption bids.

use serde_json::Value;

/// A listener's request to cut in on the current speaker.
#[derive(Debug, Clone, PartialEq)]
pub struct InterruptionBid {
    pub importance: i64,
    /// Word of the pending line after which to cut in; may be empty.
    pub interrupt_after_word: String,
    pub interruption_text: String,
    pub interrupter: String,
}

fn as_importance(value: Option<&Value>) -> Option<i64> {
    match value {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        Some(_) => None,
    }
}

fn as_text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

impl InterruptionBid {
    /// Build a bid from the parsed model response.
    ///
    /// A missing importance counts as zero; an importance that is not a number rejects the
    /// bid.
    pub fn from_value(value: &Value, interrupter: &str) -> Option<Self> {
        let importance = as_importance(value.get("importance"))?;
        Some(Self {
            importance,
            interrupt_after_word: as_text(value.get("interrupt_after_word")),
            interruption_text: as_text(value.get("interruption_text")),
            interrupter: interrupter.to_string(),
        })
    }
}

/// Pick the bid that takes the floor.
///
/// Eligible bids meet the threshold and carry text. The highest importance wins; on a tie
/// the earliest bid wins.
pub fn select_winner<I>(bids: I, threshold: i64) -> Option<InterruptionBid>
where
    I: IntoIterator<Item = InterruptionBid>,
{
    bids.into_iter()
        .filter(|b| b.importance >= threshold && !b.interruption_text.is_empty())
        .fold(None, |best: Option<InterruptionBid>, bid| match best {
            Some(current) if current.importance >= bid.importance => Some(current),
            _ => Some(bid),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bid(who: &str, importance: i64, text: &str) -> InterruptionBid {
        InterruptionBid {
            importance,
            interrupt_after_word: String::new(),
            interruption_text: text.to_string(),
            interrupter: who.to_string(),
        }
    }

    #[test]
    fn test_from_value() {
        let value = json!({"importance": "8", "interrupt_after_word": " tech ", "interruption_text": "Wait!"});
        let parsed = InterruptionBid::from_value(&value, "Bob").unwrap();
        assert_eq!(parsed.importance, 8);
        assert_eq!(parsed.interrupt_after_word, "tech");
        assert_eq!(parsed.interrupter, "Bob");
    }

    #[test]
    fn test_from_value_defaults_and_rejects() {
        let parsed = InterruptionBid::from_value(&json!({"interruption_text": null}), "Bob").unwrap();
        assert_eq!(parsed.importance, 0);
        assert_eq!(parsed.interruption_text, "");

        assert!(InterruptionBid::from_value(&json!({"importance": "very"}), "Bob").is_none());
        assert!(InterruptionBid::from_value(&json!({"importance": [1]}), "Bob").is_none());
        assert_eq!(
            InterruptionBid::from_value(&json!({"importance": 7.9}), "Bob").unwrap().importance,
            7
        );
    }

    #[test]
    fn test_select_winner_threshold() {
        let bids = vec![bid("Bob", 5, "meh"), bid("Carol", 3, "no")];
        assert!(select_winner(bids, 6).is_none());
    }

    #[test]
    fn test_select_winner_highest_first_on_tie() {
        let bids = vec![
            bid("Bob", 7, "Hold on"),
            bid("Carol", 9, "No!"),
            bid("Dave", 9, "Me too"),
        ];
        let winner = select_winner(bids, 6).unwrap();
        assert_eq!(winner.interrupter, "Carol");
    }

    #[test]
    fn test_select_winner_ignores_empty_text() {
        let bids = vec![bid("Bob", 10, ""), bid("Carol", 6, "Well...")];
        assert_eq!(select_winner(bids, 6).unwrap().interrupter, "Carol");
    }
}
