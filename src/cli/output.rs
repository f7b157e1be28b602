//! CLI output formatting utilities.

use crate::conversation::{Analytics, TranscriptEntry, MODERATOR};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a transcript line as it is recorded.
    pub fn transcript_line(entry: &TranscriptEntry) {
        let speaker = if entry.speaker == MODERATOR {
            style(entry.speaker.as_str()).magenta().bold()
        } else {
            style(entry.speaker.as_str()).cyan().bold()
        };
        println!("{} {}: {}", style(format!("[{}]", entry.timestamp)).dim(), speaker, entry.line);
    }

    /// Print the per-speaker statistics table.
    pub fn analytics(analytics: &Analytics) {
        Output::header("Analytics");
        println!(
            "  {:<20} {:>7} {:>7} {:>13}",
            style("Speaker").bold(),
            style("Words").bold(),
            style("Turns").bold(),
            style("Interruptions").bold()
        );
        for s in analytics.speakers() {
            println!(
                "  {:<20} {:>7} {:>7} {:>13}",
                s.name, s.words, s.turns, s.interruptions
            );
        }
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("a\nb", 10), "a b");
        assert_eq!(content_preview("héllo wörld", 5), "héllo...");
    }
}
