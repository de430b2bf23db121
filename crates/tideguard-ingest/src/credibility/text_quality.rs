//! Free-text quality: length, word diversity, spam penalties, information bonus.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

macro_rules! text_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Spam ───────────────────────────────────────────────────────────────────
text_pattern!(RE_EXCLAMATIONS, r"!{3,}");
text_pattern!(RE_SHOUTING, r"[A-Z]{10,}");

// ── Information content ────────────────────────────────────────────────────
text_pattern!(RE_NUMBER, r"\b\d+\b");
text_pattern!(RE_TIME_OF_DAY, r"\b(morning|evening|afternoon|night|am|pm)\b");
text_pattern!(RE_LOCATION, r"\b(near|at|in|around|beside)\b");
text_pattern!(RE_MEASUREMENT, r"\b(level|height|depth|speed)\b");

const SPAM_PENALTY: f64 = 0.1;
const INFO_BONUS: f64 = 0.05;

fn matches(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(text))
}

/// Five or more identical characters in a row.
fn has_repeated_run(text: &str) -> bool {
    let mut run = 0;
    let mut prev = None;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
            if run >= 5 {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }
    false
}

/// The same word twice in a row ("help help").
fn has_repeated_word(text: &str) -> bool {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .collect();
    words.windows(2).any(|pair| pair[0] == pair[1])
}

fn length_score(len: usize) -> f64 {
    match len {
        l if l > 500 => 0.6,
        l if l >= 100 => 0.9,
        l if l >= 50 => 0.7,
        l if l >= 30 => 0.5,
        _ => 0.0,
    }
}

/// Score free text in [0, 1]. Empty text scores 0.
pub fn score(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let lower = text.to_lowercase();
    let unique: HashSet<&str> = lower.split_whitespace().collect();
    let diversity = (unique.len() as f64 / words.len().max(1) as f64).min(1.0);

    let spam_hits = [
        has_repeated_run(text),
        has_repeated_word(text),
        matches(&RE_EXCLAMATIONS, text),
        matches(&RE_SHOUTING, text),
    ]
    .into_iter()
    .filter(|hit| *hit)
    .count();

    let info_hits = [&RE_NUMBER, &RE_TIME_OF_DAY, &RE_LOCATION, &RE_MEASUREMENT]
        .into_iter()
        .filter(|re| matches(re, &lower))
        .count();

    let raw = length_score(text.chars().count()) * 0.6 + diversity * 0.4
        + info_hits as f64 * INFO_BONUS
        - spam_hits as f64 * SPAM_PENALTY;
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(score(""), 0.0);
        assert_eq!(score("   "), 0.0);
    }

    #[test]
    fn informative_text_beats_spam() {
        let good = score("Water level near the jetty rose about 2 m this morning, road closed");
        let spam = score("HELPPPPP HELP HELP!!!! WATERWATERWATER");
        assert!(good > spam, "good={good} spam={spam}");
        assert!(good > 0.7);
    }

    #[test]
    fn spam_detectors() {
        assert!(has_repeated_run("nooooo"));
        assert!(!has_repeated_run("noooo"));
        assert!(has_repeated_word("help help us"));
        assert!(!has_repeated_word("help us now"));
    }
}
