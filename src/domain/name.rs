//! Candidate-name heuristics.
//!
//! The candidate's name labels the output file but is always redacted from
//! the body. Format-specific code gathers the raw spans; choosing among them
//! and turning the winner into a filesystem-safe token happens here.

use super::signals::{SignalDetector, SignalSet};
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on words in a candidate name.
pub const MAX_NAME_WORDS: usize = 6;

/// Upper bound on words in a name-like layout block.
pub const MAX_NAME_BLOCK_WORDS: usize = 10;

/// Paragraphs scanned for a name in flowed documents.
pub const NAME_PARAGRAPH_SCAN: usize = 6;

/// Separator joining name words in the output token.
pub const NAME_SEPARATOR: &str = "_";

const HONORIFICS: &[&str] = &["dr", "mr", "mrs", "ms", "miss", "prof", "er"];

fn name_cleaner() -> &'static Regex {
    static PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^A-Za-z\s]").expect("Valid name cleaner regex"));
    &PATTERN
}

/// A text span from the top of a paged document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanCandidate {
    pub text: String,
    pub font_size: f32,
    /// Top edge, measured downward from the top of the page
    pub top: f32,
}

fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

fn is_plain_candidate(text: &str, reject_urls: bool) -> bool {
    if text.is_empty() || text.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if text.contains('@') || text.contains('+') || (reject_urls && text.contains("http")) {
        return false;
    }
    (1..=MAX_NAME_WORDS).contains(&text.split_whitespace().count())
}

/// First qualifying paragraph among the leading ones of a flowed document.
pub fn choose_flowed_candidate<'a, I>(paragraphs: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    paragraphs
        .into_iter()
        .take(NAME_PARAGRAPH_SCAN)
        .map(str::trim)
        .find(|text| is_plain_candidate(text, false))
        .map(str::to_string)
}

/// Largest-font span in the top region of the first page; ties go to the
/// topmost span.
pub fn choose_paged_candidate(
    spans: &[SpanCandidate],
    page_height: f32,
    region_fraction: f32,
) -> Option<String> {
    let limit = page_height * region_fraction;
    spans
        .iter()
        .filter(|s| s.top <= limit)
        .filter(|s| is_plain_candidate(s.text.trim(), true))
        .min_by(|a, b| {
            b.font_size
                .total_cmp(&a.font_size)
                .then(a.top.total_cmp(&b.top))
        })
        .map(|s| s.text.trim().to_string())
}

/// Turns a raw candidate into a filesystem-safe token.
///
/// Hyphens separate words, every other character outside `[A-Za-z\s]` is
/// dropped, and a leading honorific is skipped. Returns `None` for an empty
/// result or more than [`MAX_NAME_WORDS`] words.
pub fn normalize_name(raw: &str) -> Option<String> {
    let spaced = raw.replace('-', " ");
    let cleaned = name_cleaner().replace_all(&spaced, "");
    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > 1 && HONORIFICS.contains(&words[0].to_lowercase().as_str()) {
        words.remove(0);
    }
    if words.is_empty() || words.len() > MAX_NAME_WORDS {
        return None;
    }
    Some(words.join(NAME_SEPARATOR))
}

/// Whether a span could be a bare name: a bounded number of words, at most
/// two digits, and no email or phone.
pub fn resembles_name(text: &str, max_words: usize, signals: &SignalSet) -> bool {
    let words = text.split_whitespace().count();
    (1..=max_words).contains(&words) && digit_count(text) <= 2 && !signals.has_contact()
}

/// Layout-block variant: up to ten words and at least one capitalized word.
pub fn block_resembles_name(text: &str, signals: &SignalSet) -> bool {
    resembles_name(text, MAX_NAME_BLOCK_WORDS, signals)
        && text
            .split_whitespace()
            .any(|w| w.chars().next().is_some_and(char::is_uppercase))
}

fn is_name_word(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(char::is_uppercase)
        && chars.all(|c| c.is_alphabetic() || matches!(c, '.' | '\'' | '-'))
}

/// Whether `word` is a contact or platform label ("Email", "Mobile", "GitHub").
fn is_label_word(word: &str, detector: &SignalDetector) -> bool {
    let bare = word
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    let lexicon = detector.lexicon();
    lexicon
        .contact_keywords
        .iter()
        .chain(&lexicon.platform_keywords)
        .any(|k| *k == bare)
}

/// How many leading words of a PII-bearing line to keep because they look
/// like the candidate's name.
///
/// The leading run of capitalized words is tested as a name on its own; it
/// must carry no signal and contain no contact or platform label. The kept
/// count is half the line's words (rounded down, at least one) and never
/// reaches past that run. Returns `None` when the whole line should go.
pub fn collision_keep_count(words: &[&str], detector: &SignalDetector) -> Option<usize> {
    let lead: Vec<&str> = words
        .iter()
        .copied()
        .take_while(|w| is_name_word(w))
        .take(MAX_NAME_WORDS)
        .collect();
    if lead.is_empty() || lead.iter().any(|w| is_label_word(w, detector)) {
        return None;
    }
    let lead_text = lead.join(" ");
    let signals = detector.classify(&lead_text);
    if !signals.is_empty() || !resembles_name(&lead_text, MAX_NAME_WORDS, &signals) {
        return None;
    }
    let keep = (words.len() / 2).max(1).min(lead.len());
    // The surviving prefix is what ends up on the page
    detector
        .classify(&words[..keep].join(" "))
        .is_empty()
        .then_some(keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lexicon;

    fn detector() -> SignalDetector {
        SignalDetector::new(Lexicon::new(&["linkedin"], &["london"], &[])).unwrap()
    }

    fn span(text: &str, font_size: f32, top: f32) -> SpanCandidate {
        SpanCandidate {
            text: text.to_string(),
            font_size,
            top,
        }
    }

    #[test]
    fn test_normalize_strips_punctuation_and_title() {
        assert_eq!(
            normalize_name("Dr. Jane-Q. O'Doe 🎓"),
            Some("Jane_Q_ODoe".to_string())
        );
        assert_eq!(normalize_name("  Jane   Doe "), Some("Jane_Doe".to_string()));
    }

    #[test]
    fn test_normalize_rejects_empty_and_long() {
        assert_eq!(normalize_name(""), None);
        assert_eq!(normalize_name("123 !!"), None);
        assert_eq!(normalize_name("one two three four five six seven"), None);
    }

    #[test]
    fn test_flowed_candidate_skips_contact_lines() {
        let paragraphs = ["", "jane@example.com", "+1 415 555 0199", "Jane Doe", "Engineer"];
        assert_eq!(
            choose_flowed_candidate(paragraphs.iter().copied()),
            Some("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_flowed_candidate_only_scans_six_paragraphs() {
        let mut paragraphs = vec!["2024"; 6];
        paragraphs.push("Jane Doe");
        assert_eq!(choose_flowed_candidate(paragraphs), None);
    }

    #[test]
    fn test_paged_candidate_prefers_largest_then_topmost() {
        let spans = vec![
            span("Curriculum Vitae", 14.0, 20.0),
            span("Jane Doe", 24.0, 40.0),
            span("John Roe", 24.0, 60.0),
            span("http portfolio", 30.0, 10.0),
            span("Way Down", 40.0, 500.0),
        ];
        assert_eq!(
            choose_paged_candidate(&spans, 842.0, 0.20),
            Some("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_collision_keeps_leading_name() {
        let d = detector();
        let words = ["Jane", "Doe", "+1", "415-555-0199"];
        assert_eq!(collision_keep_count(&words, &d), Some(2));
    }

    #[test]
    fn test_collision_rejects_labels() {
        let d = detector();
        assert_eq!(collision_keep_count(&["Email:", "jane@x.io"], &d), None);
        assert_eq!(collision_keep_count(&["LinkedIn", "jdoe"], &d), None);
        assert_eq!(collision_keep_count(&["+1", "415", "555", "0199"], &d), None);
        assert_eq!(collision_keep_count(&["LinkedIn", "jdoe", "London"], &d), None);
    }

    #[test]
    fn test_collision_never_keeps_past_the_name() {
        let d = detector();
        let words = ["Jane", "Doe", "+1", "415", "555", "0199"];
        assert_eq!(collision_keep_count(&words, &d), Some(2));

        let words = ["Jane", "jane@x.io", "|", "London", "+1", "415"];
        assert_eq!(collision_keep_count(&words, &d), Some(1));
    }

    #[test]
    fn test_block_name_needs_capital() {
        let s = SignalSet::new();
        assert!(block_resembles_name("Jane Doe", &s));
        assert!(!block_resembles_name("jane doe", &s));
    }
}
