//! PII signal detection over single text spans.
//!
//! Every signal is an independent boolean test. Line-level deletion ORs the
//! strong signals together; block-level whiteout counts them, because a block
//! holds more prose and one keyword alone is weak evidence there.

use super::Lexicon;
use crate::error::RedactorResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// One kind of PII indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    Email,
    Phone,
    DateOfBirth,
    IdentityLabel,
    Address,
    SocialPlatform,
    SocialUsername,
    Location,
    Emoji,
    Separator,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::DateOfBirth => "date-of-birth",
            Self::IdentityLabel => "identity-label",
            Self::Address => "address",
            Self::SocialPlatform => "social-platform",
            Self::SocialUsername => "social-username",
            Self::Location => "location",
            Self::Emoji => "emoji",
            Self::Separator => "separator",
        };
        f.write_str(name)
    }
}

/// The signals detected in one span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSet(BTreeSet<Signal>);

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, signal: Signal) {
        self.0.insert(signal);
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.0.contains(&signal)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        self.0.iter().copied()
    }

    /// Email or phone present; such a span can never be a bare name.
    pub fn has_contact(&self) -> bool {
        self.contains(Signal::Email) || self.contains(Signal::Phone)
    }

    /// A location only counts when something else corroborates it.
    pub fn has_corroborated_location(&self) -> bool {
        self.contains(Signal::Location)
            && [
                Signal::Email,
                Signal::Phone,
                Signal::SocialPlatform,
                Signal::Address,
            ]
            .iter()
            .any(|s| self.contains(*s))
    }

    /// Whether a paragraph or line carrying these signals is deleted.
    ///
    /// A location alone ("worked in London") never triggers; emoji and
    /// separators are not deletion evidence at this level.
    pub fn warrants_deletion(&self) -> bool {
        [
            Signal::Email,
            Signal::Phone,
            Signal::DateOfBirth,
            Signal::IdentityLabel,
            Signal::Address,
            Signal::SocialPlatform,
            Signal::SocialUsername,
        ]
        .iter()
        .any(|s| self.contains(*s))
            || self.has_corroborated_location()
    }

    /// Corroboration score used for block whiteout.
    pub fn block_score(&self) -> usize {
        let counted = [
            Signal::Phone,
            Signal::Email,
            Signal::SocialPlatform,
            Signal::Separator,
            Signal::IdentityLabel,
            Signal::Address,
            Signal::Emoji,
        ]
        .iter()
        .filter(|s| self.contains(**s))
        .count();
        counted + usize::from(self.has_corroborated_location())
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Emoji and pictographic symbols (including the variation selector that
/// often trails them).
pub fn emoji_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"[\x{1F000}-\x{1FAFF}\x{2600}-\x{27BF}\x{FE0F}]").expect("Valid emoji regex")
    });
    &PATTERN
}

/// Removes every emoji code point from `text`.
pub fn strip_emoji(text: &str) -> String {
    emoji_pattern().replace_all(text, "").into_owned()
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\+?\d[\d\p{Zs}\t\-]{8,}\d").expect("Valid phone number regex")
    });
    &PATTERN
}

fn dob_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)\b(?:dob|date\s+of\s+birth)\b|\b\d{1,2}(?:st|nd|rd|th)?\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*,?\s+\d{4}\b",
        )
        .expect("Valid date-of-birth regex")
    });
    &PATTERN
}

fn identity_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)\b(?:birth\s*place|nationality|citizenship|gender|marital\s*status)\b")
            .expect("Valid identity label regex")
    });
    &PATTERN
}

fn address_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\d{1,4}[-/]\d{1,4}|\b\d{6}\b").expect("Valid address regex")
    });
    &PATTERN
}

fn username_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b[A-Za-z][A-Za-z0-9._\-]{3,}").expect("Valid username regex")
    });
    &PATTERN
}

/// Byte ranges of phone numbers: at least ten digits, allowing interior
/// spaces and hyphens, starting and ending on a digit.
pub fn phone_spans(raw: &str) -> Vec<(usize, usize)> {
    phone_pattern()
        .find_iter(raw)
        .filter(|m| m.as_str().chars().filter(|c| c.is_ascii_digit()).count() >= 10)
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Stateless classifier over the injected lexicon.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    lexicon: Lexicon,
    location: Option<Regex>,
}

impl SignalDetector {
    /// Builds a detector, compiling the gazetteer into one word-bounded
    /// alternation.
    pub fn new(lexicon: Lexicon) -> RedactorResult<Self> {
        let alternatives: Vec<String> = lexicon
            .locations
            .iter()
            .filter(|w| !w.trim().is_empty())
            .map(|w| {
                w.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();
        let location = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)\b(?:{})\b",
                alternatives.join("|")
            ))?)
        };
        Ok(Self { lexicon, location })
    }

    /// Detector over the embedded lexicon.
    pub fn builtin() -> Self {
        static BUILTIN: Lazy<SignalDetector> = Lazy::new(|| {
            SignalDetector::new(Lexicon::builtin()).expect("Valid embedded gazetteer")
        });
        BUILTIN.clone()
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Classifies one span of raw text.
    pub fn classify(&self, raw: &str) -> SignalSet {
        let lower = raw.to_lowercase();
        let mut signals = SignalSet::new();

        if raw.contains('@') {
            signals.insert(Signal::Email);
        }

        let phones = phone_spans(raw);
        if !phones.is_empty() {
            signals.insert(Signal::Phone);
        }

        if dob_pattern().is_match(&lower) {
            signals.insert(Signal::DateOfBirth);
        }

        if identity_pattern().is_match(&lower) {
            signals.insert(Signal::IdentityLabel);
        }

        // Digit groups inside a phone number are not an address
        let overlaps_phone =
            |start: usize, end: usize| phones.iter().any(|&(s, e)| start < e && s < end);
        if address_pattern()
            .find_iter(raw)
            .any(|m| !overlaps_phone(m.start(), m.end()))
        {
            signals.insert(Signal::Address);
        }

        if self.has_platform_keyword(&lower) {
            signals.insert(Signal::SocialPlatform);
            if self.has_username(raw) {
                signals.insert(Signal::SocialUsername);
            }
        }

        if self.has_location(&lower) {
            signals.insert(Signal::Location);
        }

        if emoji_pattern().is_match(raw) {
            signals.insert(Signal::Emoji);
        }

        if raw.contains(['|', '#', '*']) {
            signals.insert(Signal::Separator);
        }

        signals
    }

    /// Platform keyword anywhere in the lowercase text.
    pub fn has_platform_keyword(&self, lower: &str) -> bool {
        self.lexicon
            .platform_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
    }

    /// Gazetteer entry as a whole word in the text.
    pub fn has_location(&self, lower: &str) -> bool {
        self.location.as_ref().is_some_and(|re| re.is_match(lower))
    }

    /// Contact keyword anywhere in the lowercase text.
    pub fn has_contact_keyword(&self, lower: &str) -> bool {
        self.lexicon
            .contact_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
    }

    /// A username-shaped token that is not itself a platform name.
    fn has_username(&self, raw: &str) -> bool {
        username_pattern().find_iter(raw).any(|m| {
            let token = m.as_str().to_lowercase();
            !self
                .lexicon
                .platform_keywords
                .iter()
                .any(|k| k.replace(' ', "") == token)
        })
    }
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self::builtin()
    }
}
