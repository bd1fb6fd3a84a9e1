//! Keyword data consumed by the signal library.
//!
//! Platform names, the location gazetteer and the contact keywords used by
//! the fallback pipeline are data, not code. A versioned default ships inside
//! the binary (`data/lexicon.json`); callers may inject their own, which is how
//! tests run against a minimal gazetteer.

use crate::error::{RedactorError, RedactorResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_LEXICON: &str = include_str!("../../data/lexicon.json");

/// Versioned keyword tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Data revision, bumped whenever a list changes
    pub version: u32,

    /// Social/profile platform names ("linkedin", "git hub", ...)
    pub platform_keywords: Vec<String>,

    /// Place names and region words
    pub locations: Vec<String>,

    /// Extra keywords honored by the keyword-only fallback pass
    pub contact_keywords: Vec<String>,
}

/// On-disk shape of the embedded lexicon; every list is required.
#[derive(Deserialize)]
struct LexiconFile {
    version: u32,
    platform_keywords: Vec<String>,
    locations: Vec<String>,
    contact_keywords: Vec<String>,
}

impl Lexicon {
    /// Returns the lexicon embedded at build time.
    pub fn builtin() -> Self {
        static BUILTIN: Lazy<Lexicon> = Lazy::new(|| {
            let file: LexiconFile =
                serde_json::from_str(BUILTIN_LEXICON).expect("Valid embedded lexicon");
            Lexicon {
                version: file.version,
                platform_keywords: file.platform_keywords,
                locations: file.locations,
                contact_keywords: file.contact_keywords,
            }
        });
        BUILTIN.clone()
    }

    /// Creates a lexicon from explicit lists.
    pub fn new<S: AsRef<str>>(platforms: &[S], locations: &[S], contact: &[S]) -> Self {
        let own = |items: &[S]| items.iter().map(|s| s.as_ref().to_lowercase()).collect();
        Self {
            version: 0,
            platform_keywords: own(platforms),
            locations: own(locations),
            contact_keywords: own(contact),
        }
    }

    /// Loads a lexicon from a JSON file.
    pub fn from_json_file(path: &Path) -> RedactorResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut lexicon: Lexicon = serde_json::from_str(&data)?;
        lexicon.lowercase_all();
        Ok(lexicon)
    }

    /// Lowercases every entry, since matching runs on lowercase text.
    pub fn lowercase_all(&mut self) {
        for list in [
            &mut self.platform_keywords,
            &mut self.locations,
            &mut self.contact_keywords,
        ] {
            for word in list.iter_mut() {
                *word = word.trim().to_lowercase();
            }
            list.retain(|w| !w.is_empty());
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lexicon_loads() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.version >= 1);
        assert!(lexicon.platform_keywords.iter().any(|k| k == "linkedin"));
        assert!(lexicon.locations.iter().any(|k| k == "london"));
        assert!(lexicon.contact_keywords.iter().any(|k| k == "email"));
    }

    #[test]
    fn test_explicit_lists_are_lowercased() {
        let lexicon = Lexicon::new(&["GitHub"], &["Paris"], &[]);
        assert_eq!(lexicon.platform_keywords, vec!["github"]);
        assert_eq!(lexicon.locations, vec!["paris"]);
    }

    #[test]
    fn test_partial_json_uses_defaults_for_missing_lists() {
        let lexicon: Lexicon = serde_json::from_str(r#"{"locations": ["oslo"]}"#).unwrap();
        assert_eq!(lexicon.locations, vec!["oslo"]);
        assert!(!lexicon.platform_keywords.is_empty());
    }
}
