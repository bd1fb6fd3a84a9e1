//! Tunable thresholds and keyword data.
//!
//! The numbers below were chosen empirically on real resumes. They are kept as
//! named constants so they can be tuned (or overridden from a JSON config file)
//! without touching the detectors that use them.

use crate::domain::Lexicon;
use crate::error::{RedactorError, RedactorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fraction of the total document height where paged heuristics may act.
pub const PDF_HEADER_FRACTION: f32 = 0.30;

/// Fraction of paragraphs where flowed heuristics may act.
pub const DOCX_HEADER_FRACTION: f32 = 0.30;

/// Fraction of the first page searched for a candidate name.
pub const NAME_REGION_FRACTION: f32 = 0.20;

/// Signals a block needs before it is whited out.
pub const BLOCK_SIGNAL_THRESHOLD: usize = 2;

/// A first page with fewer extracted characters is design-heavy.
pub const DESIGN_HEAVY_MIN_CHARS: usize = 80;

/// Word count above which the token check applies.
pub const DESIGN_HEAVY_MAX_WORDS: usize = 200;

/// Space-delimited tokens below which a wordy page is design-heavy.
pub const DESIGN_HEAVY_MIN_TOKENS: usize = 50;

/// Largest raster image (both sides, in points) treated as a contact icon.
pub const SMALL_IMAGE_MAX: f32 = 70.0;

/// Largest vector drawing (both sides, in points) treated as an icon.
pub const SMALL_DRAWING_MAX: f32 = 85.0;

/// Vector icons are only removed when they end within this page fraction.
pub const DRAWING_ZONE_FRACTION: f32 = 0.18;

/// Top share of a name-bearing block left visible by a block whiteout.
pub const NAME_BLOCK_KEEP_FRACTION: f32 = 0.35;

/// Numeric knobs for the detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub pdf_header_fraction: f32,
    pub docx_header_fraction: f32,
    pub name_region_fraction: f32,
    pub block_signal_threshold: usize,
    pub design_heavy_min_chars: usize,
    pub design_heavy_max_words: usize,
    pub design_heavy_min_tokens: usize,
    pub small_image_max: f32,
    pub small_drawing_max: f32,
    pub drawing_zone_fraction: f32,
    pub name_block_keep_fraction: f32,

    /// Reprocess through the fallback pipeline when the header region of a
    /// PDF yields no redaction at all.
    pub escalate_when_clean: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pdf_header_fraction: PDF_HEADER_FRACTION,
            docx_header_fraction: DOCX_HEADER_FRACTION,
            name_region_fraction: NAME_REGION_FRACTION,
            block_signal_threshold: BLOCK_SIGNAL_THRESHOLD,
            design_heavy_min_chars: DESIGN_HEAVY_MIN_CHARS,
            design_heavy_max_words: DESIGN_HEAVY_MAX_WORDS,
            design_heavy_min_tokens: DESIGN_HEAVY_MIN_TOKENS,
            small_image_max: SMALL_IMAGE_MAX,
            small_drawing_max: SMALL_DRAWING_MAX,
            drawing_zone_fraction: DRAWING_ZONE_FRACTION,
            name_block_keep_fraction: NAME_BLOCK_KEEP_FRACTION,
            escalate_when_clean: false,
        }
    }
}

impl Thresholds {
    /// Rejects fractions outside `(0, 1]` and a zero block threshold.
    pub fn validate(&self) -> RedactorResult<()> {
        let fractions = [
            ("pdf_header_fraction", self.pdf_header_fraction),
            ("docx_header_fraction", self.docx_header_fraction),
            ("name_region_fraction", self.name_region_fraction),
            ("drawing_zone_fraction", self.drawing_zone_fraction),
            ("name_block_keep_fraction", self.name_block_keep_fraction),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(RedactorError::InvalidInput {
                    parameter: name.to_string(),
                    reason: format!("expected a fraction in (0, 1], got {value}"),
                });
            }
        }
        if self.block_signal_threshold == 0 {
            return Err(RedactorError::InvalidInput {
                parameter: "block_signal_threshold".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Complete redactor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactorConfig {
    pub thresholds: Thresholds,
    pub lexicon: Lexicon,
}

impl RedactorConfig {
    /// Loads a configuration from JSON; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> RedactorResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&data)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(data: &str) -> RedactorResult<Self> {
        let mut config: RedactorConfig = serde_json::from_str(data)?;
        config.lexicon.lowercase_all();
        config.thresholds.validate()?;
        Ok(config)
    }
}
