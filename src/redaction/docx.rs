//! DOCX redaction by paragraph.
//!
//! Every paragraph loses its emoji, hyperlinks and inline graphics. Paragraphs
//! in the header region are also checked for personal details and cleared,
//! or cut down to a leading name fragment.

use super::strategy::{DocumentFormat, DocumentRedactor, RedactionReport};
use crate::config::RedactorConfig;
use crate::docx::paragraph::{self, paragraphs_mut};
use crate::docx::{DocxPackage, XmlDocument, MAIN_PART};
use crate::domain::name::{choose_flowed_candidate, collision_keep_count};
use crate::domain::{strip_emoji, SignalDetector};
use crate::error::RedactorResult;
use std::path::Path;
use tracing::{debug, info};

/// Which paragraphs of a part may be deleted on signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartScope {
    /// The leading share of paragraphs
    Body,
    /// Page headers: every paragraph
    Header,
    /// Page footers: none
    Footer,
}

/// What happens to an eligible paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphAction {
    Keep,
    /// Keep only these leading words
    Truncate(String),
    Clear,
}

#[derive(Debug, Clone, Copy, Default)]
struct PartStats {
    paragraphs: usize,
    modified: usize,
    redacted: usize,
}

/// Number of leading paragraphs eligible for deletion.
///
/// The product is snapped to four decimals before rounding up, so a fraction
/// like 0.3 that f32 stores slightly high still yields exactly 30 of 100.
pub fn header_limit(paragraph_count: usize, fraction: f32) -> usize {
    let raw = paragraph_count as f64 * f64::from(fraction);
    ((raw * 1e4).round() / 1e4).ceil() as usize
}

/// DOCX redactor.
#[derive(Debug, Clone)]
pub struct DocxRedactor {
    config: RedactorConfig,
    detector: SignalDetector,
}

impl Default for DocxRedactor {
    fn default() -> Self {
        Self {
            config: RedactorConfig::default(),
            detector: SignalDetector::builtin(),
        }
    }
}

impl DocxRedactor {
    pub fn new(config: RedactorConfig) -> RedactorResult<Self> {
        let detector = SignalDetector::new(config.lexicon.clone())?;
        Ok(Self { config, detector })
    }

    /// Decides the fate of one header-region paragraph from its text.
    pub fn paragraph_action(&self, text: &str) -> ParagraphAction {
        if !self.detector.classify(text).warrants_deletion() {
            return ParagraphAction::Keep;
        }
        let words: Vec<&str> = text.split_whitespace().collect();
        match collision_keep_count(&words, &self.detector) {
            Some(keep) => ParagraphAction::Truncate(words[..keep].join(" ")),
            None => ParagraphAction::Clear,
        }
    }

    fn redact_part(&self, part: &str, xml: &[u8], scope: PartScope) -> RedactorResult<(Vec<u8>, PartStats)> {
        let mut doc = XmlDocument::parse(part, xml)?;
        let mut stats = PartStats::default();
        {
            let mut paragraphs = paragraphs_mut(&mut doc);
            stats.paragraphs = paragraphs.len();
            let eligible = match scope {
                PartScope::Body => {
                    header_limit(stats.paragraphs, self.config.thresholds.docx_header_fraction)
                }
                PartScope::Header => stats.paragraphs,
                PartScope::Footer => 0,
            };

            for (index, p) in paragraphs.iter_mut().enumerate() {
                let mut changed = paragraph::map_text(p, strip_emoji) > 0;
                // Signals see the text as it was before links were dropped
                let visible = paragraph::text(p);
                changed |= paragraph::remove_hyperlinks(p) > 0;
                changed |= paragraph::remove_graphics(p) > 0;

                if index < eligible {
                    match self.paragraph_action(&visible) {
                        ParagraphAction::Keep => {}
                        ParagraphAction::Truncate(kept) => {
                            paragraph::set_text(p, &kept);
                            stats.redacted += 1;
                            changed = true;
                        }
                        ParagraphAction::Clear => {
                            paragraph::clear_text(p);
                            stats.redacted += 1;
                            changed = true;
                        }
                    }
                }
                if changed {
                    stats.modified += 1;
                }
            }
        }
        debug!(
            part,
            paragraphs = stats.paragraphs,
            modified = stats.modified,
            redacted = stats.redacted,
            "Redacted part"
        );
        Ok((doc.to_bytes(part)?, stats))
    }

    /// Redacts a package in memory.
    pub fn redact_package(&self, package: &mut DocxPackage) -> RedactorResult<(usize, usize, usize)> {
        let mut parts: Vec<(String, PartScope)> = vec![(MAIN_PART.to_string(), PartScope::Body)];
        parts.extend(package.header_parts().into_iter().map(|p| (p, PartScope::Header)));
        parts.extend(package.footer_parts().into_iter().map(|p| (p, PartScope::Footer)));

        let mut total = PartStats::default();
        for (part, scope) in parts {
            let Some(xml) = package.part(&part) else {
                continue;
            };
            let (bytes, stats) = self.redact_part(&part, xml, scope)?;
            package.set_part(&part, bytes);
            total.paragraphs += stats.paragraphs;
            total.modified += stats.modified;
            total.redacted += stats.redacted;
        }
        Ok((total.paragraphs, total.modified, total.redacted))
    }
}

impl DocumentRedactor for DocxRedactor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn redact(&self, input: &Path, output: &Path) -> RedactorResult<RedactionReport> {
        info!(input = %input.display(), "Redacting DOCX");
        let mut package = DocxPackage::open(input)?;
        let (paragraphs, modified, redacted) = self.redact_package(&mut package)?;

        if let Err(e) = package.save(output) {
            let _ = std::fs::remove_file(output);
            return Err(e);
        }

        let mut report = RedactionReport::new(input, output, DocumentFormat::Docx);
        report.units_processed = paragraphs;
        report.units_modified = modified;
        report.regions_redacted = redacted;
        info!(
            output = %output.display(),
            paragraphs,
            redacted,
            "DOCX redaction complete"
        );
        Ok(report)
    }

    fn candidate_name(&self, input: &Path) -> Option<String> {
        let texts = DocxPackage::open(input)
            .and_then(|package| crate::docx::paragraph_texts(&package));
        match texts {
            Ok(texts) => choose_flowed_candidate(texts.iter().map(String::as_str)),
            Err(e) => {
                debug!(input = %input.display(), error = %e, "No name candidate");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "DocxRedaction"
    }
}
