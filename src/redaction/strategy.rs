//! Redactor capability trait and supporting types.
//!
//! Each supported format implements [`DocumentRedactor`], so the service
//! only has to pick an implementation by [`DocumentFormat`].

use crate::error::{RedactorError, RedactorResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Document formats accepted by the redactors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detects the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> RedactorResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            _ => Err(RedactorError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// MIME type for the written file.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Why a PDF went through the fallback pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The first page is graphics-dominated or its text layer is unreliable
    DesignHeavy,
    /// Locating or applying whiteouts failed
    LayoutFailure(String),
    /// Nothing in the header region was redacted
    NothingRedacted,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DesignHeavy => f.write_str("design-heavy first page"),
            Self::LayoutFailure(message) => write!(f, "layout failure: {message}"),
            Self::NothingRedacted => f.write_str("no redaction in header region"),
        }
    }
}

/// Which path produced the output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RedactionRoute {
    /// Same-format redaction
    #[default]
    Direct,
    /// PDF converted to a flowed document and keyword-redacted
    Fallback(FallbackReason),
}

/// Statistics about one redaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionReport {
    pub input: PathBuf,

    /// Where the output was actually written; differs from the requested
    /// path when the fallback changed the format
    pub output: PathBuf,

    /// Format of the written file
    pub format: DocumentFormat,

    pub route: RedactionRoute,

    /// Pages or paragraphs examined
    pub units_processed: usize,

    /// Pages or paragraphs changed
    pub units_modified: usize,

    /// Whiteout rectangles applied, or paragraphs cleared or truncated
    pub regions_redacted: usize,
}

impl RedactionReport {
    pub fn new(input: &Path, output: &Path, format: DocumentFormat) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            format,
            route: RedactionRoute::Direct,
            units_processed: 0,
            units_modified: 0,
            regions_redacted: 0,
        }
    }

    /// Returns true if any content was removed.
    pub fn has_redactions(&self) -> bool {
        self.regions_redacted > 0
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self.route, RedactionRoute::Fallback(_))
    }
}

/// A format-specific resume anonymizer.
pub trait DocumentRedactor: Send + Sync {
    /// Format this redactor accepts.
    fn format(&self) -> DocumentFormat;

    /// Writes an anonymized copy of `input`.
    ///
    /// # Arguments
    /// * `input` - Path to the source document
    /// * `output` - Requested output path; see [`RedactionReport::output`]
    ///   for where the result actually landed
    fn redact(&self, input: &Path, output: &Path) -> RedactorResult<RedactionReport>;

    /// Best-guess candidate name, unnormalized. Failures yield `None`.
    fn candidate_name(&self, input: &Path) -> Option<String>;

    /// Returns a human-readable name for this redactor.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("cv.PDF")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b/cv.docx")).unwrap(),
            DocumentFormat::Docx
        );
        let err = DocumentFormat::from_path(Path::new("cv.doc")).unwrap_err();
        assert!(matches!(err, RedactorError::UnsupportedFormat { .. }));
        assert!(DocumentFormat::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_report_flags() {
        let mut report = RedactionReport::new(
            Path::new("in.pdf"),
            Path::new("out.pdf"),
            DocumentFormat::Pdf,
        );
        assert!(!report.has_redactions());
        assert!(!report.used_fallback());

        report.regions_redacted = 3;
        report.route = RedactionRoute::Fallback(FallbackReason::DesignHeavy);
        assert!(report.has_redactions());
        assert!(report.used_fallback());
    }
}
