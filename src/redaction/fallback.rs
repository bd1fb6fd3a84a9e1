//! Fallback pipeline for PDFs whose layout defeats geometric redaction.
//!
//! The PDF is converted into a flowed document and every paragraph is
//! checked with keywords only: a platform name, a gazetteer location or a
//! contact word clears the paragraph. The result is always a DOCX file.

use crate::docx::{build_package, FlowParagraph};
use crate::domain::{strip_emoji, SignalDetector};
use crate::error::{RedactorError, RedactorResult};
use crate::pdf::snapshot;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Turns a PDF into a stream of paragraphs.
pub trait FlowConverter: Send + Sync {
    fn convert(&self, input: &Path) -> RedactorResult<Vec<FlowParagraph>>;

    /// Returns a human-readable name for this converter.
    fn name(&self) -> &str;
}

/// Converter that maps each MuPDF text line to one paragraph, keeping its
/// font size and starting every page after the first on a new page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayerConverter;

impl TextLayerConverter {
    fn read(&self, input: &Path) -> RedactorResult<Vec<FlowParagraph>> {
        let doc = snapshot::open_document(input)?;
        let page_count = doc.page_count().map_err(|e| {
            snapshot::mupdf_error("Failed to get page count".to_string(), None, e)
        })?;

        let mut paragraphs = Vec::new();
        for page_idx in 0..page_count {
            let index = page_idx as usize;
            let page = doc.load_page(page_idx).map_err(|e| {
                snapshot::mupdf_error(format!("Failed to load page {}", index + 1), Some(index + 1), e)
            })?;
            let page = snapshot::snapshot_page(&page, index)?;
            for (line_idx, span) in page.spans.iter().enumerate() {
                paragraphs.push(FlowParagraph {
                    text: span.text.clone(),
                    font_size: (span.font_size > 0.0).then_some(span.font_size),
                    page_break_before: index > 0 && line_idx == 0,
                });
            }
        }
        Ok(paragraphs)
    }
}

impl FlowConverter for TextLayerConverter {
    fn convert(&self, input: &Path) -> RedactorResult<Vec<FlowParagraph>> {
        self.read(input).map_err(|e| RedactorError::Conversion {
            path: input.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "TextLayer"
    }
}

/// Where the fallback writes for a requested output path.
pub fn fallback_output_path(output: &Path) -> PathBuf {
    output.with_extension("docx")
}

/// Result of a fallback run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackOutcome {
    pub output: PathBuf,
    pub paragraphs: usize,
    pub cleared: usize,
}

/// Keyword-only redaction over a converted document.
pub struct FallbackPipeline {
    detector: SignalDetector,
    converter: Box<dyn FlowConverter>,
}

impl FallbackPipeline {
    pub fn new(detector: SignalDetector, converter: Box<dyn FlowConverter>) -> Self {
        Self {
            detector,
            converter,
        }
    }

    pub fn with_text_layer(detector: SignalDetector) -> Self {
        Self::new(detector, Box::new(TextLayerConverter))
    }

    pub fn converter_name(&self) -> &str {
        self.converter.name()
    }

    /// Keyword predicate for one paragraph.
    pub fn should_clear(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.detector.has_platform_keyword(&lower)
            || self.detector.has_location(&lower)
            || self.detector.has_contact_keyword(&lower)
    }

    /// Strips emoji everywhere and clears matching paragraphs. Returns how
    /// many were cleared.
    pub fn anonymize_paragraphs(&self, paragraphs: &mut [FlowParagraph]) -> usize {
        let mut cleared = 0;
        for paragraph in paragraphs.iter_mut() {
            paragraph.text = strip_emoji(&paragraph.text);
            if !paragraph.text.is_empty() && self.should_clear(&paragraph.text) {
                paragraph.text.clear();
                cleared += 1;
            }
        }
        cleared
    }

    /// Converts `input`, redacts it, and writes a DOCX next to `output`
    /// (same stem, `.docx` extension).
    pub fn full_pdf_anonymization(&self, input: &Path, output: &Path) -> RedactorResult<FallbackOutcome> {
        let target = fallback_output_path(output);
        info!(
            input = %input.display(),
            converter = self.converter.name(),
            "Running fallback conversion"
        );

        let mut paragraphs = self.converter.convert(input)?;
        if paragraphs.iter().all(|p| p.text.trim().is_empty()) {
            return Err(RedactorError::Conversion {
                path: input.to_path_buf(),
                message: "document has no extractable text".to_string(),
            });
        }
        let cleared = self.anonymize_paragraphs(&mut paragraphs);
        debug!(paragraphs = paragraphs.len(), cleared, "Fallback keyword pass");

        let written = build_package(&paragraphs).and_then(|package| package.save(&target));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&target);
            return Err(e);
        }

        Ok(FallbackOutcome {
            output: target,
            paragraphs: paragraphs.len(),
            cleared,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::DocxPackage;
    use crate::domain::Lexicon;

    struct FixedConverter(Vec<&'static str>);

    impl FlowConverter for FixedConverter {
        fn convert(&self, _input: &Path) -> RedactorResult<Vec<FlowParagraph>> {
            Ok(self.0.iter().map(|t| FlowParagraph::new(*t)).collect())
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    struct FailingConverter;

    impl FlowConverter for FailingConverter {
        fn convert(&self, input: &Path) -> RedactorResult<Vec<FlowParagraph>> {
            Err(RedactorError::Conversion {
                path: input.to_path_buf(),
                message: "broken".to_string(),
            })
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    fn detector() -> SignalDetector {
        SignalDetector::new(Lexicon::new(&["linkedin"], &["london"], &["phone"])).unwrap()
    }

    #[test]
    fn test_keyword_predicate() {
        let pipeline = FallbackPipeline::new(detector(), Box::new(FixedConverter(vec![])));
        assert!(pipeline.should_clear("LinkedIn: jdoe"));
        assert!(pipeline.should_clear("Based in London"));
        assert!(pipeline.should_clear("Phone 555"));
        // Other signal classes are ignored on purpose
        assert!(!pipeline.should_clear("jane@example.com"));
        assert!(!pipeline.should_clear("Londoner by heart"));
    }

    #[test]
    fn test_full_pdf_anonymization_writes_docx() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("Jane_Doe.pdf");
        let pipeline = FallbackPipeline::new(
            detector(),
            Box::new(FixedConverter(vec!["Jane Doe", "🏠 London", "Rust developer ✨"])),
        );
        let outcome = pipeline
            .full_pdf_anonymization(Path::new("in.pdf"), &output)
            .unwrap();
        assert_eq!(outcome.output, dir.path().join("Jane_Doe.docx"));
        assert_eq!(outcome.cleared, 1);

        let package = DocxPackage::open(&outcome.output).unwrap();
        let texts = crate::docx::paragraph_texts(&package).unwrap();
        assert_eq!(texts, vec!["Jane Doe", "", "Rust developer "]);
    }

    #[test]
    fn test_conversion_failure_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let pipeline = FallbackPipeline::new(detector(), Box::new(FailingConverter));
        let err = pipeline
            .full_pdf_anonymization(Path::new("in.pdf"), &output)
            .unwrap_err();
        assert!(matches!(err, RedactorError::Conversion { .. }));
        assert!(!err.is_layout_failure());
        assert!(!fallback_output_path(&output).exists());
    }
}
