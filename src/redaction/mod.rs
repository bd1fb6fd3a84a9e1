//! Resume redactors and the service that dispatches between them.
//!
//! [`RedactionService`] picks a [`DocumentRedactor`] by format, names outputs
//! after the candidate and processes batches without letting one failure stop
//! the rest.

pub mod docx;
pub mod fallback;
pub mod pdf;
pub mod planner;
pub mod strategy;

pub use docx::DocxRedactor;
pub use fallback::{FallbackPipeline, FlowConverter, TextLayerConverter};
pub use pdf::{DirectOutcome, PdfRedactor};
pub use strategy::{
    DocumentFormat, DocumentRedactor, FallbackReason, RedactionReport, RedactionRoute,
};

use crate::config::RedactorConfig;
use crate::domain::normalize_name;
use crate::error::{RedactorError, RedactorResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix of outputs whose candidate name could not be found.
pub const GENERIC_PREFIX: &str = "V1_";

/// Output file stem: the normalized candidate name, else the prefixed input
/// stem.
pub fn output_stem(input: &Path, candidate: Option<&str>) -> String {
    if let Some(name) = candidate.and_then(normalize_name) {
        return name;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{GENERIC_PREFIX}{stem}")
}

/// Output stems already handed out in one batch.
#[derive(Debug, Clone, Default)]
pub struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `stem`, appending `_2`, `_3`, ... when it is taken.
    pub fn claim(&mut self, stem: &str) -> String {
        let mut candidate = stem.to_string();
        let mut n = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{stem}_{n}");
            n += 1;
        }
        candidate
    }
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<RedactionReport>,
    pub failed: Vec<(PathBuf, RedactorError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Redaction service coordinating the format-specific redactors.
pub struct RedactionService {
    redactors: Vec<Box<dyn DocumentRedactor>>,
}

impl RedactionService {
    /// Creates a service with the PDF and DOCX redactors.
    pub fn new(config: RedactorConfig) -> RedactorResult<Self> {
        Ok(Self::with_redactors(vec![
            Box::new(PdfRedactor::new(config.clone())?),
            Box::new(DocxRedactor::new(config)?),
        ]))
    }

    pub fn with_redactors(redactors: Vec<Box<dyn DocumentRedactor>>) -> Self {
        Self { redactors }
    }

    /// The redactor registered for `format`.
    pub fn redactor_for(&self, format: DocumentFormat) -> RedactorResult<&dyn DocumentRedactor> {
        self.redactors
            .iter()
            .find(|r| r.format() == format)
            .map(|r| r.as_ref())
            .ok_or_else(|| RedactorError::InvalidInput {
                parameter: "format".to_string(),
                reason: format!("no redactor registered for {format}"),
            })
    }

    /// Redacts `input` into `output`.
    ///
    /// # Returns
    /// The report; check [`RedactionReport::output`] since the PDF fallback
    /// writes a `.docx` next to the requested path.
    pub fn redact(
        &self,
        input: &Path,
        output: &Path,
        format: DocumentFormat,
    ) -> RedactorResult<RedactionReport> {
        if !input.exists() {
            return Err(RedactorError::Io {
                path: input.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Input file does not exist",
                ),
            });
        }
        if input == output {
            return Err(RedactorError::InvalidInput {
                parameter: "output".to_string(),
                reason: "output must differ from input".to_string(),
            });
        }
        self.redactor_for(format)?.redact(input, output)
    }

    /// Unnormalized candidate name; unsupported or unreadable inputs yield `None`.
    pub fn extract_candidate_name(&self, input: &Path) -> Option<String> {
        let format = DocumentFormat::from_path(input).ok()?;
        self.redactor_for(format).ok()?.candidate_name(input)
    }

    /// Redacts one file into `out_dir`, naming it after the candidate.
    pub fn anonymize_into_dir(
        &self,
        input: &Path,
        out_dir: &Path,
        names: &mut OutputNames,
    ) -> RedactorResult<RedactionReport> {
        let format = DocumentFormat::from_path(input)?;
        let candidate = self.extract_candidate_name(input);
        let stem = names.claim(&output_stem(input, candidate.as_deref()));
        let output = out_dir.join(format!("{stem}.{}", format.extension()));

        std::fs::create_dir_all(out_dir).map_err(|e| RedactorError::Io {
            path: out_dir.to_path_buf(),
            source: e,
        })?;
        self.redact(input, &output, format)
    }

    /// Redacts each input in order; failures are recorded and skipped.
    pub fn redact_batch(&self, inputs: &[PathBuf], out_dir: &Path) -> BatchReport {
        let mut names = OutputNames::new();
        let mut batch = BatchReport::default();
        for input in inputs {
            match self.anonymize_into_dir(input, out_dir, &mut names) {
                Ok(report) => batch.succeeded.push(report),
                Err(e) => {
                    warn!(input = %input.display(), error = %e, "Document failed");
                    batch.failed.push((input.clone(), e));
                }
            }
        }
        info!(
            succeeded = batch.succeeded.len(),
            failed = batch.failed.len(),
            "Batch complete"
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(Path::new("cv.pdf"), Some("Jane Doe")), "Jane_Doe");
        assert_eq!(output_stem(Path::new("in/cv.pdf"), None), "V1_cv");
        assert_eq!(output_stem(Path::new("cv.docx"), Some("123")), "V1_cv");
    }

    #[test]
    fn test_output_names_are_unique() {
        let mut names = OutputNames::new();
        assert_eq!(names.claim("Jane_Doe"), "Jane_Doe");
        assert_eq!(names.claim("Jane_Doe"), "Jane_Doe_2");
        assert_eq!(names.claim("Jane_Doe"), "Jane_Doe_3");
        assert_eq!(names.claim("V1_cv"), "V1_cv");
    }

    #[test]
    fn test_service_dispatch() {
        let service = RedactionService::new(RedactorConfig::default()).unwrap();
        assert_eq!(
            service.redactor_for(DocumentFormat::Pdf).unwrap().name(),
            "PdfRedaction"
        );
        assert_eq!(
            service.redactor_for(DocumentFormat::Docx).unwrap().name(),
            "DocxRedaction"
        );
        assert!(service.extract_candidate_name(Path::new("notes.txt")).is_none());
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let service = RedactionService::new(RedactorConfig::default()).unwrap();
        let batch = service.redact_batch(
            &[dir.path().join("missing.docx"), dir.path().join("notes.txt")],
            &dir.path().join("out"),
        );
        assert_eq!(batch.total(), 2);
        assert_eq!(batch.failed.len(), 2);
        assert!(matches!(
            batch.failed[1].1,
            RedactorError::UnsupportedFormat { .. }
        ));
    }
}
