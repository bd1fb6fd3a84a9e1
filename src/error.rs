//! Error types for the resume redaction library.
//!
//! Errors are grouped by where they arise (I/O, PDF backends, DOCX packages,
//! the fallback converter, configuration). The PDF redactor inspects
//! [`RedactorError::is_layout_failure`] to decide whether a failure is worth a
//! second attempt through the fallback pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for redaction operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

/// Boxed backend error kept as a source for diagnostics.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error type for all redaction operations.
#[derive(Debug, Error)]
pub enum RedactorError {
    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error occurred while locating, aggregating or applying PDF redactions
    #[error(
        "PDF processing error{}: {message}",
        .page.map(|p| format!(" on page {p}")).unwrap_or_default()
    )]
    PdfProcessing {
        message: String,
        page: Option<usize>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A DOCX package or one of its XML parts could not be read or written
    #[error("DOCX error in part '{part}': {message}")]
    DocxProcessing { part: String, message: String },

    /// The fallback PDF-to-flow conversion failed
    #[error("Conversion failed for '{}': {message}", .path.display())]
    Conversion { path: PathBuf, message: String },

    /// The input is neither PDF nor DOCX
    #[error("Unsupported format for '{}': only .pdf and .docx are accepted", .path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Invalid configuration or parameters
    #[error("Invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// Configuration or lexicon could not be loaded
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Backend-specific error (MuPDF, lopdf, zip)
    #[error("{backend} backend error: {message}")]
    BackendError {
        backend: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl RedactorError {
    /// Builds a [`RedactorError::PdfProcessing`] without a source.
    pub fn pdf(message: impl Into<String>, page: Option<usize>) -> Self {
        Self::PdfProcessing {
            message: message.into(),
            page,
            source: None,
        }
    }

    /// Builds a [`RedactorError::BackendError`] carrying the backend's error.
    pub fn backend<E>(backend: &str, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendError {
            backend: backend.to_string(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`RedactorError::DocxProcessing`] for the named package part.
    pub fn docx(part: impl Into<String>, message: impl ToString) -> Self {
        Self::DocxProcessing {
            part: part.into(),
            message: message.to_string(),
        }
    }

    /// Returns true when the failure came from the document's layout or the
    /// PDF backends, meaning the fallback pipeline may still succeed.
    pub fn is_layout_failure(&self) -> bool {
        matches!(self, Self::PdfProcessing { .. } | Self::BackendError { .. })
    }
}

impl From<regex::Error> for RedactorError {
    fn from(err: regex::Error) -> Self {
        Self::Config {
            reason: format!("invalid keyword pattern: {err}"),
        }
    }
}

impl From<serde_json::Error> for RedactorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            reason: err.to_string(),
        }
    }
}

impl From<lopdf::Error> for RedactorError {
    fn from(err: lopdf::Error) -> Self {
        Self::backend("lopdf", err.to_string(), err)
    }
}
