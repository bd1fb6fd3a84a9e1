//! Resume anonymization for PDF and DOCX documents.
//!
//! This library removes contact details and other personal information from
//! the top of a resume while leaving the professional content intact. PDFs
//! are redacted geometrically: MuPDF physically removes the content under
//! each region and a white box is painted over it. DOCX files are edited
//! paragraph by paragraph.
//!
//! # Features
//!
//! - **Signal Detection**: Email, phone, date of birth, identity labels,
//!   addresses, social platforms, locations and emoji
//! - **Header-Scoped Heuristics**: Aggressive rules only act in the leading
//!   30% of a document
//! - **Name Preservation**: A name sharing a line with a phone number keeps its
//!   leading words
//! - **Fallback Pipeline**: Design-heavy or unreadable PDFs are converted to a
//!   flowed DOCX and redacted by keyword
//! - **Candidate Naming**: Outputs are labeled with the candidate's name
//!
//! # Architecture
//!
//! - [`domain`]: Signals, lexicon, name heuristics and page geometry
//! - [`docx`]: DOCX package and XML editing
//! - [`pdf`]: MuPDF snapshots and the whiteout writer
//! - [`redaction`]: Format redactors, fallback pipeline and service layer
//! - [`config`]: Tunable thresholds
//! - [`error`]: Error handling
//!
//! # Quick Start
//!
//! ```no_run
//! use resume_redactor::{DocumentFormat, RedactionService, RedactorConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedactionService::new(RedactorConfig::default())?;
//!
//! let report = service.redact(
//!     Path::new("resume.pdf"),
//!     Path::new("anonymized.pdf"),
//!     DocumentFormat::Pdf,
//! )?;
//! // The fallback pipeline writes a .docx instead
//! println!("wrote {}", report.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Examples
//!
//! ## Batch Into a Directory
//!
//! ```no_run
//! use resume_redactor::{RedactionService, RedactorConfig};
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedactionService::new(RedactorConfig::default())?;
//! let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.docx")];
//!
//! let batch = service.redact_batch(&inputs, Path::new("outputs"));
//! for (input, err) in &batch.failed {
//!     eprintln!("{}: {}", input.display(), err);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Signals and Names
//!
//! ```
//! use resume_redactor::domain::{normalize_name, Signal, SignalDetector};
//!
//! let detector = SignalDetector::builtin();
//! let signals = detector.classify("john@example.com");
//! assert!(signals.contains(Signal::Email));
//!
//! assert_eq!(normalize_name("Dr. Jane-Q. O'Doe").as_deref(), Some("Jane_Q_ODoe"));
//! ```

// Public API
pub mod config;
pub mod docx;
pub mod domain;
pub mod error;
pub mod pdf;
pub mod redaction;

// Re-exports for convenient access
pub use config::{RedactorConfig, Thresholds};
pub use domain::{normalize_name, Lexicon, Signal, SignalDetector, SignalSet};
pub use error::{RedactorError, RedactorResult};
pub use redaction::{
    BatchReport, DocumentFormat, DocumentRedactor, DocxRedactor, FallbackReason, PdfRedactor,
    RedactionReport, RedactionRoute, RedactionService,
};
