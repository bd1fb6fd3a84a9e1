//! DOCX document model.
//!
//! A DOCX file is a zip package of XML parts. [`DocxPackage`] holds the raw
//! parts, [`XmlDocument`] gives a mutable tree over one part, and
//! [`paragraph`] implements the paragraph-level edits the redactors need.

pub mod package;
pub mod paragraph;
pub mod writer;
pub mod xml;

pub use package::{DocxPackage, MAIN_PART};
pub use writer::{build_package, FlowParagraph};
pub use xml::{Element, XmlDocument};

use crate::error::RedactorResult;
use std::path::Path;

/// Paragraph texts of the main document part, in document order.
pub fn paragraph_texts(package: &DocxPackage) -> RedactorResult<Vec<String>> {
    let xml = package.part(MAIN_PART).unwrap_or_default();
    let doc = XmlDocument::parse(MAIN_PART, xml)?;
    Ok(paragraph::paragraph_texts(&doc))
}

/// Plain text of a DOCX file, one paragraph per line.
pub fn extract_text(path: &Path) -> RedactorResult<String> {
    let package = DocxPackage::open(path)?;
    Ok(paragraph_texts(&package)?.join("\n"))
}
