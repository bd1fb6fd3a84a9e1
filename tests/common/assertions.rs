//! Custom assertions for resume redaction testing.
//!
//! Text is extracted with the library's own readers, so a `.pdf` goes through
//! MuPDF and a `.docx` through the package reader.

use std::path::Path;

/// Extracts text from a PDF or DOCX output, panicking with the path on failure.
pub fn extract_text_or_panic(path: &Path) -> String {
    let is_docx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
    let result = if is_docx {
        resume_redactor::docx::extract_text(path)
    } else {
        resume_redactor::pdf::extract_text(path)
    };
    result.unwrap_or_else(|e| panic!("Failed to extract text from '{}': {e}", path.display()))
}

/// Asserts that a pattern has been removed from the output.
///
/// # Panics
/// Panics if the pattern is still found in the extracted text.
pub fn assert_redacted(path: &Path, pattern: &str) {
    let text = extract_text_or_panic(path);
    assert!(
        !text.contains(pattern),
        "Pattern '{}' should be redacted but was found in '{}'.\nExtracted text:\n{}",
        pattern,
        path.display(),
        text
    );
}

/// Asserts that a pattern survived redaction.
///
/// # Panics
/// Panics if the pattern is not found in the extracted text.
pub fn assert_preserved(path: &Path, pattern: &str) {
    let text = extract_text_or_panic(path);
    assert!(
        text.contains(pattern),
        "Pattern '{}' should be preserved but was not found in '{}'.\nExtracted text:\n{}",
        pattern,
        path.display(),
        text
    );
}

/// Asserts that an output exists and is non-empty.
pub fn assert_written(path: &Path) {
    let metadata = std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("Output should exist at '{}': {e}", path.display()));
    assert!(metadata.len() > 0, "Output should not be empty at '{}'", path.display());
}
