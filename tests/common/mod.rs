//! Common test utilities and helpers.
//!
//! This module provides shared functionality for all tests, including:
//! - Resume fixture builders for PDF and DOCX
//! - Custom assertions over extracted text
//! - The global MuPDF lock

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

use std::sync::Mutex;

// Global mutex to serialize MuPDF operations across tests
// MuPDF has thread-safety issues with font loading, so we need to ensure
// only one test uses MuPDF at a time
pub static MUPDF_LOCK: Mutex<()> = Mutex::new(());

/// Wraps MuPDF operations with the global lock.
#[allow(unused_macros)]
macro_rules! with_mupdf_lock {
    ($body:expr) => {{
        let _guard = $crate::common::MUPDF_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        $body
    }};
}
