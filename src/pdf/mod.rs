//! PDF backend: MuPDF page snapshots, `lopdf` path scanning and the
//! two-pass whiteout writer.

pub mod apply;
pub mod paths;
pub mod snapshot;

pub use apply::{apply_whiteouts, ApplyStats, PageEdits};
pub use snapshot::{first_page, load_snapshots, PageSnapshot};

use crate::error::{RedactorError, RedactorResult};
use std::path::Path;

/// Text layer of a PDF, one layout line per line and pages separated by a
/// blank line.
pub fn extract_text(path: &Path) -> RedactorResult<String> {
    let doc = snapshot::open_document(path)?;
    let page_count = doc.page_count().map_err(|e| {
        snapshot::mupdf_error("Failed to get page count".to_string(), None, e)
    })?;

    let mut pages = Vec::with_capacity(page_count.max(0) as usize);
    for page_idx in 0..page_count {
        let index = page_idx as usize;
        let page = doc.load_page(page_idx).map_err(|e| RedactorError::PdfProcessing {
            message: format!("Failed to load page {}", index + 1),
            page: Some(index + 1),
            source: Some(Box::new(e)),
        })?;
        pages.push(snapshot::snapshot_page(&page, index)?.plain_text());
    }
    Ok(pages.join("\n\n"))
}
