//! Applies planned whiteouts to a PDF.
//!
//! Two passes run over the document:
//!
//! 1. MuPDF redaction annotations are placed over every region and applied,
//!    which physically removes the text, images and marks underneath.
//! 2. `lopdf` removes link annotations on redacted pages and paints an opaque
//!    white box over each region, so the removed area reads as blank paper.
//!
//! The first pass writes a staging file next to the output. Staging is always
//! removed, and a partial output is removed when either pass fails.

use super::paths::page_box;
use super::snapshot::{mupdf_error, open_document, utf8_path};
use crate::domain::Rect;
use crate::error::{RedactorError, RedactorResult};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use mupdf::pdf::{PdfAnnotationType, PdfPage};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Regions to white out on one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageEdits {
    /// Zero-based page index
    pub page_index: usize,
    /// Regions in top-left page coordinates
    pub regions: Vec<Rect>,
    /// Remove link annotations from this page
    pub strip_links: bool,
}

/// What the apply step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyStats {
    pub regions_applied: usize,
    pub links_removed: usize,
    pub pages_modified: usize,
}

fn staging_path(output: &Path) -> PathBuf {
    output.with_extension("staging.pdf")
}

/// Writes `input` with `edits` applied to `output`.
pub fn apply_whiteouts(input: &Path, output: &Path, edits: &[PageEdits]) -> RedactorResult<ApplyStats> {
    let staging = staging_path(output);
    let result = redact_with_mupdf(input, &staging, edits)
        .and_then(|regions| finalize_with_lopdf(&staging, output, edits).map(|s| (regions, s)));

    if let Err(e) = std::fs::remove_file(&staging) {
        debug!(path = %staging.display(), error = %e, "Staging file not removed");
    }

    match result {
        Ok((regions, mut stats)) => {
            stats.regions_applied = regions;
            Ok(stats)
        }
        Err(e) => {
            if output.exists() {
                if let Err(rm) = std::fs::remove_file(output) {
                    warn!(path = %output.display(), error = %rm, "Could not remove partial output");
                }
            }
            Err(e)
        }
    }
}

fn redact_with_mupdf(input: &Path, staging: &Path, edits: &[PageEdits]) -> RedactorResult<usize> {
    let pdf_doc = open_document(input)?;
    let mut applied = 0;

    for edit in edits.iter().filter(|e| !e.regions.is_empty()) {
        let page_no = edit.page_index + 1;
        let page = pdf_doc
            .load_page(edit.page_index as i32)
            .map_err(|e| mupdf_error(format!("Failed to load page {}", page_no), Some(page_no), e))?;
        let mut pdf_page = match PdfPage::try_from(page) {
            Ok(p) => p,
            Err(_) => return Err(RedactorError::pdf("Page is not a PDF page", Some(page_no))),
        };

        for region in &edit.regions {
            let annot = pdf_page
                .create_annotation(PdfAnnotationType::Redact)
                .map_err(|e| {
                    mupdf_error("Failed to create redaction annotation".to_string(), Some(page_no), e)
                })?;
            unsafe {
                ffi::set_annotation_rect(&annot, *region);
            }
            applied += 1;
        }

        pdf_page
            .redact()
            .map_err(|e| mupdf_error(format!("Failed to apply redactions on page {}", page_no), Some(page_no), e))?;
        debug!(page = page_no, regions = edit.regions.len(), "Applied redactions");
    }

    let staging_str = utf8_path(staging)?;
    pdf_doc
        .save(staging_str)
        .map_err(|e| mupdf_error("Failed to save redacted PDF".to_string(), None, e))?;
    Ok(applied)
}

fn finalize_with_lopdf(staging: &Path, output: &Path, edits: &[PageEdits]) -> RedactorResult<ApplyStats> {
    let mut doc = Document::load(staging)?;
    let pages = doc.get_pages();
    let mut stats = ApplyStats::default();

    for edit in edits {
        let page_no = edit.page_index + 1;
        let Some(&page_id) = pages.get(&(page_no as u32)) else {
            return Err(RedactorError::pdf("Page missing after redaction", Some(page_no)));
        };
        let mut touched = false;
        if edit.strip_links {
            let removed = remove_link_annotations(&mut doc, page_id)?;
            stats.links_removed += removed;
            touched |= removed > 0;
        }
        if !edit.regions.is_empty() {
            paint_white_boxes(&mut doc, page_id, &edit.regions)?;
            touched = true;
        }
        if touched {
            stats.pages_modified += 1;
        }
    }

    doc.save(output).map_err(|e| RedactorError::Io {
        path: output.to_path_buf(),
        source: e,
    })?;
    Ok(stats)
}

fn is_link(doc: &Document, annot: &Object) -> bool {
    let dict = match annot {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    };
    dict.and_then(|d| d.get(b"Subtype").ok())
        .and_then(|s| s.as_name().ok())
        == Some(&b"Link"[..])
}

/// Drops `/Link` annotations from a page and returns how many were removed.
fn remove_link_annotations(doc: &mut Document, page_id: ObjectId) -> RedactorResult<usize> {
    let annots: Vec<Object> = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Annots") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => doc.get_object(*id)?.as_array()?.clone(),
            _ => return Ok(0),
        }
    };

    let (links, kept): (Vec<Object>, Vec<Object>) =
        annots.into_iter().partition(|a| is_link(doc, a));
    if links.is_empty() {
        return Ok(0);
    }

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    if kept.is_empty() {
        page.remove(b"Annots");
    } else {
        page.set("Annots", Object::Array(kept));
    }
    Ok(links.len())
}

/// Appends opaque white rectangles to a page's content.
///
/// Existing content is wrapped in `q`/`Q` so its graphics state cannot leak
/// into the overlay.
fn paint_white_boxes(doc: &mut Document, page_id: ObjectId, regions: &[Rect]) -> RedactorResult<()> {
    let media = page_box(doc, page_id);
    let mut overlay = String::from("Q\nq\n1 1 1 rg\n");
    for r in regions {
        let x = media.x0 + r.x0;
        let y = media.y1 - r.y1;
        let _ = writeln!(overlay, "{:.2} {:.2} {:.2} {:.2} re f", x, y, r.width(), r.height());
    }
    overlay.push_str("Q\n");

    let existing: Vec<Object> = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let close_id = doc.add_object(Stream::new(Dictionary::new(), overlay.into_bytes()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(close_id));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// FFI helpers for MuPDF annotation operations.
mod ffi {
    use crate::domain::Rect;
    use mupdf::pdf::PdfAnnotation;

    /// Sets the rectangle of a PDF annotation through MuPDF's C API.
    ///
    /// # Safety
    /// `PdfAnnotation` must wrap a single `*mut pdf_annot` pointer and the
    /// annotation must still belong to a live page.
    pub unsafe fn set_annotation_rect(annot: &PdfAnnotation, rect: Rect) {
        #[repr(C)]
        struct PdfAnnotRaw {
            inner: *mut mupdf_sys::pdf_annot,
        }

        let annot_raw = std::mem::transmute::<&PdfAnnotation, &PdfAnnotRaw>(annot);
        let ctx = mupdf_sys::mupdf_new_base_context();

        if !ctx.is_null() {
            let fz_rect = mupdf_sys::fz_rect {
                x0: rect.x0,
                y0: rect.y0,
                x1: rect.x1,
                y1: rect.y1,
            };

            mupdf_sys::pdf_set_annot_rect(ctx, annot_raw.inner, fz_rect);
            mupdf_sys::mupdf_drop_base_context(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_sits_next_to_output() {
        assert_eq!(
            staging_path(Path::new("out/Jane_Doe.pdf")),
            PathBuf::from("out/Jane_Doe.staging.pdf")
        );
    }

    #[test]
    fn test_missing_input_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let edits = [PageEdits {
            page_index: 0,
            regions: vec![Rect::new(0.0, 0.0, 10.0, 10.0)],
            strip_links: true,
        }];
        assert!(apply_whiteouts(&dir.path().join("missing.pdf"), &output, &edits).is_err());
        assert!(!output.exists());
        assert!(!staging_path(&output).exists());
    }
}
