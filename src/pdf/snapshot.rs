//! Immutable per-page snapshots extracted with MuPDF.
//!
//! A snapshot holds everything the detectors look at: words with boxes, the
//! layout engine's lines and blocks, raster image boxes and small vector
//! paths. Detection works on snapshots only, so it never touches the
//! document being modified.

use super::paths;
use crate::domain::{Block, Rect, TextSpan, Word};
use crate::error::{RedactorError, RedactorResult};
use mupdf::pdf::PdfDocument;
use mupdf::{Page, Quad, TextBlockType, TextLine, TextPageOptions};
use std::path::Path;

/// Everything the detectors need to know about one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    /// Zero-based page index
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub words: Vec<Word>,
    /// Layout lines with their font size
    pub spans: Vec<TextSpan>,
    pub blocks: Vec<Block>,
    /// Raster image boxes
    pub images: Vec<Rect>,
    /// Painted vector path boxes
    pub drawings: Vec<Rect>,
}

impl PageSnapshot {
    /// An empty page of the given size.
    pub fn blank(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            ..Default::default()
        }
    }

    /// Extracted text, one layout line per line.
    pub fn plain_text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn utf8_path(path: &Path) -> RedactorResult<&str> {
    path.to_str().ok_or_else(|| RedactorError::InvalidInput {
        parameter: "path".to_string(),
        reason: format!("'{}' contains invalid UTF-8", path.display()),
    })
}

pub(crate) fn mupdf_error(message: String, page: Option<usize>, err: mupdf::Error) -> RedactorError {
    RedactorError::PdfProcessing {
        message,
        page,
        source: Some(Box::new(err)),
    }
}

/// Opens a PDF with MuPDF.
pub(crate) fn open_document(path: &Path) -> RedactorResult<PdfDocument> {
    let path_str = utf8_path(path)?;
    PdfDocument::open(path_str)
        .map_err(|e| mupdf_error("Failed to open PDF with MuPDF".to_string(), None, e))
}

fn quad_rect(quad: &Quad) -> Rect {
    Rect {
        x0: quad.ul.x.min(quad.ll.x).min(quad.ur.x).min(quad.lr.x),
        y0: quad.ul.y.min(quad.ll.y).min(quad.ur.y).min(quad.lr.y),
        x1: quad.ul.x.max(quad.ll.x).max(quad.ur.x).max(quad.lr.x),
        y1: quad.ul.y.max(quad.ll.y).max(quad.ur.y).max(quad.lr.y),
    }
}

fn to_rect(r: mupdf::Rect) -> Rect {
    Rect::new(r.x0, r.y0, r.x1, r.y1)
}

/// Splits one layout line into whitespace-delimited words.
fn read_line(line: &TextLine<'_>) -> (TextSpan, Vec<Word>) {
    let mut text = String::new();
    let mut font_size: f32 = 0.0;
    let mut words = Vec::new();
    let mut current: Option<(String, Rect)> = None;

    for ch in line.chars() {
        let Some(c) = ch.char() else { continue };
        text.push(c);
        if c.is_whitespace() {
            if let Some((word, bbox)) = current.take() {
                words.push(Word::new(word, bbox));
            }
            continue;
        }
        font_size = font_size.max(ch.size());
        let bbox = quad_rect(&ch.quad());
        current = Some(match current.take() {
            Some((mut word, prev)) => {
                word.push(c);
                (word, prev.union(&bbox))
            }
            None => (c.to_string(), bbox),
        });
    }
    if let Some((word, bbox)) = current {
        words.push(Word::new(word, bbox));
    }

    let span = TextSpan {
        text: text.trim().to_string(),
        bbox: to_rect(line.bounds()),
        font_size,
    };
    (span, words)
}

/// Snapshot of one page's text layer and images.
pub fn snapshot_page(page: &Page, index: usize) -> RedactorResult<PageSnapshot> {
    let bounds = page
        .bounds()
        .map_err(|e| mupdf_error("Failed to read page bounds".to_string(), Some(index + 1), e))?;
    let text_page = page
        .to_text_page(TextPageOptions::PRESERVE_IMAGES)
        .map_err(|e| mupdf_error("Failed to extract text".to_string(), Some(index + 1), e))?;

    let mut snapshot = PageSnapshot::blank(
        index,
        bounds.x1 - bounds.x0,
        bounds.y1 - bounds.y0,
    );

    for block in text_page.blocks() {
        match block.r#type() {
            TextBlockType::Image => snapshot.images.push(to_rect(block.bounds())),
            TextBlockType::Text => {
                let mut lines = Vec::new();
                for line in block.lines() {
                    let (span, words) = read_line(&line);
                    if span.text.is_empty() {
                        continue;
                    }
                    lines.push(span.text.clone());
                    snapshot.spans.push(span);
                    snapshot.words.extend(words);
                }
                if !lines.is_empty() {
                    snapshot.blocks.push(Block {
                        bbox: to_rect(block.bounds()),
                        lines,
                    });
                }
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    Ok(snapshot)
}

/// Snapshots of every page, including vector paths.
pub fn load_snapshots(path: &Path) -> RedactorResult<Vec<PageSnapshot>> {
    let doc = open_document(path)?;
    let page_count = doc
        .page_count()
        .map_err(|e| mupdf_error("Failed to get page count".to_string(), None, e))?;
    let drawings = paths::scan_document(path)?;

    let mut pages = Vec::with_capacity(page_count.max(0) as usize);
    for page_idx in 0..page_count {
        let index = page_idx as usize;
        let page = doc
            .load_page(page_idx)
            .map_err(|e| mupdf_error(format!("Failed to load page {}", index + 1), Some(index + 1), e))?;
        let mut snapshot = snapshot_page(&page, index)?;
        snapshot.drawings = drawings.get(index).cloned().unwrap_or_default();
        pages.push(snapshot);
    }
    Ok(pages)
}

/// Snapshot of the first page only (text layer and images).
pub fn first_page(path: &Path) -> RedactorResult<Option<PageSnapshot>> {
    let doc = open_document(path)?;
    let page_count = doc
        .page_count()
        .map_err(|e| mupdf_error("Failed to get page count".to_string(), None, e))?;
    if page_count == 0 {
        return Ok(None);
    }
    let page = doc
        .load_page(0)
        .map_err(|e| mupdf_error("Failed to load page 1".to_string(), Some(1), e))?;
    snapshot_page(&page, 0).map(Some)
}
