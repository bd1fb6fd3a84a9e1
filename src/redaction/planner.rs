//! Page planning for PDF redaction.
//!
//! Planning is a sequence of pure detectors over immutable
//! [`PageSnapshot`]s. Each detector proposes whiteouts for one page; the
//! header budget decides how far down the document they may reach. Nothing
//! here touches a document, so every rule is unit-testable with synthetic
//! snapshots.

use crate::config::Thresholds;
use crate::domain::name::{block_resembles_name, collision_keep_count};
use crate::domain::signals::emoji_pattern;
use crate::domain::{group_lines, Rect, Signal, SignalDetector};
use crate::pdf::{PageEdits, PageSnapshot};

/// Why a region is whited out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteoutReason {
    SmallImage,
    SignalLine,
    SmallDrawing,
    SignalBlock,
    /// Lower part of a block whose first line is the name
    NameBlockTail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Whiteout {
    pub rect: Rect,
    pub reason: WhiteoutReason,
}

impl Whiteout {
    fn new(rect: Rect, reason: WhiteoutReason) -> Self {
        Self { rect, reason }
    }
}

/// Planned edits for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page_index: usize,
    /// Detectors only act above this offset from the top of the page
    pub y_limit: f32,
    pub whiteouts: Vec<Whiteout>,
}

impl PagePlan {
    pub fn regions(&self) -> Vec<Rect> {
        self.whiteouts.iter().map(|w| w.rect).collect()
    }

    pub fn count(&self, reason: WhiteoutReason) -> usize {
        self.whiteouts.iter().filter(|w| w.reason == reason).count()
    }

    /// Links are always stripped from pages inside the budget.
    pub fn to_edits(&self) -> PageEdits {
        PageEdits {
            page_index: self.page_index,
            regions: self.regions(),
            strip_links: true,
        }
    }
}

/// Running budget of document height where heuristics may act.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderBudget {
    limit: f32,
    cursor: f32,
}

impl HeaderBudget {
    pub fn new(total_height: f32, fraction: f32) -> Self {
        Self {
            limit: total_height * fraction,
            cursor: 0.0,
        }
    }

    pub fn for_pages(pages: &[PageSnapshot], fraction: f32) -> Self {
        Self::new(pages.iter().map(|p| p.height).sum(), fraction)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.limit
    }

    /// The `y_limit` for the next page, or `None` once the budget is spent.
    pub fn take(&mut self, page_height: f32) -> Option<f32> {
        if self.is_exhausted() {
            return None;
        }
        let y_limit = page_height.min(self.limit - self.cursor);
        self.cursor += page_height;
        Some(y_limit)
    }
}

/// Whether a first page's text layer is too thin or too fragmented to trust.
pub fn is_design_heavy(page: &PageSnapshot, thresholds: &Thresholds) -> bool {
    let text = page.plain_text();
    if text.trim().chars().count() < thresholds.design_heavy_min_chars {
        return true;
    }
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count();
    page.words.len() > thresholds.design_heavy_max_words
        && tokens < thresholds.design_heavy_min_tokens
}

/// Inputs shared by the detectors for one page.
pub struct PageContext<'a> {
    pub page: &'a PageSnapshot,
    pub y_limit: f32,
    pub thresholds: &'a Thresholds,
    pub detector: &'a SignalDetector,
}

pub type Detector = fn(&PageContext<'_>) -> Vec<Whiteout>;

/// Detectors in the order they run.
pub const DETECTORS: &[Detector] = &[small_images, signal_lines, small_drawings, signal_blocks];

/// Contact icons: raster images small in both directions.
pub fn small_images(ctx: &PageContext<'_>) -> Vec<Whiteout> {
    ctx.page
        .images
        .iter()
        .filter(|r| r.fits_within(ctx.thresholds.small_image_max) && r.y1 <= ctx.y_limit)
        .map(|r| Whiteout::new(*r, WhiteoutReason::SmallImage))
        .collect()
}

/// Lines carrying a deletion signal or an emoji.
///
/// A line that opens with a plausible name keeps that name. A line whose only
/// trigger is an emoji loses just the emoji-bearing words.
pub fn signal_lines(ctx: &PageContext<'_>) -> Vec<Whiteout> {
    let mut out = Vec::new();
    for line in group_lines(&ctx.page.words) {
        if line.words.is_empty() || line.bottom() > ctx.y_limit {
            continue;
        }
        let signals = ctx.detector.classify(&line.text());
        if signals.warrants_deletion() {
            let texts: Vec<&str> = line.words.iter().map(|w| w.text.as_str()).collect();
            let keep = collision_keep_count(&texts, ctx.detector).unwrap_or(0);
            out.extend(
                line.words
                    .iter()
                    .skip(keep)
                    .map(|w| Whiteout::new(w.bbox, WhiteoutReason::SignalLine)),
            );
        } else if signals.contains(Signal::Emoji) {
            out.extend(
                line.words
                    .iter()
                    .filter(|w| emoji_pattern().is_match(&w.text))
                    .map(|w| Whiteout::new(w.bbox, WhiteoutReason::SignalLine)),
            );
        }
    }
    out
}

/// Vector icons near the top of the page.
pub fn small_drawings(ctx: &PageContext<'_>) -> Vec<Whiteout> {
    let zone = ctx.page.height * ctx.thresholds.drawing_zone_fraction;
    ctx.page
        .drawings
        .iter()
        .filter(|r| r.fits_within(ctx.thresholds.small_drawing_max) && r.y1 <= zone)
        .map(|r| Whiteout::new(*r, WhiteoutReason::SmallDrawing))
        .collect()
}

/// Layout blocks with corroborated signals.
pub fn signal_blocks(ctx: &PageContext<'_>) -> Vec<Whiteout> {
    let mut out = Vec::new();
    for block in &ctx.page.blocks {
        if block.bbox.y1 > ctx.y_limit {
            continue;
        }
        let text = block.text();
        let signals = ctx.detector.classify(&text);
        if block_resembles_name(&text, &signals) {
            continue;
        }
        if signals.block_score() < ctx.thresholds.block_signal_threshold {
            continue;
        }
        let opens_with_name = block
            .first_line()
            .is_some_and(|line| block_resembles_name(line, &ctx.detector.classify(line)));
        out.push(if opens_with_name {
            Whiteout::new(
                block.bbox.lower_part(ctx.thresholds.name_block_keep_fraction),
                WhiteoutReason::NameBlockTail,
            )
        } else {
            Whiteout::new(block.bbox, WhiteoutReason::SignalBlock)
        });
    }
    out
}

/// Runs every detector on one page.
pub fn plan_page(ctx: &PageContext<'_>) -> PagePlan {
    PagePlan {
        page_index: ctx.page.index,
        y_limit: ctx.y_limit,
        whiteouts: DETECTORS.iter().flat_map(|detect| detect(ctx)).collect(),
    }
}

/// Plans every page inside the header budget, in page order.
pub fn plan_document(
    pages: &[PageSnapshot],
    thresholds: &Thresholds,
    detector: &SignalDetector,
) -> Vec<PagePlan> {
    let mut budget = HeaderBudget::for_pages(pages, thresholds.pdf_header_fraction);
    let mut plans = Vec::new();
    for page in pages {
        let Some(y_limit) = budget.take(page.height) else {
            break;
        };
        plans.push(plan_page(&PageContext {
            page,
            y_limit,
            thresholds,
            detector,
        }));
    }
    plans
}
