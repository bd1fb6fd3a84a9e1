//! PDF redaction by geometric whiteout, with the fallback pipeline as the
//! second route.
//!
//! The direct route snapshots every page, plans whiteouts inside the header
//! budget and applies them in one write. It reports
//! [`DirectOutcome::NeedsFallback`] instead of failing when the first page is
//! design-heavy or when the layout backends fail; the caller then reprocesses
//! the original input through [`FallbackPipeline`]. Nothing from a failed
//! direct attempt is kept.

use super::fallback::{FallbackPipeline, FlowConverter};
use super::planner::{is_design_heavy, plan_document, PagePlan};
use super::strategy::{
    DocumentFormat, DocumentRedactor, FallbackReason, RedactionReport, RedactionRoute,
};
use crate::config::RedactorConfig;
use crate::domain::name::{choose_paged_candidate, SpanCandidate};
use crate::domain::SignalDetector;
use crate::error::{RedactorError, RedactorResult};
use crate::pdf::{apply_whiteouts, first_page, load_snapshots, PageEdits, PageSnapshot};
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of the direct route.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectOutcome {
    Redacted(RedactionReport),
    NeedsFallback(FallbackReason),
}

fn recoverable(err: RedactorError) -> RedactorResult<DirectOutcome> {
    if err.is_layout_failure() {
        Ok(DirectOutcome::NeedsFallback(FallbackReason::LayoutFailure(
            err.to_string(),
        )))
    } else {
        Err(err)
    }
}

/// PDF redactor.
pub struct PdfRedactor {
    config: RedactorConfig,
    detector: SignalDetector,
    fallback: FallbackPipeline,
}

impl Default for PdfRedactor {
    fn default() -> Self {
        let detector = SignalDetector::builtin();
        Self {
            config: RedactorConfig::default(),
            fallback: FallbackPipeline::with_text_layer(detector.clone()),
            detector,
        }
    }
}

impl PdfRedactor {
    pub fn new(config: RedactorConfig) -> RedactorResult<Self> {
        let detector = SignalDetector::new(config.lexicon.clone())?;
        Ok(Self {
            fallback: FallbackPipeline::with_text_layer(detector.clone()),
            detector,
            config,
        })
    }

    /// Replaces the converter used by the fallback pipeline.
    pub fn with_converter(mut self, converter: Box<dyn FlowConverter>) -> Self {
        self.fallback = FallbackPipeline::new(self.detector.clone(), converter);
        self
    }

    /// Plans whiteouts for already extracted pages.
    pub fn plan(&self, pages: &[PageSnapshot]) -> Vec<PagePlan> {
        plan_document(pages, &self.config.thresholds, &self.detector)
    }

    /// Geometric redaction of `input` into `output`, without fallback.
    pub fn redact_direct(&self, input: &Path, output: &Path) -> RedactorResult<DirectOutcome> {
        let pages = match load_snapshots(input) {
            Ok(pages) => pages,
            Err(e) => return recoverable(e),
        };

        let design_heavy = pages
            .first()
            .map_or(true, |page| is_design_heavy(page, &self.config.thresholds));
        if design_heavy {
            return Ok(DirectOutcome::NeedsFallback(FallbackReason::DesignHeavy));
        }

        let plans = self.plan(&pages);
        for plan in &plans {
            debug!(
                page = plan.page_index + 1,
                y_limit = plan.y_limit,
                whiteouts = plan.whiteouts.len(),
                "Planned page"
            );
        }

        let planned: usize = plans.iter().map(|p| p.whiteouts.len()).sum();
        if planned == 0 && self.config.thresholds.escalate_when_clean {
            return Ok(DirectOutcome::NeedsFallback(FallbackReason::NothingRedacted));
        }

        let edits: Vec<PageEdits> = plans.iter().map(PagePlan::to_edits).collect();
        let stats = match apply_whiteouts(input, output, &edits) {
            Ok(stats) => stats,
            Err(e) => return recoverable(e),
        };

        let mut report = RedactionReport::new(input, output, DocumentFormat::Pdf);
        report.units_processed = pages.len();
        report.units_modified = stats.pages_modified;
        report.regions_redacted = stats.regions_applied;
        debug!(links_removed = stats.links_removed, "Removed link annotations");
        Ok(DirectOutcome::Redacted(report))
    }
}

impl DocumentRedactor for PdfRedactor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn redact(&self, input: &Path, output: &Path) -> RedactorResult<RedactionReport> {
        info!(input = %input.display(), "Redacting PDF");
        let reason = match self.redact_direct(input, output)? {
            DirectOutcome::Redacted(report) => {
                info!(
                    output = %report.output.display(),
                    pages = report.units_processed,
                    regions = report.regions_redacted,
                    "PDF redaction complete"
                );
                return Ok(report);
            }
            DirectOutcome::NeedsFallback(reason) => reason,
        };

        warn!(input = %input.display(), %reason, "Falling back to flowed conversion");
        let outcome = self.fallback.full_pdf_anonymization(input, output)?;

        let mut report = RedactionReport::new(input, &outcome.output, DocumentFormat::Docx);
        report.route = RedactionRoute::Fallback(reason);
        report.units_processed = outcome.paragraphs;
        report.units_modified = outcome.cleared;
        report.regions_redacted = outcome.cleared;
        info!(output = %outcome.output.display(), cleared = outcome.cleared, "Fallback complete");
        Ok(report)
    }

    fn candidate_name(&self, input: &Path) -> Option<String> {
        let page = match first_page(input) {
            Ok(Some(page)) => page,
            Ok(None) => return None,
            Err(e) => {
                debug!(input = %input.display(), error = %e, "No name candidate");
                return None;
            }
        };
        let spans: Vec<SpanCandidate> = page
            .spans
            .iter()
            .map(|s| SpanCandidate {
                text: s.text.clone(),
                font_size: s.font_size,
                top: s.bbox.y0,
            })
            .collect();
        choose_paged_candidate(
            &spans,
            page.height,
            self.config.thresholds.name_region_fraction,
        )
    }

    fn name(&self) -> &str {
        "PdfRedaction"
    }
}
