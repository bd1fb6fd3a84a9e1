//! Format-independent detection logic.
//!
//! Signals, keyword data, name heuristics and page geometry live here; the
//! document-specific redactors in [`crate::redaction`] consume them.

pub mod geometry;
pub mod lexicon;
pub mod name;
pub mod signals;

pub use geometry::{group_lines, Block, Line, Rect, TextSpan, Word};
pub use lexicon::Lexicon;
pub use name::{normalize_name, SpanCandidate};
pub use signals::{strip_emoji, Signal, SignalDetector, SignalSet};
