//! Page geometry: rectangles, words, reconstructed lines and layout blocks.
//!
//! Coordinates follow the extraction backend: origin at the top-left of the
//! page, `y` growing downward, units in PDF points.

use std::collections::BTreeMap;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Both sides no longer than `max`.
    pub fn fits_within(&self, max: f32) -> bool {
        self.width() <= max && self.height() <= max
    }

    /// Lower part of the rectangle, dropping `top_fraction` of its height.
    pub fn lower_part(&self, top_fraction: f32) -> Rect {
        Rect {
            y0: self.y0 + self.height() * top_fraction,
            ..*self
        }
    }
}

/// One extracted word with its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: Rect,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Words sharing one rounded vertical origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub words: Vec<Word>,
}

impl Line {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lowest word edge on the line.
    pub fn bottom(&self) -> f32 {
        self.words
            .iter()
            .map(|w| w.bbox.y1)
            .fold(f32::MIN, f32::max)
    }
}

/// Rounds a coordinate to one decimal place, as an integer key.
fn line_key(y: f32) -> i64 {
    (y * 10.0).round() as i64
}

/// Groups words into lines by their top edge rounded to one decimal.
///
/// Lines come back top to bottom, words left to right.
pub fn group_lines(words: &[Word]) -> Vec<Line> {
    let mut lines: BTreeMap<i64, Vec<Word>> = BTreeMap::new();
    for word in words {
        lines
            .entry(line_key(word.bbox.y0))
            .or_default()
            .push(word.clone());
    }
    lines
        .into_values()
        .map(|mut words| {
            words.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            Line { words }
        })
        .collect()
}

/// A text line as reported by the layout engine, with its font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub bbox: Rect,
    pub font_size: f32,
}

/// A layout block: a rectangle enclosing consecutive text lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub bbox: Rect,
    pub lines: Vec<String>,
}

impl Block {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }
}
