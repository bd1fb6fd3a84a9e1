//! Vector path boxes and page geometry read with `lopdf`.
//!
//! MuPDF's text layer does not report line art, so painted paths (icons,
//! rules, decorative shapes) are recovered by walking each page's content
//! stream. Boxes are returned in top-left page coordinates, the same space
//! MuPDF uses for text.

use crate::domain::Rect;
use crate::error::RedactorResult;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::warn;

const LETTER: Rect = Rect {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

const MAX_PARENT_DEPTH: usize = 32;

/// Numeric value of an operand.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Looks up a page attribute, following the `/Parent` chain for inherited keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_PARENT_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn box_from(doc: &Document, obj: &Object) -> Option<Rect> {
    let items = obj.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }
    let mut values = [0.0f32; 4];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = number(resolve(doc, item)?)?;
    }
    Some(Rect::new(values[0], values[1], values[2], values[3]))
}

/// Visible page box in PDF user space (CropBox, else MediaBox).
pub fn page_box(doc: &Document, page_id: ObjectId) -> Rect {
    inherited(doc, page_id, b"CropBox")
        .and_then(|obj| box_from(doc, obj))
        .or_else(|| inherited(doc, page_id, b"MediaBox").and_then(|obj| box_from(doc, obj)))
        .unwrap_or(LETTER)
}

/// Affine matrix `[a b c d e f]`.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn concat(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn transform(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    fill_white: bool,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            fill_white: false,
        }
    }
}

#[derive(Debug, Default)]
struct PathScanner {
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: Option<Rect>,
    painted: Vec<Rect>,
}

impl PathScanner {
    fn add_point(&mut self, x: f32, y: f32) {
        let (x, y) = transform(&self.state.ctm, x, y);
        let point = Rect { x0: x, y0: y, x1: x, y1: y };
        self.path = Some(match self.path {
            Some(path) => path.union(&point),
            None => point,
        });
    }

    fn paint(&mut self, fills_only: bool) {
        if let Some(path) = self.path.take() {
            if !(fills_only && self.state.fill_white) {
                self.painted.push(path);
            }
        }
    }

    fn operation(&mut self, operator: &str, operands: &[Object]) {
        let nums: Vec<f32> = operands.iter().filter_map(number).collect();
        match operator {
            "q" => self.stack.push(self.state),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" if nums.len() == 6 => {
                let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                self.state.ctm = concat(&m, &self.state.ctm);
            }
            "re" if nums.len() == 4 => {
                let (x, y, w, h) = (nums[0], nums[1], nums[2], nums[3]);
                self.add_point(x, y);
                self.add_point(x + w, y);
                self.add_point(x, y + h);
                self.add_point(x + w, y + h);
            }
            "m" | "l" | "c" | "v" | "y" => {
                for pair in nums.chunks_exact(2) {
                    self.add_point(pair[0], pair[1]);
                }
            }
            "S" | "s" | "B" | "B*" | "b" | "b*" => self.paint(false),
            "f" | "F" | "f*" => self.paint(true),
            "n" => self.path = None,
            "g" => self.state.fill_white = nums.len() == 1 && nums[0] >= 1.0,
            "rg" => self.state.fill_white = nums.len() == 3 && nums.iter().all(|v| *v >= 1.0),
            "k" => self.state.fill_white = nums.len() == 4 && nums.iter().all(|v| *v <= 0.0),
            "sc" | "scn" => {
                self.state.fill_white =
                    matches!(nums.len(), 1 | 3) && nums.iter().all(|v| *v >= 1.0)
            }
            _ => {}
        }
    }
}

/// Bounding boxes of painted paths in a decoded content stream, in PDF user
/// space. White-only fills are skipped since they paint background, not marks.
pub fn painted_paths(content: &Content) -> Vec<Rect> {
    let mut scanner = PathScanner::default();
    for op in &content.operations {
        scanner.operation(&op.operator, &op.operands);
    }
    scanner.painted
}

/// Converts a user-space box to top-left page coordinates.
pub fn to_page_space(rect: &Rect, page_box: &Rect) -> Rect {
    Rect::new(
        rect.x0 - page_box.x0,
        page_box.y1 - rect.y1,
        rect.x1 - page_box.x0,
        page_box.y1 - rect.y0,
    )
}

/// Painted path boxes for every page, in page order.
pub fn scan_document(path: &Path) -> RedactorResult<Vec<Vec<Rect>>> {
    let doc = Document::load(path)?;
    let mut pages = Vec::new();
    for (page_number, page_id) in doc.get_pages() {
        let media = page_box(&doc, page_id);
        let decoded = doc
            .get_page_content(page_id)
            .and_then(|bytes| Content::decode(&bytes));
        let boxes = match decoded {
            Ok(content) => painted_paths(&content)
                .iter()
                .map(|r| to_page_space(r, &media))
                .collect(),
            Err(e) => {
                warn!(page = page_number, error = %e, "Could not decode content stream");
                Vec::new()
            }
        };
        pages.push(boxes);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn reals(values: &[f32]) -> Vec<Object> {
        values.iter().map(|v| Object::Real((*v).into())).collect()
    }

    #[test]
    fn test_stroked_rect_is_reported() {
        let content = Content {
            operations: vec![
                op("re", reals(&[10.0, 20.0, 30.0, 40.0])),
                op("S", vec![]),
            ],
        };
        assert_eq!(painted_paths(&content), vec![Rect::new(10.0, 20.0, 40.0, 60.0)]);
    }

    #[test]
    fn test_white_fill_is_ignored() {
        let content = Content {
            operations: vec![
                op("rg", reals(&[1.0, 1.0, 1.0])),
                op("re", reals(&[0.0, 0.0, 612.0, 792.0])),
                op("f", vec![]),
                op("rg", reals(&[0.2, 0.2, 0.2])),
                op("re", reals(&[5.0, 5.0, 10.0, 10.0])),
                op("f", vec![]),
            ],
        };
        assert_eq!(painted_paths(&content), vec![Rect::new(5.0, 5.0, 15.0, 15.0)]);
    }

    #[test]
    fn test_ctm_and_state_stack() {
        let content = Content {
            operations: vec![
                op("q", vec![]),
                op("cm", reals(&[2.0, 0.0, 0.0, 2.0, 100.0, 100.0])),
                op("re", reals(&[0.0, 0.0, 5.0, 5.0])),
                op("f", vec![]),
                op("Q", vec![]),
                op("m", reals(&[0.0, 0.0])),
                op("l", reals(&[1.0, 1.0])),
                op("n", vec![]),
            ],
        };
        assert_eq!(
            painted_paths(&content),
            vec![Rect::new(100.0, 100.0, 110.0, 110.0)]
        );
    }

    #[test]
    fn test_to_page_space_flips_y() {
        let media = Rect::new(0.0, 0.0, 612.0, 792.0);
        let r = to_page_space(&Rect::new(10.0, 700.0, 40.0, 780.0), &media);
        assert_eq!(r, Rect::new(10.0, 12.0, 40.0, 92.0));
    }
}
