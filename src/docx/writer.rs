//! Builds a plain WordprocessingML document from a paragraph stream.

use super::package::{DocxPackage, MAIN_PART};
use super::xml::{Element, Node, XmlDocument};
use crate::error::RedactorResult;
use quick_xml::events::{BytesDecl, Event};

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// One paragraph of a flowed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowParagraph {
    pub text: String,
    /// Font size in points, when the source reported one
    pub font_size: Option<f32>,
    /// Starts a new page
    pub page_break_before: bool,
}

impl FlowParagraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

fn paragraph_element(paragraph: &FlowParagraph) -> Element {
    let mut p = Element::new("w:p", &[]);
    if paragraph.page_break_before {
        p = p.with_child(
            Element::new("w:r", &[]).with_child(Element::new("w:br", &[("w:type", "page")])),
        );
    }

    let mut run = Element::new("w:r", &[]);
    if let Some(size) = paragraph.font_size {
        // Run sizes are expressed in half-points
        let half_points = ((size * 2.0).round() as i64).max(1).to_string();
        run = run.with_child(
            Element::new("w:rPr", &[])
                .with_child(Element::new("w:sz", &[("w:val", half_points.as_str())])),
        );
    }
    run = run.with_child(Element::new("w:t", &[("xml:space", "preserve")]).with_text(&paragraph.text));
    p.with_child(run)
}

/// Serializes paragraphs into a `word/document.xml` part.
pub fn document_xml(paragraphs: &[FlowParagraph]) -> RedactorResult<Vec<u8>> {
    let mut body = Element::new("w:body", &[]);
    for paragraph in paragraphs {
        body = body.with_child(paragraph_element(paragraph));
    }
    let document = Element::new("w:document", &[("xmlns:w", WORDML_NS)]).with_child(body);

    let xml = XmlDocument {
        nodes: vec![
            Node::Raw(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes")))),
            Node::Element(document),
        ],
    };
    xml.to_bytes(MAIN_PART)
}

/// A complete package holding the given paragraphs.
pub fn build_package(paragraphs: &[FlowParagraph]) -> RedactorResult<DocxPackage> {
    Ok(DocxPackage::minimal(document_xml(paragraphs)?))
}
