//! Test fixtures and resume builders.
//!
//! Provides builders for creating test resumes with specific content,
//! following the Builder pattern for clean test setup.

use anyhow::Result;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A4 height in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Lines a tall resume body uses to push content well past the header.
pub const FILLER: &[&str] = &[
    "Backend engineer focused on distributed systems and storage engines.",
    "Built payment services in Rust and Go for high volume teams.",
    "Designed message queues, caches and consistent hashing schemes.",
    "Mentored engineers and reviewed designs for new product launches.",
];

#[derive(Debug, Clone)]
struct PdfLine {
    text: String,
    size: f32,
    /// Baseline offset from the top of the page, in millimetres
    from_top: f32,
}

/// Builder for one-page (or multi-page) text PDFs.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let pdf = ResumePdfBuilder::new()
///     .heading("Jane Doe")
///     .line("jane@example.com")
///     .build(Path::new("/tmp/resume.pdf"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResumePdfBuilder {
    pages: Vec<Vec<PdfLine>>,
    cursor: f32,
}

impl ResumePdfBuilder {
    /// Creates a new builder with one empty A4 page.
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor: 20.0,
        }
    }

    fn push(mut self, text: &str, size: f32, advance: f32) -> Self {
        let from_top = self.cursor;
        if let Some(page) = self.pages.last_mut() {
            page.push(PdfLine {
                text: text.to_string(),
                size,
                from_top,
            });
        }
        self.cursor += advance;
        self
    }

    /// Adds a 24pt line.
    pub fn heading(self, text: &str) -> Self {
        self.push(text, 24.0, 12.0)
    }

    /// Adds an 11pt line.
    pub fn line(self, text: &str) -> Self {
        self.push(text, 11.0, 7.0)
    }

    /// Adds an 11pt line at a fixed offset from the top of the page.
    pub fn line_at(mut self, text: &str, from_top_mm: f32) -> Self {
        self.cursor = from_top_mm;
        self.line(text)
    }

    /// Adds the standard body filler.
    pub fn filler(mut self) -> Self {
        for text in FILLER {
            self = self.line(text);
        }
        self
    }

    /// Starts a new page.
    pub fn page_break(mut self) -> Self {
        self.pages.push(Vec::new());
        self.cursor = 20.0;
        self
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let (doc, page1, layer1) =
            PdfDocument::new("Resume", Mm(210.0), Mm(A4_HEIGHT_MM), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        for (index, lines) in self.pages.iter().enumerate() {
            let (page, layer) = if index == 0 {
                (page1, layer1)
            } else {
                doc.add_page(Mm(210.0), Mm(A4_HEIGHT_MM), "Layer 1")
            };
            let current_layer = doc.get_page(page).get_layer(layer);
            for line in lines {
                current_layer.use_text(
                    line.text.clone(),
                    line.size,
                    Mm(20.0),
                    Mm(A4_HEIGHT_MM - line.from_top),
                    &font,
                );
            }
        }

        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }
}

impl Default for ResumePdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A typical resume: name, contact line, body, and a contact line far below
/// the header region.
pub fn create_standard_resume(path: &Path) -> Result<PathBuf> {
    ResumePdfBuilder::new()
        .heading("Jane Doe")
        .line("jane.doe@example.com")
        .line("Senior Software Engineer")
        .filler()
        .line_at("References: ref.person@example.com", 220.0)
        .build(path)
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const NAMESPACES: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

/// Builder for DOCX resumes written directly with `zip`.
#[derive(Debug, Clone, Default)]
pub struct ResumeDocxBuilder {
    paragraphs: Vec<String>,
    header: Option<Vec<String>>,
    footer: Option<Vec<String>>,
}

impl ResumeDocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain paragraph.
    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(format!("<w:p>{}</w:p>", run(text)));
        self
    }

    /// A paragraph whose text is split over several runs.
    pub fn split_paragraph(mut self, parts: &[&str]) -> Self {
        let runs: String = parts.iter().map(|p| run(p)).collect();
        self.paragraphs.push(format!("<w:p>{runs}</w:p>"));
        self
    }

    /// A paragraph with a leading label and a hyperlink.
    pub fn hyperlink(mut self, label: &str, link_text: &str) -> Self {
        self.paragraphs.push(format!(
            r#"<w:p>{}<w:hyperlink r:id="rId9">{}</w:hyperlink></w:p>"#,
            run(label),
            run(link_text)
        ));
        self
    }

    /// A paragraph with an inline icon before its text.
    pub fn with_icon(mut self, text: &str) -> Self {
        self.paragraphs.push(format!(
            r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="91440" cy="91440"/></wp:inline></w:drawing></w:r>{}</w:p>"#,
            run(text)
        ));
        self
    }

    /// Adds a page header part.
    pub fn header(mut self, lines: &[&str]) -> Self {
        self.header = Some(lines.iter().map(|l| format!("<w:p>{}</w:p>", run(l))).collect());
        self
    }

    /// Adds a page footer part.
    pub fn footer(mut self, lines: &[&str]) -> Self {
        self.footer = Some(lines.iter().map(|l| format!("<w:p>{}</w:p>", run(l))).collect());
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NAMESPACES}><w:body>{}<w:sectPr/></w:body></w:document>"#,
            self.paragraphs.concat()
        )
    }

    fn part_xml(root: &str, paragraphs: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:{root} {NAMESPACES}>{}</w:{root}>"#,
            paragraphs.concat()
        )
    }

    /// Builds the DOCX and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let file = fs::File::create(output_path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS.as_bytes())?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(self.document_xml().as_bytes())?;
        if let Some(header) = &self.header {
            zip.start_file("word/header1.xml", options)?;
            zip.write_all(Self::part_xml("hdr", header).as_bytes())?;
        }
        if let Some(footer) = &self.footer {
            zip.start_file("word/footer1.xml", options)?;
            zip.write_all(Self::part_xml("ftr", footer).as_bytes())?;
        }
        zip.finish()?;
        Ok(output_path.to_path_buf())
    }
}

/// Reads one part of a DOCX as a string.
pub fn read_docx_part(path: &Path, part: &str) -> Result<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path)?)?;
    let mut file = archive.by_name(part)?;
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut file, &mut xml)?;
    Ok(xml)
}

/// Adds a URI link annotation to one page (1-based) of an existing PDF.
pub fn add_link_annotation(path: &Path, page_number: u32, uri: &str) -> Result<()> {
    use lopdf::{dictionary, Object, StringFormat};

    let mut doc = lopdf::Document::load(path)?;
    let page_id = *doc
        .get_pages()
        .get(&page_number)
        .ok_or_else(|| anyhow::anyhow!("no page {page_number}"))?;
    let annot = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![
            Object::Integer(56),
            Object::Integer(700),
            Object::Integer(300),
            Object::Integer(720),
        ],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::String(uri.as_bytes().to_vec(), StringFormat::Literal),
        },
    });
    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Annots", Object::Array(vec![Object::Reference(annot)]));
    doc.save(path)?;
    Ok(())
}

/// Counts `/Link` annotations on every page of a PDF.
pub fn count_link_annotations(path: &Path) -> Result<usize> {
    let doc = lopdf::Document::load(path)?;
    let mut count = 0;
    for page_id in doc.get_pages().values() {
        let page = doc.get_dictionary(*page_id)?;
        let Ok(annots) = page.get(b"Annots") else {
            continue;
        };
        let annots = match annots {
            lopdf::Object::Reference(id) => doc.get_object(*id)?.as_array()?.clone(),
            other => other.as_array()?.clone(),
        };
        for annot in annots {
            let dict = match annot {
                lopdf::Object::Reference(id) => doc.get_dictionary(id)?.clone(),
                lopdf::Object::Dictionary(dict) => dict,
                _ => continue,
            };
            if dict.get(b"Subtype").and_then(|s| s.as_name()).ok() == Some(b"Link".as_slice()) {
                count += 1;
            }
        }
    }
    Ok(count)
}
