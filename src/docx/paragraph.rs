//! Operations on a single `w:p` paragraph element.

use super::xml::{Element, XmlDocument};

const GRAPHIC_ELEMENTS: &[&str] = &["drawing", "pict", "object", "AlternateContent"];

/// Visible text: `w:t` content, tabs as `\t`, breaks as `\n`.
pub fn text(paragraph: &Element) -> String {
    let mut out = String::new();
    paragraph.walk(&mut |e| match e.local_name() {
        "t" => out.push_str(&e.own_text()),
        "tab" => out.push('\t'),
        "br" | "cr" => out.push('\n'),
        _ => {}
    });
    out
}

/// Applies `f` to the text of every `w:t`; returns how many changed.
pub fn map_text<F>(paragraph: &mut Element, f: F) -> usize
where
    F: Fn(&str) -> String,
{
    let mut changed = 0;
    paragraph.walk_mut(&mut |e| {
        if e.is("t") {
            let before = e.own_text();
            let after = f(&before);
            if after != before {
                e.set_own_text(&after);
                changed += 1;
            }
        }
    });
    changed
}

/// Removes `w:hyperlink` nodes and `HYPERLINK` simple fields, with the runs
/// inside them.
pub fn remove_hyperlinks(paragraph: &mut Element) -> usize {
    paragraph.remove_descendants(&|e: &Element| {
        e.is("hyperlink")
            || (e.is("fldSimple")
                && e
                    .attribute("instr")
                    .is_some_and(|instr| instr.to_uppercase().contains("HYPERLINK")))
    })
}

/// Removes inline drawings, VML pictures and embedded objects.
pub fn remove_graphics(paragraph: &mut Element) -> usize {
    paragraph.remove_descendants(&|e: &Element| GRAPHIC_ELEMENTS.contains(&e.local_name()))
}

/// Empties every text node of the paragraph.
pub fn clear_text(paragraph: &mut Element) {
    set_text(paragraph, "");
}

/// Puts `text` in the first `w:t` and empties the rest.
pub fn set_text(paragraph: &mut Element, text: &str) {
    let mut first = true;
    paragraph.walk_mut(&mut |e| {
        if e.is("t") {
            e.set_own_text(if first { text } else { "" });
            first = false;
        }
    });
}

/// Paragraphs of a part in document order, not descending into a paragraph
/// (text boxes nested in drawings belong to their host paragraph).
pub fn paragraphs_mut(doc: &mut XmlDocument) -> Vec<&mut Element> {
    fn collect<'a>(element: &'a mut Element, out: &mut Vec<&'a mut Element>) {
        if element.is("p") {
            out.push(element);
            return;
        }
        for child in element.elements_mut() {
            collect(child, out);
        }
    }

    let mut out = Vec::new();
    if let Some(root) = doc.root_mut() {
        collect(root, &mut out);
    }
    out
}

/// Text of every paragraph of a part, in document order.
pub fn paragraph_texts(doc: &XmlDocument) -> Vec<String> {
    fn collect(element: &Element, out: &mut Vec<String>) {
        if element.is("p") {
            out.push(text(element));
            return;
        }
        for child in element.elements() {
            collect(child, out);
        }
    }

    let mut out = Vec::new();
    if let Some(root) = doc.root() {
        collect(root, &mut out);
    }
    out
}
