//! Paragraph and table views over the document body.
//!
//! The views borrow elements of the parsed `word/document.xml` tree and edit
//! them in place.

use crate::xml::{XmlElement, XmlNode};

/// Paragraph property children that must follow `w:jc`.
const JC_SUCCESSORS: &[&str] = &[
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

/// Horizontal paragraph alignment (`w:jc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Flush left.
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
    /// Justified.
    Justify,
}

impl Alignment {
    const fn val(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
        }
    }
}

/// A `w:p` element.
#[derive(Debug)]
pub struct Paragraph<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Paragraph<'a> {
    pub(crate) const fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    /// Text of the paragraph's runs.
    #[must_use]
    pub fn text(&self) -> String {
        paragraph_text(self.element)
    }

    /// Replaces all content except the paragraph properties with a single
    /// run holding `text`.
    pub fn set_text(&mut self, text: &str) {
        self.element
            .children
            .retain(|n| n.as_element().is_some_and(|e| e.local_name() == "pPr"));
        let run = build_run(self.element, text);
        self.element.children.push(XmlNode::Element(run));
    }

    /// Sets `w:jc`, creating the paragraph properties when absent.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        if self.element_index("pPr").is_none() {
            let ppr = XmlElement::new(self.element.qualify("pPr"));
            self.element.children.insert(0, XmlNode::Element(ppr));
        }

        let ppr = self.element.get_or_insert_child("pPr", &[]);
        let jc_name = ppr.qualify("val");
        ppr.get_or_insert_child("jc", JC_SUCCESSORS)
            .set_attr(&jc_name, alignment.val());
    }

    fn element_index(&self, local: &str) -> Option<usize> {
        self.element
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.local_name() == local))
    }
}

/// A `w:tbl` element.
#[derive(Debug)]
pub struct Table<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Table<'a> {
    pub(crate) const fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    /// Rows in document order.
    pub fn rows(&mut self) -> impl Iterator<Item = Row<'_>> {
        self.element
            .child_elements_mut()
            .filter(|e| e.local_name() == "tr")
            .map(|element| Row { element })
    }
}

/// A `w:tr` element.
#[derive(Debug)]
pub struct Row<'a> {
    element: &'a mut XmlElement,
}

impl Row<'_> {
    /// Cells in document order.
    pub fn cells(&mut self) -> impl Iterator<Item = Cell<'_>> {
        self.element
            .child_elements_mut()
            .filter(|e| e.local_name() == "tc")
            .map(|element| Cell { element })
    }
}

/// A `w:tc` element.
#[derive(Debug)]
pub struct Cell<'a> {
    element: &'a mut XmlElement,
}

impl Cell<'_> {
    /// Text of the cell's paragraphs, joined by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        cell_text(self.element)
    }

    /// Replaces all content except the cell properties with one paragraph
    /// holding a single run of `text`.
    pub fn set_text(&mut self, text: &str) {
        self.element
            .children
            .retain(|n| n.as_element().is_some_and(|e| e.local_name() == "tcPr"));

        let mut paragraph = XmlElement::new(self.element.qualify("p"));
        let run = build_run(&paragraph, text);
        paragraph.children.push(XmlNode::Element(run));
        self.element.children.push(XmlNode::Element(paragraph));
    }

    /// The cell's direct paragraphs.
    pub fn paragraphs(&mut self) -> impl Iterator<Item = Paragraph<'_>> {
        self.element
            .child_elements_mut()
            .filter(|e| e.local_name() == "p")
            .map(Paragraph::new)
    }
}

pub(crate) fn paragraph_text(p: &XmlElement) -> String {
    let mut text = String::new();
    for child in p.child_elements() {
        match child.local_name() {
            "r" => push_run_text(child, &mut text),
            "hyperlink" => child
                .child_elements()
                .filter(|e| e.local_name() == "r")
                .for_each(|r| push_run_text(r, &mut text)),
            _ => {}
        }
    }
    text
}

pub(crate) fn cell_text(tc: &XmlElement) -> String {
    tc.child_elements()
        .filter(|e| e.local_name() == "p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_run_text(run: &XmlElement, out: &mut String) {
    for item in run.child_elements() {
        match item.local_name() {
            "t" => out.push_str(&item.own_text()),
            "tab" | "ptab" => out.push('\t'),
            "br" => {
                if item.attr("type").is_none_or(|t| t == "textWrapping") {
                    out.push('\n');
                }
            }
            "cr" => out.push('\n'),
            "noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
}

/// A `w:r` holding `text`, with tabs and line breaks as their own elements.
/// Names take the prefix of `parent`.
fn build_run(parent: &XmlElement, text: &str) -> XmlElement {
    let mut run = XmlElement::new(parent.qualify("r"));
    let mut pending = String::new();

    for c in text.chars() {
        match c {
            '\t' => {
                flush_text(parent, &mut run, &mut pending);
                run.children
                    .push(XmlNode::Element(XmlElement::new(parent.qualify("tab"))));
            }
            '\n' | '\r' => {
                flush_text(parent, &mut run, &mut pending);
                run.children
                    .push(XmlNode::Element(XmlElement::new(parent.qualify("br"))));
            }
            _ => pending.push(c),
        }
    }
    flush_text(parent, &mut run, &mut pending);

    run
}

fn flush_text(parent: &XmlElement, run: &mut XmlElement, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let mut t = XmlElement::new(parent.qualify("t"));
    if pending.trim().len() < pending.len() {
        t.set_attr("xml:space", "preserve");
    }
    t.children.push(XmlNode::Text(std::mem::take(pending)));
    run.children.push(XmlNode::Element(t));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn parse(xml: &str) -> XmlElement {
        XmlDocument::parse(xml).unwrap().root
    }

    #[test]
    fn paragraph_text_covers_runs_hyperlinks_and_breaks() {
        let p = parse(concat!(
            r#"<w:p xmlns:w="urn:w"><w:pPr/>"#,
            r#"<w:r><w:t>Date:</w:t><w:tab/><w:t>x</w:t></w:r>"#,
            r#"<w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink>"#,
            r#"<w:r><w:br/><w:t>a</w:t><w:br w:type="page"/><w:cr/><w:noBreakHyphen/></w:r>"#,
            r#"<w:bookmarkStart/>"#,
            "</w:p>",
        ));
        assert_eq!(paragraph_text(&p), "Date:\txlink\na\n-");
    }

    #[test]
    fn set_text_keeps_properties_and_replaces_runs() {
        let mut p = parse(concat!(
            r#"<w:p xmlns:w="urn:w"><w:pPr><w:pStyle w:val="Title"/></w:pPr>"#,
            r#"<w:r><w:t>old</w:t></w:r><w:r><w:t> text</w:t></w:r></w:p>"#,
        ));

        let mut para = Paragraph::new(&mut p);
        para.set_text(" new\ttext ");
        assert_eq!(para.text(), " new\ttext ");

        let names: Vec<&str> = p.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:pPr", "w:r"]);

        let run = p.find_child("r").unwrap();
        let parts: Vec<&str> = run.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(parts, vec!["w:t", "w:tab", "w:t"]);
        assert_eq!(run.find_child("t").unwrap().attr("space"), Some("preserve"));
    }

    #[test]
    fn set_text_without_surrounding_space_omits_preserve() {
        let mut p = parse(r#"<w:p xmlns:w="urn:w"/>"#);
        Paragraph::new(&mut p).set_text("plain");
        let t = p.find_child("r").and_then(|r| r.find_child("t")).unwrap();
        assert_eq!(t.attr("space"), None);
    }

    #[test]
    fn center_alignment_creates_properties_first() {
        let mut p = parse(r#"<w:p xmlns:w="urn:w"><w:r><w:t>x</w:t></w:r></w:p>"#);
        Paragraph::new(&mut p).set_alignment(Alignment::Center);

        let first = p.child_elements().next().unwrap();
        assert_eq!(first.local_name(), "pPr");
        assert_eq!(first.find_child("jc").unwrap().attr("val"), Some("center"));
    }

    #[test]
    fn alignment_is_placed_before_run_properties() {
        let mut p = parse(concat!(
            r#"<w:p xmlns:w="urn:w"><w:pPr><w:spacing/><w:rPr/></w:pPr>"#,
            r#"<w:r><w:t>x</w:t></w:r></w:p>"#,
        ));
        let mut para = Paragraph::new(&mut p);
        para.set_alignment(Alignment::Right);
        para.set_alignment(Alignment::Center);

        let ppr = p.find_child("pPr").unwrap();
        let names: Vec<&str> = ppr.child_elements().map(XmlElement::local_name).collect();
        assert_eq!(names, vec!["spacing", "jc", "rPr"]);
        assert_eq!(ppr.find_child("jc").unwrap().attr("val"), Some("center"));
    }

    #[test]
    fn cell_text_joins_paragraphs() {
        let tc = parse(concat!(
            r#"<w:tc xmlns:w="urn:w"><w:tcPr/>"#,
            r#"<w:p><w:r><w:t>[wo]</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>second</w:t></w:r></w:p>"#,
            "</w:tc>",
        ));
        assert_eq!(cell_text(&tc), "[wo]\nsecond");
    }

    #[test]
    fn cell_set_text_leaves_one_paragraph() {
        let mut tc = parse(concat!(
            r#"<w:tc xmlns:w="urn:w"><w:tcPr><w:tcW w:w="100"/></w:tcPr>"#,
            r#"<w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:t>[ticket]</w:t></w:r></w:p>"#,
            "</w:tc>",
        ));

        let mut cell = Cell { element: &mut tc };
        cell.set_text("ACME");
        assert_eq!(cell.text(), "ACME");
        for mut p in cell.paragraphs() {
            p.set_alignment(Alignment::Center);
        }

        let names: Vec<&str> = tc.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:tcPr", "w:p"]);
        let jc = tc
            .find_child("p")
            .and_then(|p| p.find_child("pPr"))
            .and_then(|ppr| ppr.find_child("jc"))
            .unwrap();
        assert_eq!(jc.attr("val"), Some("center"));
    }
}
