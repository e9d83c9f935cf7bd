//! Owned XML tree for WordprocessingML parts.
//!
//! Parts are small enough to hold in memory, and in-place edits (replacing a
//! paragraph's runs, inserting `w:jc`) are much simpler on a tree than on an
//! event stream. Names are kept qualified exactly as they appear in the
//! source (`w:p`), and lookups go by local name so the namespace prefix in
//! use does not matter.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::DocxError;

/// A node in an element's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element.
    Element(XmlElement),
    /// Unescaped character data.
    Text(String),
    /// `<![CDATA[...]]>` section.
    CData(String),
    /// Comment body, verbatim.
    Comment(String),
    /// Processing instruction body, verbatim.
    ProcessingInstruction(String),
}

impl XmlNode {
    /// The element, if this node is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// The element, mutably, if this node is one.
    pub const fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    fn is_element(&self, local: &str) -> bool {
        self.as_element().is_some_and(|e| e.local_name() == local)
    }
}

/// An element with its attributes and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name (`w:p`).
    pub name: String,
    /// Attributes in document order, qualified keys, unescaped values.
    pub attributes: Vec<(String, String)>,
    /// Content in document order.
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without the namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix, if the name has one.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// `local` qualified with this element's prefix.
    #[must_use]
    pub fn qualify(&self, local: &str) -> String {
        self.prefix()
            .map_or_else(|| local.to_owned(), |prefix| format!("{prefix}:{local}"))
    }

    /// Value of the attribute whose local name is `local`.
    #[must_use]
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == local)
            .map(|(_, value)| value.as_str())
    }

    /// Sets attribute `key` (qualified), replacing an existing value.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| k == key) {
            value.clone_into(&mut slot.1);
        } else {
            self.attributes.push((key.to_owned(), value.to_owned()));
        }
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Child elements in document order, mutably.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Self> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First child element with local name `local`.
    #[must_use]
    pub fn find_child(&self, local: &str) -> Option<&Self> {
        self.child_elements().find(|e| e.local_name() == local)
    }

    /// First child element with local name `local`, mutably.
    pub fn find_child_mut(&mut self, local: &str) -> Option<&mut Self> {
        self.child_elements_mut().find(|e| e.local_name() == local)
    }

    /// Concatenated text and CDATA content of this element (not of its
    /// descendants).
    #[must_use]
    pub fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Inserts `child` before the first existing child whose local name is
    /// in `successors`, or at the end. Returns the insertion index.
    ///
    /// OOXML schemas fix the order of property children, so `successors`
    /// lists every sibling that must come after `child`.
    pub fn insert_ordered(&mut self, child: Self, successors: &[&str]) -> usize {
        let idx = self
            .children
            .iter()
            .position(|n| {
                n.as_element()
                    .is_some_and(|e| successors.contains(&e.local_name()))
            })
            .unwrap_or(self.children.len());
        self.children.insert(idx, XmlNode::Element(child));
        idx
    }

    /// Returns the first child element named `local`, creating it (with
    /// this element's prefix) at its schema position if absent.
    pub fn get_or_insert_child(&mut self, local: &str, successors: &[&str]) -> &mut Self {
        let idx = match self.children.iter().position(|n| n.is_element(local)) {
            Some(idx) => idx,
            None => {
                let child = Self::new(self.qualify(local));
                self.insert_ordered(child, successors)
            }
        };
        // `idx` was either found as an element or just inserted as one.
        let XmlNode::Element(child) = &mut self.children[idx] else {
            unreachable!("child {idx} of <{}> is an element", self.name)
        };
        child
    }
}

/// `w:p` → `p`.
#[must_use]
pub fn local_name(qualified: &str) -> &str {
    qualified
        .split_once(':')
        .map_or(qualified, |(_, local)| local)
}

/// The `<?xml ...?>` declaration of a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    /// `version` pseudo-attribute.
    pub version: String,
    /// `encoding` pseudo-attribute.
    pub encoding: Option<String>,
    /// `standalone` pseudo-attribute.
    pub standalone: Option<String>,
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Declaration, if the part had one.
    pub declaration: Option<XmlDeclaration>,
    /// Comments and processing instructions before the root element.
    pub prolog: Vec<XmlNode>,
    /// Root element.
    pub root: XmlElement,
}

impl XmlDocument {
    /// Parses an XML part.
    ///
    /// # Errors
    ///
    /// Returns [`DocxError::Xml`] on syntax errors and
    /// [`DocxError::Malformed`] if there is not exactly one root element.
    pub fn parse(xml: &str) -> Result<Self, DocxError> {
        let mut reader = Reader::from_str(xml);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut root = None;
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Decl(decl) => {
                    declaration = Some(read_declaration(&decl)?);
                    continue;
                }
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        DocxError::Malformed("unbalanced closing tag".to_owned())
                    })?;
                    XmlNode::Element(element)
                }
                Event::Empty(start) => XmlNode::Element(element_from_start(&start)?),
                Event::Text(text) => XmlNode::Text(text.unescape()?.into_owned()),
                Event::CData(data) => {
                    XmlNode::CData(String::from_utf8_lossy(&data.into_inner()).into_owned())
                }
                Event::Comment(comment) => {
                    XmlNode::Comment(String::from_utf8_lossy(&comment).into_owned())
                }
                Event::PI(pi) => {
                    XmlNode::ProcessingInstruction(String::from_utf8_lossy(&pi).into_owned())
                }
                Event::DocType(_) => continue,
                Event::Eof => break,
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }

            match node {
                XmlNode::Element(element) => {
                    if root.is_some() {
                        return Err(DocxError::Malformed(
                            "more than one root element".to_owned(),
                        ));
                    }
                    root = Some(element);
                }
                // Whitespace between the declaration and the root.
                XmlNode::Text(_) => {}
                other => prolog.push(other),
            }
        }

        if !stack.is_empty() {
            return Err(DocxError::Malformed("unclosed element at end of part".to_owned()));
        }

        let root = root.ok_or_else(|| DocxError::Malformed("part has no root element".to_owned()))?;

        Ok(Self {
            declaration,
            prolog,
            root,
        })
    }

    /// Serializes the part back to UTF-8 XML.
    ///
    /// # Errors
    ///
    /// Returns [`DocxError::Xml`] if writing an event fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
            writer.get_mut().extend_from_slice(b"\r\n");
        }

        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;

        Ok(writer.into_inner())
    }
}

fn read_declaration(decl: &BytesDecl<'_>) -> Result<XmlDeclaration, DocxError> {
    let lossy = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
    Ok(XmlDeclaration {
        version: lossy(&decl.version()?),
        encoding: decl.encoding().transpose()?.map(|v| lossy(&v)),
        standalone: decl.standalone().transpose()?.map(|v| lossy(&v)),
    })
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, DocxError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        element.attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(element)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), quick_xml::Error> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text))),
        XmlNode::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str()))),
        XmlNode::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
        }
        XmlNode::ProcessingInstruction(pi) => {
            writer.write_event(Event::PI(BytesText::from_escaped(pi.as_str())))
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\r\n",
        r#"<w:document xmlns:w="urn:w"><w:body>"#,
        r#"<w:p><w:r><w:t xml:space="preserve"> A &amp; B </w:t></w:r></w:p>"#,
        r#"<w:p/>"#,
        r#"</w:body></w:document>"#,
    );

    #[test]
    fn parses_names_attributes_and_text() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.root.local_name(), "document");
        assert_eq!(doc.root.prefix(), Some("w"));
        assert_eq!(doc.root.attr("w"), Some("urn:w"));

        let body = doc.root.find_child("body").unwrap();
        assert_eq!(body.child_elements().count(), 2);

        let t = body
            .find_child("p")
            .and_then(|p| p.find_child("r"))
            .and_then(|r| r.find_child("t"))
            .unwrap();
        assert_eq!(t.own_text(), " A & B ");
        assert_eq!(t.attr("space"), Some("preserve"));
    }

    #[test]
    fn write_then_parse_preserves_tree() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(text.contains("A &amp; B"));
        assert_eq!(XmlDocument::parse(&text).unwrap(), doc);
    }

    #[test]
    fn get_or_insert_child_respects_successors() {
        let mut rpr = XmlElement::new("w:rPr");
        rpr.children.push(XmlNode::Element(XmlElement::new("w:b")));
        rpr.children.push(XmlNode::Element(XmlElement::new("w:lang")));

        rpr.get_or_insert_child("sz", &["szCs", "lang"])
            .set_attr("w:val", "20");

        let names: Vec<&str> = rpr.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:b", "w:sz", "w:lang"]);

        rpr.get_or_insert_child("sz", &["szCs", "lang"])
            .set_attr("w:val", "24");
        assert_eq!(rpr.child_elements().count(), 3);
        assert_eq!(rpr.find_child("sz").unwrap().attr("val"), Some("24"));
    }

    #[test]
    fn rejects_unbalanced_part() {
        let err = XmlDocument::parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, DocxError::Xml(_)), "{err}");
    }

    #[test]
    fn rejects_part_without_root() {
        let err = XmlDocument::parse("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, DocxError::Malformed(_)), "{err}");
    }
}
