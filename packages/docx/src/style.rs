//! Paragraph style font edits in `word/styles.xml`.

use crate::DocxError;
use crate::xml::XmlElement;

/// Style children that must follow `w:rPr`.
const RPR_SUCCESSORS: &[&str] = &["tblPr", "trPr", "tcPr", "tblStylePr"];

/// Run property children that must follow `w:rFonts`.
const RFONTS_SUCCESSORS: &[&str] = &[
    "b",
    "bCs",
    "i",
    "iCs",
    "caps",
    "smallCaps",
    "strike",
    "dstrike",
    "outline",
    "shadow",
    "emboss",
    "imprint",
    "noProof",
    "snapToGrid",
    "vanish",
    "webHidden",
    "color",
    "spacing",
    "w",
    "kern",
    "position",
    "sz",
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
];

/// Run property children that must follow `w:sz`.
const SZ_SUCCESSORS: &[&str] = &[
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
];

/// Largest font size Word accepts, in half-points.
const MAX_HALF_POINTS: f32 = 3276.0;

/// Font size in half-points, the unit of `w:sz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HalfPoints(u32);

impl HalfPoints {
    /// Converts a point size, rounding to the nearest half point.
    ///
    /// Returns `None` for sizes Word cannot represent (below half a point,
    /// above 1638pt, or not finite).
    #[must_use]
    pub fn from_points(points: f32) -> Option<Self> {
        let half = (points * 2.0).round();
        if !half.is_finite() || !(1.0..=MAX_HALF_POINTS).contains(&half) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Self(half as u32))
    }

    /// The raw `w:sz` value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Sets the font family and size of the paragraph style named `style_name`.
pub(crate) fn set_style_font(
    styles: &mut XmlElement,
    style_name: &str,
    family: &str,
    size: HalfPoints,
) -> Result<(), DocxError> {
    let style = find_paragraph_style(styles, style_name)
        .ok_or_else(|| DocxError::MissingStyle(style_name.to_owned()))?;

    let rpr = style.get_or_insert_child("rPr", RPR_SUCCESSORS);

    let ascii = rpr.qualify("ascii");
    let h_ansi = rpr.qualify("hAnsi");
    let val = rpr.qualify("val");

    let fonts = rpr.get_or_insert_child("rFonts", RFONTS_SUCCESSORS);
    fonts.set_attr(&ascii, family);
    fonts.set_attr(&h_ansi, family);

    rpr.get_or_insert_child("sz", SZ_SUCCESSORS)
        .set_attr(&val, &size.get().to_string());

    log::debug!("Style '{style_name}' set to {family} {}hp", size.get());
    Ok(())
}

/// The paragraph `w:style` whose `w:name` is `name`, falling back to a
/// matching `w:styleId`.
fn find_paragraph_style<'a>(styles: &'a mut XmlElement, name: &str) -> Option<&'a mut XmlElement> {
    let is_paragraph_style =
        |e: &XmlElement| e.local_name() == "style" && e.attr("type") == Some("paragraph");

    let by_name = styles.child_elements().position(|e| {
        is_paragraph_style(e) && e.find_child("name").and_then(|n| n.attr("val")) == Some(name)
    });
    let idx = by_name.or_else(|| {
        styles
            .child_elements()
            .position(|e| is_paragraph_style(e) && e.attr("styleId") == Some(name))
    })?;

    styles.child_elements_mut().nth(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn styles(body: &str) -> XmlElement {
        XmlDocument::parse(&format!(r#"<w:styles xmlns:w="urn:w">{body}</w:styles>"#))
            .unwrap()
            .root
    }

    fn normal(styles: &XmlElement) -> &XmlElement {
        styles
            .child_elements()
            .find(|e| e.attr("styleId") == Some("Normal"))
            .unwrap()
    }

    #[test]
    fn half_points_round_and_bound() {
        assert_eq!(HalfPoints::from_points(10.0).unwrap().get(), 20);
        assert_eq!(HalfPoints::from_points(10.5).unwrap().get(), 21);
        assert_eq!(HalfPoints::from_points(10.2).unwrap().get(), 20);
        assert!(HalfPoints::from_points(0.0).is_none());
        assert!(HalfPoints::from_points(-4.0).is_none());
        assert!(HalfPoints::from_points(f32::NAN).is_none());
        assert!(HalfPoints::from_points(2000.0).is_none());
    }

    #[test]
    fn creates_run_properties_on_bare_style() {
        let mut root = styles(concat!(
            r#"<w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/>"#,
            r#"<w:pPr/></w:style>"#,
        ));
        set_style_font(&mut root, "Normal", "Arial", HalfPoints(20)).unwrap();

        let rpr = normal(&root).find_child("rPr").unwrap();
        let fonts = rpr.find_child("rFonts").unwrap();
        assert_eq!(fonts.attr("ascii"), Some("Arial"));
        assert_eq!(fonts.attr("hAnsi"), Some("Arial"));
        assert_eq!(rpr.find_child("sz").unwrap().attr("val"), Some("20"));
    }

    #[test]
    fn updates_existing_properties_in_schema_order() {
        let mut root = styles(concat!(
            r#"<w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/>"#,
            r#"<w:rPr><w:rFonts w:ascii="Calibri" w:eastAsia="MS Mincho"/><w:b/><w:lang w:val="en-US"/></w:rPr>"#,
            r#"<w:tblPr/></w:style>"#,
        ));
        set_style_font(&mut root, "Normal", "Arial", HalfPoints(20)).unwrap();

        let rpr = normal(&root).find_child("rPr").unwrap();
        let names: Vec<&str> = rpr.child_elements().map(XmlElement::local_name).collect();
        assert_eq!(names, vec!["rFonts", "b", "sz", "lang"]);

        let fonts = rpr.find_child("rFonts").unwrap();
        assert_eq!(fonts.attr("ascii"), Some("Arial"));
        assert_eq!(fonts.attr("eastAsia"), Some("MS Mincho"));
    }

    #[test]
    fn matches_by_display_name_before_style_id() {
        let mut root = styles(concat!(
            r#"<w:style w:type="character" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Standard"><w:name w:val="Normal"/></w:style>"#,
        ));
        set_style_font(&mut root, "Normal", "Arial", HalfPoints(20)).unwrap();

        let styles: Vec<&XmlElement> = root.child_elements().collect();
        assert!(styles[0].find_child("rPr").is_none());
        assert!(styles[1].find_child("rPr").is_some());
    }

    #[test]
    fn missing_style_is_error() {
        let mut root = styles(r#"<w:style w:type="paragraph" w:styleId="Heading1"/>"#);
        let err = set_style_font(&mut root, "Normal", "Arial", HalfPoints(20)).unwrap_err();
        assert!(matches!(&err, DocxError::MissingStyle(name) if name == "Normal"), "{err}");
    }
}
