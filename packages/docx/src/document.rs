//! DOCX package loading and saving.

use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::DocxError;
use crate::body::{Paragraph, Table, cell_text, paragraph_text};
use crate::style::{HalfPoints, set_style_font};
use crate::xml::{XmlDocument, XmlElement};

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Style definitions part.
pub const STYLES_PART: &str = "word/styles.xml";

/// Name of the style applied to paragraphs without an explicit style.
const DEFAULT_STYLE: &str = "Normal";

/// One zip entry of the source package.
#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// A DOCX report template loaded into memory.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    entries: Vec<PackageEntry>,
    document: XmlDocument,
    styles: XmlDocument,
}

impl TemplateDocument {
    /// Loads a template from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocxError::Io`] if the file cannot be opened, and the
    /// errors of [`Self::from_reader`].
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let file = std::fs::File::open(path).map_err(|e| DocxError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let doc = Self::from_reader(file)?;
        log::info!(
            "Loaded template {} ({} package parts)",
            path.display(),
            doc.entries.len()
        );
        Ok(doc)
    }

    /// Reads a DOCX package.
    ///
    /// # Errors
    ///
    /// * [`DocxError::Zip`] if the data is not a zip archive.
    /// * [`DocxError::MissingPart`] if the document or styles part is absent.
    /// * [`DocxError::Xml`] / [`DocxError::Malformed`] if either part cannot
    ///   be parsed as a WordprocessingML document.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocxError> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_owned();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).map_err(|e| DocxError::Io {
                path: name.clone(),
                source: e,
            })?;

            entries.push(PackageEntry {
                is_dir: entry.is_dir(),
                compression: entry.compression(),
                name,
                data,
            });
        }

        let document = parse_part(&entries, DOCUMENT_PART)?;
        let styles = parse_part(&entries, STYLES_PART)?;
        Self::from_parts(entries, document, styles)
    }

    /// Builds a single-part package around the given document and styles
    /// XML, without the content types or relationships a full package
    /// carries.
    ///
    /// # Errors
    ///
    /// Returns [`DocxError::Xml`] / [`DocxError::Malformed`] if either
    /// part cannot be parsed.
    pub fn from_xml_parts(document_xml: &str, styles_xml: &str) -> Result<Self, DocxError> {
        let entry = |name: &str, xml: &str| PackageEntry {
            name: name.to_owned(),
            data: xml.as_bytes().to_vec(),
            compression: CompressionMethod::Deflated,
            is_dir: false,
        };

        Self::from_parts(
            vec![entry(DOCUMENT_PART, document_xml), entry(STYLES_PART, styles_xml)],
            XmlDocument::parse(document_xml)?,
            XmlDocument::parse(styles_xml)?,
        )
    }

    fn from_parts(
        entries: Vec<PackageEntry>,
        document: XmlDocument,
        styles: XmlDocument,
    ) -> Result<Self, DocxError> {
        if document.root.local_name() != "document" || document.root.find_child("body").is_none() {
            return Err(DocxError::Malformed(format!(
                "{DOCUMENT_PART} has no <w:document>/<w:body>"
            )));
        }
        if styles.root.local_name() != "styles" {
            return Err(DocxError::Malformed(format!(
                "{STYLES_PART} has no <w:styles> root"
            )));
        }

        Ok(Self {
            entries,
            document,
            styles,
        })
    }

    fn body(&self) -> &XmlElement {
        // Checked in `from_parts`; an empty element keeps this total.
        self.document
            .root
            .find_child("body")
            .unwrap_or(&self.document.root)
    }

    fn body_mut(&mut self) -> &mut XmlElement {
        let has_body = self.document.root.find_child("body").is_some();
        if has_body {
            self.document.root.get_or_insert_child("body", &[])
        } else {
            &mut self.document.root
        }
    }

    /// Body paragraphs outside tables, in document order.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = Paragraph<'_>> {
        self.body_mut()
            .child_elements_mut()
            .filter(|e| e.local_name() == "p")
            .map(Paragraph::new)
    }

    /// Top-level tables, in document order.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = Table<'_>> {
        self.body_mut()
            .child_elements_mut()
            .filter(|e| e.local_name() == "tbl")
            .map(Table::new)
    }

    /// Text of every body paragraph outside tables.
    #[must_use]
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.body()
            .child_elements()
            .filter(|e| e.local_name() == "p")
            .map(paragraph_text)
            .collect()
    }

    /// Cell texts of every top-level table, row by row.
    #[must_use]
    pub fn table_texts(&self) -> Vec<Vec<Vec<String>>> {
        self.body()
            .child_elements()
            .filter(|e| e.local_name() == "tbl")
            .map(|tbl| {
                tbl.child_elements()
                    .filter(|e| e.local_name() == "tr")
                    .map(|tr| {
                        tr.child_elements()
                            .filter(|e| e.local_name() == "tc")
                            .map(cell_text)
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    /// Sets the font of the default paragraph style (`Normal`).
    ///
    /// # Errors
    ///
    /// Returns [`DocxError::MissingStyle`] if the template defines no
    /// `Normal` paragraph style.
    pub fn set_default_font(&mut self, family: &str, size: HalfPoints) -> Result<(), DocxError> {
        set_style_font(&mut self.styles.root, DEFAULT_STYLE, family, size)
    }

    /// Writes the package to `path`, replacing any existing file.
    ///
    /// The archive is written to a `.tmp` sibling first and renamed into
    /// place, so a failed save leaves no partial output.
    ///
    /// # Errors
    ///
    /// Returns [`DocxError::Io`] on file system errors and the errors of
    /// [`Self::write_to`].
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let tmp_path = path.with_extension("docx.tmp");

        let result = std::fs::File::create(&tmp_path)
            .map_err(|e| DocxError::Io {
                path: tmp_path.display().to_string(),
                source: e,
            })
            .and_then(|file| self.write_to(file))
            .and_then(|()| {
                std::fs::rename(&tmp_path, path).map_err(|e| DocxError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            });

        if result.is_err() {
            let _ = std::fs::remove_file(&tmp_path);
        } else {
            log::info!("Saved {}", path.display());
        }
        result
    }

    /// Writes the package as a zip archive, copying every part in its
    /// original order and serializing the edited document and styles parts.
    ///
    /// # Errors
    ///
    /// Returns [`DocxError::Zip`] / [`DocxError::Io`] if writing fails, or
    /// [`DocxError::Xml`] if a part cannot be serialized.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), DocxError> {
        let document = self.document.to_bytes()?;
        let styles = self.styles.to_bytes()?;

        let mut zip = zip::ZipWriter::new(writer);

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            let data = match entry.name.as_str() {
                DOCUMENT_PART => document.as_slice(),
                STYLES_PART => styles.as_slice(),
                _ => entry.data.as_slice(),
            };

            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(data).map_err(|e| DocxError::Io {
                path: entry.name.clone(),
                source: e,
            })?;
        }

        zip.finish()?;
        Ok(())
    }
}

fn parse_part(entries: &[PackageEntry], name: &str) -> Result<XmlDocument, DocxError> {
    let entry = entries
        .iter()
        .find(|e| e.name == name)
        .ok_or_else(|| DocxError::MissingPart(name.to_owned()))?;

    let xml = std::str::from_utf8(&entry.data)
        .map_err(|e| DocxError::Malformed(format!("{name} is not UTF-8: {e}")))?;
    XmlDocument::parse(xml)
}
