//! In-memory Open Packaging Convention container
//!
//! Workbooks are small, so the whole zip is loaded into memory, edited part by
//! part and written back in one go.

use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{Error, Result};

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PART: &str = "_rels/.rels";

const BLANK_CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    "</Types>"
);

const BLANK_ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    "</Relationships>"
);

const BLANK_WORKBOOK: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    "<sheets/>",
    "</workbook>"
);

const BLANK_WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#
);

/// A named part inside the package.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// The parts of a zip-based package, in archive order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    /// Load every part of the package at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::WorkbookNotFound`] if the file does not exist,
    /// [`Error::InvalidPackage`] if it is not a zip archive.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::WorkbookNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::io(path, e)
            }
        })?;
        Self::read(BufReader::new(file))
    }

    /// Load a package from raw zip bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(Cursor::new(bytes))
    }

    fn read<R: Read + std::io::Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).map_err(Error::package)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(Error::package)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| Error::package(format!("{name}: {e}")))?;
            parts.push(Part { name, data });
        }

        Ok(Self { parts })
    }

    /// A minimal workbook with no sheets.
    ///
    /// Not a valid spreadsheet on its own; callers add at least one sheet
    /// before saving.
    pub fn blank_workbook() -> Self {
        let mut package = Self::default();
        package.set(CONTENT_TYPES_PART, BLANK_CONTENT_TYPES);
        package.set(ROOT_RELS_PART, BLANK_ROOT_RELS);
        package.set("xl/workbook.xml", BLANK_WORKBOOK);
        package.set("xl/_rels/workbook.xml.rels", BLANK_WORKBOOK_RELS);
        package
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Part content as UTF-8 text.
    pub fn text(&self, name: &str) -> Result<&str> {
        let data = self.get(name).ok_or_else(|| Error::MissingPart {
            part: name.to_string(),
        })?;
        std::str::from_utf8(data).map_err(|e| Error::xml(name, e))
    }

    /// Insert or overwrite a part, keeping its position if it already exists.
    pub fn set(&mut self, name: &str, data: impl Into<Vec<u8>>) {
        let data = data.into();
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Remove a part. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|p| p.name != name);
        self.parts.len() != before
    }

    /// Part names in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Serialize to zip bytes. `[Content_Types].xml` is always written first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|p| p.name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|p| p.name != CONTENT_TYPES_PART));

        for part in ordered {
            writer
                .start_file(part.name.as_str(), options)
                .map_err(Error::package)?;
            writer
                .write_all(&part.data)
                .map_err(|e| Error::package(format!("{}: {e}", part.name)))?;
        }

        let cursor = writer.finish().map_err(Error::package)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        dirsync_fs::io::write_atomic(path, &bytes)?;
        Ok(())
    }
}
