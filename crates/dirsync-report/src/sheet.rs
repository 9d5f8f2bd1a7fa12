//! Worksheet content and its SpreadsheetML rendering

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::xml::{self, attr, is};
use crate::{Error, Result};

pub(crate) const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// One cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `Some` text, or an empty cell for `None`.
    pub fn optional_text(value: Option<impl Into<String>>) -> Self {
        value.map_or(Self::Empty, |v| Self::Text(v.into()))
    }
}

/// Rows of cells destined for one worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetData {
    rows: Vec<Vec<Cell>>,
}

impl SheetData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sheet with a header row of text cells.
    pub fn with_header<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheet = Self::new();
        sheet.push_row(header.into_iter().map(Cell::text).collect());
        sheet
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Render as a worksheet part. Text is written as inline strings, so no
    /// shared string table is needed.
    pub fn to_xml(&self) -> Result<String> {
        const PART: &str = "worksheet";
        let mut writer = Writer::new(Vec::new());
        let w = &mut writer;

        xml::write(PART, w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        let mut root = BytesStart::new("worksheet");
        root.push_attribute(("xmlns", NS_MAIN));
        xml::write(PART, w, Event::Start(root))?;

        if !self.is_empty() && self.width() > 0 {
            let range = format!("A1:{}{}", column_name(self.width() - 1), self.len());
            let mut dimension = BytesStart::new("dimension");
            dimension.push_attribute(("ref", range.as_str()));
            xml::write(PART, w, Event::Empty(dimension))?;
        }

        if self.is_empty() {
            xml::write(PART, w, Event::Empty(BytesStart::new("sheetData")))?;
        } else {
            xml::write(PART, w, Event::Start(BytesStart::new("sheetData")))?;
            for (r, row) in self.rows.iter().enumerate() {
                write_row(w, r + 1, row)?;
            }
            xml::write(PART, w, Event::End(BytesEnd::new("sheetData")))?;
        }

        xml::write(PART, w, Event::End(BytesEnd::new("worksheet")))?;
        xml::into_string(PART, writer)
    }
}

fn write_row(w: &mut Writer<Vec<u8>>, number: usize, cells: &[Cell]) -> Result<()> {
    const PART: &str = "worksheet";
    let number_text = number.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", number_text.as_str()));
    xml::write(PART, w, Event::Start(row))?;

    for (c, cell) in cells.iter().enumerate() {
        let reference = format!("{}{}", column_name(c), number);
        let mut element = BytesStart::new("c");
        element.push_attribute(("r", reference.as_str()));

        match cell {
            Cell::Empty => continue,
            Cell::Text(text) => {
                element.push_attribute(("t", "inlineStr"));
                xml::write(PART, w, Event::Start(element))?;
                xml::write(PART, w, Event::Start(BytesStart::new("is")))?;
                let mut t = BytesStart::new("t");
                if text.trim() != text.as_str() {
                    t.push_attribute(("xml:space", "preserve"));
                }
                xml::write(PART, w, Event::Start(t))?;
                xml::write(PART, w, Event::Text(BytesText::new(text)))?;
                xml::write(PART, w, Event::End(BytesEnd::new("t")))?;
                xml::write(PART, w, Event::End(BytesEnd::new("is")))?;
            }
            Cell::Number(value) => {
                xml::write(PART, w, Event::Start(element))?;
                xml::write(PART, w, Event::Start(BytesStart::new("v")))?;
                xml::write(PART, w, Event::Text(BytesText::new(&value.to_string())))?;
                xml::write(PART, w, Event::End(BytesEnd::new("v")))?;
            }
        }
        xml::write(PART, w, Event::End(BytesEnd::new("c")))?;
    }

    xml::write(PART, w, Event::End(BytesEnd::new("row")))
}

/// Column count of a worksheet; the last column is `XFD`.
pub const MAX_COLUMNS: usize = 16_384;

/// Spreadsheet column letters for a zero-based index (`0` -> `A`, `26` -> `AA`).
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Zero-based column index of a cell reference such as `C7`.
pub fn column_index(reference: &str) -> Option<usize> {
    let letters: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    letters
        .bytes()
        .try_fold(0usize, |acc, b| {
            let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .map(|n| n - 1)
}

/// Cell values of a worksheet part as text, one `Vec` per row.
///
/// Column gaps are filled with empty strings. `shared` resolves `t="s"`
/// cells against the workbook's shared string table.
pub(crate) fn read_rows(part: &str, xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>> {
    #[derive(PartialEq)]
    enum Capture {
        None,
        Value,
        Inline,
    }

    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut column = 0usize;
    let mut cell_type = String::new();
    let mut text = String::new();
    let mut capture = Capture::None;

    loop {
        match reader.read_event().map_err(|e| Error::xml(part, e))? {
            Event::Start(e) if is(&e, b"row") => row = Some(Vec::new()),
            Event::Empty(e) if is(&e, b"row") => rows.push(Vec::new()),
            Event::End(e) if e.local_name().as_ref() == b"row" => {
                rows.push(row.take().unwrap_or_default());
            }
            Event::Start(e) if is(&e, b"c") => {
                let current = row.as_ref().map_or(0, Vec::len);
                let reference = attr(part, &e, b"r")?;
                column = reference
                    .as_deref()
                    .and_then(column_index)
                    .unwrap_or(current);
                if column >= MAX_COLUMNS {
                    return Err(Error::xml(
                        part,
                        format!(
                            "cell {} lies beyond column {}",
                            reference.as_deref().unwrap_or("without reference"),
                            column_name(MAX_COLUMNS - 1)
                        ),
                    ));
                }
                cell_type = attr(part, &e, b"t")?.unwrap_or_default();
                text.clear();
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => {
                let value = if cell_type == "s" {
                    text.trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| shared.get(i).cloned())
                        .unwrap_or_default()
                } else {
                    std::mem::take(&mut text)
                };
                if let Some(cells) = row.as_mut() {
                    if cells.len() <= column {
                        cells.resize(column + 1, String::new());
                    }
                    cells[column] = value;
                }
            }
            Event::Start(e) if is(&e, b"v") => capture = Capture::Value,
            Event::Start(e) if is(&e, b"t") => capture = Capture::Inline,
            Event::End(e) if matches!(e.local_name().as_ref(), b"v" | b"t") => {
                capture = Capture::None;
            }
            Event::Text(e) if capture != Capture::None => {
                let unescaped = e.unescape().map_err(|err| Error::xml(part, err))?;
                text.push_str(&unescaped);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rows)
}

/// Entries of a shared string table, rich-text runs concatenated.
pub(crate) fn read_shared_strings(part: &str, xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| Error::xml(part, e))? {
            Event::Start(e) if is(&e, b"si") => current = Some(String::new()),
            Event::Empty(e) if is(&e, b"si") => strings.push(String::new()),
            Event::End(e) if e.local_name().as_ref() == b"si" => {
                strings.push(current.take().unwrap_or_default());
            }
            Event::Start(e) if is(&e, b"t") => in_text = true,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_text = false,
            Event::Text(e) if in_text => {
                let unescaped = e.unescape().map_err(|err| Error::xml(part, err))?;
                if let Some(s) = current.as_mut() {
                    s.push_str(&unescaped);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}
