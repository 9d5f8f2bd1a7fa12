//! Sheet-level edits on a workbook package
//!
//! Only the parts that describe sheets are touched: the workbook part, its
//! relationships and `[Content_Types].xml`. Everything else in the package
//! (styles, other sheets, document properties) is carried over byte for byte.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

use crate::package::{CONTENT_TYPES_PART, ROOT_RELS_PART};
use crate::sheet::{read_rows, read_shared_strings};
use crate::xml::{self, attr, is, prefixed_attr, rewrite_children};
use crate::{Error, Package, Result, SheetData};

const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// Longest sheet name spreadsheet applications accept
const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Options for [`replace_sheet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkbookOptions {
    /// Create a new workbook when none exists at the path instead of failing
    pub create_if_missing: bool,
}

/// Replace the sheet called `sheet_name` in the workbook at `path`.
///
/// An existing sheet of that name (compared case-insensitively) is deleted
/// first; the new sheet is appended after the remaining ones. The rebuilt
/// package is written atomically.
///
/// # Errors
///
/// - [`Error::WorkbookNotFound`] if `path` does not exist and
///   `create_if_missing` is off
/// - [`Error::InvalidPackage`], [`Error::Xml`] or [`Error::MissingPart`] if
///   the workbook cannot be understood
/// - [`Error::InvalidSheetName`] for names spreadsheet applications reject
pub fn replace_sheet(
    path: &Path,
    sheet_name: &str,
    data: &SheetData,
    options: &WorkbookOptions,
) -> Result<()> {
    validate_sheet_name(sheet_name)?;

    let mut package = match Package::open(path) {
        Ok(package) => package,
        Err(Error::WorkbookNotFound { .. }) if options.create_if_missing => {
            tracing::info!(?path, "Workbook not found, creating a new one");
            Package::blank_workbook()
        }
        Err(e) => return Err(e),
    };

    package.replace_sheet(sheet_name, data)?;
    package.save(path)
}

/// Names of the sheets in the workbook at `path`, in tab order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    Package::open(path)?.sheet_names()
}

/// Cell text of the sheet called `sheet_name`, or `None` if there is no such
/// sheet.
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<Option<Vec<Vec<String>>>> {
    Package::open(path)?.read_sheet(sheet_name)
}

impl Package {
    /// Names of the sheets in tab order.
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        let layout = Layout::locate(self)?;
        let sheets = parse_sheets(&layout.workbook_part, self.text(&layout.workbook_part)?)?;
        Ok(sheets.into_iter().map(|s| s.name).collect())
    }

    /// Cell text of a sheet, or `None` if the workbook has no such sheet.
    pub fn read_sheet(&self, sheet_name: &str) -> Result<Option<Vec<Vec<String>>>> {
        let layout = Layout::locate(self)?;
        let sheets = parse_sheets(&layout.workbook_part, self.text(&layout.workbook_part)?)?;
        let Some(sheet) = sheets.iter().find(|s| same_sheet_name(&s.name, sheet_name)) else {
            return Ok(None);
        };

        let rels = parse_relationships(&layout.rels_part, self.text(&layout.rels_part)?)?;
        let rel = rels
            .iter()
            .find(|r| r.id == sheet.rel_id)
            .ok_or_else(|| Error::MissingPart {
                part: format!("relationship {} for sheet {}", sheet.rel_id, sheet.name),
            })?;
        let part = resolve_target(&layout.base_dir, &rel.target);

        let shared = match rels.iter().find(|r| r.rel_type.ends_with("/sharedStrings")) {
            Some(rel) => {
                let shared_part = resolve_target(&layout.base_dir, &rel.target);
                if self.contains(&shared_part) {
                    read_shared_strings(&shared_part, self.text(&shared_part)?)?
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        };

        read_rows(&part, self.text(&part)?, &shared).map(Some)
    }

    /// Delete the sheet called `sheet_name` if present and append `data` as a
    /// new sheet of that name.
    ///
    /// The calculation chain is dropped as well, since it indexes cells by
    /// sheet position; spreadsheet applications rebuild it on load.
    pub fn replace_sheet(&mut self, sheet_name: &str, data: &SheetData) -> Result<()> {
        validate_sheet_name(sheet_name)?;

        let layout = Layout::locate(self)?;
        let workbook_xml = self.text(&layout.workbook_part)?.to_string();
        let rels_xml = self.text(&layout.rels_part)?.to_string();
        let content_types_xml = self.text(CONTENT_TYPES_PART)?.to_string();

        let sheets = parse_sheets(&layout.workbook_part, &workbook_xml)?;
        let rels = parse_relationships(&layout.rels_part, &rels_xml)?;

        let removed = sheets
            .iter()
            .position(|s| same_sheet_name(&s.name, sheet_name));

        let mut dropped_rel_ids = Vec::new();
        let mut dropped_parts = Vec::new();

        if let Some(index) = removed {
            let old = &sheets[index];
            dropped_rel_ids.push(old.rel_id.clone());
            if let Some(rel) = rels.iter().find(|r| r.id == old.rel_id) {
                let part = resolve_target(&layout.base_dir, &rel.target);
                dropped_parts.push(rels_part_for(&part));
                dropped_parts.push(part);
            }
        }
        for rel in rels.iter().filter(|r| r.rel_type.ends_with("/calcChain")) {
            dropped_rel_ids.push(rel.id.clone());
            dropped_parts.push(resolve_target(&layout.base_dir, &rel.target));
        }
        for part in &dropped_parts {
            self.remove(part);
        }

        let new_sheet = SheetRef {
            name: sheet_name.to_string(),
            sheet_id: sheets
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != removed)
                .map(|(_, s)| s.sheet_id)
                .max()
                .unwrap_or(0)
                + 1,
            rel_id: first_free(|candidate| rels.iter().any(|r| r.id == candidate), "rId"),
        };
        let sheet_file = first_free(
            |candidate| {
                let part = resolve_target(&layout.base_dir, &format!("worksheets/{candidate}.xml"));
                self.contains(&part)
            },
            "sheet",
        );
        let target = format!("worksheets/{sheet_file}.xml");
        let sheet_part = resolve_target(&layout.base_dir, &target);

        let workbook_xml = rewrite_workbook(&layout.workbook_part, &workbook_xml, removed, &new_sheet)?;

        let mut relationship = BytesStart::new("Relationship");
        relationship.push_attribute(("Id", new_sheet.rel_id.as_str()));
        relationship.push_attribute(("Type", REL_WORKSHEET));
        relationship.push_attribute(("Target", target.as_str()));
        let rels_xml = rewrite_children(
            &layout.rels_part,
            &rels_xml,
            b"Relationships",
            b"Relationship",
            |e| {
                let id = attr(&layout.rels_part, e, b"Id")?;
                Ok(!id.is_some_and(|id| dropped_rel_ids.contains(&id)))
            },
            &[relationship],
        )?;

        let dropped_names: Vec<String> = dropped_parts.iter().map(|p| format!("/{p}")).collect();
        let part_name = format!("/{sheet_part}");
        let mut content_override = BytesStart::new("Override");
        content_override.push_attribute(("PartName", part_name.as_str()));
        content_override.push_attribute(("ContentType", CT_WORKSHEET));
        let content_types_xml = rewrite_children(
            CONTENT_TYPES_PART,
            &content_types_xml,
            b"Types",
            b"Override",
            |e| {
                let name = attr(CONTENT_TYPES_PART, e, b"PartName")?;
                Ok(!name.is_some_and(|name| dropped_names.contains(&name)))
            },
            &[content_override],
        )?;

        self.set(&sheet_part, data.to_xml()?);
        self.set(&layout.workbook_part, workbook_xml);
        self.set(&layout.rels_part, rels_xml);
        self.set(CONTENT_TYPES_PART, content_types_xml);

        tracing::debug!(
            sheet = sheet_name,
            part = %sheet_part,
            rows = data.len(),
            replaced = removed.is_some(),
            "Wrote sheet"
        );
        Ok(())
    }
}

/// Where the workbook part and its relationships live in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    workbook_part: String,
    rels_part: String,
    base_dir: String,
}

impl Layout {
    fn locate(package: &Package) -> Result<Self> {
        let rels = parse_relationships(ROOT_RELS_PART, package.text(ROOT_RELS_PART)?)?;
        let document = rels
            .iter()
            .find(|r| r.rel_type.ends_with("/officeDocument"))
            .ok_or_else(|| Error::MissingPart {
                part: "officeDocument relationship".to_string(),
            })?;

        let workbook_part = resolve_target("", &document.target);
        Ok(Self {
            base_dir: parent_dir(&workbook_part).to_string(),
            rels_part: rels_part_for(&workbook_part),
            workbook_part,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetRef {
    name: String,
    sheet_id: u32,
    rel_id: String,
}

fn parse_relationships(part: &str, xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event().map_err(|e| Error::xml(part, e))? {
            Event::Start(e) | Event::Empty(e) if is(&e, b"Relationship") => {
                relationships.push(Relationship {
                    id: attr(part, &e, b"Id")?.unwrap_or_default(),
                    rel_type: attr(part, &e, b"Type")?.unwrap_or_default(),
                    target: attr(part, &e, b"Target")?.unwrap_or_default(),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

fn parse_sheets(part: &str, xml: &str) -> Result<Vec<SheetRef>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event().map_err(|e| Error::xml(part, e))? {
            Event::Start(e) | Event::Empty(e) if is(&e, b"sheet") => {
                let name = attr(part, &e, b"name")?.ok_or_else(|| {
                    Error::xml(part, "sheet element without a name attribute")
                })?;
                sheets.push(SheetRef {
                    name,
                    sheet_id: attr(part, &e, b"sheetId")?
                        .and_then(|id| id.parse().ok())
                        .unwrap_or(0),
                    rel_id: prefixed_attr(part, &e, b"id")?.unwrap_or_default(),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheets)
}

/// Copy the workbook part, dropping the sheet at `removed` and appending
/// `new_sheet`. Sheet-scoped defined names follow the removal: names local to
/// the removed sheet go, later sheet indexes shift down by one.
fn rewrite_workbook(
    part: &str,
    xml: &str,
    removed: Option<usize>,
    new_sheet: &SheetRef,
) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut rel_prefix: Option<String> = None;
    let mut sheet_index = 0usize;
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| Error::xml(part, e))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Eof => break,
            Event::Start(e) if is(&e, b"workbook") => {
                rel_prefix = relationship_prefix(part, &e)?;
                xml::write(part, &mut writer, Event::Start(e))?;
            }
            Event::Start(e) if is(&e, b"sheet") => {
                let drop = removed == Some(sheet_index);
                sheet_index += 1;
                if drop {
                    skip_depth = 1;
                } else {
                    xml::write(part, &mut writer, Event::Start(e))?;
                }
            }
            Event::Empty(e) if is(&e, b"sheet") => {
                let drop = removed == Some(sheet_index);
                sheet_index += 1;
                if !drop {
                    xml::write(part, &mut writer, Event::Empty(e))?;
                }
            }
            Event::Start(e) if is(&e, b"definedName") => {
                match renumber_defined_name(part, &e, removed)? {
                    DefinedName::Drop => skip_depth = 1,
                    DefinedName::Keep => xml::write(part, &mut writer, Event::Start(e))?,
                    DefinedName::Renumbered(updated) => {
                        xml::write(part, &mut writer, Event::Start(updated))?;
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"sheets" => {
                let element = sheet_element(new_sheet, rel_prefix.as_deref());
                xml::write(part, &mut writer, Event::Empty(element))?;
                xml::write(part, &mut writer, Event::End(e))?;
            }
            Event::Empty(e) if is(&e, b"sheets") => {
                let end = e.to_end().into_owned();
                let element = sheet_element(new_sheet, rel_prefix.as_deref());
                xml::write(part, &mut writer, Event::Start(e))?;
                xml::write(part, &mut writer, Event::Empty(element))?;
                xml::write(part, &mut writer, Event::End(end))?;
            }
            other => xml::write(part, &mut writer, other)?,
        }
    }

    xml::into_string(part, writer)
}

enum DefinedName {
    Keep,
    Drop,
    Renumbered(BytesStart<'static>),
}

fn renumber_defined_name(
    part: &str,
    element: &BytesStart<'_>,
    removed: Option<usize>,
) -> Result<DefinedName> {
    let Some(removed) = removed else {
        return Ok(DefinedName::Keep);
    };
    let Some(local) = attr(part, element, b"localSheetId")?.and_then(|v| v.parse::<usize>().ok())
    else {
        return Ok(DefinedName::Keep);
    };

    if local == removed {
        return Ok(DefinedName::Drop);
    }
    if local < removed {
        return Ok(DefinedName::Keep);
    }

    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let shifted = (local - 1).to_string();
    let mut updated = BytesStart::new(name);
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| Error::xml(part, e))?;
        if attribute.key.as_ref() == b"localSheetId" {
            updated.push_attribute(("localSheetId", shifted.as_str()));
        } else {
            updated.push_attribute(attribute);
        }
    }
    Ok(DefinedName::Renumbered(updated))
}

fn relationship_prefix(part: &str, root: &BytesStart<'_>) -> Result<Option<String>> {
    for attribute in root.attributes() {
        let attribute = attribute.map_err(|e| Error::xml(part, e))?;
        let Some(prefix) = attribute.key.as_ref().strip_prefix(b"xmlns:") else {
            continue;
        };
        if attribute.value.as_ref() == NS_REL.as_bytes() {
            return Ok(Some(String::from_utf8_lossy(prefix).into_owned()));
        }
    }
    Ok(None)
}

fn sheet_element(sheet: &SheetRef, rel_prefix: Option<&str>) -> BytesStart<'static> {
    let sheet_id = sheet.sheet_id.to_string();
    let mut element = BytesStart::new("sheet");
    element.push_attribute(("name", sheet.name.as_str()));
    element.push_attribute(("sheetId", sheet_id.as_str()));
    match rel_prefix {
        Some(prefix) => {
            let key = format!("{prefix}:id");
            element.push_attribute((key.as_str(), sheet.rel_id.as_str()));
        }
        None => {
            element.push_attribute(("xmlns:r", NS_REL));
            element.push_attribute(("r:id", sheet.rel_id.as_str()));
        }
    }
    element
}

fn validate_sheet_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.chars().count() > MAX_SHEET_NAME {
        Some("name is longer than 31 characters")
    } else if name.contains(FORBIDDEN_SHEET_CHARS) {
        Some("name contains one of [ ] : * ? / \\")
    } else if name.starts_with('\'') || name.ends_with('\'') {
        Some("name starts or ends with an apostrophe")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidSheetName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn same_sheet_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// `{prefix}{n}` for the smallest `n >= 1` not rejected by `taken`.
fn first_free(taken: impl Fn(&str) -> bool, prefix: &str) -> String {
    (1..)
        .map(|n| format!("{prefix}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| format!("{prefix}0"))
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn parent_dir(part: &str) -> &str {
    part.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const WORKBOOK: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
        r#"xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<sheets><sheet name="Summary" sheetId="1" rel:id="rId1"/>"#,
        r#"<sheet name="Last Snapshot" sheetId="2" rel:id="rId2"/>"#,
        r#"<sheet name="Notes" sheetId="3" rel:id="rId3"/></sheets>"#,
        r#"<definedNames><definedName name="_xlnm._FilterDatabase" localSheetId="1" hidden="1">'Last Snapshot'!$A$1:$D$4</definedName>"#,
        r#"<definedName name="Scratch" localSheetId="2">Notes!$A$1</definedName></definedNames>"#,
        "</workbook>"
    );

    const WORKBOOK_RELS: &str = concat!(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>"#,
        r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet3.xml"/>"#,
        r#"<Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain" Target="calcChain.xml"/>"#,
        "</Relationships>"
    );

    const CONTENT_TYPES: &str = concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet3.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"<Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/>"#,
        "</Types>"
    );

    fn three_sheet_package() -> Package {
        let mut package = Package::blank_workbook();
        package.set(CONTENT_TYPES_PART, CONTENT_TYPES);
        package.set("xl/workbook.xml", WORKBOOK);
        package.set("xl/_rels/workbook.xml.rels", WORKBOOK_RELS);
        package.set("xl/worksheets/sheet1.xml", SheetData::with_header(["summary"]).to_xml().unwrap());
        package.set("xl/worksheets/sheet2.xml", SheetData::with_header(["stale"]).to_xml().unwrap());
        package.set("xl/worksheets/_rels/sheet2.xml.rels", "<Relationships/>");
        package.set("xl/worksheets/sheet3.xml", SheetData::with_header(["notes"]).to_xml().unwrap());
        package.set("xl/calcChain.xml", "<calcChain/>");
        package
    }

    #[test]
    fn replace_existing_sheet_moves_it_last() {
        let mut package = three_sheet_package();
        let mut data = SheetData::with_header(["fresh"]);
        data.push_row(vec![Cell::text("row")]);

        package.replace_sheet("Last Snapshot", &data).unwrap();

        assert_eq!(
            package.sheet_names().unwrap(),
            vec!["Summary".to_string(), "Notes".into(), "Last Snapshot".into()]
        );
        assert_eq!(
            package.read_sheet("Last Snapshot").unwrap(),
            Some(vec![vec!["fresh".to_string()], vec!["row".to_string()]])
        );
        assert_eq!(
            package.read_sheet("Summary").unwrap(),
            Some(vec![vec!["summary".to_string()]])
        );
    }

    #[test]
    fn replace_removes_stale_parts_and_calc_chain() {
        let mut package = three_sheet_package();
        package.replace_sheet("last snapshot", &SheetData::new()).unwrap();

        assert!(!package.contains("xl/worksheets/_rels/sheet2.xml.rels"));
        assert!(!package.contains("xl/calcChain.xml"));

        let content_types = package.text(CONTENT_TYPES_PART).unwrap();
        assert!(!content_types.contains("calcChain"));
        assert_eq!(content_types.matches("/xl/worksheets/sheet2.xml").count(), 1);

        let rels = package.text("xl/_rels/workbook.xml.rels").unwrap();
        assert!(!rels.contains("rId2\""), "stale relationship kept: {rels}");
        assert!(!rels.contains("rId4"), "calc chain relationship kept: {rels}");
        assert!(rels.contains(r#"Id="rId5""#), "new relationship missing: {rels}");
    }

    #[test]
    fn replace_uses_declared_relationship_prefix() {
        let mut package = three_sheet_package();
        package.replace_sheet("Audit", &SheetData::new()).unwrap();

        let workbook = package.text("xl/workbook.xml").unwrap();
        assert!(
            workbook.contains(r#"<sheet name="Audit" sheetId="4" rel:id="rId5"/>"#),
            "unexpected workbook: {workbook}"
        );
        assert!(package.contains("xl/worksheets/sheet4.xml"));
    }

    #[test]
    fn defined_names_follow_removed_sheet() {
        let mut package = three_sheet_package();
        package.replace_sheet("Last Snapshot", &SheetData::new()).unwrap();

        let workbook = package.text("xl/workbook.xml").unwrap();
        assert!(!workbook.contains("_FilterDatabase"));
        assert!(workbook.contains(r#"<definedName name="Scratch" localSheetId="1">Notes!$A$1</definedName>"#));
    }

    #[test]
    fn blank_workbook_gets_first_sheet() {
        let mut package = Package::blank_workbook();
        package
            .replace_sheet("Last Snapshot", &SheetData::with_header(["File"]))
            .unwrap();

        let workbook = package.text("xl/workbook.xml").unwrap();
        assert!(workbook.contains(r#"<sheets><sheet name="Last Snapshot" sheetId="1" r:id="rId1"/></sheets>"#));
        assert!(package.contains("xl/worksheets/sheet1.xml"));
        assert_eq!(package.sheet_names().unwrap(), vec!["Last Snapshot".to_string()]);
    }

    #[rstest]
    #[case("")]
    #[case("a/b")]
    #[case("what?")]
    #[case("'quoted'")]
    #[case("this sheet name is far too long for excel")]
    fn invalid_sheet_names_are_rejected(#[case] name: &str) {
        let mut package = Package::blank_workbook();
        let result = package.replace_sheet(name, &SheetData::new());
        assert!(matches!(result, Err(Error::InvalidSheetName { .. })));
    }

    #[rstest]
    #[case("xl", "worksheets/sheet1.xml", "xl/worksheets/sheet1.xml")]
    #[case("xl", "/xl/worksheets/sheet1.xml", "xl/worksheets/sheet1.xml")]
    #[case("xl", "../docProps/app.xml", "docProps/app.xml")]
    #[case("", "xl/workbook.xml", "xl/workbook.xml")]
    fn targets_resolve_against_base(#[case] base: &str, #[case] target: &str, #[case] expected: &str) {
        assert_eq!(resolve_target(base, target), expected);
    }

    #[test]
    fn rels_part_naming() {
        assert_eq!(rels_part_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(rels_part_for("workbook.xml"), "_rels/workbook.xml.rels");
    }
}
