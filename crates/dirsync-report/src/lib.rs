//! Spreadsheet persistence for dirsync
//!
//! Reads and rewrites Office Open XML workbooks (`.xlsx`) without a full
//! spreadsheet model: the package is loaded as a set of zip parts and only the
//! parts that describe sheets are edited.
//!
//! The main entry point is [`replace_sheet`], which deletes a named sheet if it
//! exists and appends a freshly rendered one in its place. The new package is
//! built in memory and written atomically, so the workbook on disk is never
//! left without the sheet.

pub mod error;
pub mod package;
pub mod sheet;
pub mod workbook;
mod xml;

pub use error::{Error, Result};
pub use package::Package;
pub use sheet::{Cell, SheetData};
pub use workbook::{WorkbookOptions, read_sheet, replace_sheet, sheet_names};
