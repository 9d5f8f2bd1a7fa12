//! Scenario tests across the whole stack
//!
//! Each test builds real client and dev trees with fixed modification times,
//! runs the pipeline and checks the trees and the report workbook afterwards.

use dirsync_core::report::format_timestamp;
use dirsync_core::{SyncAction, SyncConfig, SyncPipeline};
use dirsync_fs::{KeyMode, ScanOptions, Snapshot};
use dirsync_report::{Package, SheetData, WorkbookOptions, read_sheet, replace_sheet, sheet_names};
use dirsync_test_utils::{SyncFixture, date, datetime};
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn config(fixture: &SyncFixture) -> SyncConfig {
    let mut config = SyncConfig::new(
        fixture.client.root(),
        fixture.dev.root(),
        fixture.report_path(),
    );
    config.report.create_if_missing = true;
    config
}

fn report_rows(fixture: &SyncFixture) -> Vec<Vec<String>> {
    read_sheet(&fixture.report_path(), "Last Snapshot")
        .unwrap()
        .expect("report sheet missing")
}

fn row(cells: [&str; 4]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

// =============================================================================
// Reference scenario
// =============================================================================

#[test]
fn reference_scenario_end_to_end() {
    let fixture = SyncFixture::new().with_reference_scenario();

    let summary = SyncPipeline::new(config(&fixture)).run().unwrap();
    assert_eq!(summary.execution.copied(), 3);

    let b_client = format_timestamp(date("2024-03-05"));
    let b_dev = format_timestamp(date("2024-03-02"));
    let a_client = format_timestamp(date("2024-03-01"));
    let c_dev = format_timestamp(date("2024-03-03"));
    assert_eq!(
        report_rows(&fixture),
        vec![
            row(["File", "Last Modified_Client", "Last Modified_Dev", "Sync Action"]),
            row(["b.txt", &b_client, &b_dev, "Copy to Dev"]),
            row(["a.txt", &a_client, "", "Copy to Dev"]),
            row(["c.txt", "", &c_dev, "Copy to Client"]),
        ]
    );

    fixture.dev.assert_file_contains("a.txt", "client a");
    fixture.dev.assert_file_contains("b.txt", "client b");
    fixture.client.assert_file_contains("c.txt", "dev c");
    assert_eq!(fixture.dev.mtime("a.txt"), fixture.client.mtime("a.txt"));
    assert_eq!(fixture.dev.mtime("b.txt"), date("2024-03-05"));
    assert_eq!(fixture.client.mtime("c.txt"), date("2024-03-03"));
}

#[test]
fn rerun_is_idempotent() {
    let fixture = SyncFixture::new().with_reference_scenario();
    let pipeline = SyncPipeline::new(config(&fixture));
    pipeline.run().unwrap();

    let second = pipeline.run().unwrap();

    assert_eq!(second.execution.copied(), 0);
    assert_eq!(second.actions.in_sync, 3);
    let rows = report_rows(&fixture);
    assert_eq!(rows.len(), 4);
    assert!(rows[1..].iter().all(|r| r[3] == "In Sync"));
    assert!(rows[1..].iter().all(|r| r[1] == r[2]));
}

#[test]
fn copy_effect_matches_snapshot_after_run() {
    let fixture = SyncFixture::new();
    fixture.client.write_at("x.log", "newer", datetime("2024-06-01 12:30:45"));
    fixture.dev.write_at("x.log", "older", datetime("2024-06-01 12:30:44"));

    SyncPipeline::new(config(&fixture)).run().unwrap();

    let dev = Snapshot::scan(fixture.dev.root(), &ScanOptions::default()).unwrap();
    assert_eq!(dev.modified_at("x.log"), Some(datetime("2024-06-01 12:30:45")));
    fixture.dev.assert_file_contains("x.log", "newer");
}

// =============================================================================
// Report workbook
// =============================================================================

#[test]
fn existing_workbook_keeps_other_sheets() {
    let fixture = SyncFixture::new().with_reference_scenario();
    replace_sheet(
        &fixture.report_path(),
        "Notes",
        &SheetData::with_header(["hand-written notes"]),
        &WorkbookOptions {
            create_if_missing: true,
        },
    )
    .unwrap();

    let mut config = config(&fixture);
    config.report.create_if_missing = false;
    SyncPipeline::new(config).run().unwrap();

    assert_eq!(
        sheet_names(&fixture.report_path()).unwrap(),
        vec!["Notes".to_string(), "Last Snapshot".to_string()]
    );
    assert_eq!(
        read_sheet(&fixture.report_path(), "Notes").unwrap(),
        Some(vec![vec!["hand-written notes".to_string()]])
    );
}

#[test]
fn custom_sheet_name_is_used() {
    let fixture = SyncFixture::new().with_reference_scenario();
    let mut config = config(&fixture);
    config.report.sheet_name = "Audit".into();

    SyncPipeline::new(config).run().unwrap();

    assert_eq!(
        sheet_names(&fixture.report_path()).unwrap(),
        vec!["Audit".to_string()]
    );
}

#[test]
fn report_package_stays_minimal_across_runs() {
    let fixture = SyncFixture::new().with_reference_scenario();
    let pipeline = SyncPipeline::new(config(&fixture));
    pipeline.run().unwrap();
    pipeline.run().unwrap();
    pipeline.run().unwrap();

    let package = Package::open(&fixture.report_path()).unwrap();
    let sheets: Vec<_> = package
        .part_names()
        .filter(|p| p.starts_with("xl/worksheets/"))
        .collect();
    assert_eq!(sheets, vec!["xl/worksheets/sheet1.xml"]);
}

// =============================================================================
// Key modes
// =============================================================================

#[test]
fn relative_path_mode_keeps_same_names_apart() {
    let fixture = SyncFixture::new();
    fixture.client.write_at("one/readme.md", "one", date("2024-01-02"));
    fixture.client.write_at("two/readme.md", "two", date("2024-01-03"));

    let mut config = config(&fixture);
    config.scan = ScanOptions {
        key_mode: KeyMode::RelativePath,
        ..ScanOptions::default()
    };
    let summary = SyncPipeline::new(config).run().unwrap();

    assert!(summary.collisions.is_empty());
    assert_eq!(summary.actions.count(SyncAction::CopyToDev), 2);
    fixture.dev.assert_file_contains("one/readme.md", "one");
    fixture.dev.assert_file_contains("two/readme.md", "two");

    let files: Vec<_> = report_rows(&fixture)
        .into_iter()
        .skip(1)
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(files, ["two/readme.md", "one/readme.md"]);
}

#[test]
fn base_name_mode_reports_collisions() {
    let fixture = SyncFixture::new();
    fixture.client.write_at("one/readme.md", "one", date("2024-01-02"));
    fixture.client.write_at("two/readme.md", "two", date("2024-01-03"));

    let summary = SyncPipeline::new(config(&fixture)).run().unwrap();

    assert_eq!(summary.collisions, vec!["readme.md".to_string()]);
    fixture.dev.assert_file_contains("two/readme.md", "two");
    fixture.dev.assert_file_not_exists("one/readme.md");
}
