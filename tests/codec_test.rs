mod common;

use common::{ids, sample_grid, write_csv};
use std::fs;
use tempfile::TempDir;
use workgrid::codec::{self, delimited_header};
use workgrid::row::{sample_rows, Priority, Status};
use workgrid::{GridEvent, GridOutput, ImportFormat};

fn import_file(grid: &mut workgrid::GridState, path: &std::path::Path) -> Vec<GridOutput> {
    let format = ImportFormat::from_path(path);
    let content = codec::read_import(path).unwrap();
    grid.apply(GridEvent::Import { format, content })
}

#[test]
fn test_csv_file_appends_after_existing_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(
        temp_dir.path(),
        "jobs.csv",
        &[
            "Refresh brand guide,02-02-2025,Complete,Lena Ortiz,www.lena,Sam Hill,High,09-02-2025,1,250,000",
            "Short line,03-02-2025",
        ],
    );

    let mut grid = sample_grid();
    let out = import_file(&mut grid, &path);
    assert!(out.contains(&GridOutput::Imported {
        format: ImportFormat::Csv,
        rows: 2,
        replaced: false
    }));
    assert_eq!(ids(&grid), vec![1, 2, 3, 4, 5, 6, 7]);

    let full = grid.store().get(6).unwrap();
    assert_eq!(full.status, Status::Complete);
    assert_eq!(full.priority, Priority::High);
    // No quoting: the thousands separator splits the value.
    assert_eq!(full.est_value, "1");

    let short = grid.store().get(7).unwrap();
    assert_eq!(short.job_request, "Short line");
    assert_eq!(short.submitted, "03-02-2025");
    assert_eq!(short.assigned, "");
    assert_eq!(short.est_value, "");
}

#[test]
fn test_csv_with_only_a_header_adds_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(temp_dir.path(), "empty.csv", &[]);
    let mut grid = sample_grid();
    let out = import_file(&mut grid, &path);
    assert!(out.contains(&GridOutput::Imported {
        format: ImportFormat::Csv,
        rows: 0,
        replaced: false
    }));
    assert_eq!(grid.store().len(), 5);
}

#[test]
fn test_crlf_line_endings() {
    let rows = codec::parse_delimited("h\r\nOne,01-01-2025\r\nTwo\r\n", ',', 10);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 10);
    assert_eq!(rows[0].submitted, "01-01-2025");
    assert_eq!(rows[1].job_request, "Two");
}

#[test]
fn test_header_matches_field_order() {
    assert_eq!(
        delimited_header(','),
        "jobRequest,submitted,status,submitter,url,assigned,priority,dueDate,estValue"
    );
    assert!(delimited_header(';').starts_with("jobRequest;submitted;"));
}

#[test]
fn test_json_file_replaces_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("saved.json");
    let rows = sample_rows();
    codec::write_export(&path, &codec::export_structured(&rows[3..]).unwrap()).unwrap();

    let mut grid = sample_grid();
    let out = import_file(&mut grid, &path);
    assert!(out.contains(&GridOutput::Imported {
        format: ImportFormat::Json,
        rows: 2,
        replaced: true
    }));
    assert_eq!(ids(&grid), vec![4, 5]);
    assert_eq!(grid.store().get_all(), &rows[3..]);
}

#[test]
fn test_export_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("spreadsheet-data.json");

    let grid = sample_grid();
    codec::write_export(&path, &grid.export_structured().unwrap()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("[\n  {\n    \"id\": 1,"));
    for key in [
        "\"jobRequest\"",
        "\"submitted\"",
        "\"status\": \"In-process\"",
        "\"priority\": \"Medium\"",
        "\"dueDate\"",
        "\"estValue\": \"6,200,000\"",
    ] {
        assert!(written.contains(key), "missing {}", key);
    }
    assert_eq!(codec::parse_structured(&written).unwrap(), sample_rows());
}

#[test]
fn test_export_overwrites_previous_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.json");
    fs::write(&path, "x".repeat(100_000)).unwrap();

    codec::write_export(&path, "[]").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn test_malformed_json_file_leaves_grid_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let mut grid = sample_grid();
    let before = grid.store().get_all().to_vec();

    for (name, content) in [
        ("object.json", "{\"rows\": []}"),
        ("truncated.json", "[{\"id\": 1, \"jobRequest\""),
        ("wrong-status.json", wrong_status().as_str()),
        ("zero-id.json", zero_id().as_str()),
    ] {
        let path = temp_dir.path().join(name);
        fs::write(&path, content).unwrap();
        let out = import_file(&mut grid, &path);
        match out.last() {
            Some(GridOutput::ImportFailed { message }) => {
                assert!(message.starts_with("Import failed:"), "{}", message)
            }
            other => panic!("{} should fail, got {:?}", name, other),
        }
        assert_eq!(grid.store().get_all(), before.as_slice());
    }
}

#[test]
fn test_missing_file_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = codec::read_import(&temp_dir.path().join("gone.csv")).unwrap_err();
    assert!(!err.is_parse_failure());
    assert!(err.import_message().starts_with("Could not read file"));
}

fn wrong_status() -> String {
    let json = codec::export_structured(&sample_rows()[..1]).unwrap();
    json.replace("In-process", "Paused")
}

fn zero_id() -> String {
    let json = codec::export_structured(&sample_rows()[..1]).unwrap();
    json.replace("\"id\": 1", "\"id\": 0")
}
