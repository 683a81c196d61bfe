//! Import/Export Codec for the structured (JSON) and delimited-text forms.

use std::fs;
use std::io::Write;
use std::path::Path;

use fs2::FileExt;
use tracing::{debug, info};

use crate::error::GridResult;
use crate::row::{Priority, Row, Status};
use crate::schema::ColumnKey;
use crate::store::validate_ids;
use crate::ImportFormat;

pub const DEFAULT_DELIMITER: char = ',';

/// Pretty-printed JSON array of every row, all ten fields per record.
pub fn export_structured(rows: &[Row]) -> GridResult<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Parse a JSON array of rows. Fails as a whole on any shape or id problem.
pub fn parse_structured(content: &str) -> GridResult<Vec<Row>> {
    let rows: Vec<Row> = serde_json::from_str(content)?;
    validate_ids(&rows)?;
    Ok(rows)
}

/// Parse delimited text. The first line is a header and is skipped. Each further
/// line becomes one row with ids counting up from `first_id`. Short lines fill the
/// missing fields with defaults; extra fields are ignored. Never fails.
pub fn parse_delimited(content: &str, delimiter: char, first_id: u64) -> Vec<Row> {
    content
        .lines()
        .skip(1)
        .zip(first_id..)
        .map(|(line, id)| parse_line(line.trim_end_matches('\r'), delimiter, id))
        .collect()
}

fn parse_line(line: &str, delimiter: char, id: u64) -> Row {
    let mut fields = line.split(delimiter);
    let mut row = Row::with_id(id);
    for key in ColumnKey::data_fields() {
        let value = fields.next().unwrap_or("");
        match key {
            ColumnKey::Status => row.status = Status::parse(value.trim()).unwrap_or_default(),
            ColumnKey::Priority => {
                row.priority = Priority::parse(value.trim()).unwrap_or_default()
            }
            ColumnKey::JobRequest => row.job_request = value.to_string(),
            ColumnKey::Submitted => row.submitted = value.to_string(),
            ColumnKey::Submitter => row.submitter = value.to_string(),
            ColumnKey::Url => row.url = value.to_string(),
            ColumnKey::Assigned => row.assigned = value.to_string(),
            ColumnKey::DueDate => row.due_date = value.to_string(),
            ColumnKey::EstValue => row.est_value = value.to_string(),
            ColumnKey::Id => {}
        }
    }
    row
}

/// Header line matching the delimited import layout.
pub fn delimited_header(delimiter: char) -> String {
    ColumnKey::data_fields()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

/// Read an import file as text.
pub fn read_import(path: &Path) -> GridResult<String> {
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "read import file");
    Ok(content)
}

/// Write the export, holding an exclusive lock on the file while writing.
pub fn write_export(path: &Path, content: &str) -> GridResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    file.lock_exclusive()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.unlock()?;

    info!(path = %path.display(), "export written");
    Ok(())
}

/// Parse `content` in the given form. Structured input is checked fully here;
/// delimited input cannot fail.
pub fn decode(
    format: ImportFormat,
    content: &str,
    delimiter: char,
    first_id: u64,
) -> GridResult<Vec<Row>> {
    match format {
        ImportFormat::Json => parse_structured(content),
        ImportFormat::Csv => Ok(parse_delimited(content, delimiter, first_id)),
    }
}
