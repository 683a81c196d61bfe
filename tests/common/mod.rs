use std::path::{Path, PathBuf};
use workgrid::row::sample_rows;
use workgrid::schema::ColumnKey;
use workgrid::{GridOptions, GridState};

#[allow(dead_code)]
pub fn sample_grid() -> GridState {
    GridState::with_rows(sample_rows(), GridOptions::default()).unwrap()
}

/// Visible index of a column in the grid's current schema.
#[allow(dead_code)]
pub fn column(grid: &GridState, key: ColumnKey) -> usize {
    grid.schema().visible_index_of(key).unwrap()
}

#[allow(dead_code)]
pub fn ids(grid: &GridState) -> Vec<u64> {
    grid.store().get_all().iter().map(|r| r.id).collect()
}

/// Write a delimited file with a header line and the given body lines.
#[allow(dead_code)]
pub fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::from("jobRequest,submitted,status,submitter,url,assigned,priority,dueDate,estValue\n");
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}
