//! Row Store: the ordered collection of work items.

use std::collections::HashSet;

use crate::error::GridError;
use crate::row::{FieldValue, Row};
use crate::schema::ColumnKey;

#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
    /// Highest id ever held in this session, so ids are not handed out twice.
    high_water: u64,
}

/// What an `upsert_field` call did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert {
    pub row_id: u64,
    /// Ids of rows created to make `row_id` addressable, in creation order.
    pub created: Vec<u64>,
}

impl RowStore {
    pub fn new(rows: Vec<Row>) -> Result<Self, GridError> {
        let mut store = Self::default();
        store.replace_all(rows)?;
        Ok(store)
    }

    /// Rows in current order: last applied sort, otherwise insertion order.
    pub fn get_all(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// String form of one cell. Rows not yet materialized read as defaults.
    pub fn cell_text(&self, row_id: u64, key: ColumnKey) -> String {
        match self.get(row_id) {
            Some(row) => row.text(key).into_owned(),
            None => Row::with_id(row_id).text(key).into_owned(),
        }
    }

    pub fn max_id(&self) -> u64 {
        self.rows.iter().map(|r| r.id).max().unwrap_or(0)
    }

    /// The id the next created row receives.
    pub fn next_id(&self) -> u64 {
        self.max_id().max(self.high_water) + 1
    }

    /// Set one field of the row with `row_id`. When no such row exists, the missing
    /// ids from `next_id()` up to `row_id` are created first with default values.
    /// The value is checked against the column before anything is created.
    pub fn upsert_field(
        &mut self,
        row_id: u64,
        key: ColumnKey,
        value: FieldValue,
    ) -> Result<Upsert, GridError> {
        if row_id == 0 {
            return Err(GridError::InvalidId);
        }
        if !value.fits(key) {
            return Err(GridError::Rejected {
                column: key.as_str(),
                value: value.as_str().to_string(),
            });
        }

        let mut created = Vec::new();
        if !self.contains(row_id) {
            let first = self.next_id().min(row_id);
            for id in first..=row_id {
                if !self.contains(id) {
                    self.push(Row::with_id(id));
                    created.push(id);
                }
            }
        }

        if let Some(row) = self.rows.iter_mut().find(|r| r.id == row_id) {
            row.set(key, value)?;
        }
        Ok(Upsert { row_id, created })
    }

    pub fn append(&mut self, row: Row) -> Result<(), GridError> {
        if row.id == 0 {
            return Err(GridError::InvalidId);
        }
        if self.contains(row.id) {
            return Err(GridError::DuplicateId(row.id));
        }
        self.push(row);
        Ok(())
    }

    /// Append several rows at once; nothing is appended if any id clashes.
    pub fn extend(&mut self, rows: Vec<Row>) -> Result<(), GridError> {
        let mut seen: HashSet<u64> = self.rows.iter().map(|r| r.id).collect();
        for row in &rows {
            if row.id == 0 {
                return Err(GridError::InvalidId);
            }
            if !seen.insert(row.id) {
                return Err(GridError::DuplicateId(row.id));
            }
        }
        for row in rows {
            self.push(row);
        }
        Ok(())
    }

    /// Replace every row. The store is left untouched when ids are invalid.
    pub fn replace_all(&mut self, rows: Vec<Row>) -> Result<(), GridError> {
        validate_ids(&rows)?;
        let max = rows.iter().map(|r| r.id).max().unwrap_or(0);
        self.high_water = self.high_water.max(max);
        self.rows = rows;
        Ok(())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    fn push(&mut self, row: Row) {
        self.high_water = self.high_water.max(row.id);
        self.rows.push(row);
    }
}

/// Ids must be positive and unique.
pub fn validate_ids(rows: &[Row]) -> Result<(), GridError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if row.id == 0 {
            return Err(GridError::InvalidId);
        }
        if !seen.insert(row.id) {
            return Err(GridError::DuplicateId(row.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{sample_rows, Status};

    fn sample_store() -> RowStore {
        RowStore::new(sample_rows()).unwrap()
    }

    #[test]
    fn test_upsert_existing_row() {
        let mut store = sample_store();
        let outcome = store
            .upsert_field(2, ColumnKey::Assigned, FieldValue::Text("Nia".into()))
            .unwrap();
        assert!(outcome.created.is_empty());
        assert_eq!(store.len(), 5);
        assert_eq!(store.get(2).unwrap().assigned, "Nia");
    }

    #[test]
    fn test_upsert_fills_gap() {
        let mut store = sample_store();
        let outcome = store
            .upsert_field(7, ColumnKey::JobRequest, FieldValue::Text("Audit".into()))
            .unwrap();
        assert_eq!(outcome.created, vec![6, 7]);
        let ids: Vec<u64> = store.get_all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(store.get(6).unwrap(), &Row::with_id(6));
        assert_eq!(store.get(7).unwrap().job_request, "Audit");
    }

    #[test]
    fn test_rejected_value_creates_nothing() {
        let mut store = sample_store();
        let result = store.upsert_field(9, ColumnKey::Status, FieldValue::Text("Done".into()));
        assert!(result.is_err());
        assert_eq!(store.len(), 5);

        let result = store.upsert_field(1, ColumnKey::Id, FieldValue::Text("8".into()));
        assert!(result.is_err());
        assert_eq!(store.get(1).unwrap().id, 1);
    }

    #[test]
    fn test_cell_text_defaults_for_virtual_rows() {
        let store = sample_store();
        assert_eq!(store.cell_text(2, ColumnKey::Assigned), "Tejas Pandey");
        assert_eq!(store.cell_text(12, ColumnKey::Status), "Need to start");
        assert_eq!(store.cell_text(12, ColumnKey::JobRequest), "");
    }

    #[test]
    fn test_upsert_enum_field() {
        let mut store = sample_store();
        store
            .upsert_field(5, ColumnKey::Status, FieldValue::Status(Status::Complete))
            .unwrap();
        assert_eq!(store.get(5).unwrap().status, Status::Complete);
    }

    #[test]
    fn test_append_rejects_duplicates() {
        let mut store = sample_store();
        assert!(matches!(
            store.append(Row::with_id(3)),
            Err(GridError::DuplicateId(3))
        ));
        store.append(Row::with_id(6)).unwrap();
        assert_eq!(store.next_id(), 7);
    }

    #[test]
    fn test_replace_all_keeps_state_on_error() {
        let mut store = sample_store();
        let result = store.replace_all(vec![Row::with_id(1), Row::with_id(1)]);
        assert!(matches!(result, Err(GridError::DuplicateId(1))));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_ids_not_reused_after_replace() {
        let mut store = sample_store();
        store.replace_all(vec![Row::with_id(2)]).unwrap();
        assert_eq!(store.max_id(), 2);
        assert_eq!(store.next_id(), 6);
    }

    #[test]
    fn test_extend_is_all_or_nothing() {
        let mut store = sample_store();
        let result = store.extend(vec![Row::with_id(6), Row::with_id(2)]);
        assert!(result.is_err());
        assert_eq!(store.len(), 5);
        store
            .extend(vec![Row::with_id(6), Row::with_id(7)])
            .unwrap();
        assert_eq!(store.len(), 7);
    }
}
