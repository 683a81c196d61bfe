//! Cell Address Model.
//!
//! Rows are addressed by a 1-based on-screen row number. The grid always exposes
//! `max(row_count, min_rows)` slots: first the visible rows in view order, then
//! virtual rows whose ids continue from the store's next id. Columns are addressed
//! by their index in the visible column sequence.

use crate::schema::{ColumnDescriptor, ColumnKey, ColumnSchema};

/// Minimum number of row slots the grid exposes.
pub const MIN_ROW_SLOTS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row_id: u64,
    pub column_key: ColumnKey,
    /// Index into the visible columns; stale once visibility changes.
    pub column_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A snapshot of the addressable grid for one view.
pub struct CellAddressModel<'a> {
    view: &'a [u64],
    row_count: usize,
    next_id: u64,
    min_rows: usize,
    schema: &'a ColumnSchema,
}

impl<'a> CellAddressModel<'a> {
    /// `view` holds the ids of the visible rows in display order.
    pub fn new(
        view: &'a [u64],
        row_count: usize,
        next_id: u64,
        min_rows: usize,
        schema: &'a ColumnSchema,
    ) -> Self {
        Self {
            view,
            row_count,
            next_id,
            min_rows,
            schema,
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        self.schema
    }

    /// Highest addressable row number.
    pub fn max_row_number(&self) -> usize {
        self.row_count.max(self.min_rows).max(self.view.len())
    }

    pub fn virtual_row_count(&self) -> usize {
        self.max_row_number() - self.view.len()
    }

    pub fn max_column_index(&self) -> usize {
        self.schema.visible_count().saturating_sub(1)
    }

    /// Row id shown at a 1-based row number.
    pub fn row_id_at(&self, number: usize) -> Option<u64> {
        if number == 0 || number > self.max_row_number() {
            return None;
        }
        match self.view.get(number - 1) {
            Some(id) => Some(*id),
            None => Some(self.next_id + (number - self.view.len() - 1) as u64),
        }
    }

    /// 1-based row number of a row id, or `None` when the row is filtered out.
    pub fn row_number_of(&self, row_id: u64) -> Option<usize> {
        if let Some(idx) = self.view.iter().position(|id| *id == row_id) {
            return Some(idx + 1);
        }
        if row_id >= self.next_id {
            let number = self.view.len() + (row_id - self.next_id) as usize + 1;
            if number <= self.max_row_number() {
                return Some(number);
            }
        }
        None
    }

    /// True for slots beyond the real data.
    pub fn is_virtual(&self, row_id: u64) -> bool {
        row_id >= self.next_id
    }

    pub fn column_at(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.schema.visible_at(index)
    }

    pub fn column_index_of(&self, key: ColumnKey) -> Option<usize> {
        self.schema.visible_index_of(key)
    }

    /// Address of the cell at `number` and visible column `index`, if both exist.
    pub fn position_at(&self, number: usize, index: usize) -> Option<CellPosition> {
        let row_id = self.row_id_at(number)?;
        let column = self.column_at(index)?;
        Some(CellPosition {
            row_id,
            column_key: column.key,
            column_index: index,
        })
    }

    /// Move one step, clamping at the grid bounds. Never wraps.
    pub fn navigate(&self, from: &CellPosition, direction: Direction) -> CellPosition {
        let max_row = self.max_row_number();
        let max_col = self.max_column_index();
        let col = from.column_index.min(max_col);

        let (number, col) = match self.row_number_of(from.row_id) {
            Some(number) => {
                let number = number.clamp(1, max_row);
                match direction {
                    Direction::Up => (number.saturating_sub(1).max(1), col),
                    Direction::Down => ((number + 1).min(max_row), col),
                    Direction::Left => (number, col.saturating_sub(1)),
                    Direction::Right => (number, (col + 1).min(max_col)),
                }
            }
            // The row is not on screen; only column moves make sense.
            None => {
                let col = match direction {
                    Direction::Left => col.saturating_sub(1),
                    Direction::Right => (col + 1).min(max_col),
                    Direction::Up | Direction::Down => col,
                };
                return match self.column_at(col) {
                    Some(column) => CellPosition {
                        row_id: from.row_id,
                        column_key: column.key,
                        column_index: col,
                    },
                    None => *from,
                };
            }
        };

        self.position_at(number, col).unwrap_or(*from)
    }

    /// Human label for the status bar, e.g. `JOBREQUEST3`.
    pub fn label(&self, position: &CellPosition) -> String {
        let number = self
            .row_number_of(position.row_id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!("{}{}", position.column_key.as_str().to_uppercase(), number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model<'a>(view: &'a [u64], schema: &'a ColumnSchema) -> CellAddressModel<'a> {
        CellAddressModel::new(view, 5, 6, MIN_ROW_SLOTS, schema)
    }

    #[test]
    fn test_row_numbers_and_virtual_rows() {
        let schema = ColumnSchema::new();
        let view = [3, 1, 2, 5, 4];
        let m = model(&view, &schema);
        assert_eq!(m.max_row_number(), 25);
        assert_eq!(m.virtual_row_count(), 20);
        assert_eq!(m.row_id_at(1), Some(3));
        assert_eq!(m.row_id_at(5), Some(4));
        assert_eq!(m.row_id_at(6), Some(6));
        assert_eq!(m.row_id_at(7), Some(7));
        assert_eq!(m.row_id_at(25), Some(25));
        assert_eq!(m.row_id_at(26), None);
        assert_eq!(m.row_id_at(0), None);
        assert_eq!(m.row_number_of(7), Some(7));
        assert_eq!(m.row_number_of(3), Some(1));
        assert!(m.is_virtual(6));
        assert!(!m.is_virtual(5));
    }

    #[test]
    fn test_filtered_view_pads_with_virtual_rows() {
        let schema = ColumnSchema::new();
        let view = [4];
        let m = model(&view, &schema);
        assert_eq!(m.row_id_at(2), Some(6));
        // Hidden real rows have no row number.
        assert_eq!(m.row_number_of(2), None);
    }

    #[test]
    fn test_navigation_clamps() {
        let schema = ColumnSchema::new();
        let view = [1, 2, 3, 4, 5];
        let m = model(&view, &schema);
        let start = m.position_at(1, 0).unwrap();
        assert_eq!(m.navigate(&start, Direction::Up), start);
        assert_eq!(m.navigate(&start, Direction::Left), start);

        let last = m.position_at(25, 9).unwrap();
        assert_eq!(m.navigate(&last, Direction::Down), last);
        assert_eq!(m.navigate(&last, Direction::Right), last);

        let moved = m.navigate(&start, Direction::Right);
        assert_eq!(moved.column_key, ColumnKey::JobRequest);
        assert_eq!(moved.column_index, 1);
        let moved = m.navigate(&moved, Direction::Down);
        assert_eq!(moved.row_id, 2);
    }

    #[test]
    fn test_navigation_follows_hidden_columns() {
        let mut schema = ColumnSchema::new();
        schema.set_visible(ColumnKey::Url, false);
        schema.set_visible(ColumnKey::Submitted, false);
        let view = [1, 2];
        let m = model(&view, &schema);
        assert_eq!(m.max_column_index(), 7);
        let pos = m.position_at(1, 1).unwrap();
        let next = m.navigate(&pos, Direction::Right);
        assert_eq!(next.column_key, ColumnKey::Status);
        assert_eq!(next.column_index, 2);
    }

    #[test]
    fn test_label() {
        let schema = ColumnSchema::new();
        let view = [1, 2, 3];
        let m = model(&view, &schema);
        let pos = m.position_at(3, 1).unwrap();
        assert_eq!(m.label(&pos), "JOBREQUEST3");
    }
}
