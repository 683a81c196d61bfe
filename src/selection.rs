//! Selection & Edit State Machine.
//!
//! Every transition returns a [`Transition`] describing what happened. Nothing here
//! touches the row store: a commit hands the typed value back to the caller.

use crate::address::{CellAddressModel, CellPosition, Direction};
use crate::row::FieldValue;
use crate::schema::{ColumnKey, ValueDomain};
use crate::store::RowStore;

/// Keys the grid understands. Anything else is translated away before it gets here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Delete,
    Backspace,
    Char(char),
}

impl GridKey {
    fn direction(&self) -> Option<Direction> {
        match self {
            GridKey::Up => Some(Direction::Up),
            GridKey::Down => Some(Direction::Down),
            GridKey::Left => Some(Direction::Left),
            GridKey::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

/// In-progress value of the cell being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditBuffer {
    Text(String),
    /// Enumerated columns only ever hold one of their options, or nothing.
    Choice {
        options: &'static [&'static str],
        selected: Option<usize>,
    },
}

impl EditBuffer {
    /// Buffer holding the cell's current value. `None` for read-only columns.
    pub fn seeded(key: ColumnKey, current: &str) -> Option<Self> {
        match key.domain() {
            ValueDomain::ReadOnly => None,
            ValueDomain::FreeText => Some(EditBuffer::Text(current.to_string())),
            ValueDomain::Enumerated(options) => Some(EditBuffer::Choice {
                options,
                selected: options.iter().position(|o| *o == current),
            }),
        }
    }

    pub fn cleared(key: ColumnKey) -> Option<Self> {
        let mut buffer = Self::seeded(key, "")?;
        buffer.clear();
        Some(buffer)
    }

    /// Buffer started by typing `c` over the cell.
    pub fn typed(key: ColumnKey, c: char) -> Option<Self> {
        let mut buffer = Self::cleared(key)?;
        buffer.push(c);
        Some(buffer)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EditBuffer::Text(text) => text,
            EditBuffer::Choice { options, selected } => {
                selected.and_then(|i| options.get(i)).copied().unwrap_or("")
            }
        }
    }

    pub fn options(&self) -> Option<&'static [&'static str]> {
        match self {
            EditBuffer::Text(_) => None,
            EditBuffer::Choice { options, .. } => Some(*options),
        }
    }

    fn clear(&mut self) {
        match self {
            EditBuffer::Text(text) => text.clear(),
            EditBuffer::Choice { selected, .. } => *selected = None,
        }
    }

    fn push(&mut self, c: char) {
        match self {
            EditBuffer::Text(text) => text.push(c),
            EditBuffer::Choice { options, selected } => {
                let lower: String = c.to_lowercase().collect();
                if let Some(idx) = options
                    .iter()
                    .position(|o| o.to_lowercase().starts_with(&lower))
                {
                    *selected = Some(idx);
                }
            }
        }
    }

    fn cycle(&mut self, forward: bool) -> bool {
        match self {
            EditBuffer::Text(_) => false,
            EditBuffer::Choice { options, selected } => {
                let len = options.len();
                if len == 0 {
                    return false;
                }
                *selected = Some(match (*selected, forward) {
                    (None, true) => 0,
                    (None, false) => len - 1,
                    (Some(i), true) => (i + 1) % len,
                    (Some(i), false) => (i + len - 1) % len,
                });
                true
            }
        }
    }

    /// Feed one key while editing. Returns whether the buffer changed.
    fn input(&mut self, key: GridKey) -> bool {
        let before = self.clone();
        match key {
            GridKey::Char(c) => self.push(c),
            GridKey::Backspace => match self {
                EditBuffer::Text(text) => {
                    text.pop();
                }
                EditBuffer::Choice { selected, .. } => *selected = None,
            },
            GridKey::Delete => {
                if let EditBuffer::Choice { selected, .. } = self {
                    *selected = None;
                }
            }
            GridKey::Down => return self.cycle(true),
            GridKey::Up => return self.cycle(false),
            _ => {}
        }
        *self != before
    }

    /// Replace the whole buffer. Enumerated buffers accept an exact option or "".
    pub fn set(&mut self, value: &str) -> bool {
        match self {
            EditBuffer::Text(text) => {
                *text = value.to_string();
                true
            }
            EditBuffer::Choice { options, selected } => {
                if value.is_empty() {
                    *selected = None;
                    return true;
                }
                match options.iter().position(|o| *o == value) {
                    Some(idx) => {
                        *selected = Some(idx);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Typed value to write into `key`. An empty choice yields nothing.
    pub fn value(&self, key: ColumnKey) -> Option<FieldValue> {
        match self {
            EditBuffer::Text(text) => FieldValue::parse(key, text).ok(),
            EditBuffer::Choice { selected: None, .. } => None,
            EditBuffer::Choice { .. } => FieldValue::parse(key, self.as_str()).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(CellPosition),
    Editing {
        position: CellPosition,
        buffer: EditBuffer,
        /// Cell value when editing began.
        original: String,
        /// The row is virtual; committing creates it whatever the buffer holds.
        pending_row: bool,
    },
}

/// Result of feeding one intent to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The intent does not apply in the current state.
    Ignored,
    Selected(CellPosition),
    EditingEntered {
        position: CellPosition,
        /// A pending edit elsewhere that was dropped to make room.
        discarded: Option<CellPosition>,
    },
    BufferChanged(CellPosition),
    /// Editing ended with a value to write. `None` when there is nothing to write.
    Committed {
        position: CellPosition,
        value: Option<FieldValue>,
    },
    Cancelled(CellPosition),
    Cleared,
}

/// How a new edit buffer starts out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSeed {
    Current,
    Cleared,
    Typed(char),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn position(&self) -> Option<&CellPosition> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selected(position) => Some(position),
            SelectionState::Editing { position, .. } => Some(position),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SelectionState::Editing { .. })
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match &self.state {
            SelectionState::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Drop any selection and pending edit.
    pub fn reset(&mut self) -> Transition {
        if self.state == SelectionState::Idle {
            return Transition::Ignored;
        }
        self.state = SelectionState::Idle;
        Transition::Cleared
    }

    /// Pointer selection. Only editable cells and the id column can be selected.
    /// The caller commits a pending edit before clicking elsewhere.
    pub fn click(&mut self, model: &CellAddressModel, position: CellPosition) -> Transition {
        if !model.schema().descriptor(position.column_key).selectable() {
            return Transition::Ignored;
        }
        match &self.state {
            SelectionState::Editing { position: at, .. } if *at == position => {
                Transition::Ignored
            }
            _ => {
                self.state = SelectionState::Selected(position);
                Transition::Selected(position)
            }
        }
    }

    /// Select `position` and open an editor on it in one step.
    pub fn double_click(
        &mut self,
        model: &CellAddressModel,
        store: &RowStore,
        position: CellPosition,
    ) -> Transition {
        if let SelectionState::Editing { position: at, .. } = &self.state {
            if *at == position {
                return Transition::Ignored;
            }
        }
        if !model.schema().descriptor(position.column_key).selectable() {
            return Transition::Ignored;
        }
        if !model.schema().is_editable(position.column_key) {
            self.state = SelectionState::Selected(position);
            return Transition::Selected(position);
        }
        self.begin_edit(store, position, EditSeed::Current)
    }

    pub fn key(&mut self, model: &CellAddressModel, store: &RowStore, key: GridKey) -> Transition {
        match &mut self.state {
            SelectionState::Idle => Transition::Ignored,
            SelectionState::Selected(position) => {
                let position = *position;
                if let Some(direction) = key.direction() {
                    let next = model.navigate(&position, direction);
                    self.state = SelectionState::Selected(next);
                    return Transition::Selected(next);
                }
                let seed = match key {
                    GridKey::Enter => EditSeed::Current,
                    GridKey::Delete | GridKey::Backspace => EditSeed::Cleared,
                    GridKey::Char(c) => EditSeed::Typed(c),
                    _ => return Transition::Ignored,
                };
                if !model.schema().is_editable(position.column_key) {
                    return Transition::Ignored;
                }
                self.begin_edit(store, position, seed)
            }
            SelectionState::Editing {
                position, buffer, ..
            } => {
                let position = *position;
                match key {
                    GridKey::Enter => self.commit(),
                    GridKey::Escape => self.cancel(),
                    other => {
                        if buffer.input(other) {
                            Transition::BufferChanged(position)
                        } else {
                            Transition::Ignored
                        }
                    }
                }
            }
        }
    }

    /// Replace the pending buffer text.
    pub fn set_buffer(&mut self, value: &str) -> Transition {
        match &mut self.state {
            SelectionState::Editing {
                position, buffer, ..
            } => {
                let position = *position;
                if buffer.set(value) {
                    Transition::BufferChanged(position)
                } else {
                    Transition::Ignored
                }
            }
            _ => Transition::Ignored,
        }
    }

    /// Focus left the cell: a pending edit is committed.
    pub fn blur(&mut self) -> Transition {
        if self.is_editing() {
            self.commit()
        } else {
            Transition::Ignored
        }
    }

    fn begin_edit(&mut self, store: &RowStore, position: CellPosition, seed: EditSeed) -> Transition {
        let key = position.column_key;
        let original = store.cell_text(position.row_id, key);
        let buffer = match seed {
            EditSeed::Current => EditBuffer::seeded(key, &original),
            EditSeed::Cleared => EditBuffer::cleared(key),
            EditSeed::Typed(c) => EditBuffer::typed(key, c),
        };
        let Some(buffer) = buffer else {
            return Transition::Ignored;
        };
        let discarded = match &self.state {
            SelectionState::Editing { position: at, .. } => Some(*at),
            _ => None,
        };
        self.state = SelectionState::Editing {
            position,
            buffer,
            original,
            pending_row: !store.contains(position.row_id),
        };
        Transition::EditingEntered {
            position,
            discarded,
        }
    }

    fn commit(&mut self) -> Transition {
        let state = std::mem::take(&mut self.state);
        match state {
            SelectionState::Editing {
                position,
                buffer,
                original,
                pending_row,
            } => {
                self.state = SelectionState::Selected(position);
                let key = position.column_key;
                // An untouched cell of an existing row is left alone.
                let value = match buffer.value(key) {
                    Some(_) if !pending_row && buffer.as_str() == original => None,
                    None if pending_row => {
                        EditBuffer::seeded(key, &original).and_then(|b| b.value(key))
                    }
                    value => value,
                };
                Transition::Committed { position, value }
            }
            other => {
                self.state = other;
                Transition::Ignored
            }
        }
    }

    fn cancel(&mut self) -> Transition {
        match &self.state {
            SelectionState::Editing { position, .. } => {
                let position = *position;
                self.state = SelectionState::Selected(position);
                Transition::Cancelled(position)
            }
            _ => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::MIN_ROW_SLOTS;
    use crate::row::{sample_rows, Status};
    use crate::schema::ColumnSchema;

    struct Fixture {
        store: RowStore,
        schema: ColumnSchema,
        view: Vec<u64>,
    }

    impl Fixture {
        fn new() -> Self {
            let store = RowStore::new(sample_rows()).unwrap();
            let view = store.get_all().iter().map(|r| r.id).collect();
            Self {
                store,
                schema: ColumnSchema::new(),
                view,
            }
        }

        fn model(&self) -> CellAddressModel<'_> {
            CellAddressModel::new(
                &self.view,
                self.store.len(),
                self.store.next_id(),
                MIN_ROW_SLOTS,
                &self.schema,
            )
        }

        fn at(&self, number: usize, column: ColumnKey) -> CellPosition {
            let model = self.model();
            let index = model.column_index_of(column).unwrap();
            model.position_at(number, index).unwrap()
        }
    }

    fn selected(f: &Fixture, number: usize, column: ColumnKey) -> SelectionMachine {
        let mut machine = SelectionMachine::new();
        machine.click(&f.model(), f.at(number, column));
        machine
    }

    #[test]
    fn test_click_selects_from_idle() {
        let f = Fixture::new();
        let mut machine = SelectionMachine::new();
        let pos = f.at(2, ColumnKey::Id);
        assert_eq!(machine.click(&f.model(), pos), Transition::Selected(pos));
        assert_eq!(machine.state(), &SelectionState::Selected(pos));
    }

    #[test]
    fn test_id_column_is_selectable_not_editable() {
        let f = Fixture::new();
        let mut machine = selected(&f, 1, ColumnKey::Id);
        assert_eq!(
            machine.key(&f.model(), &f.store, GridKey::Enter),
            Transition::Ignored
        );
        assert_eq!(
            machine.key(&f.model(), &f.store, GridKey::Char('x')),
            Transition::Ignored
        );
        assert!(!machine.is_editing());
    }

    #[test]
    fn test_keys_open_editor() {
        let f = Fixture::new();

        let mut machine = selected(&f, 1, ColumnKey::Assigned);
        machine.key(&f.model(), &f.store, GridKey::Enter);
        assert_eq!(machine.buffer().unwrap().as_str(), "Sophie Choudhury");

        let mut machine = selected(&f, 1, ColumnKey::Assigned);
        machine.key(&f.model(), &f.store, GridKey::Delete);
        assert_eq!(machine.buffer().unwrap().as_str(), "");

        let mut machine = selected(&f, 1, ColumnKey::Assigned);
        machine.key(&f.model(), &f.store, GridKey::Char('Z'));
        assert_eq!(machine.buffer().unwrap().as_str(), "Z");
    }

    #[test]
    fn test_navigation_suppressed_while_editing() {
        let f = Fixture::new();
        let mut machine = selected(&f, 2, ColumnKey::JobRequest);
        machine.key(&f.model(), &f.store, GridKey::Enter);
        let before = machine.position().copied();
        for key in [GridKey::Left, GridKey::Right, GridKey::Up, GridKey::Down] {
            assert_eq!(machine.key(&f.model(), &f.store, key), Transition::Ignored);
        }
        assert_eq!(machine.position().copied(), before);
        assert!(machine.is_editing());
    }

    #[test]
    fn test_escape_discards_buffer() {
        let f = Fixture::new();
        let mut machine = selected(&f, 3, ColumnKey::Submitter);
        machine.key(&f.model(), &f.store, GridKey::Backspace);
        machine.key(&f.model(), &f.store, GridKey::Char('Q'));
        let pos = f.at(3, ColumnKey::Submitter);
        assert_eq!(
            machine.key(&f.model(), &f.store, GridKey::Escape),
            Transition::Cancelled(pos)
        );
        assert_eq!(machine.state(), &SelectionState::Selected(pos));
    }

    #[test]
    fn test_enter_commits_typed_value() {
        let f = Fixture::new();
        let mut machine = selected(&f, 7, ColumnKey::JobRequest);
        for c in "Audit".chars() {
            machine.key(&f.model(), &f.store, GridKey::Char(c));
        }
        let pos = f.at(7, ColumnKey::JobRequest);
        assert_eq!(pos.row_id, 7);
        assert_eq!(
            machine.key(&f.model(), &f.store, GridKey::Enter),
            Transition::Committed {
                position: pos,
                value: Some(FieldValue::Text("Audit".into()))
            }
        );
        assert_eq!(machine.state(), &SelectionState::Selected(pos));
    }

    #[test]
    fn test_unchanged_commit_writes_nothing() {
        let f = Fixture::new();
        let mut machine = selected(&f, 2, ColumnKey::Url);
        machine.key(&f.model(), &f.store, GridKey::Enter);
        assert!(matches!(
            machine.blur(),
            Transition::Committed { value: None, .. }
        ));
    }

    #[test]
    fn test_unchanged_commit_on_virtual_row_still_writes() {
        let f = Fixture::new();
        let mut machine = selected(&f, 9, ColumnKey::Url);
        machine.key(&f.model(), &f.store, GridKey::Enter);
        assert!(matches!(
            machine.blur(),
            Transition::Committed { value: Some(_), .. }
        ));

        let mut machine = selected(&f, 9, ColumnKey::Status);
        machine.key(&f.model(), &f.store, GridKey::Delete);
        assert!(matches!(
            machine.key(&f.model(), &f.store, GridKey::Enter),
            Transition::Committed { value: Some(_), .. }
        ));
    }

    #[test]
    fn test_choice_buffer_stays_in_domain() {
        let f = Fixture::new();
        let mut machine = selected(&f, 1, ColumnKey::Status);
        machine.key(&f.model(), &f.store, GridKey::Char('b'));
        assert_eq!(machine.buffer().unwrap().as_str(), "Blocked");
        // No option starts with 'x'; the choice is unchanged.
        assert_eq!(
            machine.key(&f.model(), &f.store, GridKey::Char('x')),
            Transition::Ignored
        );
        assert_eq!(machine.set_buffer("Done"), Transition::Ignored);
        machine.key(&f.model(), &f.store, GridKey::Down);
        assert_eq!(machine.buffer().unwrap().as_str(), "In-process");
        machine.key(&f.model(), &f.store, GridKey::Up);
        assert_eq!(
            machine.key(&f.model(), &f.store, GridKey::Enter),
            Transition::Committed {
                position: f.at(1, ColumnKey::Status),
                value: Some(FieldValue::Status(Status::Blocked))
            }
        );
    }

    #[test]
    fn test_cleared_choice_commits_nothing() {
        let f = Fixture::new();
        let mut machine = selected(&f, 2, ColumnKey::Priority);
        machine.key(&f.model(), &f.store, GridKey::Delete);
        assert_eq!(machine.buffer().unwrap().as_str(), "");
        assert!(matches!(
            machine.key(&f.model(), &f.store, GridKey::Enter),
            Transition::Committed { value: None, .. }
        ));
    }

    #[test]
    fn test_double_click_elsewhere_discards_pending_edit() {
        let f = Fixture::new();
        let mut machine = SelectionMachine::new();
        let first = f.at(1, ColumnKey::Url);
        let second = f.at(2, ColumnKey::Url);
        machine.double_click(&f.model(), &f.store, first);
        machine.set_buffer("draft");
        assert_eq!(
            machine.double_click(&f.model(), &f.store, second),
            Transition::EditingEntered {
                position: second,
                discarded: Some(first)
            }
        );
        assert_eq!(machine.buffer().unwrap().as_str(), "www.irfankhap...");
    }

    #[test]
    fn test_arrow_navigation_clamps() {
        let f = Fixture::new();
        let mut machine = selected(&f, 1, ColumnKey::Id);
        assert_eq!(
            machine.key(&f.model(), &f.store, GridKey::Up),
            Transition::Selected(f.at(1, ColumnKey::Id))
        );
        machine.key(&f.model(), &f.store, GridKey::Right);
        machine.key(&f.model(), &f.store, GridKey::Down);
        assert_eq!(machine.position(), Some(&f.at(2, ColumnKey::JobRequest)));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let f = Fixture::new();
        let mut machine = selected(&f, 1, ColumnKey::Id);
        assert_eq!(machine.reset(), Transition::Cleared);
        assert_eq!(machine.reset(), Transition::Ignored);
        assert_eq!(machine.state(), &SelectionState::Idle);
    }
}
