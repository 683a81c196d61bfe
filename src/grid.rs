//! The single grid state value and the reducer that feeds events through it.
//!
//! Every user intent is a [`GridEvent`]. [`GridState::apply`] runs it to completion
//! and reports what happened as a list of [`GridOutput`] values; rendering and
//! focus handling live outside this module.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::address::{CellAddressModel, CellPosition, MIN_ROW_SLOTS};
use crate::codec::{self, DEFAULT_DELIMITER};
use crate::error::GridResult;
use crate::filter::{self, FilterCriteria};
use crate::row::{FieldValue, Priority, Row, Status};
use crate::schema::{ColumnKey, ColumnSchema};
use crate::selection::{GridKey, SelectionMachine, SelectionState, Transition};
use crate::sort::{sort_rows, SortDirective};
use crate::store::RowStore;
use crate::ImportFormat;

/// Tunables that come from configuration and the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    pub min_rows: usize,
    pub delimiter: char,
    /// Columns hidden by the hide-fields toggle.
    pub hidden_fields: Vec<ColumnKey>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            min_rows: MIN_ROW_SLOTS,
            delimiter: DEFAULT_DELIMITER,
            hidden_fields: vec![ColumnKey::Url, ColumnKey::Submitted],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// Pointer press on the cell at a 1-based row number and visible column index.
    Click { row: usize, column: usize },
    DoubleClick { row: usize, column: usize },
    Key(GridKey),
    /// Focus left the grid.
    Blur,
    SetEditBuffer(String),
    /// Select the top-left selectable cell when nothing is selected.
    SelectFirst,
    ToggleSort(ColumnKey),
    SetSearch(String),
    SetFilters(FilterCriteria),
    ToggleStatusFilter(Status),
    TogglePriorityFilter(Priority),
    ToggleSubmitterFilter(String),
    ToggleAssignedFilter(String),
    SetDateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    ClearFilters,
    ToggleHiddenFields,
    SetColumnVisible { column: ColumnKey, visible: bool },
    NewRow { today: NaiveDate },
    /// File content that finished loading; applied in one step.
    Import {
        format: ImportFormat,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridOutput {
    Ignored,
    Selection(Transition),
    CellUpdated { row_id: u64, column: ColumnKey },
    RowsMaterialized(Vec<u64>),
    EditRejected { message: String },
    Sorted(SortDirective),
    ViewChanged { visible_rows: usize },
    ColumnsChanged { visible_columns: usize },
    RowAdded(u64),
    Imported {
        format: ImportFormat,
        rows: usize,
        replaced: bool,
    },
    ImportFailed { message: String },
}

impl GridOutput {
    /// Short name used by the debug line.
    pub fn name(&self) -> &'static str {
        match self {
            GridOutput::Ignored => "ignored",
            GridOutput::Selection(t) => match t {
                Transition::Ignored => "ignored",
                Transition::Selected(_) => "selected",
                Transition::EditingEntered { .. } => "editing",
                Transition::BufferChanged(_) => "buffer",
                Transition::Committed { .. } => "commit",
                Transition::Cancelled(_) => "cancel",
                Transition::Cleared => "cleared",
            },
            GridOutput::CellUpdated { .. } => "cell_updated",
            GridOutput::RowsMaterialized(_) => "rows_materialized",
            GridOutput::EditRejected { .. } => "edit_rejected",
            GridOutput::Sorted(_) => "sorted",
            GridOutput::ViewChanged { .. } => "view_changed",
            GridOutput::ColumnsChanged { .. } => "columns_changed",
            GridOutput::RowAdded(_) => "row_added",
            GridOutput::Imported { .. } => "imported",
            GridOutput::ImportFailed { .. } => "import_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridState {
    store: RowStore,
    schema: ColumnSchema,
    selection: SelectionMachine,
    filters: FilterCriteria,
    search: String,
    sort: Option<SortDirective>,
    options: GridOptions,
    /// Ids of the rows passing filter and search, in store order.
    view: Vec<u64>,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(RowStore::default(), GridOptions::default())
    }
}

impl GridState {
    pub fn new(store: RowStore, options: GridOptions) -> Self {
        let mut state = Self {
            store,
            schema: ColumnSchema::new(),
            selection: SelectionMachine::new(),
            filters: FilterCriteria::new(),
            search: String::new(),
            sort: None,
            options,
            view: Vec::new(),
        };
        state.refresh_view();
        state
    }

    pub fn with_rows(rows: Vec<Row>, options: GridOptions) -> GridResult<Self> {
        Ok(Self::new(RowStore::new(rows)?, options))
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn selected(&self) -> Option<&CellPosition> {
        self.selection.position()
    }

    pub fn is_editing(&self) -> bool {
        self.selection.is_editing()
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.selection.buffer().map(|b| b.as_str())
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<&SortDirective> {
        self.sort.as_ref()
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Ids of the visible rows in display order.
    pub fn view(&self) -> &[u64] {
        &self.view
    }

    pub fn visible_rows(&self) -> Vec<&Row> {
        self.view.iter().filter_map(|id| self.store.get(*id)).collect()
    }

    pub fn model(&self) -> CellAddressModel<'_> {
        address_model(&self.view, &self.store, &self.options, &self.schema)
    }

    pub fn visible_row_count(&self) -> usize {
        self.view.len()
    }

    pub fn visible_column_count(&self) -> usize {
        self.schema.visible_count()
    }

    /// Label of the selected cell, e.g. `JOBREQUEST3`.
    pub fn selected_label(&self) -> Option<String> {
        self.selection.position().map(|p| self.model().label(p))
    }

    pub fn submitters(&self) -> Vec<String> {
        filter::distinct_values(self.store.get_all(), ColumnKey::Submitter)
    }

    pub fn assignees(&self) -> Vec<String> {
        filter::distinct_values(self.store.get_all(), ColumnKey::Assigned)
    }

    /// Structured form of every row, regardless of filters.
    pub fn export_structured(&self) -> GridResult<String> {
        codec::export_structured(self.store.get_all())
    }

    pub fn apply(&mut self, event: GridEvent) -> Vec<GridOutput> {
        let mut out = Vec::new();
        match event {
            GridEvent::Click { row, column } => {
                let Some(position) = self.model().position_at(row, column) else {
                    out.push(GridOutput::Ignored);
                    return out;
                };
                if self.selection.position() != Some(&position) {
                    self.commit_pending(&mut out);
                }
                let model = address_model(&self.view, &self.store, &self.options, &self.schema);
                let transition = self.selection.click(&model, position);
                self.push_transition(transition, &mut out);
            }
            GridEvent::DoubleClick { row, column } => {
                let Some(position) = self.model().position_at(row, column) else {
                    out.push(GridOutput::Ignored);
                    return out;
                };
                let model = address_model(&self.view, &self.store, &self.options, &self.schema);
                let transition = self.selection.double_click(&model, &self.store, position);
                self.push_transition(transition, &mut out);
            }
            GridEvent::Key(key) => {
                let model = address_model(&self.view, &self.store, &self.options, &self.schema);
                let transition = self.selection.key(&model, &self.store, key);
                self.push_transition(transition, &mut out);
            }
            GridEvent::Blur => self.commit_pending(&mut out),
            GridEvent::SetEditBuffer(text) => {
                let transition = self.selection.set_buffer(&text);
                self.push_transition(transition, &mut out);
            }
            GridEvent::SelectFirst => {
                if self.selection.position().is_some() {
                    out.push(GridOutput::Ignored);
                    return out;
                }
                let model = address_model(&self.view, &self.store, &self.options, &self.schema);
                match model.position_at(1, 0) {
                    Some(position) => {
                        let transition = self.selection.click(&model, position);
                        self.push_transition(transition, &mut out);
                    }
                    None => out.push(GridOutput::Ignored),
                }
            }
            GridEvent::ToggleSort(column) => {
                self.commit_pending(&mut out);
                let directive = SortDirective::toggle(self.sort.as_ref(), column);
                sort_rows(self.store.rows_mut(), &directive);
                self.sort = Some(directive);
                info!(
                    column = column.as_str(),
                    direction = ?directive.direction,
                    "sort applied"
                );
                out.push(GridOutput::Sorted(directive));
                self.view_changed(&mut out);
            }
            GridEvent::SetSearch(text) => {
                self.commit_pending(&mut out);
                self.search = text;
                self.view_changed(&mut out);
            }
            GridEvent::SetFilters(criteria) => {
                self.commit_pending(&mut out);
                self.filters = criteria;
                self.view_changed(&mut out);
            }
            GridEvent::ToggleStatusFilter(status) => {
                self.commit_pending(&mut out);
                self.filters.toggle_status(status);
                self.view_changed(&mut out);
            }
            GridEvent::TogglePriorityFilter(priority) => {
                self.commit_pending(&mut out);
                self.filters.toggle_priority(priority);
                self.view_changed(&mut out);
            }
            GridEvent::ToggleSubmitterFilter(submitter) => {
                self.commit_pending(&mut out);
                self.filters.toggle_submitter(&submitter);
                self.view_changed(&mut out);
            }
            GridEvent::ToggleAssignedFilter(assigned) => {
                self.commit_pending(&mut out);
                self.filters.toggle_assigned(&assigned);
                self.view_changed(&mut out);
            }
            GridEvent::SetDateRange { start, end } => {
                self.commit_pending(&mut out);
                self.filters.set_date_range(start, end);
                self.view_changed(&mut out);
            }
            GridEvent::ClearFilters => {
                self.commit_pending(&mut out);
                self.filters.clear();
                self.view_changed(&mut out);
            }
            GridEvent::ToggleHiddenFields => {
                let changed = if self.schema.has_hidden() {
                    self.schema.show_all()
                } else {
                    let mut changed = false;
                    for key in self.options.hidden_fields.clone() {
                        changed |= self.schema.set_visible(key, false);
                    }
                    changed
                };
                self.columns_changed(changed, &mut out);
            }
            GridEvent::SetColumnVisible { column, visible } => {
                let changed = self.schema.set_visible(column, visible);
                self.columns_changed(changed, &mut out);
            }
            GridEvent::NewRow { today } => {
                self.commit_pending(&mut out);
                let id = self.store.next_id();
                match self.store.append(Row::template(id, today)) {
                    Ok(()) => {
                        info!(row_id = id, "row added");
                        out.push(GridOutput::RowAdded(id));
                        self.view_changed(&mut out);
                    }
                    Err(e) => {
                        warn!(error = %e, "new row rejected");
                        out.push(GridOutput::EditRejected {
                            message: e.to_string(),
                        });
                    }
                }
            }
            GridEvent::Import { format, content } => {
                self.commit_pending(&mut out);
                self.import(format, &content, &mut out);
            }
        }
        if out.is_empty() {
            out.push(GridOutput::Ignored);
        }
        out
    }

    /// Parse and apply an import. A failure leaves every piece of state untouched.
    fn import(&mut self, format: ImportFormat, content: &str, out: &mut Vec<GridOutput>) {
        let parsed = codec::decode(
            format,
            content,
            self.options.delimiter,
            self.store.next_id(),
        );
        let result = parsed.and_then(|rows| {
            let count = rows.len();
            match format {
                ImportFormat::Json => self.store.replace_all(rows).map(|()| (count, true)),
                ImportFormat::Csv => self.store.extend(rows).map(|()| (count, false)),
            }
        });

        match result {
            Ok((rows, replaced)) => {
                info!(format = format.as_str(), rows, replaced, "import applied");
                if replaced {
                    self.sort = None;
                    if self.selection.reset() == Transition::Cleared {
                        out.push(GridOutput::Selection(Transition::Cleared));
                    }
                }
                out.push(GridOutput::Imported {
                    format,
                    rows,
                    replaced,
                });
                self.view_changed(out);
            }
            Err(e) => {
                warn!(format = format.as_str(), error = %e, "import failed");
                out.push(GridOutput::ImportFailed {
                    message: e.import_message(),
                });
            }
        }
    }

    fn commit_pending(&mut self, out: &mut Vec<GridOutput>) {
        let transition = self.selection.blur();
        if transition != Transition::Ignored {
            self.push_transition(transition, out);
        }
    }

    fn push_transition(&mut self, transition: Transition, out: &mut Vec<GridOutput>) {
        match &transition {
            Transition::EditingEntered {
                position,
                discarded,
            } => {
                if let Some(previous) = discarded {
                    debug!(
                        row_id = previous.row_id,
                        column = previous.column_key.as_str(),
                        "pending edit dropped"
                    );
                }
                debug!(
                    row_id = position.row_id,
                    column = position.column_key.as_str(),
                    "edit entered"
                );
            }
            Transition::Cancelled(position) => {
                debug!(
                    row_id = position.row_id,
                    column = position.column_key.as_str(),
                    "edit cancelled"
                );
            }
            _ => {}
        }

        let commit = match &transition {
            Transition::Committed {
                position,
                value: Some(value),
            } => Some((*position, value.clone())),
            _ => None,
        };
        out.push(GridOutput::Selection(transition));

        if let Some((position, value)) = commit {
            self.write_cell(position, value, out);
        }
    }

    fn write_cell(&mut self, position: CellPosition, value: FieldValue, out: &mut Vec<GridOutput>) {
        match self
            .store
            .upsert_field(position.row_id, position.column_key, value)
        {
            Ok(upsert) => {
                if !upsert.created.is_empty() {
                    info!(rows = ?upsert.created, "rows materialized");
                    out.push(GridOutput::RowsMaterialized(upsert.created));
                }
                info!(
                    row_id = position.row_id,
                    column = position.column_key.as_str(),
                    "edit committed"
                );
                out.push(GridOutput::CellUpdated {
                    row_id: position.row_id,
                    column: position.column_key,
                });
                self.view_changed(out);
            }
            Err(e) => {
                warn!(error = %e, "edit rejected");
                out.push(GridOutput::EditRejected {
                    message: e.to_string(),
                });
            }
        }
    }

    fn columns_changed(&mut self, changed: bool, out: &mut Vec<GridOutput>) {
        if !changed {
            out.push(GridOutput::Ignored);
            return;
        }
        // Column indices are stale now; any pending edit is dropped.
        if self.selection.reset() == Transition::Cleared {
            out.push(GridOutput::Selection(Transition::Cleared));
        }
        let visible_columns = self.schema.visible_count();
        debug!(visible_columns, "column visibility changed");
        out.push(GridOutput::ColumnsChanged { visible_columns });
    }

    fn view_changed(&mut self, out: &mut Vec<GridOutput>) {
        self.refresh_view();
        let still_addressable = self
            .selection
            .position()
            .map(|p| self.model().row_number_of(p.row_id).is_some());
        if still_addressable == Some(false) && self.selection.reset() == Transition::Cleared {
            out.push(GridOutput::Selection(Transition::Cleared));
        }
        out.push(GridOutput::ViewChanged {
            visible_rows: self.view.len(),
        });
    }

    fn refresh_view(&mut self) {
        self.view = filter::visible_rows(self.store.get_all(), &self.filters, &self.search)
            .into_iter()
            .map(|row| row.id)
            .collect();
    }
}

fn address_model<'a>(
    view: &'a [u64],
    store: &RowStore,
    options: &GridOptions,
    schema: &'a ColumnSchema,
) -> CellAddressModel<'a> {
    CellAddressModel::new(
        view,
        store.len(),
        store.next_id(),
        options.min_rows,
        schema,
    )
}
