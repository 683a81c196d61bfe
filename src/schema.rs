//! Column schema: the fixed set of addressable fields and their visibility.

use serde::{Deserialize, Serialize};

/// Identifies one column of the grid. `Id` is the synthetic row-number column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKey {
    Id,
    JobRequest,
    Submitted,
    Status,
    Submitter,
    Url,
    Assigned,
    Priority,
    DueDate,
    EstValue,
}

/// Value domain accepted by a column when edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    ReadOnly,
    FreeText,
    Enumerated(&'static [&'static str]),
}

pub const STATUS_OPTIONS: &[&str] = &["In-process", "Need to start", "Complete", "Blocked"];
pub const PRIORITY_OPTIONS: &[&str] = &["High", "Medium", "Low"];

impl ColumnKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKey::Id => "id",
            ColumnKey::JobRequest => "jobRequest",
            ColumnKey::Submitted => "submitted",
            ColumnKey::Status => "status",
            ColumnKey::Submitter => "submitter",
            ColumnKey::Url => "url",
            ColumnKey::Assigned => "assigned",
            ColumnKey::Priority => "priority",
            ColumnKey::DueDate => "dueDate",
            ColumnKey::EstValue => "estValue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnKey::Id => "#",
            ColumnKey::JobRequest => "Job Request",
            ColumnKey::Submitted => "Submitted",
            ColumnKey::Status => "Status",
            ColumnKey::Submitter => "Submitter",
            ColumnKey::Url => "URL",
            ColumnKey::Assigned => "Assigned",
            ColumnKey::Priority => "Priority",
            ColumnKey::DueDate => "Due Date",
            ColumnKey::EstValue => "Est. Value",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::iterator().find(|k| k.as_str() == s)
    }

    /// All columns in schema order.
    pub fn iterator() -> impl Iterator<Item = ColumnKey> {
        [
            ColumnKey::Id,
            ColumnKey::JobRequest,
            ColumnKey::Submitted,
            ColumnKey::Status,
            ColumnKey::Submitter,
            ColumnKey::Url,
            ColumnKey::Assigned,
            ColumnKey::Priority,
            ColumnKey::DueDate,
            ColumnKey::EstValue,
        ]
        .iter()
        .copied()
    }

    /// The nine data fields in serialized order (everything except `id`).
    pub fn data_fields() -> impl Iterator<Item = ColumnKey> {
        Self::iterator().skip(1)
    }

    pub fn domain(&self) -> ValueDomain {
        match self {
            ColumnKey::Id => ValueDomain::ReadOnly,
            ColumnKey::Status => ValueDomain::Enumerated(STATUS_OPTIONS),
            ColumnKey::Priority => ValueDomain::Enumerated(PRIORITY_OPTIONS),
            _ => ValueDomain::FreeText,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub key: ColumnKey,
    pub label: &'static str,
    pub editable: bool,
    pub visible: bool,
}

impl ColumnDescriptor {
    fn new(key: ColumnKey) -> Self {
        Self {
            key,
            label: key.label(),
            editable: key != ColumnKey::Id,
            visible: true,
        }
    }

    /// Cells that can hold the selection: editable ones plus the read-only id column.
    pub fn selectable(&self) -> bool {
        self.editable || self.key == ColumnKey::Id
    }
}

/// Ordered column descriptors with per-column visibility.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    columns: Vec<ColumnDescriptor>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            columns: ColumnKey::iterator().map(ColumnDescriptor::new).collect(),
        }
    }
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn descriptor(&self, key: ColumnKey) -> &ColumnDescriptor {
        // Every key has a descriptor; the position matches the enum order.
        &self.columns[key as usize]
    }

    pub fn is_editable(&self, key: ColumnKey) -> bool {
        self.descriptor(key).editable
    }

    pub fn visible(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn visible_at(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.visible().nth(index)
    }

    pub fn visible_index_of(&self, key: ColumnKey) -> Option<usize> {
        self.visible().position(|c| c.key == key)
    }

    pub fn has_hidden(&self) -> bool {
        self.columns.iter().any(|c| !c.visible)
    }

    /// Change a column's visibility. Hiding the last visible column is refused.
    /// Returns true when visibility actually changed.
    pub fn set_visible(&mut self, key: ColumnKey, visible: bool) -> bool {
        if !visible && self.visible_count() == 1 && self.descriptor(key).visible {
            return false;
        }
        let column = &mut self.columns[key as usize];
        if column.visible == visible {
            return false;
        }
        column.visible = visible;
        true
    }

    pub fn show_all(&mut self) -> bool {
        let mut changed = false;
        for column in &mut self.columns {
            changed |= !column.visible;
            column.visible = true;
        }
        changed
    }
}
