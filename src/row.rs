//! Work-item rows and typed per-column field access.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::GridError;
use crate::schema::ColumnKey;

/// External textual form of `submitted` and `dueDate`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Status {
    #[serde(rename = "In-process")]
    InProcess,
    #[default]
    #[serde(rename = "Need to start")]
    NeedToStart,
    Complete,
    Blocked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProcess => "In-process",
            Status::NeedToStart => "Need to start",
            Status::Complete => "Complete",
            Status::Blocked => "Blocked",
        }
    }

    pub fn iterator() -> impl Iterator<Item = Status> {
        [
            Status::InProcess,
            Status::NeedToStart,
            Status::Complete,
            Status::Blocked,
        ]
        .iter()
        .copied()
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::iterator().find(|v| v.as_str() == s)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn iterator() -> impl Iterator<Item = Priority> {
        [Priority::High, Priority::Medium, Priority::Low]
            .iter()
            .copied()
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::iterator().find(|v| v.as_str() == s)
    }
}

/// One work item. Field names serialize exactly as the column keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: u64,
    pub job_request: String,
    pub submitted: String,
    pub status: Status,
    pub submitter: String,
    pub url: String,
    pub assigned: String,
    pub priority: Priority,
    pub due_date: String,
    pub est_value: String,
}

/// A typed value ready to be written into one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Status(Status),
    Priority(Priority),
}

impl FieldValue {
    /// Coerce text into the value type the column expects.
    /// Enumerated columns only accept their exact option labels.
    pub fn parse(key: ColumnKey, text: &str) -> Result<Self, GridError> {
        let rejected = || GridError::Rejected {
            column: key.as_str(),
            value: text.to_string(),
        };
        match key {
            ColumnKey::Id => Err(rejected()),
            ColumnKey::Status => Status::parse(text).map(FieldValue::Status).ok_or_else(rejected),
            ColumnKey::Priority => Priority::parse(text)
                .map(FieldValue::Priority)
                .ok_or_else(rejected),
            _ => Ok(FieldValue::Text(text.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Status(s) => s.as_str(),
            FieldValue::Priority(p) => p.as_str(),
        }
    }

    /// Whether a value of this kind can be stored in `key`.
    pub fn fits(&self, key: ColumnKey) -> bool {
        matches!(
            (key, self),
            (ColumnKey::Status, FieldValue::Status(_))
                | (ColumnKey::Priority, FieldValue::Priority(_))
        ) || (!matches!(
            key,
            ColumnKey::Id | ColumnKey::Status | ColumnKey::Priority
        ) && matches!(self, FieldValue::Text(_)))
    }
}

impl Row {
    /// A blank row used when a virtual row slot is materialized.
    pub fn with_id(id: u64) -> Self {
        Self {
            id,
            job_request: String::new(),
            submitted: String::new(),
            status: Status::default(),
            submitter: String::new(),
            url: String::new(),
            assigned: String::new(),
            priority: Priority::default(),
            due_date: String::new(),
            est_value: String::new(),
        }
    }

    /// Row produced by the "new row" action.
    pub fn template(id: u64, today: NaiveDate) -> Self {
        let date = today.format(DATE_FORMAT).to_string();
        Self {
            id,
            job_request: "New Job Request".to_string(),
            submitted: date.clone(),
            status: Status::NeedToStart,
            submitter: "New User".to_string(),
            url: "www.example.com".to_string(),
            assigned: "Unassigned".to_string(),
            priority: Priority::Medium,
            due_date: date,
            est_value: "0".to_string(),
        }
    }

    /// String form of one field.
    pub fn text(&self, key: ColumnKey) -> Cow<'_, str> {
        match key {
            ColumnKey::Id => Cow::Owned(self.id.to_string()),
            ColumnKey::Status => Cow::Borrowed(self.status.as_str()),
            ColumnKey::Priority => Cow::Borrowed(self.priority.as_str()),
            _ => match self.text_field(key) {
                Some(s) => Cow::Borrowed(s.as_str()),
                None => Cow::Borrowed(""),
            },
        }
    }

    fn text_field(&self, key: ColumnKey) -> Option<&String> {
        match key {
            ColumnKey::JobRequest => Some(&self.job_request),
            ColumnKey::Submitted => Some(&self.submitted),
            ColumnKey::Submitter => Some(&self.submitter),
            ColumnKey::Url => Some(&self.url),
            ColumnKey::Assigned => Some(&self.assigned),
            ColumnKey::DueDate => Some(&self.due_date),
            ColumnKey::EstValue => Some(&self.est_value),
            ColumnKey::Id | ColumnKey::Status | ColumnKey::Priority => None,
        }
    }

    fn text_field_mut(&mut self, key: ColumnKey) -> Option<&mut String> {
        match key {
            ColumnKey::JobRequest => Some(&mut self.job_request),
            ColumnKey::Submitted => Some(&mut self.submitted),
            ColumnKey::Submitter => Some(&mut self.submitter),
            ColumnKey::Url => Some(&mut self.url),
            ColumnKey::Assigned => Some(&mut self.assigned),
            ColumnKey::DueDate => Some(&mut self.due_date),
            ColumnKey::EstValue => Some(&mut self.est_value),
            ColumnKey::Id | ColumnKey::Status | ColumnKey::Priority => None,
        }
    }

    /// Write one field. The id is never writable and values must match the column type.
    pub fn set(&mut self, key: ColumnKey, value: FieldValue) -> Result<(), GridError> {
        match (key, value) {
            (ColumnKey::Status, FieldValue::Status(s)) => self.status = s,
            (ColumnKey::Priority, FieldValue::Priority(p)) => self.priority = p,
            (key, FieldValue::Text(text)) => match self.text_field_mut(key) {
                Some(slot) => *slot = text,
                None => {
                    return Err(GridError::Rejected {
                        column: key.as_str(),
                        value: text,
                    })
                }
            },
            (key, other) => {
                return Err(GridError::Rejected {
                    column: key.as_str(),
                    value: other.as_str().to_string(),
                })
            }
        }
        Ok(())
    }
}

/// The five work items the grid starts with.
pub fn sample_rows() -> Vec<Row> {
    let row = |id: u64,
               job_request: &str,
               submitted: &str,
               status: Status,
               submitter: &str,
               url: &str,
               assigned: &str,
               priority: Priority,
               due_date: &str,
               est_value: &str| Row {
        id,
        job_request: job_request.to_string(),
        submitted: submitted.to_string(),
        status,
        submitter: submitter.to_string(),
        url: url.to_string(),
        assigned: assigned.to_string(),
        priority,
        due_date: due_date.to_string(),
        est_value: est_value.to_string(),
    };

    vec![
        row(
            1,
            "Launch social media campaign for pro...",
            "15-11-2024",
            Status::InProcess,
            "Aisha Patel",
            "www.aishapatel...",
            "Sophie Choudhury",
            Priority::Medium,
            "20-11-2024",
            "6,200,000",
        ),
        row(
            2,
            "Update press kit for company redesign",
            "28-10-2024",
            Status::NeedToStart,
            "Irfan Khan",
            "www.irfankhap...",
            "Tejas Pandey",
            Priority::High,
            "30-10-2024",
            "3,500,000",
        ),
        row(
            3,
            "Finalize user testing feedback for app...",
            "05-12-2024",
            Status::InProcess,
            "Mark Johnson",
            "www.markjohns...",
            "Rachel Lee",
            Priority::Medium,
            "10-12-2024",
            "4,750,000",
        ),
        row(
            4,
            "Design new features for the website",
            "10-01-2025",
            Status::Complete,
            "Emily Green",
            "www.emilygreen...",
            "Tom Wright",
            Priority::Low,
            "15-01-2025",
            "5,900,000",
        ),
        row(
            5,
            "Prepare financial report for Q4",
            "25-01-2025",
            Status::Blocked,
            "Jessica Brown",
            "www.jessicabro...",
            "Kevin Smith",
            Priority::Low,
            "30-01-2025",
            "2,800,000",
        ),
    ]
}
