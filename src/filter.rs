//! Filter/Search Engine: computes the visible subset of rows.
//!
//! Pure functions of (rows, criteria, search text). Input order is preserved and
//! nothing is mutated.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::row::{Priority, Row, Status};
use crate::schema::ColumnKey;
use crate::sort::parse_grid_date;

/// Inclusive range on `submitted`. Only constrains when both bounds are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn contains(&self, row: &Row) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => match parse_grid_date(&row.submitted) {
                Some(date) => start <= date && date <= end,
                None => false,
            },
            _ => true,
        }
    }
}

/// Inclusion sets (empty = match all) plus the submitted date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub status: BTreeSet<Status>,
    pub priority: BTreeSet<Priority>,
    pub submitter: BTreeSet<String>,
    pub assigned: BTreeSet<String>,
    pub date_range: DateRange,
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

fn admits<T: Ord>(set: &BTreeSet<T>, value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
            && self.priority.is_empty()
            && self.submitter.is_empty()
            && self.assigned.is_empty()
            && !self.date_range.is_active()
    }

    pub fn toggle_status(&mut self, status: Status) {
        toggle(&mut self.status, status);
    }

    pub fn toggle_priority(&mut self, priority: Priority) {
        toggle(&mut self.priority, priority);
    }

    pub fn toggle_submitter(&mut self, submitter: &str) {
        toggle(&mut self.submitter, submitter.to_string());
    }

    pub fn toggle_assigned(&mut self, assigned: &str) {
        toggle(&mut self.assigned, assigned.to_string());
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.date_range = DateRange { start, end };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, row: &Row) -> bool {
        admits(&self.status, &row.status)
            && admits(&self.priority, &row.priority)
            && admits(&self.submitter, &row.submitter)
            && admits(&self.assigned, &row.assigned)
            && self.date_range.contains(row)
    }
}

/// Case-insensitive substring match against every field, id included.
/// An empty query matches every row.
pub fn matches_search(row: &Row, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    ColumnKey::iterator().any(|key| row.text(key).to_lowercase().contains(&needle))
}

/// Rows passing the search and every criterion, in input order.
pub fn visible_rows<'a>(rows: &'a [Row], criteria: &FilterCriteria, search: &str) -> Vec<&'a Row> {
    rows.iter()
        .filter(|row| matches_search(row, search) && criteria.matches(row))
        .collect()
}

/// Distinct values of a text column in first-appearance order, for filter toggles.
pub fn distinct_values(rows: &[Row], key: ColumnKey) -> Vec<String> {
    let mut seen = BTreeSet::new();
    rows.iter()
        .map(|row| row.text(key).into_owned())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Parse a `YYYY-MM-DD` filter bound; blank input clears the bound.
pub fn parse_filter_date(s: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map(Some)
}
