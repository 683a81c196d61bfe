//! State of the filter side panel. Each action becomes a `GridEvent` for the reducer.

use crate::filter::{parse_filter_date, FilterCriteria};
use crate::grid::{GridEvent, GridState};
use crate::row::{Priority, Status};

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FilterFocus {
    #[default]
    Status,
    Priority,
    Submitter,
    Assigned,
    StartDate,
    EndDate,
    Clear,
}

impl FilterFocus {
    pub fn iterator() -> impl Iterator<Item = FilterFocus> {
        [
            FilterFocus::Status,
            FilterFocus::Priority,
            FilterFocus::Submitter,
            FilterFocus::Assigned,
            FilterFocus::StartDate,
            FilterFocus::EndDate,
            FilterFocus::Clear,
        ]
        .iter()
        .copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            FilterFocus::Status => "Status",
            FilterFocus::Priority => "Priority",
            FilterFocus::Submitter => "Submitter",
            FilterFocus::Assigned => "Assigned",
            FilterFocus::StartDate => "Start date",
            FilterFocus::EndDate => "End date",
            FilterFocus::Clear => "Clear filters",
        }
    }

    fn step(self, forward: bool) -> Self {
        let all: Vec<FilterFocus> = Self::iterator().collect();
        let idx = all.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % all.len()
        } else {
            (idx + all.len() - 1) % all.len()
        };
        all[next]
    }
}

#[derive(Default)]
pub struct FilterModal {
    pub active: bool,
    pub focus: FilterFocus,
    /// Highlighted entry inside the focused toggle list.
    pub cursor: usize,
    pub submitters: Vec<String>,
    pub assignees: Vec<String>,
    /// Date bounds as typed, `YYYY-MM-DD`.
    pub start_input: String,
    pub end_input: String,
    pub error: Option<String>,
}

impl FilterModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the panel with toggle values taken from the current rows.
    pub fn open(&mut self, grid: &GridState) {
        self.active = true;
        self.focus = FilterFocus::Status;
        self.cursor = 0;
        self.error = None;
        self.submitters = grid.submitters();
        self.assignees = grid.assignees();
        let range = &grid.filters().date_range;
        self.start_input = range
            .start
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self.end_input = range
            .end
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
    }

    pub fn close(&mut self) {
        self.active = false;
        self.error = None;
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.step(true);
        self.cursor = 0;
    }

    pub fn prev_focus(&mut self) {
        self.focus = self.focus.step(false);
        self.cursor = 0;
    }

    /// Labels listed under the focused toggle group.
    pub fn options(&self, focus: FilterFocus) -> Vec<String> {
        match focus {
            FilterFocus::Status => Status::iterator().map(|s| s.as_str().to_string()).collect(),
            FilterFocus::Priority => Priority::iterator()
                .map(|p| p.as_str().to_string())
                .collect(),
            FilterFocus::Submitter => self.submitters.clone(),
            FilterFocus::Assigned => self.assignees.clone(),
            _ => Vec::new(),
        }
    }

    /// Whether an option of a toggle group is in the active criteria.
    pub fn is_checked(criteria: &FilterCriteria, focus: FilterFocus, label: &str) -> bool {
        match focus {
            FilterFocus::Status => Status::parse(label).is_some_and(|s| criteria.status.contains(&s)),
            FilterFocus::Priority => {
                Priority::parse(label).is_some_and(|p| criteria.priority.contains(&p))
            }
            FilterFocus::Submitter => criteria.submitter.contains(label),
            FilterFocus::Assigned => criteria.assigned.contains(label),
            _ => false,
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        let len = self.options(self.focus).len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = if down {
            (self.cursor + 1).min(len - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.date_input_mut() {
            if c.is_ascii_digit() || c == '-' {
                input.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.date_input_mut() {
            input.pop();
        }
    }

    fn date_input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FilterFocus::StartDate => Some(&mut self.start_input),
            FilterFocus::EndDate => Some(&mut self.end_input),
            _ => None,
        }
    }

    /// Apply the focused control. Returns the grid event to dispatch, if any.
    pub fn activate(&mut self) -> Option<GridEvent> {
        self.error = None;
        match self.focus {
            FilterFocus::Status => Status::iterator()
                .nth(self.cursor)
                .map(GridEvent::ToggleStatusFilter),
            FilterFocus::Priority => Priority::iterator()
                .nth(self.cursor)
                .map(GridEvent::TogglePriorityFilter),
            FilterFocus::Submitter => self
                .submitters
                .get(self.cursor)
                .cloned()
                .map(GridEvent::ToggleSubmitterFilter),
            FilterFocus::Assigned => self
                .assignees
                .get(self.cursor)
                .cloned()
                .map(GridEvent::ToggleAssignedFilter),
            FilterFocus::StartDate | FilterFocus::EndDate => {
                let start = parse_filter_date(&self.start_input);
                let end = parse_filter_date(&self.end_input);
                match (start, end) {
                    (Ok(start), Ok(end)) => Some(GridEvent::SetDateRange { start, end }),
                    _ => {
                        self.error = Some("Dates must be YYYY-MM-DD".to_string());
                        None
                    }
                }
            }
            FilterFocus::Clear => {
                self.start_input.clear();
                self.end_input.clear();
                Some(GridEvent::ClearFilters)
            }
        }
    }
}
