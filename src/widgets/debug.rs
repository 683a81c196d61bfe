//! One-line readout of input counters and grid state, shown under the controls bar.

use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::grid::GridState;
use crate::selection::SelectionState;

#[derive(Debug, Default)]
pub struct DebugState {
    pub enabled: bool,
    pub num_events: usize,
    pub num_frames: usize,
    keys: usize,
    clicks: usize,
    last_input: String,
    /// Name of the last grid output, e.g. "commit".
    pub last_action: String,
}

impl DebugState {
    pub fn on_key(&mut self, event: &KeyEvent) {
        self.keys += 1;
        self.last_input = if event.modifiers.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{:?}", event.code)
        } else {
            format!("{:?}", event.code)
        };
    }

    pub fn on_mouse(&mut self, event: &MouseEvent) {
        if let MouseEventKind::Down(_) = event.kind {
            self.clicks += 1;
        }
        self.last_input = format!("{:?}@{},{}", event.kind, event.column, event.row);
    }
}

pub struct DebugLine<'a> {
    state: &'a DebugState,
    grid: &'a GridState,
    mode: &'a str,
}

impl<'a> DebugLine<'a> {
    pub fn new(state: &'a DebugState, grid: &'a GridState, mode: &'a str) -> Self {
        Self { state, grid, mode }
    }

    fn selection(&self) -> String {
        match self.grid.selection() {
            SelectionState::Idle => "idle".to_string(),
            SelectionState::Selected(p) => format!("sel {}#{}", p.column_key.as_str(), p.row_id),
            SelectionState::Editing { position: p, .. } => {
                format!("edit {}#{}", p.column_key.as_str(), p.row_id)
            }
        }
    }

    fn sort(&self) -> String {
        match self.grid.sort() {
            Some(d) => format!("{}{}", d.column.as_str(), d.direction.arrow()),
            None => "-".to_string(),
        }
    }

    pub fn text(&self) -> String {
        format!(
            "ev={} fr={} keys={} clicks={} in={} mode={} {} sort={} view={}/{} last={}",
            self.state.num_events,
            self.state.num_frames,
            self.state.keys,
            self.state.clicks,
            self.state.last_input,
            self.mode,
            self.selection(),
            self.sort(),
            self.grid.visible_row_count(),
            self.grid.store().len(),
            self.state.last_action,
        )
    }
}

impl Widget for DebugLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled("debug ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.text()),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
