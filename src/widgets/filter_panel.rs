use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::filter::FilterCriteria;
use crate::filter_modal::{FilterFocus, FilterModal};

/// Side panel listing every filter control of a [`FilterModal`].
pub struct FilterPanel<'a> {
    modal: &'a FilterModal,
    criteria: &'a FilterCriteria,
    pub border: Color,
    pub active: Color,
    pub error: Color,
}

impl<'a> FilterPanel<'a> {
    pub fn new(modal: &'a FilterModal, criteria: &'a FilterCriteria) -> Self {
        Self {
            modal,
            criteria,
            border: Color::Cyan,
            active: Color::Yellow,
            error: Color::Red,
        }
    }

    pub fn with_colors(mut self, border: Color, active: Color, error: Color) -> Self {
        self.border = border;
        self.active = active;
        self.error = error;
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let title_style = |focused: bool| {
            let style = Style::default().add_modifier(Modifier::BOLD);
            if focused {
                style.fg(self.active)
            } else {
                style
            }
        };

        for focus in FilterFocus::iterator() {
            let focused = self.modal.focus == focus;
            match focus {
                FilterFocus::StartDate | FilterFocus::EndDate => {
                    let value = if focus == FilterFocus::StartDate {
                        &self.modal.start_input
                    } else {
                        &self.modal.end_input
                    };
                    let shown = if value.is_empty() && !focused {
                        "YYYY-MM-DD".to_string()
                    } else if focused {
                        format!("{}▏", value)
                    } else {
                        value.clone()
                    };
                    lines.push(Line::from(vec![
                        Span::styled(format!("{}: ", focus.title()), title_style(focused)),
                        Span::raw(shown),
                    ]));
                }
                FilterFocus::Clear => {
                    lines.push(Line::default());
                    lines.push(Line::from(Span::styled(
                        format!("[ {} ]", focus.title()),
                        title_style(focused),
                    )));
                }
                _ => {
                    lines.push(Line::from(Span::styled(focus.title(), title_style(focused))));
                    for (i, label) in self.modal.options(focus).into_iter().enumerate() {
                        let mark = if FilterModal::is_checked(self.criteria, focus, &label) {
                            "[x]"
                        } else {
                            "[ ]"
                        };
                        let style = if focused && i == self.modal.cursor {
                            Style::default().add_modifier(Modifier::REVERSED)
                        } else {
                            Style::default()
                        };
                        lines.push(Line::from(Span::styled(
                            format!("  {} {}", mark, label),
                            style,
                        )));
                    }
                    lines.push(Line::default());
                }
            }
        }

        if let Some(error) = &self.modal.error {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.error),
            )));
        }
        lines
    }
}

impl Widget for FilterPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Filters (Tab: next, Space: toggle, Esc: close)")
            .border_style(Style::default().fg(self.border));
        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the focused section in view on short terminals.
        let lines = self.lines();
        let focus_line = lines
            .iter()
            .position(|l| {
                l.spans
                    .first()
                    .is_some_and(|s| s.content.starts_with(self.modal.focus.title()))
            })
            .unwrap_or(0);
        let scroll = (focus_line + self.modal.cursor + 2).saturating_sub(inner.height as usize);
        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Status;

    #[test]
    fn test_lines_mark_checked_values() {
        let mut modal = FilterModal::new();
        modal.submitters = vec!["Ann".to_string()];
        let mut criteria = FilterCriteria::new();
        criteria.toggle_status(Status::Blocked);
        let panel = FilterPanel::new(&modal, &criteria);
        let text: Vec<String> = panel.lines().iter().map(|l| l.to_string()).collect();
        assert!(text.contains(&"  [x] Blocked".to_string()));
        assert!(text.contains(&"  [ ] Complete".to_string()));
        assert!(text.contains(&"  [ ] Ann".to_string()));
        assert!(text.contains(&"Start date: YYYY-MM-DD".to_string()));
    }
}
