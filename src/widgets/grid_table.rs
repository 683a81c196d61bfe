use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{StatefulWidget, Widget},
};

use crate::address::CellPosition;
use crate::grid::GridState;
use crate::schema::{ColumnKey, ValueDomain};

/// Width of the row number gutter, separator included.
const GUTTER_WIDTH: u16 = 5;

pub fn column_width(key: ColumnKey) -> u16 {
    match key {
        ColumnKey::Id => 4,
        ColumnKey::JobRequest => 38,
        ColumnKey::Submitted | ColumnKey::DueDate => 12,
        ColumnKey::Status => 15,
        ColumnKey::Submitter | ColumnKey::Assigned => 18,
        ColumnKey::Url => 20,
        ColumnKey::Priority => 10,
        ColumnKey::EstValue => 13,
    }
}

/// What a screen coordinate points at, as of the last render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Header(ColumnKey),
    /// 1-based row number and visible column index.
    Cell { row: usize, column: usize },
}

#[derive(Debug, Default)]
pub struct GridTableState {
    /// Row numbers above this many are scrolled off the top.
    pub row_offset: usize,
    /// First visible column index drawn.
    pub col_offset: usize,
    pub visible_rows: usize,
    /// Row number and column index the view was last scrolled to.
    anchor: Option<(usize, usize)>,
    headers: Vec<(Rect, ColumnKey)>,
    cells: Vec<(Rect, usize, usize)>,
}

impl GridTableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self, x: u16, y: u16) -> Option<Hit> {
        let inside = |r: &Rect| x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height;
        if let Some((_, key)) = self.headers.iter().find(|(r, _)| inside(r)) {
            return Some(Hit::Header(*key));
        }
        self.cells
            .iter()
            .find(|(r, _, _)| inside(r))
            .map(|(_, row, column)| Hit::Cell {
                row: *row,
                column: *column,
            })
    }

    /// Shift the offsets so the given cell is on screen.
    fn scroll_to(&mut self, row: usize, column: usize, columns_fit: impl Fn(usize) -> bool) {
        if row > 0 {
            if row <= self.row_offset {
                self.row_offset = row - 1;
            } else if self.visible_rows > 0 && row > self.row_offset + self.visible_rows {
                self.row_offset = row - self.visible_rows;
            }
        }
        if column < self.col_offset {
            self.col_offset = column;
        }
        while self.col_offset < column && !columns_fit(self.col_offset) {
            self.col_offset += 1;
        }
    }
}

pub struct GridTable<'a> {
    grid: &'a GridState,
    pub header_fg: Color,
    pub border_fg: Color,
    pub selected: Color,
    pub editing: Color,
    pub virtual_fg: Color,
}

impl<'a> GridTable<'a> {
    pub fn new(grid: &'a GridState) -> Self {
        Self {
            grid,
            header_fg: Color::White,
            border_fg: Color::Cyan,
            selected: Color::Reset,
            editing: Color::Yellow,
            virtual_fg: Color::Indexed(238),
        }
    }

    pub fn with_colors(
        mut self,
        header_fg: Color,
        border_fg: Color,
        selected: Color,
        editing: Color,
        virtual_fg: Color,
    ) -> Self {
        self.header_fg = header_fg;
        self.border_fg = border_fg;
        self.selected = selected;
        self.editing = editing;
        self.virtual_fg = virtual_fg;
        self
    }

    fn selected_style(&self) -> Style {
        // Reset means "reverse video" rather than a concrete color.
        if self.selected == Color::Reset {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().bg(self.selected)
        }
    }

    fn cell_text(&self, position: &CellPosition, is_virtual: bool) -> String {
        if let Some(buffer) = self.editing_buffer(position) {
            return match position.column_key.domain() {
                ValueDomain::FreeText => format!("{}▏", buffer),
                _ => format!("▾ {}", buffer),
            };
        }
        if is_virtual {
            return String::new();
        }
        self.grid
            .store()
            .get(position.row_id)
            .map(|row| row.text(position.column_key).into_owned())
            .unwrap_or_default()
    }

    fn editing_buffer(&self, position: &CellPosition) -> Option<&str> {
        match (self.grid.selected(), self.grid.edit_buffer()) {
            (Some(selected), Some(buffer)) if selected == position => Some(buffer),
            _ => None,
        }
    }
}

impl StatefulWidget for GridTable<'_> {
    type State = GridTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.headers.clear();
        state.cells.clear();
        if area.height < 2 || area.width <= GUTTER_WIDTH {
            return;
        }
        state.visible_rows = (area.height - 1) as usize;

        let model = self.grid.model();
        let columns: Vec<ColumnKey> = self.grid.schema().visible().map(|c| c.key).collect();
        let available = area.width - GUTTER_WIDTH;

        let target = self.grid.selected().map(|selected| {
            let row = model.row_number_of(selected.row_id).unwrap_or(0);
            (row, selected.column_index)
        });
        if let Some((row, column)) = target.filter(|t| state.anchor != Some(*t)) {
            let fits = |offset: usize| {
                let needed: u16 = columns[offset..=column.min(columns.len() - 1)]
                    .iter()
                    .map(|k| column_width(*k) + 1)
                    .sum();
                needed <= available
            };
            state.scroll_to(row, column, fits);
        }
        state.anchor = target;
        let max_offset = model.max_row_number().saturating_sub(state.visible_rows);
        state.row_offset = state.row_offset.min(max_offset);
        state.col_offset = state.col_offset.min(columns.len().saturating_sub(1));

        let header_style = Style::default()
            .fg(self.header_fg)
            .add_modifier(Modifier::BOLD);
        let border_style = Style::default().fg(self.border_fg);
        let sort = self.grid.sort();

        // Header row.
        buf.set_string(area.x, area.y, format!("{:>4}", "#"), header_style);
        let mut x = area.x + GUTTER_WIDTH;
        let mut drawn = Vec::new();
        for (index, key) in columns.iter().enumerate().skip(state.col_offset) {
            let width = column_width(*key);
            if x + width > area.x + area.width {
                break;
            }
            let mut label = self.grid.schema().descriptor(*key).label.to_string();
            if let Some(directive) = sort.filter(|d| d.column == *key) {
                label.push(' ');
                label.push_str(directive.direction.arrow());
            }
            let rect = Rect::new(x, area.y, width, 1);
            Span::styled(fit(&label, width), header_style).render(rect, buf);
            state.headers.push((rect, *key));
            drawn.push((index, *key, x));
            x += width;
            buf.set_string(x, area.y, "│", border_style);
            x += 1;
        }

        // Body rows.
        for line in 0..state.visible_rows {
            let number = state.row_offset + line + 1;
            let Some(row_id) = model.row_id_at(number) else {
                break;
            };
            let y = area.y + 1 + line as u16;
            let is_virtual = model.is_virtual(row_id);
            let row_style = if is_virtual {
                Style::default().fg(self.virtual_fg)
            } else {
                Style::default()
            };
            buf.set_string(
                area.x,
                y,
                format!("{:>4}", number),
                Style::default().fg(self.virtual_fg),
            );

            for (index, key, x) in &drawn {
                let width = column_width(*key);
                let position = CellPosition {
                    row_id,
                    column_key: *key,
                    column_index: *index,
                };
                let style = if self.editing_buffer(&position).is_some() {
                    Style::default()
                        .fg(self.editing)
                        .add_modifier(Modifier::BOLD)
                } else if self.grid.selected() == Some(&position) {
                    self.selected_style()
                } else {
                    row_style
                };
                let rect = Rect::new(*x, y, width, 1);
                Span::styled(fit(&self.cell_text(&position, is_virtual), width), style)
                    .render(rect, buf);
                state.cells.push((rect, number, *index));
                buf.set_string(x + width, y, "│", border_style);
            }
        }
    }
}

/// Pad or truncate to exactly `width` characters.
fn fit(text: &str, width: u16) -> String {
    let width = width as usize;
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridEvent, GridOptions};
    use crate::row::sample_rows;
    use crate::selection::GridKey;

    fn grid() -> GridState {
        GridState::with_rows(sample_rows(), GridOptions::default()).unwrap()
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn render(grid: &GridState, state: &mut GridTableState) -> Buffer {
        let area = Rect::new(0, 0, 200, 12);
        let mut buf = Buffer::empty(area);
        GridTable::new(grid).render(area, &mut buf, state);
        buf
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
    }

    #[test]
    fn test_render_rows_and_hits() {
        let grid = grid();
        let mut state = GridTableState::new();
        let buf = render(&grid, &mut state);
        assert!(line(&buf, 0).contains("Job Request"));
        assert!(line(&buf, 1).contains("Aisha Patel"));
        assert_eq!(state.visible_rows, 11);

        let (rect, key) = state.headers[1];
        assert_eq!(state.hit(rect.x, rect.y), Some(Hit::Header(key)));
        assert_eq!(
            state.hit(rect.x + 1, rect.y + 3),
            Some(Hit::Cell { row: 3, column: 1 })
        );
        assert_eq!(state.hit(0, 0), None);
    }

    #[test]
    fn test_sort_arrow_and_edit_buffer() {
        let mut grid = grid();
        grid.apply(GridEvent::ToggleSort(ColumnKey::Id));
        grid.apply(GridEvent::Click { row: 1, column: 1 });
        grid.apply(GridEvent::Key(GridKey::Char('Q')));
        let mut state = GridTableState::new();
        let buf = render(&grid, &mut state);
        assert!(line(&buf, 0).contains("↑"));
        assert!(line(&buf, 1).contains("Q▏"));
    }

    #[test]
    fn test_scrolls_to_selection() {
        let mut grid = grid();
        grid.apply(GridEvent::Click { row: 20, column: 0 });
        let mut state = GridTableState::new();
        render(&grid, &mut state);
        assert_eq!(state.row_offset, 9);
    }

    #[test]
    fn test_wheel_scroll_is_kept_until_selection_moves() {
        let mut grid = grid();
        grid.apply(GridEvent::Click { row: 2, column: 1 });
        let mut state = GridTableState::new();
        render(&grid, &mut state);
        assert_eq!(state.row_offset, 0);

        state.row_offset = 6;
        render(&grid, &mut state);
        assert_eq!(state.row_offset, 6);

        grid.apply(GridEvent::Key(GridKey::Up));
        render(&grid, &mut state);
        assert_eq!(state.row_offset, 0);
    }
}
