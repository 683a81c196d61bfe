use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

const CONTROLS: [(&str, &str); 8] = [
    ("^F", "Search"),
    ("^T", "Filter"),
    ("^S", "Sort"),
    ("^H", "Fields"),
    ("^N", "New"),
    ("^O", "Import"),
    ("^E", "Export"),
    ("^Q", "Quit"),
];

/// Key hints on the left, the status bar on the right.
pub struct Controls {
    pub row_count: usize,
    pub column_count: usize,
    pub selected_label: Option<String>,
    /// Transient feedback such as "Exported 5 rows".
    pub message: Option<String>,
    pub dimmed: bool,
    pub search_active: bool,
    pub bg: Color,
    pub fg: Color,
    pub highlight: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            row_count: 0,
            column_count: 0,
            selected_label: None,
            message: None,
            dimmed: false,
            search_active: false,
            bg: Color::DarkGray,
            fg: Color::White,
            highlight: Color::Cyan,
        }
    }
}

impl Controls {
    pub fn new(row_count: usize, column_count: usize) -> Self {
        Self {
            row_count,
            column_count,
            ..Self::default()
        }
    }

    pub fn with_selected(mut self, label: Option<String>) -> Self {
        self.selected_label = label;
        self
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_search_active(mut self, search_active: bool) -> Self {
        self.search_active = search_active;
        self
    }

    pub fn with_colors(mut self, bg: Color, fg: Color, highlight: Color) -> Self {
        self.bg = bg;
        self.fg = fg;
        self.highlight = highlight;
        self
    }

    /// `Rows: 5 | Columns: 8 | Selected: JOBREQUEST3`
    pub fn status_text(&self) -> String {
        let mut text = format!("Rows: {} | Columns: {}", self.row_count, self.column_count);
        if let Some(label) = &self.selected_label {
            text.push_str(&format!(" | Selected: {}", label));
        }
        text
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            let action_style = if *action == "Search" && self.search_active {
                base_style.bg(self.bg).fg(self.highlight)
            } else {
                base_style.bg(self.bg)
            };
            Paragraph::new(*action)
                .style(action_style)
                .render(layout[j + 1], buf);
        }

        let fg = if self.dimmed { Color::DarkGray } else { self.fg };
        let status = self.status_text();
        let status_layout = Layout::new(
            Direction::Horizontal,
            [
                Constraint::Fill(1),
                Constraint::Length(status.chars().count() as u16 + 1),
            ],
        )
        .split(layout[CONTROLS.len() * 2]);
        Paragraph::new(format!(" {}", self.message.as_deref().unwrap_or_default()))
            .style(base_style.bg(self.bg).fg(self.highlight))
            .render(status_layout[0], buf);
        Paragraph::new(status)
            .style(base_style.bg(self.bg).fg(fg))
            .right_aligned()
            .render(status_layout[1], buf);
    }
}
