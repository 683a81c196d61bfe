use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Clear, Paragraph, StatefulWidget};

pub mod address;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod filter_modal;
pub mod grid;
pub mod logging;
pub mod row;
pub mod schema;
pub mod selection;
pub mod sort;
pub mod store;
pub mod widgets;

pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorDepth, ColorParser, ConfigManager, Theme,
};
pub use error::{GridError, GridResult};
pub use grid::{GridEvent, GridOptions, GridOutput, GridState};
pub use workgrid_cli::{Args, ImportFormat};

use filter_modal::{FilterFocus, FilterModal};
use selection::GridKey;
use widgets::controls::Controls;
use widgets::debug::{DebugLine, DebugState};
use widgets::filter_panel::FilterPanel;
use widgets::grid_table::{GridTable, GridTableState, Hit};
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "workgrid";

pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Start reading an import file. The format is detected from the path when `None`.
    Import(PathBuf, Option<ImportFormat>),
    /// An import file finished loading.
    ImportReady {
        format: ImportFormat,
        content: String,
    },
    ImportFailed(String),
    Export,
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    Filter,
    ImportPath,
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

pub struct App {
    grid: GridState,
    events: Sender<AppEvent>,
    debug: DebugState,
    pub input_mode: InputMode,
    search_input: TextInput,
    path_input: TextInput,
    pub filter_modal: FilterModal,
    error_modal: ErrorModal,
    table_state: GridTableState,
    theme: Theme,
    export_path: PathBuf,
    double_click: Duration,
    /// Time and cell of the last left click, for double-click detection.
    last_click: Option<(Instant, usize, usize)>,
    /// One-line feedback shown in the status bar.
    message: Option<String>,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> Self {
        let config = AppConfig::default();
        let theme = Theme::from_config(&config.theme).unwrap_or_default();
        Self::new_with_config(events, theme, &config, GridState::default())
    }

    pub fn new_with_config(
        events: Sender<AppEvent>,
        theme: Theme,
        config: &AppConfig,
        grid: GridState,
    ) -> Self {
        let primary = theme.get("text_primary");
        let mut app = Self {
            grid,
            events,
            debug: DebugState::default(),
            input_mode: InputMode::Normal,
            search_input: TextInput::new().with_text_color(primary),
            path_input: TextInput::new().with_text_color(primary),
            filter_modal: FilterModal::new(),
            error_modal: ErrorModal::new(),
            table_state: GridTableState::new(),
            theme,
            export_path: config.export_path(),
            double_click: Duration::from_millis(config.ui.double_click_ms),
            last_click: None,
            message: None,
        };
        if config.debug.enabled {
            app.enable_debug();
        }
        app
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn set_export_path(&mut self, path: PathBuf) {
        self.export_path = path;
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_modal
            .active
            .then_some(self.error_modal.message.as_str())
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    /// Feed one intent to the grid and react to what it reports.
    fn dispatch(&mut self, event: GridEvent) {
        let outputs = self.grid.apply(event);
        for output in outputs {
            self.debug.last_action = output.name().to_string();
            match output {
                GridOutput::Imported {
                    format,
                    rows,
                    replaced,
                } => {
                    let verb = if replaced { "Loaded" } else { "Appended" };
                    self.message = Some(format!("{} {} rows from {}", verb, rows, format.as_str()));
                }
                GridOutput::RowAdded(id) => {
                    self.message = Some(format!("Added row {}", id));
                }
                GridOutput::ImportFailed { message } | GridOutput::EditRejected { message } => {
                    self.error_modal.show(message);
                }
                _ => {}
            }
        }
    }

    fn spawn_import(&mut self, path: PathBuf, format: Option<ImportFormat>) {
        let format = format.unwrap_or_else(|| ImportFormat::from_path(&path));
        self.message = Some(format!("Loading {}", path.display()));
        info!(path = %path.display(), format = format.as_str(), "import requested");
        let events = self.events.clone();
        std::thread::spawn(move || {
            let event = match codec::read_import(&path) {
                Ok(content) => AppEvent::ImportReady { format, content },
                Err(e) => AppEvent::ImportFailed(e.import_message()),
            };
            // The receiver is gone only when the app is shutting down.
            let _ = events.send(event);
        });
    }

    fn export(&mut self) {
        // Export sees the same rows the user sees, pending edit included.
        self.dispatch(GridEvent::Blur);
        let result = self
            .grid
            .export_structured()
            .and_then(|json| codec::write_export(&self.export_path, &json));
        match result {
            Ok(()) => {
                self.message = Some(format!(
                    "Exported {} rows to {}",
                    self.grid.store().len(),
                    self.export_path.display()
                ));
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.error_modal.show(format!("Export failed: {}", e));
            }
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Mouse(mouse) => {
                self.mouse(mouse);
                None
            }
            AppEvent::Import(path, format) => {
                self.spawn_import(path.clone(), *format);
                None
            }
            AppEvent::ImportReady { format, content } => {
                self.message = None;
                self.dispatch(GridEvent::Import {
                    format: *format,
                    content: content.clone(),
                });
                None
            }
            AppEvent::ImportFailed(message) => {
                self.message = None;
                warn!(error = %message, "import failed");
                self.error_modal.show(message.clone());
                None
            }
            AppEvent::Export => {
                self.export();
                None
            }
            AppEvent::Resize(cols, rows) => {
                debug!(cols, rows, "resized");
                None
            }
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        // Handle error modal first - it has highest priority
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(event.code, KeyCode::Char('q') | KeyCode::Char('c')) {
            self.dispatch(GridEvent::Blur);
            return Some(AppEvent::Exit);
        }

        match self.input_mode {
            InputMode::Search => {
                match self.search_input.handle_key(event) {
                    TextInputEvent::Changed => {
                        let query = self.search_input.value().to_string();
                        self.dispatch(GridEvent::SetSearch(query));
                    }
                    TextInputEvent::Submit => self.leave_input(),
                    TextInputEvent::Cancel => {
                        self.search_input.clear();
                        self.dispatch(GridEvent::SetSearch(String::new()));
                        self.leave_input();
                    }
                    TextInputEvent::None => {}
                }
                None
            }
            InputMode::ImportPath => match self.path_input.handle_key(event) {
                TextInputEvent::Submit => {
                    let path = self.path_input.value().trim().to_string();
                    self.path_input.clear();
                    self.leave_input();
                    (!path.is_empty()).then(|| AppEvent::Import(PathBuf::from(path), None))
                }
                TextInputEvent::Cancel => {
                    self.path_input.clear();
                    self.leave_input();
                    None
                }
                _ => None,
            },
            InputMode::Filter => {
                self.filter_key(event);
                None
            }
            InputMode::Normal => self.normal_key(event, ctrl),
        }
    }

    fn leave_input(&mut self) {
        self.search_input.set_focused(false);
        self.path_input.set_focused(false);
        self.input_mode = InputMode::Normal;
    }

    fn filter_key(&mut self, event: &KeyEvent) {
        match event.code {
            KeyCode::Esc => {
                self.filter_modal.close();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Tab => self.filter_modal.next_focus(),
            KeyCode::BackTab => self.filter_modal.prev_focus(),
            KeyCode::Up => self.filter_modal.move_cursor(false),
            KeyCode::Down => self.filter_modal.move_cursor(true),
            KeyCode::Backspace => self.filter_modal.backspace(),
            KeyCode::Enter => self.activate_filter(),
            KeyCode::Char(' ')
                if !matches!(
                    self.filter_modal.focus,
                    FilterFocus::StartDate | FilterFocus::EndDate
                ) =>
            {
                self.activate_filter()
            }
            KeyCode::Char(c) => self.filter_modal.input_char(c),
            _ => {}
        }
    }

    fn activate_filter(&mut self) {
        if let Some(event) = self.filter_modal.activate() {
            self.dispatch(event);
        }
    }

    fn normal_key(&mut self, event: &KeyEvent, ctrl: bool) -> Option<AppEvent> {
        if ctrl {
            match event.code {
                KeyCode::Char('f') => {
                    self.dispatch(GridEvent::Blur);
                    self.search_input.set_value(self.grid.search());
                    self.search_input.set_focused(true);
                    self.input_mode = InputMode::Search;
                }
                KeyCode::Char('t') => {
                    self.dispatch(GridEvent::Blur);
                    self.filter_modal.open(&self.grid);
                    self.input_mode = InputMode::Filter;
                }
                KeyCode::Char('s') => match self.grid.selected() {
                    Some(position) => {
                        let column = position.column_key;
                        self.dispatch(GridEvent::ToggleSort(column));
                    }
                    None => self.message = Some("Select a cell to sort by its column".to_string()),
                },
                KeyCode::Char('h') => self.dispatch(GridEvent::ToggleHiddenFields),
                KeyCode::Char('n') => {
                    let today = chrono::Local::now().date_naive();
                    self.dispatch(GridEvent::NewRow { today });
                }
                KeyCode::Char('e') => return Some(AppEvent::Export),
                KeyCode::Char('o') => {
                    self.dispatch(GridEvent::Blur);
                    self.path_input.clear();
                    self.path_input.set_focused(true);
                    self.input_mode = InputMode::ImportPath;
                }
                _ => {}
            }
            return None;
        }

        let key = match event.code {
            KeyCode::Tab => {
                self.dispatch(GridEvent::SelectFirst);
                return None;
            }
            KeyCode::Up => GridKey::Up,
            KeyCode::Down => GridKey::Down,
            KeyCode::Left => GridKey::Left,
            KeyCode::Right => GridKey::Right,
            KeyCode::Enter => GridKey::Enter,
            KeyCode::Esc => GridKey::Escape,
            KeyCode::Delete => GridKey::Delete,
            KeyCode::Backspace => GridKey::Backspace,
            KeyCode::Char(_)
                if event.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::META) =>
            {
                return None
            }
            KeyCode::Char(c) => GridKey::Char(c),
            _ => return None,
        };
        self.dispatch(GridEvent::Key(key));
        None
    }

    fn mouse(&mut self, event: &MouseEvent) {
        self.debug.on_mouse(event);
        if self.error_modal.active {
            return;
        }
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(hit) = self.table_state.hit(event.column, event.row) else {
                    return;
                };
                if matches!(self.input_mode, InputMode::Search | InputMode::ImportPath) {
                    self.leave_input();
                }
                match hit {
                    Hit::Header(column) => {
                        self.last_click = None;
                        self.dispatch(GridEvent::ToggleSort(column));
                    }
                    Hit::Cell { row, column } => {
                        let now = Instant::now();
                        let is_double = self.last_click.is_some_and(|(at, r, c)| {
                            r == row && c == column && now.duration_since(at) <= self.double_click
                        });
                        if is_double {
                            self.last_click = None;
                            self.dispatch(GridEvent::DoubleClick { row, column });
                        } else {
                            self.last_click = Some((now, row, column));
                            self.dispatch(GridEvent::Click { row, column });
                        }
                    }
                }
            }
            MouseEventKind::ScrollDown => {
                self.table_state.row_offset += 3;
            }
            MouseEventKind::ScrollUp => {
                self.table_state.row_offset = self.table_state.row_offset.saturating_sub(3);
            }
            _ => {}
        }
    }

    fn render_error_modal(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 60, 30);
        Clear.render(popup_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Error")
            .border_style(Style::default().fg(self.color("modal_border_error")));
        let inner_area = block.inner(popup_area);
        block.render(popup_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner_area);

        Paragraph::new(self.error_modal.message.as_str())
            .style(Style::default().fg(self.color("error")))
            .wrap(ratatui::widgets::Wrap { trim: true })
            .render(chunks[0], buf);

        Paragraph::new("[ OK ]")
            .centered()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.color("modal_border"))),
            )
            .render(chunks[1], buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![Constraint::Fill(1)];
        let show_input = matches!(self.input_mode, InputMode::Search | InputMode::ImportPath)
            || !self.grid.search().is_empty();
        if show_input {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(1)); // Controls
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let main_area = layout[0];
        let mut data_area = main_area;
        let mut panel_area = Rect::default();
        if self.filter_modal.active {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(50)])
                .split(main_area);
            data_area = chunks[0];
            panel_area = chunks[1];
        }

        GridTable::new(&self.grid)
            .with_colors(
                self.theme.get("table_header"),
                self.theme.get("table_border"),
                self.theme.get("cell_selected"),
                self.theme.get("cell_editing"),
                self.theme.get("virtual_row"),
            )
            .render(data_area, buf, &mut self.table_state);

        if self.filter_modal.active {
            FilterPanel::new(&self.filter_modal, self.grid.filters())
                .with_colors(
                    self.color("modal_border"),
                    self.color("secondary"),
                    self.color("error"),
                )
                .render(panel_area, buf);
        }

        let mut next = 1;
        if show_input {
            let input_area = layout[next];
            next += 1;
            let (title, input) = if self.input_mode == InputMode::ImportPath {
                ("Import file (Enter to load, Esc to cancel)", &self.path_input)
            } else {
                ("Search", &self.search_input)
            };
            let focused = self.input_mode != InputMode::Normal;
            let border = if focused {
                self.color("modal_border")
            } else {
                self.color("dimmed")
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border));
            let inner_area = block.inner(input_area);
            block.render(input_area, buf);
            input.render(inner_area, buf);
        }

        let controls_area = layout[next];
        let controls = Controls::new(
            self.grid.visible_row_count(),
            self.grid.visible_column_count(),
        )
        .with_selected(self.grid.selected_label())
        .with_message(self.message.clone())
        .with_dimmed(self.error_modal.active)
        .with_search_active(self.input_mode == InputMode::Search)
        .with_colors(
            self.color("controls_bg"),
            self.color("text_primary"),
            self.color("primary"),
        );
        (&controls).render(controls_area, buf);

        if self.error_modal.active {
            self.render_error_modal(area, buf);
        }

        if self.debug.enabled && layout.len() > next + 1 {
            let mode = format!("{:?}", self.input_mode);
            DebugLine::new(&self.debug, &self.grid, &mode).render(layout[next + 1], buf);
        }
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
