use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Event emitted by [`TextInput::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    /// The value changed.
    Changed,
    Submit,
    Cancel,
}

/// Single-line text input backed by tui-textarea. Used by the search bar and
/// the import path prompt.
pub struct TextInput {
    textarea: TextArea<'static>,
    text_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            text_color: None,
            focused: false,
        };
        input.apply_style();
        input
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self.apply_style();
        self
    }

    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(color) = self.text_color {
            style = style.fg(color);
        }
        self.textarea.set_style(style);
        self.textarea.set_cursor_line_style(Style::default());
        let cursor = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            // Same style as the text hides the cursor.
            style
        };
        self.textarea.set_cursor_style(cursor);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_style();
    }

    pub fn value(&self) -> &str {
        self.textarea
            .lines()
            .first()
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, value: &str) {
        self.textarea = TextArea::new(vec![value.replace(['\n', '\r'], " ")]);
        self.apply_style();
        self.textarea.move_cursor(CursorMove::End);
    }

    pub fn cursor(&self) -> usize {
        self.textarea.cursor().1
    }

    pub fn clear(&mut self) {
        self.set_value("");
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => return TextInputEvent::Submit,
            KeyCode::Esc => return TextInputEvent::Cancel,
            // Single line: vertical movement and tabs do nothing.
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                return TextInputEvent::None
            }
            _ => {}
        }
        let before = self.value().to_string();
        self.textarea.input(to_input(event));
        if self.value() != before {
            TextInputEvent::Changed
        } else {
            TextInputEvent::None
        }
    }
}

fn to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Null,
    };
    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);
    }
}
