use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::grid::GridOptions;
use crate::schema::ColumnKey;

const CONFIG_FILE: &str = "config.toml";

/// Locates the configuration directory and the files inside it.
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Use `config_dir` as is, e.g. a temporary directory in tests.
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// `<platform config dir>/<app_name>`, e.g. `~/.config/workgrid`.
    pub fn new(app_name: &str) -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| eyre!("No config directory on this platform"))?;
        Ok(Self::with_dir(base.join(app_name)))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, name: &str) -> PathBuf {
        self.config_dir.join(name)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)
            .map_err(|e| eyre!("Cannot create {}: {}", self.config_dir.display(), e))
    }

    /// Create `<config dir>/<name>` if needed and return its path.
    pub fn ensure_subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.config_path(name);
        std::fs::create_dir_all(&dir).map_err(|e| eyre!("Cannot create {}: {}", dir.display(), e))?;
        Ok(dir)
    }

    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write the commented template. An existing file is kept unless `force`.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let path = self.config_path(CONFIG_FILE);
        if !force && path.exists() {
            return Err(eyre!(
                "{} already exists; pass --force to replace it",
                path.display()
            ));
        }
        self.ensure_config_dir()?;
        std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub grid: GridConfig,
    pub export: ExportConfig,
    pub ui: UiConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Minimum number of row slots, padded with virtual rows
    pub min_rows: usize,
    /// Delimiter for delimited-text import, a single character
    pub delimiter: String,
    /// Column keys hidden by the hide-fields toggle
    pub hidden_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
    /// Directory for exports; the working directory when unset
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub event_poll_interval_ms: u64,
    /// Two presses on the same cell within this window count as a double click
    pub double_click_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub error: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub table_header: String,
    pub table_border: String,
    pub cell_selected: String,
    pub cell_editing: String,
    pub virtual_row: String,
    pub modal_border: String,
    pub modal_border_error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            grid: GridConfig::default(),
            export: ExportConfig::default(),
            ui: UiConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_rows: 25,
            delimiter: ",".to_string(),
            hidden_fields: vec!["url".to_string(), "submitted".to_string()],
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "spreadsheet-data.json".to_string(),
            directory: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
            double_click_ms: 400,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            cell_selected: "reversed".to_string(),
            cell_editing: "yellow".to_string(),
            virtual_row: "indexed(238)".to_string(),
            modal_border: "cyan".to_string(),
            modal_border_error: "red".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Load from the `config.toml` managed by `manager`, if there is one
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(Self::load_user_config(manager)?);
        config.validate()?;
        Ok(config)
    }

    fn load_user_config(manager: &ConfigManager) -> Result<AppConfig> {
        let path = manager.config_path(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
            Err(e) => return Err(eyre!("Failed to read config file {}: {}", path.display(), e)),
        };
        toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.grid.merge(other.grid);
        self.export.merge(other.export);
        self.ui.merge(other.ui);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.grid.min_rows == 0 {
            return Err(eyre!("min_rows must be greater than 0"));
        }
        self.grid.delimiter_char()?;
        self.grid.hidden_keys()?;

        if self.export.file_name.trim().is_empty() {
            return Err(eyre!("export file_name must not be empty"));
        }

        if self.ui.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }
        if self.ui.double_click_ms == 0 {
            return Err(eyre!("double_click_ms must be greater than 0"));
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    /// Grid tunables from the `[grid]` section.
    pub fn grid_options(&self) -> Result<GridOptions> {
        Ok(GridOptions {
            min_rows: self.grid.min_rows,
            delimiter: self.grid.delimiter_char()?,
            hidden_fields: self.grid.hidden_keys()?,
        })
    }

    /// Where the export action writes.
    pub fn export_path(&self) -> PathBuf {
        match &self.export.directory {
            Some(dir) => dir.join(&self.export.file_name),
            None => PathBuf::from(&self.export.file_name),
        }
    }
}

impl GridConfig {
    pub fn delimiter_char(&self) -> Result<char> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(eyre!(
                "delimiter must be a single character, got '{}'",
                self.delimiter
            )),
        }
    }

    pub fn hidden_keys(&self) -> Result<Vec<ColumnKey>> {
        self.hidden_fields
            .iter()
            .map(|name| match ColumnKey::parse(name) {
                Some(ColumnKey::Id) => Err(eyre!("The id column cannot be hidden")),
                Some(key) => Ok(key),
                None => Err(eyre!("Unknown column in hidden_fields: '{}'", name)),
            })
            .collect()
    }

    pub fn merge(&mut self, other: Self) {
        let default = GridConfig::default();
        if other.min_rows != default.min_rows {
            self.min_rows = other.min_rows;
        }
        if other.delimiter != default.delimiter {
            self.delimiter = other.delimiter;
        }
        if other.hidden_fields != default.hidden_fields {
            self.hidden_fields = other.hidden_fields;
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        if other.file_name != default.file_name {
            self.file_name = other.file_name;
        }
        if other.directory.is_some() {
            self.directory = other.directory;
        }
    }
}

impl UiConfig {
    pub fn merge(&mut self, other: Self) {
        let default = UiConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
        if other.double_click_ms != default.double_click_ms {
            self.double_click_ms = other.double_click_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    /// Every color slot with its config name.
    fn fields(&self) -> [(&'static str, &String); 13] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("error", &self.error),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("table_header", &self.table_header),
            ("table_border", &self.table_border),
            ("cell_selected", &self.cell_selected),
            ("cell_editing", &self.cell_editing),
            ("virtual_row", &self.virtual_row),
            ("modal_border", &self.modal_border),
            ("modal_border_error", &self.modal_border_error),
        ]
    }

    fn fields_mut(&mut self) -> [&mut String; 13] {
        [
            &mut self.primary,
            &mut self.secondary,
            &mut self.error,
            &mut self.dimmed,
            &mut self.controls_bg,
            &mut self.text_primary,
            &mut self.table_header,
            &mut self.table_border,
            &mut self.cell_selected,
            &mut self.cell_editing,
            &mut self.virtual_row,
            &mut self.modal_border,
            &mut self.modal_border_error,
        ]
    }

    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.fields() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        let theirs = other.fields().map(|(_, v)| v.clone());
        let defaults = default.fields().map(|(_, v)| v.clone());
        for ((slot, value), default) in self.fields_mut().into_iter().zip(theirs).zip(defaults) {
            if value != default {
                *slot = value;
            }
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// How many colors the terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// `NO_COLOR` is set: every color becomes the terminal default.
    Monochrome,
    Basic,
    Indexed,
    TrueColor,
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("light_gray", Color::Indexed(7)),
    ("gray", Color::Indexed(8)),
    ("dark_gray", Color::Indexed(8)),
    ("bright_black", Color::Indexed(8)),
    ("bright_red", Color::Indexed(9)),
    ("bright_green", Color::Indexed(10)),
    ("bright_yellow", Color::Indexed(11)),
    ("bright_blue", Color::Indexed(12)),
    ("bright_magenta", Color::Indexed(13)),
    ("bright_cyan", Color::Indexed(14)),
    ("bright_white", Color::Indexed(15)),
    ("reset", Color::Reset),
    // Drawn as the REVERSED modifier by the grid.
    ("reversed", Color::Reset),
];

/// Turns theme strings into colors the current terminal can display.
pub struct ColorParser {
    depth: ColorDepth,
}

impl ColorParser {
    /// Detect the depth from `NO_COLOR` and the terminal on stdout.
    pub fn new() -> Self {
        let depth = if std::env::var_os("NO_COLOR").is_some() {
            ColorDepth::Monochrome
        } else {
            match supports_color::on(Stream::Stdout) {
                Some(level) if level.has_16m => ColorDepth::TrueColor,
                Some(level) if level.has_256 => ColorDepth::Indexed,
                _ => ColorDepth::Basic,
            }
        };
        Self { depth }
    }

    pub fn with_depth(depth: ColorDepth) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    /// Accepts a color name, `indexed(n)` or `#rrggbb`.
    pub fn parse(&self, s: &str) -> Result<Color> {
        let value = s.trim();
        let color = if let Some(hex) = value.strip_prefix('#') {
            let (r, g, b) = parse_hex(hex).ok_or_else(|| eyre!("Invalid hex color: '{}'", value))?;
            self.fit_rgb(r, g, b)
        } else {
            let lower = value.to_lowercase();
            match lower
                .strip_prefix("indexed(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                Some(n) => Color::Indexed(n.trim().parse().map_err(|_| {
                    eyre!("Invalid indexed color: '{}'. Expected indexed(0-255)", value)
                })?),
                None => named_color(&lower).ok_or_else(|| {
                    eyre!(
                        "Unknown color name: '{}'. Use a basic or bright_ ANSI name, \
                         indexed(n) or #rrggbb",
                        value
                    )
                })?,
            }
        };
        if self.depth == ColorDepth::Monochrome {
            return Ok(Color::Reset);
        }
        Ok(color)
    }

    fn fit_rgb(&self, r: u8, g: u8, b: u8) -> Color {
        match self.depth {
            ColorDepth::TrueColor => Color::Rgb(r, g, b),
            ColorDepth::Indexed => Color::Indexed(rgb_to_256_color(r, g, b)),
            ColorDepth::Basic | ColorDepth::Monochrome => rgb_to_basic_ansi(r, g, b),
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn named_color(lower: &str) -> Option<Color> {
    let key = lower.replace(' ', "_").replace("grey", "gray");
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, color)| *color)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = u32::from_str_radix(hex, 16).ok()?;
    Some(((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

/// Nearest index in the xterm 256-color palette
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let spread = r.max(g).max(b) - r.min(g).min(b);
    if spread < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        return match gray {
            0..=7 => 16,
            248.. => 231,
            _ => 232 + ((gray - 8) * 24 / 240) as u8,
        };
    }

    let cube = |c: u8| (c as u16 * 5 / 255) as u8;
    16 + 36 * cube(r) + 6 * cube(g) + cube(b)
}

/// Nearest of the eight basic ANSI colors
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let spread = r.max(g).max(b) - r.min(g).min(b);
    if spread < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Parsed colors keyed by their config name
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .fields()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), parser.parse(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
