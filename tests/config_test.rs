use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use workgrid::config::{AppConfig, ConfigManager, Theme};
use workgrid::schema::ColumnKey;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_config(manager: &ConfigManager, content: &str) {
    manager.ensure_config_dir().expect("Failed to create config dir");
    fs::write(manager.config_path("config.toml"), content).expect("Failed to write config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.grid.min_rows, 25);
    assert_eq!(config.grid.delimiter, ",");
    assert_eq!(config.grid.hidden_fields, vec!["url", "submitted"]);
    assert_eq!(config.export.file_name, "spreadsheet-data.json");
    assert!(config.export.directory.is_none());
    assert_eq!(config.ui.event_poll_interval_ms, 25);
    assert_eq!(config.ui.double_click_ms, 400);
    assert_eq!(config.theme.colors.cell_selected, "reversed");
    assert!(!config.debug.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[grid]"));
    assert!(template.contains("[export]"));
    assert!(template.contains("[ui]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_generated_template_parses_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    let config = AppConfig::load_from(&config_manager).expect("Template should load");
    let defaults = AppConfig::default();
    assert_eq!(config.grid.min_rows, defaults.grid.min_rows);
    assert_eq!(config.grid.hidden_fields, defaults.grid.hidden_fields);
    assert_eq!(config.export.file_name, defaults.export.file_name);
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    fs::write(&first_path, "garbage").unwrap();

    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
    let content = fs::read_to_string(&second_path).unwrap();
    assert!(content.contains("[grid]"));
}

#[test]
fn test_load_config_with_no_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Should load default config");
    assert_eq!(config.version, "0.1");
    assert_eq!(config.grid.min_rows, 25);
}

#[test]
fn test_load_partial_config_keeps_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(
        &config_manager,
        r##"
version = "0.1"

[grid]
min_rows = 40
delimiter = ";"

[theme.colors]
primary = "#00ff00"
"##,
    );

    let config = AppConfig::load_from(&config_manager).expect("Should load");
    assert_eq!(config.grid.min_rows, 40);
    assert_eq!(config.grid.delimiter, ";");
    assert_eq!(config.grid.hidden_fields, vec!["url", "submitted"]);
    assert_eq!(config.theme.colors.primary, "#00ff00");
    assert_eq!(config.theme.colors.error, "red");
    assert_eq!(config.ui.double_click_ms, 400);

    let options = config.grid_options().unwrap();
    assert_eq!(options.min_rows, 40);
    assert_eq!(options.delimiter, ';');
    assert_eq!(options.hidden_fields, vec![ColumnKey::Url, ColumnKey::Submitted]);
}

#[test]
fn test_hidden_fields_and_export_directory() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(
        &config_manager,
        r#"
[grid]
hidden_fields = ["estValue", "dueDate", "url"]

[export]
file_name = "jobs.json"
directory = "/tmp/workgrid-exports"
"#,
    );

    let config = AppConfig::load_from(&config_manager).expect("Should load");
    assert_eq!(
        config.grid_options().unwrap().hidden_fields,
        vec![ColumnKey::EstValue, ColumnKey::DueDate, ColumnKey::Url]
    );
    assert_eq!(
        config.export_path(),
        PathBuf::from("/tmp/workgrid-exports/jobs.json")
    );
}

#[test]
fn test_invalid_toml_is_an_error() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(&config_manager, "[grid\nmin_rows = ");

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_invalid_values_are_rejected() {
    std::env::remove_var("NO_COLOR");
    let (_temp_dir, config_manager) = setup_test_config_dir();

    for bad in [
        "version = \"0.9\"",
        "[grid]\nmin_rows = 0",
        "[grid]\ndelimiter = \"\"",
        "[grid]\nhidden_fields = [\"id\"]",
        "[grid]\nhidden_fields = [\"notes\"]",
        "[ui]\ndouble_click_ms = 0",
        "[theme.colors]\nerror = \"not_a_color\"",
    ] {
        write_config(&config_manager, bad);
        assert!(
            AppConfig::load_from(&config_manager).is_err(),
            "expected rejection of {:?}",
            bad
        );
    }
}

#[test]
fn test_theme_from_default_config() {
    std::env::remove_var("NO_COLOR");
    let config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).expect("Default theme should parse");
    assert_eq!(theme.colors.len(), 13);
    assert!(theme.colors.contains_key("virtual_row"));
    assert!(!theme.colors.contains_key("text_inverse"));
    assert_eq!(theme.get("no_such_color"), ratatui::style::Color::Reset);
}
