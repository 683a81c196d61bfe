//! Shared CLI definitions for workgrid.
//!
//! Used by the binary and by the build script that renders the manpage.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Serialized form of an import file.
/// When `--format` is not specified, the form is detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ImportFormat {
    /// JSON array of row records; replaces the whole grid
    Json,
    /// Comma-delimited text with a header line; rows are appended
    Csv,
}

impl ImportFormat {
    /// `.json` files use the structured form; anything else is read as delimited text.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
        {
            Some(ext) if ext == "json" => Self::Json,
            _ => Self::Csv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Command-line arguments for workgrid
#[derive(Clone, Parser, Debug)]
#[command(
    name = "workgrid",
    version,
    about = "Spreadsheet-style work-item grid in the Terminal"
)]
pub struct Args {
    /// File to import at start-up (.json replaces the grid, anything else is appended as CSV)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Force the import format instead of detecting it from the file extension
    #[arg(long = "format", value_enum)]
    pub format: Option<ImportFormat>,

    /// Delimiter used when importing delimited text (default: ',')
    #[arg(long = "delimiter")]
    pub delimiter: Option<char>,

    /// Minimum number of row slots shown by the grid (default: 25)
    #[arg(long = "min-rows", value_name = "N")]
    pub min_rows: Option<usize>,

    /// Start with no rows instead of the built-in sample work items
    #[arg(long = "empty", action)]
    pub empty: bool,

    /// Path the export action writes to (default: spreadsheet-data.json in the working directory)
    #[arg(long = "export-file", value_name = "FILE")]
    pub export_file: Option<PathBuf>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/workgrid/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_format_from_path() {
        assert_eq!(
            ImportFormat::from_path(Path::new("rows.json")),
            ImportFormat::Json
        );
        assert_eq!(
            ImportFormat::from_path(Path::new("ROWS.JSON")),
            ImportFormat::Json
        );
        assert_eq!(
            ImportFormat::from_path(Path::new("rows.csv")),
            ImportFormat::Csv
        );
        assert_eq!(ImportFormat::from_path(Path::new("rows")), ImportFormat::Csv);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "workgrid",
            "items.csv",
            "--delimiter",
            ";",
            "--min-rows",
            "40",
            "--debug",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("items.csv")));
        assert_eq!(args.delimiter, Some(';'));
        assert_eq!(args.min_rows, Some(40));
        assert!(args.debug);
        assert!(!args.empty);
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["workgrid", "--force"]).is_err());
        let args = Args::try_parse_from(["workgrid", "--generate-config", "--force"]).unwrap();
        assert!(args.generate_config && args.force);
    }

    #[test]
    fn test_format_flag_overrides_detection() {
        let args = Args::parse_from(["workgrid", "dump.txt", "--format", "json"]);
        assert_eq!(args.format, Some(ImportFormat::Json));
    }
}
