//! Sort Engine: single-column, stable, type-aware ordering of rows.

use chrono::NaiveDate;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization as _;

use crate::row::{Row, DATE_FORMAT};
use crate::schema::ColumnKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub column: ColumnKey,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn ascending(column: ColumnKey) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    /// Same column flips the direction; a different column starts ascending.
    pub fn toggle(current: Option<&SortDirective>, column: ColumnKey) -> Self {
        match current {
            Some(d) if d.column == column => Self {
                column,
                direction: d.direction.flip(),
            },
            _ => Self::ascending(column),
        }
    }
}

/// How a column's values compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortClass {
    Numeric,
    Date,
    Text,
}

impl SortClass {
    pub fn of(column: ColumnKey) -> Self {
        match column {
            ColumnKey::EstValue => SortClass::Numeric,
            ColumnKey::Submitted | ColumnKey::DueDate => SortClass::Date,
            _ => SortClass::Text,
        }
    }
}

fn non_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9]").expect("valid regex"))
}

/// Digits of `s` with separators and units removed, leading zeros trimmed.
/// `None` when the value holds no digits at all.
pub fn numeric_key(s: &str) -> Option<String> {
    let digits = non_digits().replace_all(s, "");
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

/// Arbitrary-length integer comparison on normalized digit strings.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (numeric_key(a), numeric_key(b)) {
        (Some(a), Some(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(&b)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse the `DD-MM-YYYY` form used by the date columns.
pub fn parse_grid_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Unparseable dates compare as the lowest possible date.
fn compare_dates(a: &str, b: &str) -> Ordering {
    parse_grid_date(a).cmp(&parse_grid_date(b))
}

/// Base letters only: decomposed, accents dropped, lowercased.
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Collation order for text: base letters first, then accents (unaccented first),
/// then case (lowercase first).
fn compare_text(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| {
            a.nfd()
                .flat_map(char::to_lowercase)
                .cmp(b.nfd().flat_map(char::to_lowercase))
        })
        .then_with(|| b.cmp(a))
}

pub fn compare_values(class: SortClass, a: &str, b: &str) -> Ordering {
    match class {
        SortClass::Numeric => compare_numeric(a, b),
        SortClass::Date => compare_dates(a, b),
        SortClass::Text => compare_text(a, b),
    }
}

pub fn compare_rows(a: &Row, b: &Row, directive: &SortDirective) -> Ordering {
    let class = SortClass::of(directive.column);
    let ord = compare_values(
        class,
        &a.text(directive.column),
        &b.text(directive.column),
    );
    match directive.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Reorder `rows` in place. The sort is stable: equal keys keep their prior order.
pub fn sort_rows(rows: &mut [Row], directive: &SortDirective) {
    rows.sort_by(|a, b| compare_rows(a, b, directive));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::sample_rows;

    fn ids(rows: &[Row]) -> Vec<u64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_toggle_directive() {
        let first = SortDirective::toggle(None, ColumnKey::Status);
        assert_eq!(first.direction, SortDirection::Ascending);
        let second = SortDirective::toggle(Some(&first), ColumnKey::Status);
        assert_eq!(second.direction, SortDirection::Descending);
        let third = SortDirective::toggle(Some(&second), ColumnKey::Status);
        assert_eq!(third.direction, SortDirection::Ascending);
        let other = SortDirective::toggle(Some(&second), ColumnKey::Url);
        assert_eq!(other, SortDirective::ascending(ColumnKey::Url));
    }

    #[test]
    fn test_est_value_numeric_order() {
        let mut rows = sample_rows();
        sort_rows(&mut rows, &SortDirective::ascending(ColumnKey::EstValue));
        let values: Vec<&str> = rows.iter().map(|r| r.est_value.as_str()).collect();
        assert_eq!(
            values,
            vec!["2,800,000", "3,500,000", "4,750,000", "5,900,000", "6,200,000"]
        );
    }

    #[test]
    fn test_numeric_ignores_separator_style() {
        assert_eq!(compare_numeric("1.000.000", "999,999"), Ordering::Greater);
        assert_eq!(compare_numeric("$ 12", "12 EUR"), Ordering::Equal);
        assert_eq!(compare_numeric("", "0"), Ordering::Less);
        assert_eq!(
            compare_numeric("123456789012345678901234567890", "9"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_dates_compare_by_calendar() {
        let mut rows = sample_rows();
        sort_rows(&mut rows, &SortDirective::ascending(ColumnKey::Submitted));
        assert_eq!(ids(&rows), vec![2, 1, 3, 4, 5]);

        assert_eq!(compare_dates("not a date", "01-01-1900"), Ordering::Less);
        assert_eq!(compare_dates("31-12-2024", "01-01-2025"), Ordering::Less);
    }

    #[test]
    fn test_descending_inverts() {
        let mut rows = sample_rows();
        let directive = SortDirective {
            column: ColumnKey::EstValue,
            direction: SortDirection::Descending,
        };
        sort_rows(&mut rows, &directive);
        assert_eq!(ids(&rows), vec![1, 4, 3, 2, 5]);
    }

    #[test]
    fn test_stable_ties_survive_toggling() {
        // Rows 1 and 3 share priority Medium, rows 4 and 5 share Low.
        let mut rows = sample_rows();
        let asc = SortDirective::toggle(None, ColumnKey::Priority);
        sort_rows(&mut rows, &asc);
        assert_eq!(ids(&rows), vec![2, 4, 5, 1, 3]);

        let desc = SortDirective::toggle(Some(&asc), ColumnKey::Priority);
        sort_rows(&mut rows, &desc);
        assert_eq!(ids(&rows), vec![1, 3, 4, 5, 2]);

        let asc_again = SortDirective::toggle(Some(&desc), ColumnKey::Priority);
        sort_rows(&mut rows, &asc_again);
        assert_eq!(ids(&rows), vec![2, 4, 5, 1, 3]);
    }

    #[test]
    fn test_text_compare_is_case_insensitive() {
        assert_eq!(compare_text("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_text("a", "A"), Ordering::Less);
        assert_eq!(compare_text("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_text_compare_folds_accents() {
        assert_eq!(compare_text("Émile", "Zoe"), Ordering::Less);
        assert_eq!(compare_text("résumé", "resume"), Ordering::Greater);
        assert_eq!(compare_text("éclair", "Eclair"), Ordering::Greater);
        assert_eq!(compare_text("Ångström", "angstrom"), Ordering::Greater);
        assert_eq!(compare_text("côte", "cote"), Ordering::Greater);
        assert_eq!(compare_text("côte", "cotes"), Ordering::Less);
    }
}
