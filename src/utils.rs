//! Shared string helpers for turning STEO metadata into spreadsheet labels

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Boilerplate phrases that repeat across every series of a table and carry
/// no information once the series sits in its table's sheet.
pub const BOILERPLATE: [&str; 3] = [
    "Crude Oil Production",
    "Crude Oil and Liquid Fuels Supply",
    "Liquid Fuels Consumption",
];

/// Excel refuses sheet names longer than this.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Clean a series description into a column header
///
/// Removes the boilerplate phrases, normalizes whitespace and `", "`
/// separators, then strips the commas left dangling at either end.
///
/// # Examples
///
/// ```
/// use steo_scraper::utils::clean_description;
///
/// assert_eq!(clean_description("Crude Oil Production, East Coast"), "East Coast");
/// assert_eq!(clean_description("North America, Crude Oil Production"), "North America");
/// assert_eq!(clean_description("OECD Europe, Liquid Fuels Consumption"), "OECD Europe");
/// assert_eq!(clean_description("Canada, Mexico"), "Canada,Mexico");
/// ```
pub fn clean_description(description: &str) -> String {
    // Removing one phrase can splice the remains into another match.
    let mut cleaned = description.to_string();
    loop {
        let before = cleaned.len();
        for phrase in BOILERPLATE {
            cleaned = cleaned.replace(phrase, "");
        }
        if cleaned.len() == before {
            break;
        }
    }

    let cleaned = SPACE_RUN
        .replace_all(cleaned.trim(), " ")
        .replace(", ", ",");

    cleaned
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

/// Make a table key usable as an XLSX sheet name
///
/// Forbidden characters become `_`, apostrophes are stripped from both ends
/// and the name is cut to 31 characters. Normal table keys (`PAPR`, `COPR`,
/// ...) come back unchanged.
///
/// # Examples
///
/// ```
/// use steo_scraper::utils::sheet_name;
///
/// assert_eq!(sheet_name("PAPR"), "PAPR");
/// assert_eq!(sheet_name("A/B"), "A_B");
/// assert_eq!(sheet_name("'Q'"), "Q");
/// ```
pub fn sheet_name(table: &str) -> String {
    let replaced: String = table
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let truncated: String = replaced
        .trim_start_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let mut name = truncated.trim_end_matches('\'').to_string();
    if name.is_empty() {
        name.push('_');
    }

    if name != table {
        warn!("Sheet name for table {:?} rewritten to {:?}", table, name);
    }
    name
}
