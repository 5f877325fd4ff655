//! Output filename convention for generated PDFs.
//!
//! Every generated document is named `File <N>.pdf`, where `N` is a positive
//! integer. The next name is derived from what already exists in the output
//! directory: the largest `N` found plus one. Deleting a file never renumbers
//! the others, so gaps are expected:
//!
//! - `[]` → `File 1.pdf`
//! - `[File 1.pdf, File 3.pdf]` → `File 4.pdf`
//! - `[File 2.pdf, notes.pdf]` → `File 3.pdf` (non-matching names are ignored)
//!
//! Ordering is taken from the names alone, never from filesystem timestamps.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static OUTPUT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^File (\d+)\.pdf$").expect("output name pattern is valid"));

/// Extract `N` from a name of exactly the form `File <N>.pdf`.
///
/// Returns `None` for anything else, including names whose number does not
/// fit in a `u32`.
pub fn parse_output_number(name: &str) -> Option<u32> {
    OUTPUT_NAME
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Format the output name for a given number.
pub fn output_name(number: u32) -> String {
    format!("File {number}.pdf")
}

/// Choose the name for the next generated document.
///
/// Returns `None` once `File 4294967295.pdf` exists, since no larger number
/// can be written.
pub fn next_output_name<'a>(existing: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let max = existing
        .into_iter()
        .filter_map(parse_output_number)
        .max()
        .unwrap_or(0);
    max.checked_add(1).map(output_name)
}

/// Sort order for the recent list: numbered outputs newest first, then any
/// other `.pdf` names alphabetically.
pub fn recent_order(a: &str, b: &str) -> Ordering {
    match (parse_output_number(a), parse_output_number(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
