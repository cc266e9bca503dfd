//! Text formatting helpers shared by the report renderers.

use std::fmt::Write;

use crate::stats::Tally;

/// Width of section rules.
pub const RULE_WIDTH: usize = 80;

/// Write a `=`-ruled section title.
pub fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = write!(out, "\n{rule}\n{title}\n{rule}\n\n");
}

/// Write a `-`-ruled subsection title.
pub fn section(out: &mut String, title: &str) {
    let rule = "-".repeat(RULE_WIDTH);
    let _ = write!(out, "\n{rule}\n{title}\n{rule}\n\n");
}

/// Write a half-width `-`-ruled subsection title.
pub fn subsection(out: &mut String, title: &str) {
    let rule = "-".repeat(RULE_WIDTH / 2);
    let _ = write!(out, "\n{rule}\n{title}\n{rule}\n\n");
}

/// Closing `=` rule.
pub fn closing_rule(out: &mut String) {
    let _ = write!(out, "\n{}\n", "=".repeat(RULE_WIDTH));
}

/// Human-readable byte size (`1.50 KB`).
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} TB")
}

/// Render an optional number, `n/a` when absent.
pub fn opt_number(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Render an optional label, `none` when absent.
pub fn opt_label(value: Option<&str>) -> String {
    value.unwrap_or("none").to_string()
}

/// Write `label: count` lines ordered by descending count.
pub fn tally_lines(out: &mut String, tally: &Tally, indent: &str, suffix: &str) {
    for (label, count) in tally.by_count() {
        let _ = writeln!(out, "{indent}{label}: {count}{suffix}");
    }
}

/// Truncate to at most `max` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
