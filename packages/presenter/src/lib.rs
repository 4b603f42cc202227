#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal rendering for the reports.
//!
//! Everything here returns a `String`; the binary decides where it goes.
//! Styling goes through `console`, which drops ANSI codes when stdout is
//! not a terminal.

pub mod chart;
pub mod narrative;
pub mod table;

/// Width of the plotting area of bar and line charts, in columns.
pub const CHART_WIDTH: usize = 60;

/// Height of line charts, in rows.
pub const CHART_HEIGHT: usize = 12;

/// Width that narrative text is wrapped to.
pub const TEXT_WIDTH: usize = 78;

/// Formats an integer with thousands separators (`1234567` → `1,234,567`).
#[must_use]
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats an optional count, showing a dash for a gap.
#[must_use]
pub fn format_optional(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), format_count)
}
