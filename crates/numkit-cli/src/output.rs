//! CLI output formatting.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Digits kept on each side when a long number is elided.
const ELIDE_KEEP: usize = 50;

/// Render a big number, eliding the middle of values longer than
/// `2 * ELIDE_KEEP` digits unless `full` is set.
#[must_use]
pub fn format_result(value: &impl Display, full: bool) -> String {
    let digits = value.to_string();
    let len = digits.len();
    if full || len <= 2 * ELIDE_KEEP {
        return digits;
    }
    let (head, rest) = digits.split_at(ELIDE_KEEP);
    let tail = &rest[rest.len() - ELIDE_KEEP..];
    format!("{head}...{tail} ({len} digits)")
}

/// Format a duration with a unit suited to its magnitude.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    match d.as_secs() {
        0 if d.as_micros() < 1000 => format!("{:.2}µs", d.as_secs_f64() * 1e6),
        0 => format!("{:.2}ms", d.as_secs_f64() * 1e3),
        s if s < 60 => format!("{:.3}s", d.as_secs_f64()),
        s => format!("{}m{:.1}s", s / 60, d.as_secs_f64() - (s / 60 * 60) as f64),
    }
}

/// Group the digits of `n` in threes with commas.
#[must_use]
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let lead = digits.len() % 3;
    let mut groups: Vec<&str> = Vec::new();
    if lead > 0 {
        groups.push(&digits[..lead]);
    }
    groups.extend(
        digits.as_bytes()[lead..]
            .chunks(3)
            .filter_map(|g| std::str::from_utf8(g).ok()),
    );
    groups.join(",")
}

/// Format an optional statistic, printing `-` for "no value".
#[must_use]
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v}"))
}

/// Write a value to a file.
pub fn write_to_file(path: impl AsRef<Path>, value: &impl Display) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{value}")?;
    Ok(())
}
