//! Styled terminal messages.

use console::style;

/// Check if color output is disabled via `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var("NO_COLOR").is_ok()
}

/// Print an error message to stderr.
pub fn print_error(text: &str) {
    if is_color_disabled() {
        eprintln!("[ERROR] {text}");
    } else {
        eprintln!("{} {text}", style("[ERROR]").red().bold());
    }
}

/// Print a warning to stderr.
pub fn print_warning(text: &str) {
    if is_color_disabled() {
        eprintln!("[WARN] {text}");
    } else {
        eprintln!("{} {text}", style("[WARN]").yellow().bold());
    }
}
