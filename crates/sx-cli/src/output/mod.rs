//! Output formatting utilities for the CLI
//!
//! Colored status lines on the terminal, plus the rendering of a finished
//! script run as either a status line or a JSON document.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use sx_core::SessionResult;

fn print_tagged(mut out: impl Write, color: Color, tag: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(tag),
        Print(" "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    print_tagged(std::io::stdout(), Color::Green, "✓", msg);
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr.
pub fn print_error(msg: &str) {
    print_tagged(std::io::stderr(), Color::Red, "✗", msg);
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    print_tagged(std::io::stderr(), Color::Yellow, "⚠", msg);
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    print_tagged(std::io::stdout(), Color::Cyan, "ℹ", msg);
}

/// Print an attach status reported by the service while it attaches.
///
/// Goes to stderr so stdout stays clean for `--json`.
pub fn print_status(status: &str) {
    print_tagged(
        std::io::stderr(),
        Color::Magenta,
        "⌚",
        &format!("status: {}", status),
    );
}

/// Render a result as a single JSON line
pub fn format_result_json(result: &SessionResult) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| {
        format!(r#"{{"result":"error","reason":"{}"}}"#, e)
    })
}

/// Print a finished run's result, as a status line or as JSON
pub fn print_result(result: &SessionResult, json: bool) {
    if json {
        println!("{}", format_result_json(result));
    } else if result.is_success() {
        print_success(&result.to_string());
    } else {
        print_error(&result.to_string());
    }
}
