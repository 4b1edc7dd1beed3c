//! Console output helpers for the command-line binary.
//!
//! The library itself never prints; only the binary goes through these.

use console::style;

/// Print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}
