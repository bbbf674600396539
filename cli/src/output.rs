//! Status lines for CLI commands
//!
//! Status lines go to stderr. `heading` prints on stdout because it titles
//! result tables.

use colored::Colorize;

/// Print success message
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    eprintln!("{} {}", "ℹ".blue(), msg);
}

/// Bold section heading on stdout
pub fn heading(title: &str) {
    println!("{}", title.bold());
}
