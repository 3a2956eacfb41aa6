//! CLI subcommands

pub mod config;
pub mod connect;
pub mod scan;
pub mod status;
pub mod sync;
pub mod wipe;

use std::io::{BufRead, Write};

/// Yes/no prompt on stdin. Anything but `y`/`yes` declines.
pub(crate) fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N]: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Free-text prompt on stdin with a default shown in brackets.
///
/// Returns the default when the user just presses enter, `None` when stdin
/// is closed.
pub(crate) fn prompt_for_text(prompt: &str, default: &str) -> Option<String> {
    if default.is_empty() {
        print!("{prompt}: ");
    } else {
        print!("{prompt} [{default}]: ");
    }
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Some(default.to_string())
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}
