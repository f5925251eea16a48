//! Display utilities for the CLI

use cipherbank_core::RegistryEvent;
use colored::*;

const RULE_WIDTH: usize = 60;

/// Print a section header
pub fn section(title: &str) {
    let rule = "━".repeat(RULE_WIDTH);
    println!();
    println!("{}", rule.bright_black());
    println!(" {}", title.bright_white().bold());
    println!("{}", rule.bright_black());
}

/// Print a success message
pub fn success(message: &str) {
    println!("  {} {}", "✓".bright_green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    println!("  {} {}", "✗".bright_red(), message.bright_red());
}

/// Print an info message
pub fn info(message: &str) {
    println!("  {} {}", "→".bright_blue(), message);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("      {}: {}", key, value.bright_cyan());
}

/// Print one emitted event
pub fn event(event: &RegistryEvent) {
    println!(
        "  {} {} {}",
        "◆".bright_magenta(),
        event.name().bright_white(),
        event.summary().bright_black()
    );
}
