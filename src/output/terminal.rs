// Colored terminal output for a single verdict.

use colored::{ColoredString, Colorize};

use crate::scoring::{Status, Verdict};

/// Display a verdict in the terminal.
pub fn display_verdict(url: &str, verdict: &Verdict) {
    println!("\n{}", format!("=== {url} ===").bold());
    println!(
        "  Score:       {} / 100  {}",
        verdict.score.to_string().bold(),
        colorize_status(verdict.status)
    );
    println!("  Category:    {}", verdict.category);
    println!("  Description: {}", verdict.description.dimmed());

    if verdict.red_flags.is_empty() {
        println!("  {}", "No red flags found".green());
    } else {
        println!("  Red flags:");
        for flag in &verdict.red_flags {
            println!("    {} {flag}", "!".red().bold());
        }
    }
    println!();
}

pub fn colorize_status(status: Status) -> ColoredString {
    match status {
        Status::Safe => status.as_str().green().bold(),
        Status::Suspicious => status.as_str().yellow().bold(),
        Status::Dangerous => status.as_str().red().bold(),
    }
}
