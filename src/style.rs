//! Terminal output for the CLI. Diagnostics go to stderr so stdout stays
//! clean for reports and quick-check messages.

use crate::model::Severity;
use colored::Colorize;
use crossterm::style::Color;
use std::io::{self, IsTerminal, Write};
use termimad::{MadSkin, StyledChar};

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green().bold(), msg);
}

pub fn hint(msg: &str) {
    eprintln!("{} {}", "hint:".dimmed(), msg.dimmed());
}

pub fn header(msg: &str) {
    eprintln!("{}", msg.cyan().bold());
}

pub fn path(p: &std::path::Path) -> String {
    p.display().to_string().bright_white().to_string()
}

pub fn metric(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {}: {}", label.dimmed(), value.to_string().cyan())
}

/// Severity label colored by how urgently it needs attention.
pub fn severity(severity: Severity) -> String {
    let label = severity.to_string();
    match severity {
        Severity::Critical => label.red().bold().to_string(),
        Severity::Major => label.yellow().to_string(),
        Severity::Minor => label.blue().to_string(),
    }
}

/// Render markdown with the audit skin when stdout is a terminal, plain
/// otherwise.
pub fn render_markdown(markdown: &str, output: &mut dyn Write) -> io::Result<()> {
    if io::stdout().is_terminal() {
        write!(output, "{}", skin().term_text(markdown))
    } else {
        write!(output, "{}", markdown)
    }
}

fn skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.set_headers_fg(Color::Cyan);
    skin.bold.set_fg(Color::White);
    skin.bullet = StyledChar::from_fg_char(Color::Blue, '•');
    // element names are rendered as inline code
    skin.inline_code.set_fg(Color::Yellow);
    skin.italic.set_fg(Color::DarkGrey);
    skin.horizontal_rule = StyledChar::from_fg_char(Color::DarkGrey, '─');
    skin
}
