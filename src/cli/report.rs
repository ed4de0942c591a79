//! Report formatting and printing utilities.
//!
//! Issues are printed cargo-style. Kept apart from the sync engine so that
//! potsync can be driven as a library by a bundler integration.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{CommandResult, CommandSummary, InitSummary, SyncSummary};
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult, verbose: bool) {
    let mut stdout = io::stdout().lock();
    match &result.summary {
        CommandSummary::Sync(summary) => {
            report_to(&result.issues, verbose, &mut stdout);
            print_sync_to(summary, verbose, &mut stdout);
        }
        CommandSummary::Init(summary) => print_init(summary),
    }
}

/// Print issues to a custom writer. Notes only show up with `verbose`.
pub fn report_to<W: Write>(issues: &[Issue], verbose: bool, writer: &mut W) {
    let mut shown: Vec<&Issue> = issues
        .iter()
        .filter(|issue| verbose || !issue.is_verbose_only())
        .collect();
    if shown.is_empty() {
        return;
    }
    shown.sort();

    for issue in &shown {
        print_issue(issue, writer);
    }

    print_summary(&shown, writer);
}

fn print_issue<W: Write>(issue: &Issue, writer: &mut W) {
    let severity = match issue.severity() {
        Severity::Warning => "warning".bold().yellow(),
        Severity::Note => "note".bold().cyan(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity,
        issue.message(),
        issue.rule().to_string().dimmed().cyan()
    );

    match issue.location() {
        ReportLocation::Source(location) => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), location);
        }
        ReportLocation::File { path } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(writer, "   {} {} {}", "=".blue(), "note:".bold(), details);
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[&Issue], writer: &mut W) {
    let warnings = issues
        .iter()
        .filter(|issue| issue.severity() == Severity::Warning)
        .count();
    let notes = issues.len() - warnings;

    let mut parts = Vec::new();
    if warnings > 0 {
        parts.push(format!("{} {}", warnings, plural(warnings, "warning", "warnings")));
    }
    if notes > 0 {
        parts.push(format!("{} {}", notes, plural(notes, "note", "notes")));
    }

    let total = issues.len();
    let line = format!(
        "{} {} {} ({})",
        FAILURE_MARK,
        total,
        plural(total, "problem", "problems"),
        parts.join(", ")
    );
    let _ = if warnings > 0 {
        writeln!(writer, "{}", line.bold().yellow())
    } else {
        writeln!(writer, "{}", line.bold())
    };
    let _ = writeln!(writer);
}

fn print_sync_to<W: Write>(summary: &SyncSummary, verbose: bool, writer: &mut W) {
    if verbose || summary.is_dry_run {
        let verb = if summary.is_dry_run { "Would write" } else { "Wrote" };
        for path in &summary.files {
            let _ = writeln!(writer, "{} {}", verb.dimmed(), path.display());
        }
    }

    let message = format!(
        "Synced {} {} from {} source {}",
        summary.template_entries,
        plural(summary.template_entries, "message", "messages"),
        summary.source_files,
        plural(summary.source_files, "file", "files"),
    );
    let _ = if summary.is_dry_run {
        writeln!(
            writer,
            "{} {} {}",
            SUCCESS_MARK.green(),
            message.green(),
            "(dry run)".dimmed()
        )
    } else {
        writeln!(writer, "{} {}", SUCCESS_MARK.green(), message.green())
    };
}

fn print_init(summary: &InitSummary) {
    if summary.created {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        eprintln!("Error: {} already exists", CONFIG_FILE_NAME);
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
