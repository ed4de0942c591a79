use std::path::PathBuf;

use crate::cli::exit_status::ExitStatus;
use crate::issues::{Issue, Report, Severity};

#[derive(Debug)]
pub enum CommandSummary {
    Sync(SyncSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct SyncSummary {
    pub source_files: usize,
    pub template_entries: usize,
    /// Files written, or that would be written in a dry run.
    pub files: Vec<PathBuf>,
    pub is_dry_run: bool,
}

#[derive(Debug)]
pub struct InitSummary {
    /// False when a config file already existed.
    pub created: bool,
}

/// Result of running a potsync command
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub issues: Vec<Issue>,
    /// If true, warnings turn the exit status into a failure.
    pub deny_warnings: bool,
}

impl CommandResult {
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Warning)
            .count()
    }

    pub fn exit_status(&self) -> ExitStatus {
        match &self.summary {
            CommandSummary::Init(InitSummary { created: false }) => ExitStatus::Failure,
            _ if self.deny_warnings && self.warning_count() > 0 => ExitStatus::Failure,
            _ => ExitStatus::Success,
        }
    }
}
