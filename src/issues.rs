//! Diagnostics produced while synchronizing catalogs.
//!
//! None of these stop a build. Each issue carries what the reporter needs to
//! print it; the ones marked verbose-only are shown only with `-v`.

use enum_dispatch::enum_dispatch;

use crate::core::data::Location;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Note,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    MissingDomain,
    MissingLanguage,
    ParseError,
    CatalogFallback,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::MissingDomain => write!(f, "missing-domain"),
            Rule::MissingLanguage => write!(f, "missing-language"),
            Rule::ParseError => write!(f, "parse-error"),
            Rule::CatalogFallback => write!(f, "catalog-fallback"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// Translation call without a text domain argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDomainIssue {
    pub location: Location,
    pub msgid: String,
}

/// Locale catalog without a `Language` header; its MO and JED files are not
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingLanguageIssue {
    pub path: String,
}

/// Source file that could not be scanned and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

/// Catalog that could not be read or parsed and was replaced by an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFallbackIssue {
    pub path: String,
    pub error: String,
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingDomain(MissingDomainIssue),
    MissingLanguage(MissingLanguageIssue),
    ParseError(ParseErrorIssue),
    CatalogFallback(CatalogFallbackIssue),
}

impl Issue {
    /// Issues printed only in verbose mode.
    pub fn is_verbose_only(&self) -> bool {
        matches!(self, Issue::ParseError(_) | Issue::CatalogFallback(_))
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Position of a call site.
    Source(&'a Location),
    /// File-level only.
    File { path: &'a str },
}

impl ReportLocation<'_> {
    pub fn path(&self) -> &str {
        match self {
            ReportLocation::Source(location) => &location.file,
            ReportLocation::File { path } => path,
        }
    }
}

#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn severity(&self) -> Severity;

    fn rule(&self) -> Rule;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

impl Report for MissingDomainIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.location)
    }

    fn message(&self) -> String {
        format!("\"{}\" has no text domain", self.msgid)
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::MissingDomain
    }

    fn details(&self) -> Option<String> {
        Some("messages without a domain are left out of the template".to_string())
    }
}

impl Report for MissingLanguageIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File { path: &self.path }
    }

    fn message(&self) -> String {
        "catalog has no Language header".to_string()
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::MissingLanguage
    }

    fn details(&self) -> Option<String> {
        Some("MO and JSON files are not generated for this locale".to_string())
    }
}

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn severity(&self) -> Severity {
        Severity::Note
    }

    fn rule(&self) -> Rule {
        Rule::ParseError
    }
}

impl Report for CatalogFallbackIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File { path: &self.path }
    }

    fn message(&self) -> String {
        "started from an empty catalog".to_string()
    }

    fn severity(&self) -> Severity {
        Severity::Note
    }

    fn rule(&self) -> Rule {
        Rule::CatalogFallback
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    fn sort_position(&self) -> (usize, usize) {
        match self.location() {
            ReportLocation::Source(location) => (location.line, location.column),
            ReportLocation::File { .. } => (0, 0),
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.location()
            .path()
            .cmp(other.location().path())
            .then_with(|| self.sort_position().cmp(&other.sort_position()))
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
