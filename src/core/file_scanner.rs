use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Paths relative to the base directory, forward-slash separated.
    pub files: BTreeSet<String>,
    pub skipped_count: usize,
}

/// Walk `roots` under `base_dir` and collect files with one of `extensions`.
///
/// Roots may be literal directories or glob patterns expanding to
/// directories. Ignore entries are globs matched against the full path, or
/// literal paths relative to `base_dir` that exclude everything below them.
pub fn scan_files(
    base_dir: &Path,
    roots: &[String],
    ignore_patterns: &[String],
    extensions: &[&str],
    verbose: bool,
) -> ScanResult {
    let mut result = ScanResult::default();

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    let mut dirs_to_scan: Vec<PathBuf> = Vec::new();
    for root in roots {
        if is_glob_pattern(root) {
            let full_pattern = base_dir.join(root);
            match glob(&full_pattern.to_string_lossy()) {
                Ok(entries) => dirs_to_scan.extend(entries.flatten().filter(|e| e.is_dir())),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid glob pattern '{}': {}",
                            "warning:".bold().yellow(),
                            root,
                            e
                        );
                    }
                }
            }
        } else {
            let path = base_dir.join(root);
            if path.exists() {
                dirs_to_scan.push(path);
            } else if verbose {
                eprintln!(
                    "{} Source root does not exist: {}",
                    "warning:".bold().yellow(),
                    path.display()
                );
            }
        }
    }

    for dir in dirs_to_scan {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if literal_ignore_paths
                .iter()
                .any(|ignore_path| path.starts_with(ignore_path))
            {
                continue;
            }

            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            if path.is_file() && has_extension(path, extensions) {
                result.files.insert(relative_path(base_dir, path));
            }
        }
    }

    result
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

/// `path` relative to `base_dir` with forward slashes, as used in references.
pub fn relative_path(base_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    let relative = relative.strip_prefix(".").unwrap_or(relative);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
