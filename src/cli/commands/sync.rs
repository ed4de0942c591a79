//! The `sync` command: one full build without a bundler.
//!
//! Every JS/TS file under the configured roots is accumulated as a module
//! and also stands in for its own bundle, so each script gets a JED file
//! keyed by its own path.

use std::{env, fs};

use anyhow::{Context, Result};

use super::{CommandResult, CommandSummary, SyncSummary};
use crate::cli::args::SyncCommand;
use crate::config::load_config;
use crate::core::extract::JS_EXTENSIONS;
use crate::core::file_scanner::scan_files;
use crate::core::sync::{BuildInput, Bundle, SyncOptions, Synchronizer};

pub fn sync(cmd: SyncCommand) -> Result<CommandResult> {
    let verbose = cmd.common.verbose;
    let start_dir = match &cmd.common.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to read the current directory")?,
    };

    let loaded = load_config(&start_dir)?;
    let mut config = loaded.config;
    if let Some(domain) = &cmd.common.domain {
        config.domain = domain.clone();
        config.validate()?;
    }
    if verbose && !loaded.from_file {
        eprintln!("No config file found, using defaults");
    }

    let root_dir = loaded.root_dir;
    let scan = scan_files(
        &root_dir,
        &config.source_roots,
        &config.ignores,
        JS_EXTENSIONS,
        verbose,
    );

    let mut synchronizer = Synchronizer::new(SyncOptions::from_config(&config, &root_dir, verbose));
    synchronizer.reset();

    let mut bundles = Vec::with_capacity(scan.files.len());
    for file in scan.files {
        let source = match fs::read_to_string(root_dir.join(&file)) {
            Ok(source) => source,
            Err(e) => {
                if verbose {
                    eprintln!("Warning: Failed to read {}: {}", file, e);
                }
                continue;
            }
        };
        synchronizer.accumulate(&file, &source);
        bundles.push(Bundle {
            output_path: file.clone(),
            sources: vec![file],
        });
    }

    let output = synchronizer.finalize(&BuildInput { bundles });
    if !cmd.dry_run {
        output.write_all()?;
    }

    Ok(CommandResult {
        summary: CommandSummary::Sync(SyncSummary {
            source_files: output.source_files,
            template_entries: output.template_entries,
            files: output.files.iter().map(|file| file.path.clone()).collect(),
            is_dry_run: cmd.dry_run,
        }),
        issues: output.issues,
        deny_warnings: cmd.deny_warnings,
    })
}
