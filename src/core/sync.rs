//! Per-build catalog synchronization.
//!
//! A build drives one [`Synchronizer`] through `reset`, then `accumulate`
//! for every JS/TS module it loads, then `finalize` once the bundles are
//! known. `finalize` discovers PHP, Twig and stylesheet sources itself,
//! rebuilds the template from scratch, folds it into every locale and
//! returns the files to write. Nothing touches the disk until
//! [`SyncOutput::write_all`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::Config;
use crate::core::catalog::{Catalog, CatalogEntry, LANGUAGE_HEADER};
use crate::core::data::Message;
use crate::core::extract::{
    Extract, Extractor, JsExtractor, PHP_EXTENSIONS, StylesheetExtractor, TEMPLATE_EXTENSIONS,
};
use crate::core::file_scanner::scan_files;
use crate::issues::{
    CatalogFallbackIssue, Issue, MissingDomainIssue, MissingLanguageIssue, ParseErrorIssue,
};

/// Inputs that stay fixed across builds.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub domain: String,
    /// Directory that every other path is relative to.
    pub root_dir: PathBuf,
    pub template: String,
    pub locales: Vec<String>,
    pub source_roots: Vec<String>,
    pub ignores: Vec<String>,
    pub stylesheet: Option<String>,
    pub json_dir: Option<String>,
    pub fold_length: usize,
    pub js: JsExtractor,
    pub verbose: bool,
}

impl SyncOptions {
    pub fn from_config(config: &Config, root_dir: &Path, verbose: bool) -> Self {
        Self {
            domain: config.domain.clone(),
            root_dir: root_dir.to_path_buf(),
            template: config.template.clone(),
            locales: config.locales.clone(),
            source_roots: config.source_roots.clone(),
            ignores: config.ignores.clone(),
            stylesheet: Some(config.stylesheet.clone()).filter(|s| !s.is_empty()),
            json_dir: config.json_dir.clone(),
            fold_length: config.fold_length,
            js: JsExtractor::new(config.js_module.clone(), config.js_global.clone()),
            verbose,
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root_dir.join(path)
    }
}

/// One output bundle reported by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Path of the emitted bundle; its hash names the JSON files.
    pub output_path: String,
    /// Source files that went into the bundle, as referenced in catalogs.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BuildInput {
    pub bundles: Vec<Bundle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct SyncOutput {
    pub files: Vec<OutputFile>,
    pub issues: Vec<Issue>,
    /// Number of source files that contributed messages or were scanned.
    pub source_files: usize,
    /// Number of messages added to the template.
    pub template_entries: usize,
}

impl SyncOutput {
    /// Write every output file, creating parent directories.
    pub fn write_all(&self) -> Result<()> {
        for file in &self.files {
            if let Some(parent) = file.path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&file.path, &file.contents)
                .with_context(|| format!("Failed to write {}", file.path.display()))?;
        }
        Ok(())
    }

    pub fn file(&self, path: &Path) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Name of a bundle's JED file for one locale.
pub fn jed_file_name(domain: &str, language: &str, bundle_output_path: &str) -> String {
    format!(
        "{}-{}-{:x}.json",
        domain,
        language,
        md5::compute(bundle_output_path.as_bytes())
    )
}

pub struct Synchronizer {
    options: SyncOptions,
    messages: Vec<Message>,
    issues: Vec<Issue>,
    accumulated_files: usize,
}

impl Synchronizer {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            messages: Vec::new(),
            issues: Vec::new(),
            accumulated_files: 0,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Forget everything accumulated by the previous build.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.issues.clear();
        self.accumulated_files = 0;
    }

    /// Extract messages from a JS/TS module loaded by the build.
    pub fn accumulate(&mut self, path: &str, source: &str) {
        self.accumulated_files += 1;
        let (messages, issue) = extract_file(&Extractor::Js(self.options.js.clone()), path, source);
        self.messages.extend(messages);
        self.issues.extend(issue);
    }

    /// Rebuild the template, sync every locale and compile runtime files.
    pub fn finalize(&self, input: &BuildInput) -> SyncOutput {
        let mut output = SyncOutput {
            issues: self.issues.clone(),
            ..Default::default()
        };

        let mut messages = self.messages.clone();
        let discovered = self.extract_discovered(&mut output);
        messages.extend(discovered);
        output.source_files += self.accumulated_files;

        for message in &messages {
            if message.domain.is_none() {
                output.issues.push(Issue::MissingDomain(MissingDomainIssue {
                    location: message.location.clone(),
                    msgid: message.msgid().to_string(),
                }));
            }
        }

        let template_path = self.options.resolve(&self.options.template);
        let mut template = self.load_catalog(&template_path, &mut output);
        template.clear();
        for message in messages.iter().filter(|m| m.in_domain(&self.options.domain)) {
            template.set(message);
        }
        output.template_entries = template.len();
        output.files.push(OutputFile {
            path: template_path,
            contents: template.to_po_string(self.options.fold_length).into_bytes(),
        });

        for locale in &self.options.locales {
            let locale_path = self.options.resolve(locale);
            let mut catalog = self.load_catalog(&locale_path, &mut output);
            catalog.update_from_template(&template);
            output.files.push(OutputFile {
                path: locale_path.clone(),
                contents: catalog.to_po_string(self.options.fold_length).into_bytes(),
            });

            match catalog.header(LANGUAGE_HEADER).filter(|l| !l.is_empty()) {
                Some(language) => {
                    self.compile_locale(&catalog, &locale_path, language, input, &mut output)
                }
                None => output.issues.push(Issue::MissingLanguage(MissingLanguageIssue {
                    path: locale.clone(),
                })),
            }
        }

        output.issues.sort();
        output
    }

    fn load_catalog(&self, path: &Path, output: &mut SyncOutput) -> Catalog {
        let (catalog, error) = Catalog::load_with_status(path);
        if let Some(error) = error {
            output.issues.push(Issue::CatalogFallback(CatalogFallbackIssue {
                path: path.display().to_string(),
                error: format!("{:#}", error),
            }));
        }
        catalog
    }

    fn compile_locale(
        &self,
        catalog: &Catalog,
        locale_path: &Path,
        language: &str,
        input: &BuildInput,
        output: &mut SyncOutput,
    ) {
        output.files.push(OutputFile {
            path: locale_path.with_extension("mo"),
            contents: catalog.to_mo(|_| true),
        });

        let json_dir = match &self.options.json_dir {
            Some(dir) => self.options.resolve(dir),
            None => locale_path
                .parent()
                .map_or_else(|| self.options.root_dir.clone(), Path::to_path_buf),
        };

        for bundle in &input.bundles {
            let in_bundle = |entry: &CatalogEntry| {
                bundle
                    .sources
                    .iter()
                    .any(|source| entry.references_file(source))
            };
            let Some(document) = catalog.to_jed(&self.options.domain, in_bundle) else {
                continue;
            };
            let contents = match document.to_json() {
                Ok(json) => json.into_bytes(),
                Err(e) => {
                    output.issues.push(Issue::ParseError(ParseErrorIssue {
                        file_path: bundle.output_path.clone(),
                        error: format!("Failed to serialize JED: {}", e),
                    }));
                    continue;
                }
            };
            output.files.push(OutputFile {
                path: json_dir.join(jed_file_name(
                    &self.options.domain,
                    language,
                    &bundle.output_path,
                )),
                contents,
            });
        }
    }

    /// Scan and extract PHP, Twig and the theme stylesheet in parallel.
    fn extract_discovered(&self, output: &mut SyncOutput) -> Vec<Message> {
        let extensions: Vec<&str> = PHP_EXTENSIONS
            .iter()
            .chain(TEMPLATE_EXTENSIONS)
            .copied()
            .collect();
        let scan = scan_files(
            &self.options.root_dir,
            &self.options.source_roots,
            &self.options.ignores,
            &extensions,
            self.options.verbose,
        );

        let mut jobs: Vec<(String, Extractor)> = scan
            .files
            .into_iter()
            .filter_map(|file| {
                let extractor = Extractor::for_path(Path::new(&file), &self.options.js)?;
                Some((file, extractor))
            })
            .collect();
        if let Some(stylesheet) = &self.options.stylesheet
            && self.options.resolve(stylesheet).is_file()
        {
            jobs.push((
                stylesheet.clone(),
                Extractor::Stylesheet(StylesheetExtractor),
            ));
        }
        output.source_files += jobs.len();

        let results: Vec<(Vec<Message>, Option<Issue>)> = jobs
            .par_iter()
            .map(|(file, extractor)| {
                match fs::read_to_string(self.options.resolve(file)) {
                    Ok(source) => extract_file(extractor, file, &source),
                    Err(e) => (
                        Vec::new(),
                        Some(Issue::ParseError(ParseErrorIssue {
                            file_path: file.clone(),
                            error: format!("Failed to read file: {}", e),
                        })),
                    ),
                }
            })
            .collect();

        let mut messages = Vec::new();
        for (found, issue) in results {
            messages.extend(found);
            output.issues.extend(issue);
        }
        messages
    }
}

/// Guarded extraction that reports an unparseable file instead of failing.
fn extract_file(extractor: &Extractor, path: &str, source: &str) -> (Vec<Message>, Option<Issue>) {
    if !extractor.might_have_translations(source) {
        return (Vec::new(), None);
    }
    match extractor.extract(source, path) {
        Ok(messages) => (messages, None),
        Err(e) => (
            Vec::new(),
            Some(Issue::ParseError(ParseErrorIssue {
                file_path: path.to_string(),
                error: e.to_string(),
            })),
        ),
    }
}
