//! potsync - keep gettext catalogs in sync with your sources
//!
//! potsync extracts translatable strings from JS/TS, PHP, Twig and the theme
//! stylesheet header, rebuilds the POT template, merges it into every locale
//! PO file and compiles MO files plus per-bundle JED JSON for scripts.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction, catalog engine and the build synchronizer
//! - `issues`: Issue type definitions and reporting

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
