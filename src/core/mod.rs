//! Core engine: extraction, catalogs and build synchronization.
//!
//! ## Module Structure
//!
//! - `data`: Message model and source locations
//! - `parsers`: Per-grammar scanners (swc for JS/TS, lexers for PHP and Twig)
//! - `extract`: Extractors turning source text into messages
//! - `catalog`: In-memory gettext catalog with PO, MO and JED output
//! - `file_scanner`: Discovery of PHP and Twig sources
//! - `sync`: Per-build synchronizer

pub mod catalog;
pub mod data;
pub mod extract;
pub mod file_scanner;
pub mod parsers;
pub mod sync;
