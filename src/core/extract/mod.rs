//! Per-grammar extractors.
//!
//! Every extractor turns source text into [`Message`]s. They share the call
//! table in [`calls`] and the translator-comment fold in [`comments`]; only
//! the scanning differs.

pub mod calls;
pub mod comments;
pub mod js;
pub mod php;
pub mod stylesheet;
pub mod template;

use std::path::Path;

use anyhow::Result;
use enum_dispatch::enum_dispatch;

pub use calls::{CALLS, CallShape, CallSpec, lookup_call, might_contain_call};
pub use comments::{SourceComment, attach_translator_comments};
pub use js::JsExtractor;
pub use php::PhpExtractor;
pub use stylesheet::StylesheetExtractor;
pub use template::TemplateExtractor;

use crate::core::data::Message;

pub const JS_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];
pub const PHP_EXTENSIONS: &[&str] = &["php"];
pub const TEMPLATE_EXTENSIONS: &[&str] = &["twig"];

#[enum_dispatch]
pub trait Extract {
    /// Cheap string scan run before parsing. Never a false negative.
    fn might_have_translations(&self, source: &str) -> bool;

    /// Parse `source` and collect its messages.
    ///
    /// Fails only when the whole file cannot be scanned; individual calls
    /// with non-literal arguments are skipped.
    fn extract(&self, source: &str, filename: &str) -> Result<Vec<Message>>;

    /// Guarded extraction that treats an unparseable file as empty.
    fn extract_translations(&self, source: &str, filename: &str) -> Vec<Message> {
        if !self.might_have_translations(source) {
            return Vec::new();
        }
        self.extract(source, filename).unwrap_or_default()
    }
}

#[enum_dispatch(Extract)]
#[derive(Debug, Clone)]
pub enum Extractor {
    Js(JsExtractor),
    Php(PhpExtractor),
    Template(TemplateExtractor),
    Stylesheet(StylesheetExtractor),
}

impl Extractor {
    /// Pick the call-based extractor for a path by its extension.
    ///
    /// The stylesheet extractor is never selected here: only the configured
    /// theme stylesheet is scanned for a header.
    pub fn for_path(path: &Path, js: &JsExtractor) -> Option<Extractor> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let ext = ext.as_str();
        if JS_EXTENSIONS.contains(&ext) {
            Some(Extractor::Js(js.clone()))
        } else if PHP_EXTENSIONS.contains(&ext) {
            Some(Extractor::Php(PhpExtractor))
        } else if TEMPLATE_EXTENSIONS.contains(&ext) {
            Some(Extractor::Template(TemplateExtractor))
        } else {
            None
        }
    }
}
