//! Theme stylesheet header extractor.
//!
//! Only the first `/* ... */` block of the file is inspected. Each known
//! header field yields one message annotated with what the field is.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::data::{LineIndex, Message, MessageKind};
use crate::core::extract::Extract;

const GUARD: &str = "Theme Name:";

/// `(header field, translator annotation)`
const FIELDS: &[(&str, &str)] = &[
    ("Theme Name", "Theme Name of the theme"),
    ("Description", "Description of the theme"),
    ("Theme URI", "Theme URI of the theme"),
    ("Author", "Author of the theme"),
    ("Author URI", "Author URI of the theme"),
];

static FIELD_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    FIELDS
        .iter()
        .map(|(field, _)| header_regex(field))
        .collect()
});

static TEXT_DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| header_regex("Text Domain"));

fn header_regex(field: &str) -> Regex {
    Regex::new(&format!(
        r"(?mi)^[ \t/*#@]*{}:[ \t]*(.*)$",
        regex::escape(field)
    ))
    .unwrap()
}

/// Header values end at the line end or at the closing `*/`.
fn clean_value(raw: &str) -> &str {
    let value = raw.find("*/").map_or(raw, |end| &raw[..end]);
    value.trim()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StylesheetExtractor;

impl Extract for StylesheetExtractor {
    fn might_have_translations(&self, source: &str) -> bool {
        source.contains(GUARD)
    }

    fn extract(&self, source: &str, filename: &str) -> Result<Vec<Message>> {
        let Some(start) = source.find("/*") else {
            return Ok(Vec::new());
        };
        let end = source[start + 2..]
            .find("*/")
            .map_or(source.len(), |idx| start + 2 + idx + 2);
        let header = &source[start..end];
        let index = LineIndex::new(source);

        let domain = TEXT_DOMAIN_REGEX
            .captures(header)
            .and_then(|caps| caps.get(1))
            .map(|m| clean_value(m.as_str()))
            .filter(|value| !value.is_empty())
            .map(String::from);

        let mut messages = Vec::new();
        for ((_, annotation), regex) in FIELDS.iter().zip(FIELD_REGEXES.iter()) {
            let Some(value) = regex.captures(header).and_then(|caps| caps.get(1)) else {
                continue;
            };
            let text = clean_value(value.as_str());
            if text.is_empty() {
                continue;
            }
            let location = index.location(filename, start + value.start());
            messages.push(
                Message::new(
                    MessageKind::Single { text: text.to_string() },
                    domain.clone(),
                    location,
                )
                .with_translators(Some(annotation.to_string())),
            );
        }

        Ok(messages)
    }
}
