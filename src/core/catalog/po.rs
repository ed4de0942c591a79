//! PO/POT text format.
//!
//! The parser is line based: comments, `msgctxt`, `msgid`, `msgid_plural`,
//! `msgstr` / `msgstr[n]` and quoted continuation lines. Obsolete `#~`
//! entries are dropped. The writer folds long strings the way gettext
//! tools do, so output diffs cleanly against files they produced.

use anyhow::{Result, anyhow, bail};

use crate::core::catalog::entry::{CatalogEntry, Comments};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str(usize),
}

#[derive(Default)]
struct EntryBuilder {
    entry: CatalogEntry,
    has_id: bool,
    has_str: bool,
    last: Option<Field>,
}

impl EntryBuilder {
    fn is_started(&self) -> bool {
        self.has_id || self.has_str || self.entry.msgctxt.is_some()
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Context => self.entry.msgctxt.get_or_insert_with(String::new),
            Field::Id => &mut self.entry.msgid,
            Field::IdPlural => self.entry.msgid_plural.get_or_insert_with(String::new),
            Field::Str(idx) => {
                if self.entry.msgstr.len() <= idx {
                    self.entry.msgstr.resize(idx + 1, String::new());
                }
                &mut self.entry.msgstr[idx]
            }
        }
    }

    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Id => self.has_id = true,
            Field::Str(_) => self.has_str = true,
            _ => {}
        }
        *self.field_mut(field) = value;
        self.last = Some(field);
    }

    fn finish(self) -> Option<CatalogEntry> {
        if !self.has_id {
            return None;
        }
        let mut entry = self.entry;
        if entry.msgstr.is_empty() {
            entry.msgstr.push(String::new());
        }
        Some(entry)
    }
}

/// Parse PO text into entries in file order. The header is the entry with
/// an empty `msgid` and no context.
pub fn parse_entries(text: &str) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    let mut current = EntryBuilder::default();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            entries.extend(std::mem::take(&mut current).finish());
            continue;
        }
        if line.starts_with("#~") {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            if current.has_str {
                entries.extend(std::mem::take(&mut current).finish());
            }
            push_comment(&mut current.entry.comments, rest);
            continue;
        }

        if line.starts_with('"') {
            let Some(field) = current.last else {
                bail!("line {}: string continuation without a keyword", line_number);
            };
            let value = parse_quoted(line, line_number)?;
            current.field_mut(field).push_str(&value);
            continue;
        }

        let (keyword, rest) = line
            .split_once(|c: char| c.is_whitespace())
            .ok_or_else(|| anyhow!("line {}: expected keyword and string", line_number))?;
        let field = match keyword {
            "msgctxt" => Field::Context,
            "msgid" => Field::Id,
            "msgid_plural" => Field::IdPlural,
            "msgstr" => Field::Str(0),
            _ => match keyword
                .strip_prefix("msgstr[")
                .and_then(|s| s.strip_suffix(']'))
            {
                Some(index) => Field::Str(index.parse().map_err(|_| {
                    anyhow!("line {}: invalid msgstr index '{}'", line_number, index)
                })?),
                None => bail!("line {}: unknown keyword '{}'", line_number, keyword),
            },
        };

        if matches!(field, Field::Context | Field::Id) && current.has_str {
            entries.extend(std::mem::take(&mut current).finish());
        }
        if matches!(field, Field::Id) && current.has_id {
            bail!("line {}: duplicate msgid", line_number);
        }

        let value = parse_quoted(rest.trim(), line_number)?;
        current.set(field, value);
    }

    entries.extend(current.finish());
    Ok(entries)
}

fn push_comment(comments: &mut Comments, rest: &str) {
    let (blob, content) = match rest.chars().next() {
        Some('.') => (&mut comments.extracted, &rest[1..]),
        Some(':') => (&mut comments.reference, &rest[1..]),
        Some(',') => (&mut comments.flag, &rest[1..]),
        Some('|') => (&mut comments.previous, &rest[1..]),
        _ => (&mut comments.translator, rest),
    };
    let content = content.trim();
    if content.is_empty() {
        return;
    }
    if !blob.is_empty() {
        blob.push('\n');
    }
    blob.push_str(content);
}

/// Parse one `"..."` token, resolving escapes.
fn parse_quoted(token: &str, line_number: usize) -> Result<String> {
    let inner = token
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .filter(|_| token.len() >= 2)
        .ok_or_else(|| anyhow!("line {}: expected quoted string", line_number))?;

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = match chars.next() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('a') => '\x07',
                    Some('b') => '\x08',
                    Some('f') => '\x0c',
                    Some('v') => '\x0b',
                    Some(c @ ('"' | '\\' | '\'' | '?')) => c,
                    Some(other) => {
                        bail!("line {}: invalid escape '\\{}'", line_number, other)
                    }
                    None => bail!("line {}: unterminated string", line_number),
                };
                value.push(escaped);
            }
            '"' => bail!("line {}: unescaped quote inside string", line_number),
            c => value.push(c),
        }
    }
    Ok(value)
}

/// Parse the header entry's `msgstr` into ordered `(name, value)` pairs.
pub fn parse_header(msgstr: &str) -> Vec<(String, String)> {
    msgstr
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

pub fn format_header(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}\n", name, value))
        .collect()
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `boundaries[k]` is false when position `k` falls inside a `\x` escape.
fn escape_boundaries(chars: &[char]) -> Vec<bool> {
    let mut boundaries = vec![true; chars.len() + 1];
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            boundaries[i + 1] = false;
            i += 2;
        } else {
            i += 1;
        }
    }
    boundaries
}

fn is_fold_punctuation(c: char) -> bool {
    matches!(c, '\x21'..='\x2f' | '0'..='9' | '\x5b'..='\x60' | '\x7b'..='\x7e')
}

/// Split an escaped string into lines of at most `max_len` characters.
///
/// A line ends after the first `\n` escape; otherwise, when more text
/// follows, after the last whitespace, else after the last punctuation. An
/// escape sequence is never split, which may make a line one character
/// longer than `max_len`. With `max_len == 0` lines only break after `\n`.
pub fn fold_line(escaped: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = escaped.chars().collect();
    let boundaries = escape_boundaries(&chars);
    let max_len = if max_len == 0 { chars.len().max(1) } else { max_len };

    let mut lines = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let mut end = (pos + max_len).min(chars.len());
        while !boundaries[end] {
            end += 1;
        }
        let window = &chars[pos..end];
        let at_end = end == chars.len();

        let newline = (0..window.len().saturating_sub(1))
            .find(|&i| boundaries[pos + i] && window[i] == '\\' && window[i + 1] == 'n')
            .map(|i| i + 2);

        let cut = newline
            .or_else(|| {
                if at_end {
                    return None;
                }
                let whitespace = window
                    .iter()
                    .rposition(|c| c.is_whitespace())
                    .map(|i| i + 1)
                    .filter(|&cut| window[..cut].iter().any(|c| !c.is_whitespace()));
                whitespace.or_else(|| {
                    (0..window.len())
                        .rev()
                        .find(|&i| is_fold_punctuation(window[i]) && boundaries[pos + i + 1])
                        .map(|i| i + 1)
                        .filter(|&cut| window[..cut].iter().any(|c| !is_fold_punctuation(*c)))
                })
            })
            .unwrap_or(window.len());

        lines.push(window[..cut].iter().collect());
        pos += cut;
    }
    lines
}

fn write_string(out: &mut String, keyword: &str, value: &str, fold_length: usize) {
    let lines = fold_line(&escape(value), fold_length);
    if lines.len() < 2 {
        out.push_str(&format!(
            "{} \"{}\"\n",
            keyword,
            lines.first().map_or("", String::as_str)
        ));
        return;
    }
    out.push_str(&format!("{} \"\"\n", keyword));
    for line in lines {
        out.push_str(&format!("\"{}\"\n", line));
    }
}

fn write_comments(out: &mut String, comments: &Comments) {
    let blocks = [
        ("#", &comments.translator),
        ("#.", &comments.extracted),
        ("#:", &comments.reference),
        ("#,", &comments.flag),
        ("#|", &comments.previous),
    ];
    for (prefix, blob) in blocks {
        for line in blob.lines().filter(|line| !line.is_empty()) {
            out.push_str(&format!("{} {}\n", prefix, line));
        }
    }
}

/// Append one entry block (without the separating blank line).
pub fn write_entry(out: &mut String, entry: &CatalogEntry, fold_length: usize) {
    write_comments(out, &entry.comments);
    if let Some(context) = &entry.msgctxt {
        write_string(out, "msgctxt", context, fold_length);
    }
    write_string(out, "msgid", &entry.msgid, fold_length);
    match &entry.msgid_plural {
        Some(plural) => {
            write_string(out, "msgid_plural", plural, fold_length);
            for (idx, value) in entry.msgstr.iter().enumerate() {
                write_string(out, &format!("msgstr[{}]", idx), value, fold_length);
            }
        }
        None => {
            let value = entry.msgstr.first().map_or("", String::as_str);
            write_string(out, "msgstr", value, fold_length);
        }
    }
}
