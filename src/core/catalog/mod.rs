//! In-memory gettext catalog.
//!
//! A [`Catalog`] holds the headers of one PO/POT file and its entries under
//! `context -> msgid`. It is loaded at the start of a build, rebuilt or
//! merged, serialized and then dropped; nothing is kept between builds.

pub mod entry;
pub mod jed;
pub mod merge;
pub mod mo;
pub mod order;
pub mod po;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub use entry::{CatalogEntry, Comments, UNUSED_MARKER};
pub use jed::{JedDocument, JedLocaleData, JedMetadata};
pub use merge::{CommentMerge, merge_comment_lines, merge_entries, merge_positional};
pub use order::compare_entries;

pub const PLURAL_FORMS_HEADER: &str = "Plural-Forms";
pub const PLURAL_FORMS: &str = "nplurals=2; plural=(n != 1);";
pub const LANGUAGE_HEADER: &str = "Language";

/// Default line width of serialized strings.
pub const DEFAULT_FOLD_LENGTH: usize = 76;

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "text/plain; charset=UTF-8"),
    ("Content-Transfer-Encoding", "8bit"),
    ("MIME-Version", "1.0"),
    (PLURAL_FORMS_HEADER, PLURAL_FORMS),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    headers: Vec<(String, String)>,
    /// Comments attached to the header entry.
    header_comments: Comments,
    entries: BTreeMap<String, BTreeMap<String, CatalogEntry>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            header_comments: Comments::default(),
            entries: BTreeMap::new(),
        }
    }
}

impl Catalog {
    /// Parse PO text strictly.
    pub fn parse(text: &str) -> Result<Catalog> {
        let mut catalog = Catalog {
            headers: Vec::new(),
            ..Default::default()
        };
        let mut has_header = false;

        for entry in po::parse_entries(text)? {
            if entry.msgid.is_empty() && entry.msgctxt.is_none() {
                catalog.headers = po::parse_header(entry.msgstr.first().map_or("", String::as_str));
                catalog.header_comments = entry.comments;
                has_header = true;
                continue;
            }
            if entry.msgid.is_empty() {
                continue;
            }
            catalog
                .entries
                .entry(entry.context().to_string())
                .or_default()
                .insert(entry.msgid.clone(), entry);
        }

        if !has_header {
            catalog.headers = Catalog::default().headers;
        }
        catalog.set_header(PLURAL_FORMS_HEADER, PLURAL_FORMS);
        Ok(catalog)
    }

    /// Load a catalog file, falling back to the default skeleton when it
    /// cannot be read or parsed. The error explains the fallback.
    pub fn load_with_status(path: &Path) -> (Catalog, Option<anyhow::Error>) {
        let loaded = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|text| {
                Catalog::parse(&text).with_context(|| format!("Failed to parse {}", path.display()))
            });
        match loaded {
            Ok(catalog) => (catalog, None),
            Err(e) => (Catalog::default(), Some(e)),
        }
    }

    /// Load a catalog file. Never fails.
    pub fn load(path: &Path) -> Catalog {
        Catalog::load_with_status(path).0
    }

    pub fn has(&self, msgid: &str, context: &str) -> bool {
        self.get(msgid, context).is_some()
    }

    pub fn get(&self, msgid: &str, context: &str) -> Option<&CatalogEntry> {
        self.entries.get(context)?.get(msgid)
    }

    pub fn has_context(&self, context: &str) -> bool {
        self.entries.get(context).is_some_and(|group| !group.is_empty())
    }

    pub fn get_context(&self, context: &str) -> Option<&BTreeMap<String, CatalogEntry>> {
        self.entries.get(context).filter(|group| !group.is_empty())
    }

    /// All entries in canonical order.
    pub fn entries(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> =
            self.entries.values().flat_map(|group| group.values()).collect();
        entries.sort_by(|a, b| compare_entries(a, b));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, keeping its position when it already exists.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Insert or merge an entry, merging every comment field.
    pub fn set(&mut self, entry: impl Into<CatalogEntry>) {
        self.set_with(entry, CommentMerge::All);
    }

    /// Insert or merge an entry under its `(context, msgid)` key.
    ///
    /// Entries with an empty `msgid` are ignored; that key is the header.
    pub fn set_with(&mut self, entry: impl Into<CatalogEntry>, mode: CommentMerge) {
        let entry = entry.into();
        if entry.msgid.is_empty() {
            return;
        }
        let group = self.entries.entry(entry.context().to_string()).or_default();
        let old = group.remove(&entry.msgid).unwrap_or_default();
        let merged = merge_entries(old, entry, mode);
        group.insert(merged.msgid.clone(), merged);
    }

    pub fn remove(&mut self, msgid: &str, context: &str) -> Option<CatalogEntry> {
        let group = self.entries.get_mut(context)?;
        let removed = group.remove(msgid);
        if group.is_empty() {
            self.entries.remove(context);
        }
        removed
    }

    /// Drop every entry. Headers and header comments stay.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Fold a freshly built template into this locale catalog.
    ///
    /// Entries the template no longer has keep their translation and get the
    /// unused marker. Template entries are set with
    /// [`CommentMerge::TranslatorOnly`], which also clears the marker from
    /// entries that came back.
    pub fn update_from_template(&mut self, template: &Catalog) {
        let stale: Vec<(String, String)> = self
            .entries
            .iter()
            .flat_map(|(context, group)| {
                group
                    .keys()
                    .filter(|msgid| !template.has(msgid, context))
                    .map(|msgid| (context.clone(), msgid.clone()))
            })
            .collect();

        for (context, msgid) in stale {
            if let Some(mut entry) = self.remove(&msgid, &context) {
                entry.comments.translator =
                    merge_comment_lines(&entry.comments.translator, UNUSED_MARKER);
                self.entries
                    .entry(context)
                    .or_default()
                    .insert(msgid, entry);
            }
        }

        for entry in template.entries() {
            self.set_with(entry.clone(), CommentMerge::TranslatorOnly);
        }
    }

    /// Serialize as PO text: header entry first, then entries in canonical
    /// order, separated by blank lines.
    pub fn to_po_string(&self, fold_length: usize) -> String {
        let header = CatalogEntry {
            msgstr: vec![po::format_header(&self.headers)],
            comments: self.header_comments.clone(),
            ..Default::default()
        };

        let mut blocks = Vec::with_capacity(self.len() + 1);
        for entry in std::iter::once(&header).chain(self.entries()) {
            let mut block = String::new();
            po::write_entry(&mut block, entry, fold_length);
            blocks.push(block);
        }
        blocks.join("\n")
    }

    /// Entries accepted by `filter`. The header entry is never among them.
    fn compiled_entries<F>(&self, filter: F) -> impl Iterator<Item = &CatalogEntry>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        self.entries().into_iter().filter(move |e| filter(*e))
    }

    /// Compile to MO bytes.
    pub fn to_mo<F>(&self, filter: F) -> Vec<u8>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        let mut messages = vec![(String::new(), po::format_header(&self.headers))];
        messages.extend(self.compiled_entries(filter).map(|entry| {
            let mut key = runtime_key(entry);
            if let Some(plural) = &entry.msgid_plural {
                key.push('\0');
                key.push_str(plural);
            }
            (key, entry.msgstr.join("\0"))
        }));
        mo::write_mo(messages)
    }

    /// Compile to a JED document, or `None` when no entry passes `filter`.
    pub fn to_jed<F>(&self, domain: &str, filter: F) -> Option<JedDocument>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        let messages: BTreeMap<String, Vec<String>> = self
            .compiled_entries(filter)
            .map(|entry| (runtime_key(entry), entry.msgstr.clone()))
            .collect();
        if messages.is_empty() {
            return None;
        }

        let metadata = JedMetadata {
            domain: domain.to_string(),
            lang: self.header(LANGUAGE_HEADER).unwrap_or_default().to_string(),
            plural_forms: self
                .header(PLURAL_FORMS_HEADER)
                .unwrap_or(PLURAL_FORMS)
                .to_string(),
        };
        Some(JedDocument {
            domain: domain.to_string(),
            locale_data: BTreeMap::from([(
                domain.to_string(),
                JedLocaleData { metadata, messages },
            )]),
        })
    }
}

/// `msgid`, or `msgctxt\u{4}msgid` when the entry has a context.
fn runtime_key(entry: &CatalogEntry) -> String {
    match &entry.msgctxt {
        Some(context) => format!("{}\u{4}{}", context, entry.msgid),
        None => entry.msgid.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::core::catalog::*;
    use crate::core::data::{Location, Message, MessageKind};
    use crate::core::extract::{Extract, JsExtractor};

    fn single(text: &str, file: &str, line: usize) -> Message {
        Message::new(
            MessageKind::Single { text: text.into() },
            Some("app".into()),
            Location::new(file, line, 0),
        )
    }

    fn translated(msgid: &str, msgstr: &str) -> CatalogEntry {
        let mut entry = CatalogEntry::new(msgid);
        entry.msgstr = vec![msgstr.to_string()];
        entry
    }

    const LOCALE: &str = r#"# French translation
msgid ""
msgstr ""
"Language: fr\n"
"Plural-Forms: nplurals=2; plural=(n > 1);\n"

#: src/b.js:2
msgid "Zebra"
msgstr "Zèbre"

#: src/a.js:1
msgctxt "menu"
msgid "Open"
msgstr "Ouvrir"
"#;

    #[test]
    fn test_default_skeleton() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.header("plural-forms"), Some(PLURAL_FORMS));
        assert_eq!(catalog.header(LANGUAGE_HEADER), None);
    }

    #[test]
    fn test_parse_forces_plural_forms() {
        let catalog = Catalog::parse(LOCALE).unwrap();
        assert_eq!(catalog.header("Language"), Some("fr"));
        assert_eq!(catalog.header("Plural-Forms"), Some(PLURAL_FORMS));
        assert_eq!(catalog.len(), 2);
        assert!(catalog.has("Open", "menu"));
        assert!(!catalog.has("Open", ""));
        assert!(catalog.has_context("menu"));
        assert_eq!(catalog.get_context("").map(|g| g.len()), Some(1));
    }

    #[test]
    fn test_load_falls_back() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.po");
        let (catalog, error) = Catalog::load_with_status(&missing);
        assert_eq!(catalog, Catalog::default());
        assert!(error.is_some());

        let broken = dir.path().join("broken.po");
        fs::write(&broken, "msgid \"unterminated\n").unwrap();
        let (catalog, error) = Catalog::load_with_status(&broken);
        assert_eq!(catalog, Catalog::default());
        assert!(error.unwrap().to_string().contains("broken.po"));
        assert_eq!(Catalog::load(&broken), Catalog::default());
    }

    #[test]
    fn test_load_store_is_stable() {
        let catalog = Catalog::parse(LOCALE).unwrap();
        let first = catalog.to_po_string(DEFAULT_FOLD_LENGTH);
        let second = Catalog::parse(&first)
            .unwrap()
            .to_po_string(DEFAULT_FOLD_LENGTH);
        assert_eq!(first, second);
        insta::assert_snapshot!(first, @r#"
        # French translation
        msgid ""
        msgstr ""
        "Language: fr\n"
        "Plural-Forms: nplurals=2; plural=(n != 1);\n"

        #: src/a.js:1
        msgctxt "menu"
        msgid "Open"
        msgstr "Ouvrir"

        #: src/b.js:2
        msgid "Zebra"
        msgstr "Zèbre"
        "#);
    }

    #[test]
    fn test_set_is_idempotent() {
        let message = single("Hello", "src/app.js", 3).with_translators(Some("translators: hi".into()));
        let mut once = Catalog::default();
        once.set(&message);
        let mut twice = Catalog::default();
        twice.set(&message);
        twice.set(&message);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_accumulates_references() {
        let mut catalog = Catalog::default();
        catalog.set(single("Hello", "src/b.js", 9));
        catalog.set(single("Hello", "src/a.js", 3));
        let entry = catalog.get("Hello", "").unwrap();
        assert_eq!(entry.comments.reference, "src/a.js:3\nsrc/b.js:9");
    }

    #[test]
    fn test_set_ignores_empty_msgid() {
        let mut catalog = Catalog::default();
        catalog.set(CatalogEntry::new(""));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_plural_entry_has_two_slots() {
        let message = Message::new(
            MessageKind::Plural {
                single: "one".into(),
                plural: "many".into(),
            },
            Some("d".into()),
            Location::new("src/app.js", 1, 0),
        );
        let mut catalog = Catalog::default();
        catalog.set(&message);
        assert_eq!(catalog.get("one", "").unwrap().msgstr.len(), 2);

        let mut oversized = CatalogEntry::from(&message);
        oversized.msgstr = vec!["un".into(), "plusieurs".into(), "trop".into()];
        catalog.set(oversized);
        assert_eq!(
            catalog.get("one", "").unwrap().msgstr,
            vec!["un".to_string(), "plusieurs".to_string()]
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let mut catalog = Catalog::parse(LOCALE).unwrap();
        let removed = catalog.remove("Open", "menu").unwrap();
        assert_eq!(removed.msgstr, vec!["Ouvrir".to_string()]);
        assert!(!catalog.has_context("menu"));
        assert!(catalog.remove("Open", "menu").is_none());

        catalog.clear();
        assert!(catalog.is_empty());
        assert_eq!(catalog.header("Language"), Some("fr"));
    }

    #[test]
    fn test_update_from_template_flags_and_restores() {
        let mut locale = Catalog::default();
        locale.set(translated("A", "A-translated"));

        let mut template = Catalog::default();
        template.set(CatalogEntry::new("B"));
        locale.update_from_template(&template);

        let a = locale.get("A", "").unwrap();
        assert!(a.is_unused());
        assert_eq!(a.msgstr, vec!["A-translated".to_string()]);
        let b = locale.get("B", "").unwrap();
        assert!(!b.is_unused());
        assert!(!b.is_translated());

        let order: Vec<&str> = locale.entries().iter().map(|e| e.msgid.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);

        template.set(CatalogEntry::new("A"));
        locale.update_from_template(&template);
        let a = locale.get("A", "").unwrap();
        assert!(!a.is_unused());
        assert_eq!(a.msgstr, vec!["A-translated".to_string()]);
        assert_eq!(a.comments.translator, "");
    }

    #[test]
    fn test_update_keeps_translator_notes_and_refreshes_references() {
        let mut locale = Catalog::default();
        let mut entry = translated("Hello", "Bonjour");
        entry.comments.translator = "informal".into();
        entry.comments.reference = "old.js:1".into();
        locale.set(entry);

        let mut template = Catalog::default();
        template.set(single("Hello", "new.js", 4));
        locale.update_from_template(&template);

        let hello = locale.get("Hello", "").unwrap();
        assert_eq!(hello.comments.translator, "informal");
        assert_eq!(hello.comments.reference, "new.js:4");
        assert_eq!(hello.msgstr, vec!["Bonjour".to_string()]);
    }

    #[test]
    fn test_to_jed_filters() {
        let mut catalog = Catalog::parse(LOCALE).unwrap();
        let mut untranslated = CatalogEntry::new("Hello");
        untranslated.comments.reference = "src/a.js:7".to_string();
        catalog.set(untranslated);

        assert_eq!(catalog.to_jed("app", |_| false), None);

        let doc = catalog
            .to_jed("app", |entry| entry.references_file("src/a.js"))
            .unwrap();
        let data = &doc.locale_data["app"];
        assert_eq!(data.metadata.lang, "fr");
        assert_eq!(data.metadata.plural_forms, PLURAL_FORMS);
        let keys: Vec<&str> = data.messages.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Hello", "menu\u{4}Open"]);
        assert_eq!(data.messages["Hello"], vec![String::new()]);

        let all = catalog.to_jed("app", |_| true).unwrap();
        assert_eq!(all.messages().map(|m| m.len()), Some(3));
    }

    #[test]
    fn test_to_jed_keeps_unused_entries_the_filter_accepts() {
        let mut catalog = Catalog::default();
        let mut unused = translated("Gone", "Parti");
        unused.comments.translator = UNUSED_MARKER.to_string();
        catalog.set_with(unused, CommentMerge::All);

        let doc = catalog.to_jed("app", |_| true).unwrap();
        let messages = doc.messages().unwrap();
        assert_eq!(messages["Gone"], vec!["Parti".to_string()]);
    }

    #[test]
    fn test_to_mo_applies_filter_only() {
        let mut catalog = Catalog::parse(LOCALE).unwrap();
        catalog.set(CatalogEntry::new("Untranslated"));
        let mut unused = translated("Gone", "Parti");
        unused.comments.translator = UNUSED_MARKER.to_string();
        catalog.set_with(unused, CommentMerge::All);

        let bytes = catalog.to_mo(|_| true);
        let count = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        assert_eq!(count, 5);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("menu\u{4}Open\0"));
        assert!(text.contains("Untranslated\0"));
        assert!(text.contains("Parti"));

        let bytes = catalog.to_mo(|entry| entry.references_file("src/b.js"));
        let count = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        assert_eq!(count, 2);
    }

    #[test]
    fn test_translators_end_to_end() {
        let source = "import { __ } from '@wordpress/i18n';\n/* translators: greet */\n__('Hello', 'app');\n";
        let messages = JsExtractor::default().extract_translations(source, "src/app.js");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].translators.as_deref(), Some("translators: greet"));

        let mut template = Catalog::default();
        for message in &messages {
            template.set(message);
        }
        let pot = template.to_po_string(DEFAULT_FOLD_LENGTH);
        assert!(pot.contains("#. translators: greet\n#: src/app.js:3\nmsgid \"Hello\"\nmsgstr \"\"\n"));

        let mut locale = Catalog::default();
        locale.update_from_template(&template);
        let hello = locale.get("Hello", "").unwrap();
        assert_eq!(hello.msgstr, vec![String::new()]);
        assert_eq!(hello.comments.reference, "src/app.js:3");
    }
}
