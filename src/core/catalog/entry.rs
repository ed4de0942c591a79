use crate::core::data::Message;

/// Translator comment line flagging an entry no source references anymore.
pub const UNUSED_MARKER: &str = "THIS STRING IS NO LONGER IN USE";

/// Comment blobs of one entry, each a newline-joined list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// `# ` lines
    pub translator: String,
    /// `#. ` lines
    pub extracted: String,
    /// `#: ` lines
    pub reference: String,
    /// `#, ` lines
    pub flag: String,
    /// `#| ` lines
    pub previous: String,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.translator.is_empty()
            && self.extracted.is_empty()
            && self.reference.is_empty()
            && self.flag.is_empty()
            && self.previous.is_empty()
    }
}

/// One message of a catalog, keyed by `(msgctxt or "", msgid)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    /// One slot for singular entries, two for plural ones.
    pub msgstr: Vec<String>,
    pub comments: Comments,
}

impl CatalogEntry {
    pub fn new(msgid: impl Into<String>) -> Self {
        Self {
            msgid: msgid.into(),
            msgstr: vec![String::new()],
            ..Default::default()
        }
    }

    pub fn context(&self) -> &str {
        self.msgctxt.as_deref().unwrap_or_default()
    }

    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    pub fn is_unused(&self) -> bool {
        self.comments
            .translator
            .lines()
            .any(|line| line.contains(UNUSED_MARKER))
    }

    pub fn is_translated(&self) -> bool {
        self.msgstr.iter().any(|s| !s.is_empty())
    }

    /// Whether any `#:` line points at `file`.
    ///
    /// Paths compare with forward slashes and without a leading `./`. A line
    /// is first taken whole, so a path containing spaces still matches; only
    /// then is it split on whitespace, for lines listing several references.
    pub fn references_file(&self, file: &str) -> bool {
        let wanted = normalize_path(file);
        let matches = |reference: &str| normalize_path(reference_path(reference)) == wanted;
        self.comments.reference.lines().map(str::trim).any(|line| {
            !line.is_empty() && (matches(line) || line.split_whitespace().any(|r| matches(r)))
        })
    }
}

/// `reference` without a trailing `:line`.
fn reference_path(reference: &str) -> &str {
    reference
        .rsplit_once(':')
        .filter(|(_, line)| !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()))
        .map_or(reference, |(path, _)| path)
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}

impl From<&Message> for CatalogEntry {
    fn from(message: &Message) -> Self {
        let slots = if message.kind.is_plural() { 2 } else { 1 };
        Self {
            msgctxt: message.context().map(String::from),
            msgid: message.msgid().to_string(),
            msgid_plural: message.plural().map(String::from),
            msgstr: vec![String::new(); slots],
            comments: Comments {
                reference: message.location.reference(),
                extracted: message.translators.clone().unwrap_or_default(),
                ..Default::default()
            },
        }
    }
}

impl From<Message> for CatalogEntry {
    fn from(message: Message) -> Self {
        Self::from(&message)
    }
}
