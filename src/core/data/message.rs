//! Translation messages produced by the extractors.
//!
//! A [`Message`] is the uniform output of every extractor, regardless of the
//! source grammar. Its shape is a closed enum so the invariants hold by
//! construction: a message carries either a single text or a singular/plural
//! pair, never both, and a context only ever accompanies one of them.

use crate::core::data::Location;

/// The four message shapes recognized by the extractors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `__('text')`
    Single { text: String },
    /// `_x('text', 'context')`
    SingleWithContext { text: String, context: String },
    /// `_n('single', 'plural', n)`
    Plural { single: String, plural: String },
    /// `_nx('single', 'plural', n, 'context')`
    PluralWithContext {
        single: String,
        plural: String,
        context: String,
    },
}

impl MessageKind {
    /// The msgid: the text for single forms, the singular for plural forms.
    pub fn msgid(&self) -> &str {
        match self {
            MessageKind::Single { text } | MessageKind::SingleWithContext { text, .. } => text,
            MessageKind::Plural { single, .. } | MessageKind::PluralWithContext { single, .. } => {
                single
            }
        }
    }

    pub fn plural(&self) -> Option<&str> {
        match self {
            MessageKind::Plural { plural, .. } | MessageKind::PluralWithContext { plural, .. } => {
                Some(plural)
            }
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&str> {
        match self {
            MessageKind::SingleWithContext { context, .. }
            | MessageKind::PluralWithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn is_plural(&self) -> bool {
        self.plural().is_some()
    }
}

/// One translatable call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    pub kind: MessageKind,
    /// Text domain argument. `None` means the library default applies.
    pub domain: Option<String>,
    /// Translator annotation (`translators: ...`) from a preceding comment.
    pub translators: Option<String>,
    pub location: Location,
}

impl Message {
    pub fn new(kind: MessageKind, domain: Option<String>, location: Location) -> Self {
        Self {
            kind,
            domain,
            translators: None,
            location,
        }
    }

    pub fn with_translators(mut self, translators: Option<String>) -> Self {
        self.translators = translators;
        self
    }

    pub fn msgid(&self) -> &str {
        self.kind.msgid()
    }

    pub fn context(&self) -> Option<&str> {
        self.kind.context()
    }

    pub fn plural(&self) -> Option<&str> {
        self.kind.plural()
    }

    /// Whether this message belongs to `domain`.
    pub fn in_domain(&self, domain: &str) -> bool {
        self.domain.as_deref() == Some(domain)
    }
}
