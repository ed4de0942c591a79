//! The table of recognized translation functions.
//!
//! Every grammar shares this table: the extractors only differ in how they
//! find a call and its literal arguments. Once arguments are collected as
//! `Option<String>` per position, [`CallSpec::build`] turns them into a
//! [`Message`].

use crate::core::data::{Location, Message, MessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    Single,
    SingleWithContext,
    Plural,
    PluralWithContext,
}

/// Argument layout of one translation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSpec {
    pub name: &'static str,
    pub shape: CallShape,
    /// Index of the context argument, for context shapes.
    pub context_arg: usize,
    pub domain_arg: usize,
}

const fn single(name: &'static str) -> CallSpec {
    CallSpec {
        name,
        shape: CallShape::Single,
        context_arg: 0,
        domain_arg: 1,
    }
}

const fn single_ctx(name: &'static str) -> CallSpec {
    CallSpec {
        name,
        shape: CallShape::SingleWithContext,
        context_arg: 1,
        domain_arg: 2,
    }
}

pub const CALLS: &[CallSpec] = &[
    single("__"),
    single("_e"),
    single("esc_attr__"),
    single("esc_attr_e"),
    single("esc_html__"),
    single("esc_html_e"),
    single_ctx("_x"),
    single_ctx("_ex"),
    single_ctx("esc_attr_x"),
    single_ctx("esc_html_x"),
    CallSpec {
        name: "_n",
        shape: CallShape::Plural,
        context_arg: 0,
        domain_arg: 3,
    },
    CallSpec {
        name: "_n_noop",
        shape: CallShape::Plural,
        context_arg: 0,
        domain_arg: 2,
    },
    CallSpec {
        name: "_nx",
        shape: CallShape::PluralWithContext,
        context_arg: 3,
        domain_arg: 4,
    },
    CallSpec {
        name: "_nx_noop",
        shape: CallShape::PluralWithContext,
        context_arg: 2,
        domain_arg: 3,
    },
];

/// Substrings of which every recognized name contains at least one.
const NAME_FRAGMENTS: &[&str] = &["__", "_e", "_x", "_n"];

/// Look up a translation function by name.
pub fn lookup_call(name: &str) -> Option<&'static CallSpec> {
    CALLS.iter().find(|spec| spec.name == name)
}

/// Cheap pre-filter shared by the call-based extractors.
///
/// Never returns false for a source that contains a recognized call name.
pub fn might_contain_call(source: &str) -> bool {
    NAME_FRAGMENTS.iter().any(|frag| source.contains(frag))
}

impl CallSpec {
    /// Build a message from positional literal arguments.
    ///
    /// `args[i]` is `Some` only when argument `i` is a literal string. Returns
    /// `None` when a required argument (text, singular, plural, context) is
    /// missing or not literal.
    pub fn build(&self, args: &[Option<String>], location: Location) -> Option<Message> {
        let arg = |idx: usize| args.get(idx).cloned().flatten();

        let kind = match self.shape {
            CallShape::Single => MessageKind::Single { text: arg(0)? },
            CallShape::SingleWithContext => MessageKind::SingleWithContext {
                text: arg(0)?,
                context: arg(self.context_arg)?,
            },
            CallShape::Plural => MessageKind::Plural {
                single: arg(0)?,
                plural: arg(1)?,
            },
            CallShape::PluralWithContext => MessageKind::PluralWithContext {
                single: arg(0)?,
                plural: arg(1)?,
                context: arg(self.context_arg)?,
            },
        };

        Some(Message::new(kind, arg(self.domain_arg), location))
    }
}
