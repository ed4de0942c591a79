//! Translator comment association.
//!
//! Every extractor collects two position-ordered streams: the comments of a
//! file and its recognized call sites. [`attach_translator_comments`] folds
//! over the merged stream. The most recent `translators:` comment stays
//! pending until the next call site consumes it, so a comment is attached to
//! at most one message. Scanners without an AST also report statement
//! boundaries, where a pending comment is dropped.

use std::cmp::Ordering;

const TRANSLATORS_PREFIX: &str = "translators:";

/// Normalize a comment body (delimiters already removed).
///
/// Strips the leading `*` of block-comment lines, trims every line, drops
/// blank lines and joins the rest with single spaces.
pub fn normalize_comment(body: &str) -> String {
    body.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a normalized comment is a translator annotation.
pub fn is_translator_comment(normalized: &str) -> bool {
    normalized
        .get(..TRANSLATORS_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(TRANSLATORS_PREFIX))
}

/// A comment found by a scanner, at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceComment {
    pub offset: usize,
    /// Comment body without delimiters.
    pub body: String,
}

impl SourceComment {
    pub fn new(offset: usize, body: impl Into<String>) -> Self {
        Self {
            offset,
            body: body.into(),
        }
    }
}

enum Event {
    Comment(usize),
    Boundary,
    Call(usize),
}

impl Event {
    /// Comments sort before calls at the same offset.
    fn rank(&self) -> u8 {
        match self {
            Event::Comment(_) => 0,
            Event::Boundary => 1,
            Event::Call(_) => 2,
        }
    }
}

/// Pair call sites with their translator comment.
///
/// `call_offsets` may be in any order; the result is indexed like it.
/// A comment does not survive past any offset in `boundaries`.
pub fn attach_translator_comments(
    comments: &[SourceComment],
    call_offsets: &[usize],
    boundaries: &[usize],
) -> Vec<Option<String>> {
    let mut events: Vec<(usize, Event)> = comments
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.offset, Event::Comment(idx)))
        .chain(
            call_offsets
                .iter()
                .enumerate()
                .map(|(idx, offset)| (*offset, Event::Call(idx))),
        )
        .chain(boundaries.iter().map(|offset| (*offset, Event::Boundary)))
        .collect();

    events.sort_by(|(a_pos, a), (b_pos, b)| match a_pos.cmp(b_pos) {
        Ordering::Equal => a.rank().cmp(&b.rank()),
        other => other,
    });

    let mut attached = vec![None; call_offsets.len()];
    let mut pending: Option<String> = None;

    for (_, event) in events {
        match event {
            Event::Comment(idx) => {
                let normalized = normalize_comment(&comments[idx].body);
                if is_translator_comment(&normalized) {
                    pending = Some(normalized);
                }
            }
            Event::Boundary => pending = None,
            Event::Call(idx) => attached[idx] = pending.take(),
        }
    }

    attached
}
