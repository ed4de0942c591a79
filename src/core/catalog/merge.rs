//! Per-field merge rules used by [`Catalog::set_with`](super::Catalog::set_with).

use crate::core::catalog::entry::{CatalogEntry, Comments, UNUSED_MARKER};

/// Which comment fields accumulate when an entry is set over an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentMerge {
    /// Every comment field merges. Used while rebuilding the template.
    #[default]
    All,
    /// Only translator comments merge; the other fields take the new value.
    /// Used when folding the template into a locale catalog.
    TranslatorOnly,
}

/// Merge two comment blobs line by line.
///
/// Lines are unioned (first occurrence wins), blanks dropped, and lines
/// carrying the unused marker dropped unless `new` carries it too. The
/// result is sorted.
pub fn merge_comment_lines(old: &str, new: &str) -> String {
    let keep_marker = new.contains(UNUSED_MARKER);
    let mut lines: Vec<&str> = Vec::new();
    for line in old.lines().chain(new.lines()) {
        if line.is_empty() || lines.contains(&line) {
            continue;
        }
        if !keep_marker && line.contains(UNUSED_MARKER) {
            continue;
        }
        lines.push(line);
    }
    lines.sort_unstable();
    lines.join("\n")
}

/// Merge translation slots index by index, preferring non-empty new values,
/// then fit the result to two slots for plural entries and one otherwise.
pub fn merge_positional(old: &[String], new: &[String], plural: bool) -> Vec<String> {
    let len = old.len().max(new.len());
    let mut merged: Vec<String> = (0..len)
        .map(|idx| match new.get(idx) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => old.get(idx).cloned().unwrap_or_default(),
        })
        .collect();
    merged.resize(if plural { 2 } else { 1 }, String::new());
    merged
}

fn merge_comments(old: Comments, new: Comments, mode: CommentMerge) -> Comments {
    let translator = merge_comment_lines(&old.translator, &new.translator);
    match mode {
        CommentMerge::All => Comments {
            translator,
            extracted: merge_comment_lines(&old.extracted, &new.extracted),
            reference: merge_comment_lines(&old.reference, &new.reference),
            flag: merge_comment_lines(&old.flag, &new.flag),
            previous: merge_comment_lines(&old.previous, &new.previous),
        },
        CommentMerge::TranslatorOnly => Comments { translator, ..new },
    }
}

/// Merge `new` over `old`, field by field.
pub fn merge_entries(old: CatalogEntry, new: CatalogEntry, mode: CommentMerge) -> CatalogEntry {
    let plural = old.is_plural() || new.is_plural();
    CatalogEntry {
        msgstr: merge_positional(&old.msgstr, &new.msgstr, plural),
        msgid_plural: new.msgid_plural.or(old.msgid_plural),
        comments: merge_comments(old.comments, new.comments, mode),
        msgctxt: new.msgctxt,
        msgid: new.msgid,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::catalog::merge::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_comment_lines_union_sorted() {
        assert_eq!(
            merge_comment_lines("src/b.js:4\nsrc/a.js:1", "src/a.js:1\n\nsrc/c.js:9"),
            "src/a.js:1\nsrc/b.js:4\nsrc/c.js:9"
        );
        assert_eq!(merge_comment_lines("", ""), "");
    }

    #[test]
    fn test_marker_dropped_unless_new_carries_it() {
        let old = format!("ask before changing\n{UNUSED_MARKER}");
        assert_eq!(merge_comment_lines(&old, ""), "ask before changing");
        assert_eq!(
            merge_comment_lines(&old, UNUSED_MARKER),
            format!("{UNUSED_MARKER}\nask before changing")
        );
    }

    #[test]
    fn test_positional_prefers_non_empty_new() {
        assert_eq!(
            merge_positional(&strings(&["un", "des"]), &strings(&["", "plusieurs"]), true),
            strings(&["un", "plusieurs"])
        );
    }

    #[test]
    fn test_positional_fits_slot_count() {
        assert_eq!(
            merge_positional(&[], &strings(&["a", "b", "c"]), true),
            strings(&["a", "b"])
        );
        assert_eq!(merge_positional(&[], &[], true), strings(&["", ""]));
        assert_eq!(
            merge_positional(&strings(&["a", "b"]), &[], false),
            strings(&["a"])
        );
    }

    #[test]
    fn test_translator_only_refreshes_other_comments() {
        let mut old = CatalogEntry::new("Hello");
        old.msgstr = strings(&["Bonjour"]);
        old.comments.translator = "formal".into();
        old.comments.reference = "old.js:1".into();

        let mut new = CatalogEntry::new("Hello");
        new.comments.reference = "new.js:2".into();

        let merged = merge_entries(old.clone(), new.clone(), CommentMerge::TranslatorOnly);
        assert_eq!(merged.msgstr, strings(&["Bonjour"]));
        assert_eq!(merged.comments.translator, "formal");
        assert_eq!(merged.comments.reference, "new.js:2");

        let merged = merge_entries(old, new, CommentMerge::All);
        assert_eq!(merged.comments.reference, "new.js:2\nold.js:1");
    }

    #[test]
    fn test_plural_id_survives_singular_update() {
        let mut old = CatalogEntry::new("%d item");
        old.msgid_plural = Some("%d items".into());
        old.msgstr = strings(&["%d élément", "%d éléments"]);

        let merged = merge_entries(old, CatalogEntry::new("%d item"), CommentMerge::All);
        assert_eq!(merged.msgid_plural.as_deref(), Some("%d items"));
        assert_eq!(merged.msgstr.len(), 2);
    }
}
