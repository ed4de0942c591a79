use std::cmp::Ordering;

use crate::core::catalog::entry::CatalogEntry;

/// Canonical catalog order: used entries before unused ones, then by
/// `msgid`, then by `msgctxt` (absent sorts as empty).
pub fn compare_entries(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.is_unused()
        .cmp(&b.is_unused())
        .then_with(|| a.msgid.cmp(&b.msgid))
        .then_with(|| a.context().cmp(b.context()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::catalog::entry::UNUSED_MARKER;
    use crate::core::catalog::order::*;

    fn entry(msgid: &str, context: Option<&str>, unused: bool) -> CatalogEntry {
        let mut entry = CatalogEntry::new(msgid);
        entry.msgctxt = context.map(String::from);
        if unused {
            entry.comments.translator = UNUSED_MARKER.to_string();
        }
        entry
    }

    #[test]
    fn test_three_keys() {
        let mut entries = vec![
            entry("Apple", None, true),
            entry("Banana", Some("fruit"), false),
            entry("Banana", None, false),
            entry("Apple", Some("tree"), false),
            entry("Apple", None, false),
        ];
        entries.sort_by(compare_entries);

        let order: Vec<(&str, &str, bool)> = entries
            .iter()
            .map(|e| (e.msgid.as_str(), e.context(), e.is_unused()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Apple", "", false),
                ("Apple", "tree", false),
                ("Banana", "", false),
                ("Banana", "fruit", false),
                ("Apple", "", true),
            ]
        );
    }

    #[test]
    fn test_equal_entries() {
        let a = entry("Same", Some("ctx"), false);
        assert_eq!(compare_entries(&a, &a.clone()), Ordering::Equal);
    }
}
