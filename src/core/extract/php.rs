//! PHP extractor.
//!
//! PHP has no static import binding for the global translation functions, so
//! calls are matched by name alone (`__()` and `\__()`), excluding method
//! calls, static calls and function declarations.

use anyhow::Result;

use crate::core::data::{LineIndex, Message};
use crate::core::extract::{
    CallSpec, Extract, SourceComment, attach_translator_comments, lookup_call,
    might_contain_call,
};
use crate::core::parsers::php::{PhpToken, Spanned, tokenize_php};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhpExtractor;

impl Extract for PhpExtractor {
    fn might_have_translations(&self, source: &str) -> bool {
        might_contain_call(source)
    }

    fn extract(&self, source: &str, filename: &str) -> Result<Vec<Message>> {
        let tokens = tokenize_php(source)?;
        let index = LineIndex::new(source);

        let (comments, code): (Vec<&Spanned>, Vec<&Spanned>) = tokens
            .iter()
            .partition(|t| matches!(t.token, PhpToken::Comment(_)));

        let comments: Vec<SourceComment> = comments
            .into_iter()
            .filter_map(|t| match &t.token {
                PhpToken::Comment(body) => Some(SourceComment::new(t.offset, body.clone())),
                _ => None,
            })
            .collect();

        let mut sites: Vec<(usize, Option<Message>)> = Vec::new();
        for (idx, token) in code.iter().enumerate() {
            let Some(call) = call_at(&code, idx) else {
                continue;
            };
            let message = collect_args(&code, idx + 2)
                .and_then(|args| call.build(&args, index.location(filename, token.offset)));
            sites.push((token.offset, message));
        }

        let offsets: Vec<usize> = sites.iter().map(|(offset, _)| *offset).collect();
        let boundaries: Vec<usize> = code
            .iter()
            .filter(|t| matches!(t.token, PhpToken::Punct(';' | '{' | '}')))
            .map(|t| t.offset)
            .collect();
        let translators = attach_translator_comments(&comments, &offsets, &boundaries);

        Ok(sites
            .into_iter()
            .zip(translators)
            .filter_map(|((_, message), note)| message.map(|m| m.with_translators(note)))
            .collect())
    }
}

/// The translation function called at `code[idx]`, if that token starts a
/// plain function call.
fn call_at(code: &[&Spanned], idx: usize) -> Option<&'static CallSpec> {
    let PhpToken::Name(name) = &code[idx].token else {
        return None;
    };
    if code.get(idx + 1).map(|t| &t.token) != Some(&PhpToken::Punct('(')) {
        return None;
    }

    let previous = idx.checked_sub(1).map(|i| &code[i].token);
    match previous {
        Some(PhpToken::Arrow | PhpToken::DoubleColon) => return None,
        Some(PhpToken::Name(kw))
            if kw.eq_ignore_ascii_case("function") || kw.eq_ignore_ascii_case("new") =>
        {
            return None;
        }
        _ => {}
    }

    lookup_call(name.strip_prefix('\\').unwrap_or(name))
}

/// Collect positional literal arguments starting right after `(`.
///
/// Returns `None` when the argument list is never closed.
fn collect_args(code: &[&Spanned], start: usize) -> Option<Vec<Option<String>>> {
    let mut args = Vec::new();
    let mut current: Vec<&PhpToken> = Vec::new();
    let mut depth = 0usize;

    for spanned in code.get(start..)? {
        let token = &spanned.token;
        match token {
            PhpToken::Punct('(' | '[' | '{') => depth += 1,
            PhpToken::Punct(')' | ']' | '}') if depth > 0 => depth -= 1,
            PhpToken::Punct(')') => {
                if !(args.is_empty() && current.is_empty()) {
                    args.push(literal(&current));
                }
                return Some(args);
            }
            PhpToken::Punct(',') if depth == 0 => {
                args.push(literal(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(token);
    }

    None
}

/// An argument is literal only when it is exactly one string token.
fn literal(tokens: &[&PhpToken]) -> Option<String> {
    match tokens {
        [PhpToken::Str(value)] => value.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::data::{Location, MessageKind};
    use crate::core::extract::php::*;

    fn extract(source: &str) -> Vec<Message> {
        PhpExtractor.extract_translations(source, "inc/template.php")
    }

    fn texts(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.msgid()).collect()
    }

    #[test]
    fn test_single_with_domain() {
        let messages = extract("<?php\necho __('X', 'd');");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::Single { text: "X".into() });
        assert_eq!(messages[0].domain.as_deref(), Some("d"));
        assert_eq!(messages[0].location, Location::new("inc/template.php", 2, 5));
    }

    #[test]
    fn test_all_shapes() {
        let messages = extract(
            r#"<?php
_e('Echoed', 'd');
esc_html_x('Post', 'noun', 'd');
printf(_n('%d comment', '%d comments', $count, 'd'), $count);
_nx_noop('%d item', '%d items', 'cart', 'd');
"#,
        );
        assert_eq!(
            texts(&messages),
            vec!["Echoed", "Post", "%d comment", "%d item"]
        );
        assert_eq!(messages[1].context(), Some("noun"));
        assert_eq!(messages[2].plural(), Some("%d comments"));
        assert_eq!(messages[2].domain.as_deref(), Some("d"));
        assert_eq!(messages[3].context(), Some("cart"));
    }

    #[test]
    fn test_namespace_root_escape() {
        let messages = extract(r"<?php namespace App; echo \esc_attr__('Search', 'd');");
        assert_eq!(texts(&messages), vec!["Search"]);
    }

    #[test]
    fn test_methods_and_declarations_are_ignored() {
        let messages = extract(
            r#"<?php
$obj->__('method', 'd');
Foo::__('static', 'd');
function __($text, $domain = 'default') { return $text; }
"#,
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_non_literal_arguments() {
        let messages = extract(
            r#"<?php
__($text, 'd');
__("Hello $name", 'd');
__('a' . 'b', 'd');
__('Kept', $domain);
"#,
        );
        assert_eq!(texts(&messages), vec!["Kept"]);
        assert_eq!(messages[0].domain, None);
    }

    #[test]
    fn test_nested_argument_expressions() {
        let messages = extract("<?php _x('Title', 'ctx', get_domain(['a', 'b']));\n__('Next', 'd');");
        assert_eq!(texts(&messages), vec!["Title", "Next"]);
        assert_eq!(messages[0].domain, None);
    }

    #[test]
    fn test_translator_comments() {
        let messages = extract(
            r#"<?php
/* translators: %s: user name */
printf( __( 'Hello %s', 'd' ), $name );
// translators: second
echo esc_html__( 'Bye', 'd' );
echo esc_html__( 'Plain', 'd' );
"#,
        );
        assert_eq!(
            messages
                .iter()
                .map(|m| m.translators.as_deref())
                .collect::<Vec<_>>(),
            vec![
                Some("translators: %s: user name"),
                Some("translators: second"),
                None
            ]
        );
    }

    #[test]
    fn test_translator_comment_stops_at_statement_end() {
        let messages = extract(
            r#"<?php
// translators: label for the foo widget
register_foo();
$x = compute();
if ($x) { echo __('Later', 'd'); }
/* translators: %s: count */
printf(
    _n( '%s item', '%s items', $n, 'd' ),
    $n
);
"#,
        );
        assert_eq!(texts(&messages), vec!["Later", "%s item"]);
        assert_eq!(messages[0].translators, None);
        assert_eq!(
            messages[1].translators.as_deref(),
            Some("translators: %s: count")
        );
    }

    #[test]
    fn test_calls_inside_template_markup() {
        let messages = extract(
            r#"<header>
  <h1><?php esc_html_e( 'Site title', 'd' ); ?></h1>
  <a title="<?= esc_attr__( 'Home', 'd' ) ?>">x</a>
</header>"#,
        );
        assert_eq!(texts(&messages), vec!["Site title", "Home"]);
        assert_eq!(messages[1].location.line, 3);
    }

    #[test]
    fn test_prefilter() {
        assert!(!PhpExtractor.might_have_translations("<?php echo 'hello';"));
        assert!(extract("<?php echo 'hello';").is_empty());
    }

    #[test]
    fn test_unterminated_file_is_skipped() {
        assert!(PhpExtractor.extract("<?php __('x", "a.php").is_err());
        assert!(extract("<?php __('x").is_empty());
    }
}
