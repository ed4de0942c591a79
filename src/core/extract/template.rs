//! Twig template extractor.
//!
//! Works on the token stream instead of a full template AST: a NAME token
//! from the call table immediately followed by `(` starts a call, and each
//! top-level argument holds a value only when it is a single string token.

use anyhow::Result;

use crate::core::data::{LineIndex, Message};
use crate::core::extract::{
    Extract, SourceComment, attach_translator_comments, lookup_call, might_contain_call,
};
use crate::core::parsers::twig::{Spanned, TwigToken, tokenize_twig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateExtractor;

impl Extract for TemplateExtractor {
    fn might_have_translations(&self, source: &str) -> bool {
        might_contain_call(source)
    }

    fn extract(&self, source: &str, filename: &str) -> Result<Vec<Message>> {
        let tokens = tokenize_twig(source)?;
        let index = LineIndex::new(source);

        let mut comments = Vec::new();
        let mut code: Vec<&Spanned> = Vec::new();
        for spanned in &tokens {
            match &spanned.token {
                TwigToken::Comment(body) => {
                    comments.push(SourceComment::new(spanned.offset, body.clone()))
                }
                _ => code.push(spanned),
            }
        }

        let mut sites: Vec<(usize, Option<Message>)> = Vec::new();
        for (idx, spanned) in code.iter().enumerate() {
            let TwigToken::Name(name) = &spanned.token else {
                continue;
            };
            let Some(call) = lookup_call(name) else {
                continue;
            };
            if code.get(idx + 1).map(|t| &t.token) != Some(&TwigToken::Punct('(')) {
                continue;
            }

            let message = string_args(&code[idx + 2..])
                .and_then(|args| call.build(&args, index.location(filename, spanned.offset)));
            sites.push((spanned.offset, message));
        }

        let offsets: Vec<usize> = sites.iter().map(|(offset, _)| *offset).collect();
        let tag_ends: Vec<usize> = code
            .iter()
            .filter(|t| t.token == TwigToken::TagEnd)
            .map(|t| t.offset)
            .collect();
        let translators = attach_translator_comments(&comments, &offsets, &tag_ends);

        Ok(sites
            .into_iter()
            .zip(translators)
            .filter_map(|((_, message), note)| message.map(|m| m.with_translators(note)))
            .collect())
    }
}

/// Positional string arguments of a call whose `(` was just consumed.
///
/// Returns `None` if the tag ends before the call is closed.
fn string_args(tokens: &[&Spanned]) -> Option<Vec<Option<String>>> {
    let mut args: Vec<Option<String>> = Vec::new();
    let mut current: Vec<&TwigToken> = Vec::new();
    let mut depth = 0usize;

    for spanned in tokens {
        let token = &spanned.token;
        match token {
            TwigToken::TagEnd => return None,
            TwigToken::Punct('(' | '[' | '{') => depth += 1,
            TwigToken::Punct(')' | ']' | '}') if depth > 0 => depth -= 1,
            TwigToken::Punct(')') => {
                if !(args.is_empty() && current.is_empty()) {
                    args.push(single_string(&current));
                }
                return Some(args);
            }
            TwigToken::Punct(',') if depth == 0 => {
                args.push(single_string(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(token);
    }

    None
}

fn single_string(tokens: &[&TwigToken]) -> Option<String> {
    match tokens {
        [TwigToken::Str(value)] => value.clone(),
        _ => None,
    }
}
