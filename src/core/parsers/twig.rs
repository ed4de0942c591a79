//! Twig template lexer.
//!
//! Text outside tags is skipped. Inside `{{ }}` and `{% %}` the lexer emits
//! expression tokens; `{# #}` becomes a comment token. `{% verbatim %}` and
//! `{% raw %}` sections are skipped entirely.

use anyhow::{Result, anyhow};

use crate::core::data::LineIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwigToken {
    Name(String),
    /// String literal. `None` when it uses `#{...}` interpolation.
    Str(Option<String>),
    Number,
    /// One of `( ) [ ] { } , . : ? |`
    Punct(char),
    Operator,
    /// Comment body without `{# #}` and whitespace-control modifiers.
    Comment(String),
    /// End of a `{{ }}` or `{% %}` tag.
    TagEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: TwigToken,
    pub offset: usize,
}

pub fn tokenize_twig(source: &str) -> Result<Vec<Spanned>> {
    let mut lexer = Lexer {
        src: source,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Spanned>,
}

const RAW_BLOCKS: &[(&str, &str)] = &[("verbatim", "endverbatim"), ("raw", "endraw")];

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, offset: usize, what: &str) -> anyhow::Error {
        let (line, _) = LineIndex::new(self.src).position(offset);
        anyhow!("{} starting on line {}", what, line)
    }

    fn push(&mut self, token: TwigToken, offset: usize) {
        self.tokens.push(Spanned { token, offset });
    }

    fn run(&mut self) -> Result<()> {
        while let Some(open) = self.rest().find('{').map(|i| self.pos + i) {
            self.pos = open;
            let rest = self.rest();

            if rest.starts_with("{#") {
                let Some(end) = rest.find("#}") else {
                    return Err(self.error(open, "Unclosed comment"));
                };
                let body = rest[2..end]
                    .trim_start_matches(['-', '~'])
                    .trim_end_matches(['-', '~'])
                    .to_string();
                self.pos += end + 2;
                self.push(TwigToken::Comment(body), open);
            } else if rest.starts_with("{{") {
                self.pos += 2;
                self.lex_tag(open, "}}")?;
            } else if rest.starts_with("{%") {
                self.pos += 2;
                let first = self.tokens.len();
                self.lex_tag(open, "%}")?;
                self.skip_raw_block(first)?;
            } else {
                self.pos += 1;
            }
        }
        Ok(())
    }

    /// After a `{% verbatim %}` tag, jump past the matching end tag.
    fn skip_raw_block(&mut self, first: usize) -> Result<()> {
        let Some(TwigToken::Name(name)) = self.tokens.get(first).map(|t| &t.token) else {
            return Ok(());
        };
        let Some(&(_, end_name)) = RAW_BLOCKS.iter().find(|(start, _)| *start == name.as_str())
        else {
            return Ok(());
        };

        let start = self.pos;
        let mut search = self.pos;
        while let Some(found) = self.src[search..].find("{%").map(|i| search + i) {
            let inner = self.src[found + 2..]
                .trim_start_matches(['-', '~'])
                .trim_start();
            if inner.starts_with(end_name) {
                let Some(close) = self.src[found..].find("%}") else {
                    break;
                };
                self.pos = found + close + 2;
                return Ok(());
            }
            search = found + 2;
        }
        Err(self.error(start, "Unclosed verbatim block"))
    }

    fn lex_tag(&mut self, open: usize, end: &str) -> Result<()> {
        if self.rest().starts_with(['-', '~']) {
            self.pos += 1;
        }
        let mut depth = 0usize;

        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return Err(self.error(open, "Unclosed tag"));
            };
            let start = self.pos;

            if depth == 0 {
                let trimmed = rest.strip_prefix(['-', '~']).unwrap_or(rest);
                if trimmed.starts_with(end) {
                    self.pos += rest.len() - trimmed.len() + end.len();
                    self.push(TwigToken::TagEnd, start);
                    return Ok(());
                }
            }

            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if c == '_' || c.is_ascii_alphabetic() {
                let len = rest
                    .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
                    .unwrap_or(rest.len());
                self.pos += len;
                self.push(TwigToken::Name(rest[..len].to_string()), start);
            } else if c.is_ascii_digit() {
                let len = rest
                    .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '_'))
                    .unwrap_or(rest.len());
                self.pos += len;
                self.push(TwigToken::Number, start);
            } else if c == '\'' || c == '"' {
                let value = self.lex_string(c, start)?;
                self.push(TwigToken::Str(value), start);
            } else if matches!(c, '(' | '[' | '{') {
                depth += 1;
                self.pos += 1;
                self.push(TwigToken::Punct(c), start);
            } else if matches!(c, ')' | ']' | '}') {
                depth = depth.saturating_sub(1);
                self.pos += 1;
                self.push(TwigToken::Punct(c), start);
            } else if matches!(c, ',' | '.' | ':' | '?' | '|') {
                self.pos += 1;
                self.push(TwigToken::Punct(c), start);
            } else {
                self.pos += c.len_utf8();
                self.push(TwigToken::Operator, start);
            }
        }
    }

    fn lex_string(&mut self, quote: char, start: usize) -> Result<Option<String>> {
        self.pos += 1;
        let mut value = String::new();
        let mut interpolated = false;
        let mut chars = self.rest().char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos += idx + 1;
                    return Ok((!interpolated).then_some(value));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, other)) if other == quote || other == '\\' => value.push(other),
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                '#' if quote == '"' && chars.peek().map(|(_, n)| *n) == Some('{') => {
                    interpolated = true;
                    value.push(c);
                }
                _ => value.push(c),
            }
        }

        Err(self.error(start, "Unterminated string"))
    }
}
