//! Minimal PHP lexer.
//!
//! Produces just enough structure to find translation calls: names,
//! string literals (with their decoded value when they contain no
//! interpolation), comments, and the punctuation that delimits call
//! arguments. Everything else collapses into [`PhpToken::Other`].

use anyhow::Result;

use crate::core::data::LineIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpToken {
    /// Identifier or qualified name, e.g. `__`, `\__`, `Foo\bar`.
    Name(String),
    Variable(String),
    /// String literal. `None` when the string interpolates variables.
    Str(Option<String>),
    /// Comment body without delimiters.
    Comment(String),
    /// One of `( ) [ ] { } , ;`
    Punct(char),
    /// `->` or `?->`
    Arrow,
    /// `::`
    DoubleColon,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: PhpToken,
    /// Byte offset of the token start.
    pub offset: usize,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Spanned>,
}

/// Tokenize a PHP file, starting in inline-HTML mode.
pub fn tokenize_php(source: &str) -> Result<Vec<Spanned>> {
    let mut lexer = Lexer {
        src: source,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(&mut self, token: PhpToken, offset: usize) {
        self.tokens.push(Spanned { token, offset });
    }

    fn error(&self, offset: usize, what: &str) -> anyhow::Error {
        let (line, _) = LineIndex::new(self.src).position(offset);
        anyhow::anyhow!("{} starting on line {}", what, line)
    }

    fn run(&mut self) -> Result<()> {
        loop {
            // Inline HTML until the next open tag.
            let Some(open) = self.rest().find("<?") else {
                return Ok(());
            };
            self.pos += open + 2;
            if self
                .rest()
                .get(..3)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("php"))
            {
                self.pos += 3;
            } else if self.rest().starts_with('=') {
                self.pos += 1;
            }

            if !self.lex_code()? {
                return Ok(());
            }
        }
    }

    /// Lex PHP code. Returns `true` when a close tag switched back to HTML.
    fn lex_code(&mut self) -> Result<bool> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            let rest = self.rest();

            if c.is_whitespace() {
                self.bump();
            } else if rest.starts_with("?>") {
                self.pos += 2;
                self.push(PhpToken::Punct(';'), start);
                return Ok(true);
            } else if rest.starts_with("//") || (c == '#' && self.peek_nth(1) != Some('[')) {
                self.pos += if c == '#' { 1 } else { 2 };
                self.lex_line_comment(start);
            } else if rest.starts_with("/*") {
                let Some(end) = rest[2..].find("*/") else {
                    return Err(self.error(start, "Unterminated comment"));
                };
                let body = rest[2..2 + end].to_string();
                self.pos += end + 4;
                self.push(PhpToken::Comment(body), start);
            } else if rest.starts_with("<<<") {
                self.lex_heredoc(start)?;
            } else if c == '\'' {
                self.bump();
                let value = self.lex_single_quoted(start)?;
                self.push(PhpToken::Str(Some(value)), start);
            } else if c == '"' {
                self.bump();
                let value = self.lex_double_quoted(start)?;
                self.push(PhpToken::Str(value), start);
            } else if c == '$' && self.peek_nth(1).is_some_and(is_ident_start) {
                self.bump();
                let name = self.take_while(is_ident_char);
                self.push(PhpToken::Variable(name), start);
            } else if is_ident_start(c)
                || (c == '\\' && self.peek_nth(1).is_some_and(is_ident_start))
            {
                let name = self.take_while(|c| is_ident_char(c) || c == '\\');
                self.push(PhpToken::Name(name), start);
            } else if c.is_ascii_digit() {
                self.take_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
                self.push(PhpToken::Other, start);
            } else if rest.starts_with("->") {
                self.pos += 2;
                self.push(PhpToken::Arrow, start);
            } else if rest.starts_with("?->") {
                self.pos += 3;
                self.push(PhpToken::Arrow, start);
            } else if rest.starts_with("::") {
                self.pos += 2;
                self.push(PhpToken::DoubleColon, start);
            } else if matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';') {
                self.bump();
                self.push(PhpToken::Punct(c), start);
            } else {
                self.bump();
                self.push(PhpToken::Other, start);
            }
        }
        Ok(false)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    /// Line comments end at a newline or right before a close tag.
    fn lex_line_comment(&mut self, start: usize) {
        let rest = self.rest();
        let newline = rest.find('\n').unwrap_or(rest.len());
        let end = rest[..newline].find("?>").unwrap_or(newline);
        let body = rest[..end].to_string();
        self.pos += end;
        self.push(PhpToken::Comment(body), start);
    }

    fn lex_single_quoted(&mut self, start: usize) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(start, "Unterminated string")),
                Some('\'') => return Ok(value),
                Some('\\') => match self.peek() {
                    Some(c @ ('\'' | '\\')) => {
                        self.bump();
                        value.push(c);
                    }
                    _ => value.push('\\'),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn lex_double_quoted(&mut self, start: usize) -> Result<Option<String>> {
        let body_start = self.pos;
        loop {
            match self.bump() {
                None => return Err(self.error(start, "Unterminated string")),
                Some('"') => break,
                Some('\\') => {
                    self.bump();
                }
                Some(_) => {}
            }
        }
        let body = &self.src[body_start..self.pos - 1];
        Ok(unescape_double_quoted(body))
    }

    fn lex_heredoc(&mut self, start: usize) -> Result<()> {
        self.pos += 3;
        self.take_while(|c| c == ' ' || c == '\t');

        let nowdoc = self.peek() == Some('\'');
        let quoted = nowdoc || self.peek() == Some('"');
        if quoted {
            self.bump();
        }
        let label = self.take_while(is_ident_char);
        if quoted {
            self.bump();
        }
        if label.is_empty() {
            self.push(PhpToken::Other, start);
            return Ok(());
        }

        // Body starts on the next line.
        let rest = self.rest();
        let Some(newline) = rest.find('\n') else {
            return Err(self.error(start, "Unterminated heredoc"));
        };
        let body_start = self.pos + newline + 1;

        let mut line_start = body_start;
        loop {
            if line_start > self.src.len() {
                return Err(self.error(start, "Unterminated heredoc"));
            }
            let line_end = self.src[line_start..]
                .find('\n')
                .map(|i| line_start + i)
                .unwrap_or(self.src.len());
            let line = &self.src[line_start..line_end];
            let trimmed = line.trim_start();
            let indent = line.len() - trimmed.len();

            if let Some(after) = trimmed.strip_prefix(label.as_str())
                && !after.chars().next().is_some_and(is_ident_char)
            {
                let body_end = line_start.saturating_sub(1).max(body_start);
                let raw = &self.src[body_start..body_end];
                let body = raw
                    .split('\n')
                    .map(|l| l.get(indent..).unwrap_or(l.trim_start()))
                    .collect::<Vec<_>>()
                    .join("\n");

                let value = if nowdoc {
                    Some(body)
                } else {
                    unescape_double_quoted(&body)
                };
                self.pos = line_start + indent + label.len();
                self.push(PhpToken::Str(value), start);
                return Ok(());
            }

            if line_end == self.src.len() {
                return Err(self.error(start, "Unterminated heredoc"));
            }
            line_start = line_end + 1;
        }
    }
}

/// Decode a double-quoted (or heredoc) body.
///
/// Returns `None` when the body interpolates a variable (`$name`, `{$expr}`).
fn unescape_double_quoted(body: &str) -> Option<String> {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' if chars.peek().is_some_and(|n| is_ident_start(*n) || *n == '{') => {
                return None;
            }
            '{' if chars.peek() == Some(&'$') => return None,
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('v') => value.push('\u{b}'),
                Some('e') => value.push('\u{1b}'),
                Some('f') => value.push('\u{c}'),
                Some('\\') => value.push('\\'),
                Some('$') => value.push('$'),
                Some('"') => value.push('"'),
                Some('x') => {
                    let hex: String = std::iter::from_fn(|| chars.next_if(|c| c.is_ascii_hexdigit()))
                        .take(2)
                        .collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(ch) => value.push(ch),
                        None => value.push_str("\\x"),
                    }
                }
                Some('u') if chars.peek() == Some(&'{') => {
                    chars.next();
                    let hex: String = std::iter::from_fn(|| chars.next_if(|c| *c != '}')).collect();
                    chars.next();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(ch) => value.push(ch),
                        None => value.push_str(&format!("\\u{{{}}}", hex)),
                    }
                }
                Some(d @ '0'..='7') => {
                    let mut octal = d.to_string();
                    while octal.len() < 3
                        && let Some(next) = chars.next_if(|c| ('0'..='7').contains(c))
                    {
                        octal.push(next);
                    }
                    match u32::from_str_radix(&octal, 8).ok().and_then(char::from_u32) {
                        Some(ch) => value.push(ch),
                        None => value.push_str(&octal),
                    }
                }
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            },
            _ => value.push(c),
        }
    }

    Some(value)
}
