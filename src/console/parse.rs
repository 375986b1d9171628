//! Command line parsing
//!
//! Three grammars live here:
//! - word tokens: whitespace separated, `"…"` / `'…'` runs keep spaces
//! - mapping literals: `{"name": "Pool", "number": 3}`
//! - dotted calls: `City.update("id", "name", "Austin")`
//!
//! Value coercion for unquoted text: a token containing `.` is tried as a
//! float, anything else as an integer, and on failure the text is kept.

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{CommandError, CommandResult};
use crate::model::FieldValue;

/// One word of a command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text with quotes removed
    pub text: String,
    /// Whether any part of the token was quoted
    pub quoted: bool,
    /// Byte offset just past the token in the tokenized input
    pub end: usize,
}

impl Token {
    /// Builds a token from one raw argument, stripping a single pair of
    /// matching outer quotes.
    pub fn from_raw(raw: &str) -> Token {
        let trimmed = raw.trim();
        let bytes = trimmed.as_bytes();
        let quoted = bytes.len() >= 2
            && (bytes[0] == b'"' || bytes[0] == b'\'')
            && bytes[bytes.len() - 1] == bytes[0];
        let text = if quoted {
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        };
        Token {
            text: text.to_string(),
            quoted,
            end: raw.len(),
        }
    }

    /// Coerces this token into a field value.
    pub fn coerce(&self) -> FieldValue {
        if self.quoted {
            FieldValue::Str(self.text.clone())
        } else {
            coerce_bare(&self.text)
        }
    }
}

/// Coerces unquoted text: float if it contains `.`, else integer, else the
/// text itself. Non-finite floats stay text since JSON cannot hold them.
pub fn coerce_bare(text: &str) -> FieldValue {
    if text.contains('.') {
        match text.parse::<f64>() {
            Ok(x) if x.is_finite() => FieldValue::Float(x),
            _ => FieldValue::Str(text.to_string()),
        }
    } else {
        text.parse::<i64>()
            .map(FieldValue::Int)
            .unwrap_or_else(|_| FieldValue::Str(text.to_string()))
    }
}

/// Splits a line into its verb and the raw text after it.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    }
}

/// Splits text into word tokens.
///
/// Quoted runs may contain whitespace and `\` escapes. Adjacent quoted and
/// unquoted runs join into one token.
///
/// # Errors
///
/// `** invalid syntax **` on an unterminated quote.
pub fn tokenize(input: &str) -> CommandResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut text = String::new();
        let mut quoted = false;
        let mut end = input.len();

        while let Some(&(pos, c)) = chars.peek() {
            if c.is_whitespace() {
                end = pos;
                break;
            }
            chars.next();
            if c == '"' || c == '\'' {
                quoted = true;
                let mut closed = false;
                while let Some((_, inner)) = chars.next() {
                    if inner == c {
                        closed = true;
                        break;
                    }
                    if inner == '\\' {
                        match chars.next() {
                            Some((_, escaped)) => text.push(escaped),
                            None => break,
                        }
                    } else {
                        text.push(inner);
                    }
                }
                if !closed {
                    return Err(CommandError::InvalidSyntax);
                }
            } else {
                text.push(c);
            }
        }

        tokens.push(Token { text, quoted, end });
    }

    Ok(tokens)
}

/// Parses a mapping literal into ordered assignments.
///
/// Grammar:
///
/// ```text
/// literal := '{' [ entry (',' entry)* [','] ] '}'
/// entry   := string ':' value
/// value   := string | list | bare
/// list    := '[' [ string (',' string)* [','] ] ']'
/// ```
///
/// Strings are single- or double-quoted. Bare values run to the next `,`
/// or `}` and are coerced like unquoted tokens.
///
/// # Errors
///
/// `** invalid dictionary syntax **` if the text is not one complete literal.
pub fn parse_mapping_literal(text: &str) -> CommandResult<Vec<(String, FieldValue)>> {
    LiteralParser::new(text)
        .parse()
        .ok_or(CommandError::InvalidDictionarySyntax)
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Option<Vec<(String, FieldValue)>> {
        let mut entries = Vec::new();

        self.expect('{')?;
        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            let key = self.string()?;
            self.expect(':')?;
            let value = self.value()?;
            entries.push((key, value));

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            break;
        }

        self.skip_ws();
        if self.pos != self.chars.len() {
            return None;
        }
        Some(entries)
    }

    fn value(&mut self) -> Option<FieldValue> {
        self.skip_ws();
        match self.peek()? {
            '"' | '\'' => self.string().map(FieldValue::Str),
            '[' => self.list().map(FieldValue::List),
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ',' || c == '}' {
                        break;
                    }
                    self.pos += 1;
                }
                let bare: String = self.chars[start..self.pos].iter().collect();
                let bare = bare.trim();
                if bare.is_empty() || bare.contains(|c| matches!(c, '{' | '[' | ':' | '"' | '\'')) {
                    return None;
                }
                Some(coerce_bare(bare))
            }
        }
    }

    fn list(&mut self) -> Option<Vec<String>> {
        let mut items = Vec::new();
        self.expect('[')?;
        loop {
            self.skip_ws();
            if self.eat(']') {
                return Some(items);
            }
            items.push(self.string()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            return Some(items);
        }
    }

    fn string(&mut self) -> Option<String> {
        self.skip_ws();
        let quote = self.peek()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        self.pos += 1;

        let mut out = String::new();
        loop {
            let c = self.peek()?;
            self.pos += 1;
            match c {
                c if c == quote => return Some(out),
                '\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                c => out.push(c),
            }
        }
    }

    fn expect(&mut self, c: char) -> Option<()> {
        self.skip_ws();
        if self.eat(c) {
            Some(())
        } else {
            None
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }
}

/// A parsed `Kind.method(args)` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedCall<'a> {
    pub kind: &'a str,
    pub method: &'a str,
    pub args: &'a str,
}

/// Shape of a line that didn't match a known verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback<'a> {
    /// `Kind.method(args)`
    Call(DottedCall<'a>),
    /// `Kind.something` without a well-formed call
    Malformed { kind: &'a str },
    /// Nothing dotted at all
    Unrecognized,
}

fn call_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$")
            .expect("call pattern is a valid regex")
    })
}

fn kind_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\.").expect("kind prefix is a valid regex")
    })
}

/// Classifies a line for the dotted fallback syntax.
pub fn parse_fallback(line: &str) -> Fallback<'_> {
    let line = line.trim();
    if let Some(caps) = call_pattern().captures(line) {
        if let (Some(kind), Some(method), Some(args)) = (caps.get(1), caps.get(2), caps.get(3)) {
            return Fallback::Call(DottedCall {
                kind: kind.as_str(),
                method: method.as_str(),
                args: args.as_str(),
            });
        }
    }
    match kind_prefix().captures(line).and_then(|caps| caps.get(1)) {
        Some(kind) => Fallback::Malformed {
            kind: kind.as_str(),
        },
        None => Fallback::Unrecognized,
    }
}

/// Splits dotted-call arguments at top-level commas.
///
/// Commas inside quotes, braces, or brackets don't split. Empty input
/// yields no arguments.
///
/// # Errors
///
/// `** invalid syntax **` on an unterminated quote or unbalanced brackets.
pub fn split_call_args(args: &str) -> CommandResult<Vec<&str>> {
    if args.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (pos, c) in args.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CommandError::InvalidSyntax);
                }
            }
            ',' if depth == 0 => {
                parts.push(args[start..pos].trim());
                start = pos + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() || depth != 0 {
        return Err(CommandError::InvalidSyntax);
    }
    parts.push(args[start..].trim());
    Ok(parts)
}
