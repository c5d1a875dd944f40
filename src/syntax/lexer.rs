//! Structural tokenizer for the built-in grammar
//!
//! Produces a Python-style token stream: names, numbers, strings,
//! comments, operators, and the layout tokens (logical newline,
//! non-logical newline, indent, dedent, end marker). Tokenizing stops at the
//! first unrecoverable error and keeps every token produced before it.

use crate::error::{HighlightError, Result};

/// Lexical token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Number,
    String,
    Comment,
    Op,
    /// End of a logical line
    Newline,
    /// Line break that does not end a statement
    Nl,
    Indent,
    Dedent,
    EndMarker,
    /// Character sequence no rule accepts
    Error,
}

/// A (line, column) position; lines are 1-based, columns count characters
pub type Position = (usize, usize);

/// A single lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }

    /// Layout tokens skipped when looking for the next significant token
    pub fn is_layout(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Newline
                | TokenKind::Nl
                | TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::EndMarker
        )
    }

    /// Whether this is the operator `op`
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_name(&self) -> bool {
        self.kind == TokenKind::Name
    }
}

/// Output of one tokenizer run
#[derive(Debug)]
pub struct TokenStream {
    /// Tokens produced before any error
    pub tokens: Vec<Token>,
    /// Why tokenizing stopped early, if it did
    pub error: Option<HighlightError>,
}

impl TokenStream {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Tokenize `text` with the built-in grammar's lexical rules
pub fn tokenize(text: &str) -> TokenStream {
    let mut tokenizer = Tokenizer::new();
    let error = tokenizer.run(text).err();
    TokenStream {
        tokens: tokenizer.tokens,
        error,
    }
}

const OPERATORS_3: [&str; 5] = ["**=", "//=", ">>=", "<<=", "..."];

const OPERATORS_2: [&str; 19] = [
    "==", "!=", "<=", ">=", "**", "//", "<<", ">>", "->", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "@=", ":=",
];

const OPERATORS_1: &str = "()[]{}:;,.+-*/%&|^~<>=@";

/// A string literal that continues past the end of its first line
struct OpenString {
    start: Position,
    quote: char,
    triple: bool,
    text: String,
}

struct Tokenizer {
    tokens: Vec<Token>,
    indents: Vec<usize>,
    depth: usize,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            indents: vec![0],
            depth: 0,
        }
    }

    fn push(&mut self, kind: TokenKind, chars: &[char], line: usize, start: usize, end: usize) {
        let text: String = chars[start..end].iter().collect();
        self.tokens.push(Token::new(kind, text, (line, start), (line, end)));
    }

    fn run(&mut self, text: &str) -> Result<()> {
        let mut lnum = 0;
        let mut open: Option<OpenString> = None;
        let mut continued = false;

        for raw in text.split_inclusive('\n') {
            lnum += 1;
            let chars: Vec<char> = raw.chars().collect();
            let len = chars.len();
            let mut pos = 0;

            if let Some(mut string) = open.take() {
                match find_string_end(&chars, 0, string.quote, string.triple) {
                    Some(end) => {
                        string.text.extend(&chars[..end]);
                        self.tokens.push(Token::new(
                            TokenKind::String,
                            string.text,
                            string.start,
                            (lnum, end),
                        ));
                        pos = end;
                    }
                    None if string.triple || ends_with_escaped_newline(&chars) => {
                        string.text.extend(&chars);
                        open = Some(string);
                        continue;
                    }
                    None => {
                        // single-quoted string continued with a backslash but never closed
                        string.text.extend(&chars);
                        self.tokens.push(Token::new(
                            TokenKind::Error,
                            string.text,
                            string.start,
                            (lnum, len),
                        ));
                        continue;
                    }
                }
            } else if self.depth == 0 && !continued {
                let mut column = 0;
                while pos < len {
                    match chars[pos] {
                        ' ' => column += 1,
                        '\t' => column = (column / 8 + 1) * 8,
                        '\x0c' => column = 0,
                        _ => break,
                    }
                    pos += 1;
                }
                if pos == len {
                    // whitespace-only last line without a newline
                    continue;
                }

                let ch = chars[pos];
                if ch == '#' || ch == '\r' || ch == '\n' {
                    if ch == '#' {
                        let end = line_content_end(&chars);
                        self.push(TokenKind::Comment, &chars, lnum, pos, end);
                        pos = end;
                    }
                    if pos < len {
                        self.push(TokenKind::Nl, &chars, lnum, pos, len);
                    }
                    continue;
                }

                self.indent_to(column, &chars, lnum, pos)?;
            } else {
                continued = false;
            }

            while pos < len {
                while pos < len && matches!(chars[pos], ' ' | '\t' | '\x0c') {
                    pos += 1;
                }
                if pos >= len {
                    break;
                }

                let start = pos;
                let ch = chars[pos];

                if ch == '\r' || ch == '\n' {
                    let kind = if self.depth > 0 {
                        TokenKind::Nl
                    } else {
                        TokenKind::Newline
                    };
                    self.push(kind, &chars, lnum, start, len);
                    pos = len;
                } else if ch == '#' {
                    pos = line_content_end(&chars);
                    self.push(TokenKind::Comment, &chars, lnum, start, pos);
                } else if ch.is_ascii_digit()
                    || (ch == '.' && chars.get(pos + 1).is_some_and(|c| c.is_ascii_digit()))
                {
                    pos = scan_number(&chars, pos);
                    self.push(TokenKind::Number, &chars, lnum, start, pos);
                } else if let Some(quote_at) = string_quote_at(&chars, pos) {
                    let quote = chars[quote_at];
                    let triple = chars.get(quote_at + 1) == Some(&quote)
                        && chars.get(quote_at + 2) == Some(&quote);
                    let body = if triple { quote_at + 3 } else { quote_at + 1 };

                    match find_string_end(&chars, body, quote, triple) {
                        Some(end) => {
                            pos = end;
                            self.push(TokenKind::String, &chars, lnum, start, pos);
                        }
                        None if triple || ends_with_escaped_newline(&chars) => {
                            open = Some(OpenString {
                                start: (lnum, start),
                                quote,
                                triple,
                                text: chars[start..].iter().collect(),
                            });
                            pos = len;
                        }
                        None => {
                            // unterminated on this line: flag the opening quote and carry on
                            pos = quote_at + 1;
                            self.push(TokenKind::Error, &chars, lnum, start, pos);
                        }
                    }
                } else if ch.is_alphabetic() || ch == '_' {
                    while pos < len && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                        pos += 1;
                    }
                    self.push(TokenKind::Name, &chars, lnum, start, pos);
                } else if ch == '\\' {
                    if is_line_end(&chars, pos + 1) {
                        continued = true;
                        pos = len;
                    } else {
                        pos += 1;
                        self.push(TokenKind::Error, &chars, lnum, start, pos);
                    }
                } else {
                    pos = self.scan_operator(&chars, pos);
                    let kind = if pos > start {
                        TokenKind::Op
                    } else {
                        pos = start + 1;
                        TokenKind::Error
                    };
                    self.push(kind, &chars, lnum, start, pos);
                }
            }
        }

        if let Some(string) = open {
            return Err(tokenize_error(string.start, "EOF in multi-line string"));
        }
        if continued || self.depth > 0 {
            return Err(tokenize_error((lnum + 1, 0), "EOF in multi-line statement"));
        }

        let ends_statement = self
            .tokens
            .last()
            .map_or(true, |t| matches!(t.kind, TokenKind::Newline | TokenKind::Nl));
        if !ends_statement {
            let end = self.tokens.last().map(|t| t.end).unwrap_or((lnum, 0));
            self.tokens.push(Token::new(TokenKind::Newline, "", end, end));
        }

        let eof = (lnum + 1, 0);
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, "", eof, eof));
        }
        self.tokens.push(Token::new(TokenKind::EndMarker, "", eof, eof));
        Ok(())
    }

    /// Emit indent/dedent tokens for a new logical line at `column`
    fn indent_to(&mut self, column: usize, chars: &[char], lnum: usize, pos: usize) -> Result<()> {
        let top = self.indents.last().copied().unwrap_or(0);
        if column > top {
            self.indents.push(column);
            self.push(TokenKind::Indent, chars, lnum, 0, pos);
            return Ok(());
        }
        if column < top && !self.indents.contains(&column) {
            return Err(tokenize_error(
                (lnum, pos),
                "unindent does not match any outer indentation level",
            ));
        }
        while self.indents.last().is_some_and(|&level| column < level) {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, "", (lnum, pos), (lnum, pos)));
        }
        Ok(())
    }

    /// Longest operator at `pos`; returns `pos` unchanged if none matches
    fn scan_operator(&mut self, chars: &[char], pos: usize) -> usize {
        let rest = |n: usize| -> Option<String> {
            (pos + n <= chars.len()).then(|| chars[pos..pos + n].iter().collect())
        };
        if let Some(op) = rest(3).filter(|s| OPERATORS_3.contains(&s.as_str())) {
            return pos + op.chars().count();
        }
        if let Some(op) = rest(2).filter(|s| OPERATORS_2.contains(&s.as_str())) {
            return pos + op.chars().count();
        }
        let ch = chars[pos];
        if !OPERATORS_1.contains(ch) {
            return pos;
        }
        match ch {
            '(' | '[' | '{' => self.depth += 1,
            ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        pos + 1
    }
}

fn tokenize_error(at: Position, reason: &str) -> HighlightError {
    HighlightError::Tokenize {
        line: at.0,
        column: at.1,
        reason: reason.to_string(),
    }
}

/// Index where the line's newline characters begin
fn line_content_end(chars: &[char]) -> usize {
    let mut end = chars.len();
    while end > 0 && matches!(chars[end - 1], '\n' | '\r') {
        end -= 1;
    }
    end
}

/// Whether only newline characters (or nothing) remain from `pos`
fn is_line_end(chars: &[char], pos: usize) -> bool {
    pos >= chars.len() || line_content_end(chars) <= pos
}

/// Whether the line ends with a backslash escaping its newline
fn ends_with_escaped_newline(chars: &[char]) -> bool {
    let end = line_content_end(chars);
    end < chars.len() && end > 0 && chars[end - 1] == '\\' && {
        let slashes = chars[..end].iter().rev().take_while(|&&c| c == '\\').count();
        slashes % 2 == 1
    }
}

/// If a string literal (with optional prefix) starts at `pos`, the quote's index
fn string_quote_at(chars: &[char], pos: usize) -> Option<usize> {
    let is_quote = |i: usize| matches!(chars.get(i), Some('"') | Some('\''));
    if is_quote(pos) {
        return Some(pos);
    }
    let prefix_char = |i: usize| chars.get(i).map(|c| c.to_ascii_lowercase());
    match (prefix_char(pos), prefix_char(pos + 1)) {
        (Some('r' | 'u' | 'b' | 'f'), _) if is_quote(pos + 1) => Some(pos + 1),
        (Some('r'), Some('b' | 'f')) | (Some('b' | 'f'), Some('r')) if is_quote(pos + 2) => {
            Some(pos + 2)
        }
        _ => None,
    }
}

/// Index just past the closing quote, searching from `from`
fn find_string_end(chars: &[char], from: usize, quote: char, triple: bool) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' | '\r' if !triple => return None,
            c if c == quote => {
                if !triple {
                    return Some(i + 1);
                }
                if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                    return Some(i + 3);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Index just past a numeric literal starting at `pos`
fn scan_number(chars: &[char], pos: usize) -> usize {
    let mut i = pos;
    let at = |i: usize| chars.get(i).copied();

    if at(i) == Some('0') && matches!(at(i + 1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')) {
        i += 2;
        while at(i).is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
            i += 1;
        }
        return i;
    }

    while at(i).is_some_and(|c| c.is_ascii_digit() || c == '_') {
        i += 1;
    }
    if at(i) == Some('.') {
        i += 1;
        while at(i).is_some_and(|c| c.is_ascii_digit() || c == '_') {
            i += 1;
        }
    }
    if matches!(at(i), Some('e' | 'E')) {
        let digits_at = if matches!(at(i + 1), Some('+' | '-')) { i + 2 } else { i + 1 };
        if at(digits_at).is_some_and(|c| c.is_ascii_digit()) {
            i = digits_at;
            while at(i).is_some_and(|c| c.is_ascii_digit() || c == '_') {
                i += 1;
            }
        }
    }
    if matches!(at(i), Some('j' | 'J')) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(text: &str, kind: TokenKind) -> Vec<String> {
        tokenize(text)
            .tokens
            .into_iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_simple_statement() {
        use TokenKind::*;
        assert_eq!(
            kinds("x = 42\n"),
            vec![Name, Op, Number, Newline, EndMarker]
        );
    }

    #[test]
    fn test_positions() {
        let stream = tokenize("a\n  bc = 1\n");
        let bc = stream.tokens.iter().find(|t| t.text == "bc").unwrap();
        assert_eq!(bc.start, (2, 2));
        assert_eq!(bc.end, (2, 4));
    }

    #[test]
    fn test_indent_and_dedent() {
        use TokenKind::*;
        let stream = tokenize("if x:\n    y\nz\n");
        assert!(stream.is_complete());
        let k: Vec<_> = stream.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            k,
            vec![Name, Name, Op, Newline, Indent, Name, Newline, Dedent, Name, Newline, EndMarker]
        );
    }

    #[test]
    fn test_blank_and_comment_lines() {
        use TokenKind::*;
        assert_eq!(kinds("\n# note\nx\n"), vec![Nl, Comment, Nl, Name, Newline, EndMarker]);
        assert_eq!(texts("x  # trailing\n", Comment), vec!["# trailing"]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            texts(r#"a = "x\"y" + 'z' + f"{a}" + rb'raw'"#, TokenKind::String),
            vec![r#""x\"y""#, "'z'", r#"f"{a}""#, "rb'raw'"]
        );
    }

    #[test]
    fn test_hash_inside_string_is_not_comment() {
        assert!(texts("s = '# not a comment'\n", TokenKind::Comment).is_empty());
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let stream = tokenize("s = \"\"\"one\ntwo\"\"\"\nx\n");
        assert!(stream.is_complete());
        let s = stream
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::String)
            .unwrap();
        assert_eq!(s.start, (1, 4));
        assert_eq!(s.end, (2, 6));
        assert_eq!(s.text, "\"\"\"one\ntwo\"\"\"");
    }

    #[test]
    fn test_newlines_inside_brackets_are_nl() {
        use TokenKind::*;
        assert_eq!(
            kinds("f(a,\n  b)\n"),
            vec![Name, Op, Name, Op, Nl, Name, Op, Newline, EndMarker]
        );
    }

    #[test]
    fn test_backslash_continuation() {
        let stream = tokenize("x = 1 + \\\n    2\n");
        assert!(stream.is_complete());
        assert_eq!(texts("x = 1 + \\\n    2\n", TokenKind::Number), vec!["1", "2"]);
        assert!(!stream.tokens.iter().any(|t| t.kind == TokenKind::Indent));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            texts("0xFF 1_000 3.14 1e-5 .5 2j", TokenKind::Number),
            vec!["0xFF", "1_000", "3.14", "1e-5", ".5", "2j"]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            texts("a **= b == c -> d ... e", TokenKind::Op),
            vec!["**=", "==", "->", "..."]
        );
    }

    #[test]
    fn test_unterminated_triple_string_keeps_prefix() {
        let stream = tokenize("x = 1\ns = '''never closed\nmore\n");
        assert!(!stream.is_complete());
        assert!(matches!(stream.error, Some(HighlightError::Tokenize { line: 2, .. })));
        assert_eq!(stream.tokens[0].text, "x");
        assert!(stream.tokens.iter().all(|t| t.kind != TokenKind::String));
    }

    #[test]
    fn test_unclosed_bracket_is_eof_error() {
        let stream = tokenize("print(1,\n");
        assert!(!stream.is_complete());
        assert_eq!(stream.tokens[0].text, "print");
    }

    #[test]
    fn test_bad_dedent_stops() {
        let stream = tokenize("if x:\n        a\n    b\nc\n");
        assert!(matches!(stream.error, Some(HighlightError::Tokenize { line: 3, .. })));
        assert!(stream.tokens.iter().any(|t| t.text == "a"));
        assert!(!stream.tokens.iter().any(|t| t.text == "c"));
    }

    #[test]
    fn test_unterminated_single_quote_recovers() {
        let stream = tokenize("s = 'abc\nx = 1\n");
        assert!(stream.is_complete());
        assert!(stream.tokens.iter().any(|t| t.kind == TokenKind::Error && t.text == "'"));
        assert!(stream.tokens.iter().any(|t| t.text == "x"));
    }

    #[test]
    fn test_missing_final_newline() {
        use TokenKind::*;
        assert_eq!(kinds("x"), vec![Name, Newline, EndMarker]);
        assert_eq!(kinds(""), vec![EndMarker]);
    }
}
