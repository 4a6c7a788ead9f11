//! Lexer (tokenizer) for B source code
//!
//! Converts raw source text into a [`Token`] stream consumed by the parser.
//! The lexer supports exactly one token of lookahead through
//! [`Lexer::peek_token`], skips whitespace and `/* ... */` comments between
//! tokens, and tags every token with its start and end [`Position`].
//!
//! Lexing continues after an error: a bad input region produces an `Error`
//! token (returned inside the [`LexError`]), and the next call resumes at the
//! following recognizable boundary.

use rustc_hash::FxHashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::OnceLock;

/// Reserved words of B. Everything else that looks like a word is an
/// identifier, including underscore-suffixed near-misses such as `auto_`.
static KEYWORDS: OnceLock<FxHashSet<&'static str>> = OnceLock::new();

fn keyword_set() -> &'static FxHashSet<&'static str> {
    KEYWORDS.get_or_init(|| {
        [
            "auto", "extrn", "if", "else", "while", "switch", "case",
            "default", "break", "return", "goto",
        ]
        .into_iter()
        .collect()
    })
}

/// A point in a named source text.
///
/// `line` and `column` are 1-based; `offset` is the byte offset from the
/// start of the input. The input name is shared rather than copied because
/// every token carries two positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// All token classes produced by the lexer.
///
/// Operators share a single kind and carry their spelling in the token
/// value; whether `*` is a dereference or a multiplication is decided by the
/// parser from grammatical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    String,
    Character,
    Ident,
    Keyword,
    Operator,
    Ternary,
    Colon,
    Semicolon,
    Comma,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Error,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Character => "character",
            TokenKind::Ident => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Ternary => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenBrace => "'{'",
            TokenKind::CloseBrace => "'}'",
            TokenKind::OpenBracket => "'['",
            TokenKind::CloseBracket => "']'",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        };
        f.write_str(name)
    }
}

/// A single lexed token.
///
/// `value` holds the lexeme: the digits of a number, the unescaped contents
/// of a string or character literal, the spelling of an operator or
/// identifier, or the message of an `Error` token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub start: Position,
    pub end: Position,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number => write!(f, "number {}", self.value),
            TokenKind::String => write!(f, "string \"{}\"", self.value),
            TokenKind::Character => write!(f, "character '{}'", self.value),
            TokenKind::Ident => write!(f, "identifier '{}'", self.value),
            TokenKind::Error => write!(f, "error"),
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "'{}'", self.value),
        }
    }
}

/// Lexer error type.
///
/// Carries the `Error` token emitted for the bad input region, so callers
/// holding only the error still see where lexing failed.
#[derive(Debug, Clone)]
pub struct LexError {
    pub token: Token,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.token.start.line, self.token.start.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for B source code.
pub struct Lexer {
    file: Rc<str>,
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    offset: usize,
    peeked: Option<Result<Token, LexError>>,
}

impl Lexer {
    /// Create a new lexer over `source`, tagging positions with `name`.
    pub fn new(name: &str, source: &str) -> Self {
        Self {
            file: Rc::from(name),
            input: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            offset: 0,
            peeked: None,
        }
    }

    /// The input name this lexer tags positions with.
    pub fn name(&self) -> &str {
        &self.file
    }

    /// Return the next token, consuming it. At end of input this returns an
    /// `Eof` token on every call.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(res) = self.peeked.take() {
            return res;
        }
        self.scan_token()
    }

    /// Return the next token without consuming it. Repeated calls return the
    /// same token until [`Lexer::next_token`] is called.
    pub fn peek_token(&mut self) -> Result<Token, LexError> {
        if self.peeked.is_none() {
            let res = self.scan_token();
            self.peeked = Some(res);
        }
        self.peeked.clone().unwrap()
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let start = self.position();
        let Some(ch) = self.advance() else {
            return Ok(self.token(TokenKind::Eof, String::new(), start));
        };

        match ch {
            '"' => self.string_literal(start),
            '\'' => self.character_literal(start),
            '0'..='9' => self.number(start, ch),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.ident_or_keyword(start, ch)),

            '?' => Ok(self.token(TokenKind::Ternary, "?".to_string(), start)),
            ':' => Ok(self.token(TokenKind::Colon, ":".to_string(), start)),
            ';' => Ok(self.token(TokenKind::Semicolon, ";".to_string(), start)),
            ',' => Ok(self.token(TokenKind::Comma, ",".to_string(), start)),
            '(' => Ok(self.token(TokenKind::OpenParen, "(".to_string(), start)),
            ')' => Ok(self.token(TokenKind::CloseParen, ")".to_string(), start)),
            '{' => Ok(self.token(TokenKind::OpenBrace, "{".to_string(), start)),
            '}' => Ok(self.token(TokenKind::CloseBrace, "}".to_string(), start)),
            '[' => Ok(self.token(TokenKind::OpenBracket, "[".to_string(), start)),
            ']' => Ok(self.token(TokenKind::CloseBracket, "]".to_string(), start)),

            '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '~' | '!' | '='
            | '<' | '>' => Ok(self.operator(start, ch)),

            _ => Err(self.error(start, format!("unexpected character '{}'", ch))),
        }
    }

    /// Maximal munch over the operator lexicon. The first character has
    /// already been consumed.
    fn operator(&mut self, start: Position, first: char) -> Token {
        let value = match first {
            '+' => {
                if self.eat('+') {
                    "++"
                } else {
                    "+"
                }
            }
            '-' => {
                if self.eat('-') {
                    "--"
                } else {
                    "-"
                }
            }
            '!' => {
                if self.eat('=') {
                    "!="
                } else {
                    "!"
                }
            }
            '&' => {
                if self.eat('&') {
                    "&&"
                } else {
                    "&"
                }
            }
            '|' => {
                if self.eat('|') {
                    "||"
                } else {
                    "|"
                }
            }
            '<' => {
                if self.eat('<') {
                    "<<"
                } else if self.eat('=') {
                    "<="
                } else {
                    "<"
                }
            }
            '>' => {
                if self.eat('>') {
                    ">>"
                } else if self.eat('=') {
                    ">="
                } else {
                    ">"
                }
            }
            '=' => self.assignment_operator(),
            '*' => "*",
            '/' => "/",
            '%' => "%",
            '^' => "^",
            '~' => "~",
            _ => unreachable!("operator() called on a non-operator character"),
        };

        self.token(TokenKind::Operator, value.to_string(), start)
    }

    /// B spells compound assignment with the `=` first: `=+`, `=-`, `=<<`
    /// and so on. A lone `=` not followed by another operator character is
    /// plain assignment.
    fn assignment_operator(&mut self) -> &'static str {
        match self.peek_char() {
            Some('=') => {
                self.advance();
                "=="
            }
            Some('+') => {
                self.advance();
                "=+"
            }
            Some('-') => {
                self.advance();
                "=-"
            }
            Some('*') => {
                self.advance();
                "=*"
            }
            Some('/') => {
                self.advance();
                "=/"
            }
            Some('%') => {
                self.advance();
                "=%"
            }
            Some('&') => {
                self.advance();
                "=&"
            }
            Some('|') => {
                self.advance();
                "=|"
            }
            Some('^') => {
                self.advance();
                "=^"
            }
            Some('<') if self.peek_char_at(1) == Some('<') => {
                self.advance();
                self.advance();
                "=<<"
            }
            Some('>') if self.peek_char_at(1) == Some('>') => {
                self.advance();
                self.advance();
                "=>>"
            }
            _ => "=",
        }
    }

    /// Lex a number: a run of decimal digits. A trailing identifier
    /// character is an error; the whole malformed region is consumed so the
    /// next call resumes at a clean boundary.
    fn number(&mut self, start: Position, first: char) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first);

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.peek_char(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            while matches!(self.peek_char(), Some(c) if c.is_ascii_alphanumeric() || c == '_')
            {
                self.advance();
            }
            return Err(self.error(start, "malformed number suffix".to_string()));
        }

        Ok(self.token(TokenKind::Number, text, start))
    }

    fn ident_or_keyword(&mut self, start: Position, first: char) -> Token {
        let mut ident = String::new();
        ident.push(first);

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = if keyword_set().contains(ident.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };

        self.token(kind, ident, start)
    }

    /// Lex a string literal. The opening quote has been consumed. Newlines
    /// are allowed inside the literal.
    fn string_literal(&mut self, start: Position) -> Result<Token, LexError> {
        let mut value = String::new();

        loop {
            let Some(ch) = self.advance() else {
                return Err(
                    self.error(start, "unterminated string literal".to_string())
                );
            };

            match ch {
                '"' => return Ok(self.token(TokenKind::String, value, start)),
                '\\' => value.push(self.escape(&start)?),
                ch => value.push(ch),
            }
        }
    }

    /// Lex a character literal: 1 to 4 characters between single quotes.
    fn character_literal(&mut self, start: Position) -> Result<Token, LexError> {
        let mut value = String::new();

        loop {
            let Some(ch) = self.advance() else {
                return Err(
                    self.error(start, "unterminated character literal".to_string())
                );
            };

            match ch {
                '\'' => break,
                '\\' => value.push(self.escape(&start)?),
                ch => value.push(ch),
            }
        }

        if value.is_empty() {
            return Err(self.error(start, "empty character literal".to_string()));
        }
        if value.chars().count() > 4 {
            return Err(self.error(
                start,
                "character literal longer than 4 characters".to_string(),
            ));
        }

        Ok(self.token(TokenKind::Character, value, start))
    }

    /// Decode one escape sequence; the backslash has been consumed. `\e` is
    /// the B escape character, which is `*`.
    fn escape(&mut self, start: &Position) -> Result<char, LexError> {
        let Some(ch) = self.advance() else {
            return Err(
                self.error(start.clone(), "unterminated escape sequence".to_string())
            );
        };

        match ch {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            '0' => Ok('\0'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            'e' => Ok('*'),
            other => Err(self.error(
                start.clone(),
                format!("unknown escape sequence '\\{}'", other),
            )),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r' | '\n' | '\x0b') => {
                    self.advance();
                }
                Some('/') if self.peek_char_at(1) == Some('*') => {
                    self.skip_comment()?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip a `/* ... */` comment. Comments do not nest. An unterminated
    /// comment is reported at the opening `/*`.
    fn skip_comment(&mut self) -> Result<(), LexError> {
        let start = self.position();
        self.advance();
        self.advance();

        loop {
            if self.is_at_end() {
                return Err(self.error(start, "unterminated comment".to_string()));
            }
            if self.peek_char() == Some('*') && self.peek_char_at(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }
    }

    fn token(&self, kind: TokenKind, value: String, start: Position) -> Token {
        Token {
            kind,
            value,
            start,
            end: self.position(),
        }
    }

    fn error(&self, start: Position, message: String) -> LexError {
        let token = Token {
            kind: TokenKind::Error,
            value: message.clone(),
            start,
            end: self.position(),
        };
        LexError { token, message }
    }

    fn position(&self) -> Position {
        Position {
            file: Rc::clone(&self.file),
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n).copied()
    }

    /// Consume the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        self.offset += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_values(source: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new("test", source);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            let done = tok.kind == TokenKind::Eof;
            out.push((tok.kind, tok.value));
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn test_keyword_vs_identifier() {
        let tokens = kinds_and_values("auto auto_ 123");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "auto".to_string()),
                (TokenKind::Ident, "auto_".to_string()),
                (TokenKind::Number, "123".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_operator_maximal_munch() {
        let tokens = kinds_and_values("> = >=");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Operator, ">".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Operator, ">=".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_assignment_operators() {
        let tokens = kinds_and_values("=+ =- =* =/ =% =& =| =^ =<< =>> == =");
        let values: Vec<&str> = tokens
            .iter()
            .take_while(|(kind, _)| *kind == TokenKind::Operator)
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(
            values,
            vec!["=+", "=-", "=*", "=/", "=%", "=&", "=|", "=^", "=<<", "=>>", "==", "="]
        );
    }

    #[test]
    fn test_equals_less_is_not_munched() {
        // "=<" is not an operator; only "=<<" is.
        let tokens = kinds_and_values("a =< b");
        assert_eq!(tokens[1], (TokenKind::Operator, "=".to_string()));
        assert_eq!(tokens[2], (TokenKind::Operator, "<".to_string()));
    }

    #[test]
    fn test_increment_and_logical() {
        let tokens = kinds_and_values("++ -- && || << >> <= >= != ==");
        let values: Vec<&str> = tokens
            .iter()
            .take_while(|(kind, _)| *kind == TokenKind::Operator)
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(
            values,
            vec!["++", "--", "&&", "||", "<<", ">>", "<=", ">=", "!=", "=="]
        );
    }

    #[test]
    fn test_peek_then_next() {
        let mut lexer = Lexer::new("file", "a b ¿");

        let tok = lexer.peek_token().unwrap();
        assert_eq!((tok.kind, tok.value.as_str()), (TokenKind::Ident, "a"));

        // Peeking again returns the same token.
        let tok = lexer.peek_token().unwrap();
        assert_eq!((tok.kind, tok.value.as_str()), (TokenKind::Ident, "a"));

        let tok = lexer.next_token().unwrap();
        assert_eq!((tok.kind, tok.value.as_str()), (TokenKind::Ident, "a"));

        let tok = lexer.next_token().unwrap();
        assert_eq!((tok.kind, tok.value.as_str()), (TokenKind::Ident, "b"));

        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.token.kind, TokenKind::Error);

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Eof);
    }

    #[test]
    fn test_bad_number_then_recovery() {
        let mut lexer = Lexer::new("test", "123abc xyz");

        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.token.kind, TokenKind::Error);
        assert_eq!(err.message, "malformed number suffix");

        let tok = lexer.next_token().unwrap();
        assert_eq!((tok.kind, tok.value.as_str()), (TokenKind::Ident, "xyz"));

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Eof);
    }

    #[test]
    fn test_number_before_identifier_is_fine() {
        let tokens = kinds_and_values("123 abc");
        assert_eq!(tokens[0], (TokenKind::Number, "123".to_string()));
        assert_eq!(tokens[1], (TokenKind::Ident, "abc".to_string()));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = kinds_and_values(r#""a string with spaces" "tab\there\n" "\e""#);
        assert_eq!(tokens[0], (TokenKind::String, "a string with spaces".to_string()));
        assert_eq!(tokens[1], (TokenKind::String, "tab\there\n".to_string()));
        assert_eq!(tokens[2], (TokenKind::String, "*".to_string()));
    }

    #[test]
    fn test_string_with_embedded_newline() {
        let mut lexer = Lexer::new("test", "\"line one\nline two\" next");
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.value, "line one\nline two");
        // The token after the literal is positioned on the second line.
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.start.line, 2);
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("test", "\"unterminated string");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.token.kind, TokenKind::Error);
        assert_eq!(err.message, "unterminated string literal");
    }

    #[test]
    fn test_character_literals() {
        let tokens = kinds_and_values(r"'a' 'abcd' '\n' '\''");
        assert_eq!(tokens[0], (TokenKind::Character, "a".to_string()));
        assert_eq!(tokens[1], (TokenKind::Character, "abcd".to_string()));
        assert_eq!(tokens[2], (TokenKind::Character, "\n".to_string()));
        assert_eq!(tokens[3], (TokenKind::Character, "'".to_string()));
    }

    #[test]
    fn test_empty_character_literal() {
        let mut lexer = Lexer::new("test", "''");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.message, "empty character literal");
    }

    #[test]
    fn test_oversized_character_literal() {
        let mut lexer = Lexer::new("test", "'abcde'");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.message, "character literal longer than 4 characters");
    }

    #[test]
    fn test_comments() {
        let tokens = kinds_and_values("a /* one\ntwo */ b");
        assert_eq!(tokens[0], (TokenKind::Ident, "a".to_string()));
        assert_eq!(tokens[1], (TokenKind::Ident, "b".to_string()));
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = Lexer::new("test", "x /* never closed");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.message, "unterminated comment");
        // Reported at the opening "/*".
        assert_eq!(err.token.start.column, 3);
    }

    #[test]
    fn test_positions_and_offsets() {
        let mut lexer = Lexer::new("test", "ab cd\nef");
        let mut previous_end = 0;
        loop {
            let tok = lexer.next_token().unwrap();
            assert!(tok.start.offset <= tok.end.offset);
            assert!(previous_end <= tok.start.offset);
            previous_end = tok.end.offset;
            if tok.kind == TokenKind::Eof {
                assert_eq!(tok.start.line, 2);
                break;
            }
        }
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("test", "");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_punctuation_kinds() {
        let tokens = kinds_and_values("? : ; , ( ) { } [ ]");
        let kinds: Vec<TokenKind> = tokens.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ternary,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
                TokenKind::OpenBracket,
                TokenKind::CloseBracket,
                TokenKind::Eof,
            ]
        );
    }
}
