//! Lexical analysis.
//!
//! Turns a source buffer into a stream of [`Token`]s, tracked one token at
//! a time. Mirrors the shape of a hand-rolled scanner: an explicit cursor
//! over the input plus `(line, column, offset)` bookkeeping, rather than a
//! regex- or grammar-generator-driven approach — the parser downstream
//! depends on `peek_token` being idempotent and on errors accumulating
//! instead of aborting the scan.
mod error;
mod token;

pub use error::{LexError, LexErrorKind};
pub use token::{Location, Token, TokenKind};

/// Byte-indexed scanner over a Pascal source buffer.
///
/// `chars` is a materialized char vector rather than a live iterator so the
/// cursor can freely look ahead (needed for `:=`, `<=`, doubled-quote
/// escapes, and the two comment syntaxes) without fighting a `Peekable`'s
/// single-token lookahead.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    offset: usize,
    peeked: Option<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            offset: 0,
            peeked: None,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len() && self.peeked.is_none()
    }

    /// Returns the next token without consuming it. Calling this twice in a
    /// row, with no intervening `next_token`, returns an identical token
    /// both times.
    pub fn peek_token(&mut self) -> Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan_token());
        }
        self.peeked.clone().expect("just populated")
    }

    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.scan_token()
    }

    fn here(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_char_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('{') => self.skip_brace_comment(),
                Some('(') if self.peek_char_at(1) == Some('*') => self.skip_paren_comment(),
                _ => break,
            }
        }
    }

    fn skip_brace_comment(&mut self) {
        let start = self.here();
        self.advance(); // '{'
        loop {
            match self.peek_char() {
                None => {
                    self.errors.push(LexError {
                        kind: LexErrorKind::UnterminatedComment,
                        location: start,
                    });
                    return;
                }
                Some('}') => {
                    self.advance();
                    return;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn skip_paren_comment(&mut self) {
        let start = self.here();
        self.advance(); // '('
        self.advance(); // '*'
        loop {
            match (self.peek_char(), self.peek_char_at(1)) {
                (None, _) => {
                    self.errors.push(LexError {
                        kind: LexErrorKind::UnterminatedComment,
                        location: start,
                    });
                    return;
                }
                (Some('*'), Some(')')) => {
                    self.advance();
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.here();

        let Some(c) = self.peek_char() else {
            return Token::eof(start);
        };

        if c.is_ascii_digit() {
            return self.scan_number(start);
        }
        if c.is_alphabetic() || c == '_' {
            return self.scan_identifier(start);
        }
        if c == '\'' {
            return self.scan_string(start);
        }
        if c == '#' {
            return self.scan_char_ordinal(start);
        }

        self.scan_operator(start)
    }

    fn scan_identifier(&mut self, start: Location) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword_from_str(&text.to_ascii_lowercase())
            .unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, start)
    }

    fn scan_number(&mut self, start: Location) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_real = false;

        if self.peek_char() == Some('.')
            && self
                .peek_char_at(1)
                .is_some_and(|c| c.is_ascii_digit())
        {
            is_real = true;
            text.push('.');
            self.advance();
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_char_at(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if self
                .peek_char_at(lookahead)
                .is_some_and(|c| c.is_ascii_digit())
            {
                is_real = true;
                text.push(self.advance().expect("e"));
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    text.push(self.advance().expect("sign"));
                }
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let kind = if is_real {
            TokenKind::RealLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        Token::new(kind, text, start)
    }

    fn scan_string(&mut self, start: Location) -> Token {
        let mut text = String::new();
        self.advance(); // opening quote
        loop {
            match self.peek_char() {
                None => {
                    self.errors.push(LexError {
                        kind: LexErrorKind::UnterminatedString,
                        location: start,
                    });
                    return Token::new(TokenKind::Error, text, start);
                }
                Some('\'') => {
                    self.advance();
                    if self.peek_char() == Some('\'') {
                        // doubled quote denotes a literal quote
                        text.push('\'');
                        self.advance();
                        continue;
                    }
                    let kind = if text.chars().count() == 1 {
                        TokenKind::CharLiteral
                    } else {
                        TokenKind::StringLiteral
                    };
                    return Token::new(kind, text, start);
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
    }

    /// `#N` ordinal character literal, e.g. `#65` for `'A'`.
    fn scan_char_ordinal(&mut self, start: Location) -> Token {
        let mut text = String::new();
        self.advance(); // '#'
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if text.is_empty() {
            self.errors.push(LexError {
                kind: LexErrorKind::MalformedNumber,
                location: start,
            });
            return Token::new(TokenKind::Error, text, start);
        }
        Token::new(TokenKind::CharLiteral, format!("#{text}"), start)
    }

    fn scan_operator(&mut self, start: Location) -> Token {
        // Longest-match-first so `:=`, `<=`, `>=`, `<>`, `..` win over their
        // one-character prefixes.
        let two: Option<String> = self
            .peek_char()
            .zip(self.peek_char_at(1))
            .map(|(a, b)| [a, b].iter().collect());

        if let Some(two) = two.as_deref() {
            let kind = match two {
                ":=" => Some(TokenKind::Assign),
                "<=" => Some(TokenKind::LessEqual),
                ">=" => Some(TokenKind::GreaterEqual),
                "<>" => Some(TokenKind::NotEqual),
                ".." => Some(TokenKind::DotDot),
                _ => None,
            };
            if let Some(kind) = kind {
                self.advance();
                self.advance();
                return Token::new(kind, two, start);
            }
        }

        let c = self.advance().expect("checked by caller");
        let kind = match c {
            '\'' => {
                // handled by scan_string, but a bare apostrophe can reach
                // here only as a lone unterminated literal.
                self.errors.push(LexError {
                    kind: LexErrorKind::UnterminatedCharLiteral,
                    location: start,
                });
                TokenKind::Error
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Equal,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '^' => TokenKind::Caret,
            '@' => TokenKind::At,
            other => {
                self.errors.push(LexError {
                    kind: LexErrorKind::UnrecognizedCharacter(other),
                    location: start,
                });
                TokenKind::Error
            }
        };
        Token::new(kind, c.to_string(), start)
    }

    /// Drains the whole source into a token vector. Convenient for tests
    /// and for the parser, which otherwise drives `next_token` on demand.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.errors)
    }

    pub fn source(&self) -> &'a str {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_keywords_case_insensitively_but_keeps_spelling() {
        let (tokens, _) = Lexer::new("BEGIN End").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Begin);
        assert_eq!(tokens[0].text, "BEGIN");
        assert_eq!(tokens[1].kind, TokenKind::End);
        assert_eq!(tokens[1].text, "End");
    }

    #[test]
    fn lexes_identifier_case_sensitively_for_spelling() {
        let (tokens, _) = Lexer::new("myVar").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "myVar");
    }

    #[test]
    fn longest_match_wins_for_operators() {
        assert_eq!(
            kinds(":= <= >= <> .."),
            vec![
                TokenKind::Assign,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::NotEqual,
                TokenKind::DotDot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn integer_and_real_literals() {
        let (tokens, _) = Lexer::new("42 3.14 2.5e-3").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[1].kind, TokenKind::RealLiteral);
        assert_eq!(tokens[2].kind, TokenKind::RealLiteral);
        assert_eq!(tokens[2].text, "2.5e-3");
    }

    #[test]
    fn doubled_quote_denotes_literal_quote() {
        let (tokens, errors) = Lexer::new("'it''s'").tokenize();
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "it's");
    }

    #[test]
    fn char_ordinal_literal() {
        let (tokens, _) = Lexer::new("#65").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[0].text, "#65");
    }

    #[test]
    fn brace_and_paren_comments_are_skipped_and_non_nesting() {
        // an inner '{' does not nest; the comment ends at the first '}'
        let (tokens, errors) = Lexer::new("{ a { b } c").tokenize();
        assert!(!errors.is_empty(), "unterminated comment should error");
        let _ = tokens;

        let (tokens, errors) = Lexer::new("x {comment} y (* another *) z").tokenize();
        assert!(errors.is_empty());
        let kinds: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(kinds, vec!["x", "y", "z", ""]);
    }

    #[test]
    fn unterminated_comment_is_reported_and_lexing_continues() {
        let (_, errors) = Lexer::new("{ no closer").tokenize();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedComment);
    }

    #[test]
    fn unrecognized_character_is_reported_and_lexing_continues() {
        let (tokens, errors) = Lexer::new("a $ b").tokenize();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnrecognizedCharacter('$'));
        // lexing continued past the bad character
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn peek_token_is_idempotent() {
        let mut lexer = Lexer::new("foo bar");
        let first_peek = lexer.peek_token();
        let second_peek = lexer.peek_token();
        assert_eq!(first_peek, second_peek);
        let consumed = lexer.next_token();
        assert_eq!(consumed, first_peek);
        assert_eq!(lexer.next_token().text, "bar");
    }

    #[test]
    fn locations_are_non_decreasing() {
        let (tokens, _) = Lexer::new("foo\n  bar baz").tokenize();
        let mut last = (0, 0, 0);
        for t in &tokens {
            let loc = (t.location.line, t.location.column, t.location.offset);
            assert!(loc.2 >= last.2, "offsets must be non-decreasing");
            assert!(loc.0 >= last.0, "lines must be non-decreasing");
            last = loc;
        }
    }
}
