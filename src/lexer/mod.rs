//! Character-by-character scanner turning source text into a token stream.

mod token;

pub use token::{Keyword, Token, TokenKind};

use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

use crate::error::SpylangError;
use crate::position::{Position, Span};

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(file: Rc<str>, source: &'a Rc<str>) -> Self {
        Self {
            chars: source.chars().peekable(),
            pos: Position::start_of(file, source.clone()),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        self.pos.advance(ch);
        ch
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Scan the whole input into a token stream (always EOF-terminated), or
    /// the first lexical error encountered.
    pub fn lex(mut self) -> Result<Vec<Token>, SpylangError> {
        let mut tokens = Vec::new();

        loop {
            let Some(ch) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, Span::point(self.pos.clone())));
                return Ok(tokens);
            };

            match ch {
                ' ' | '\t' => {
                    self.advance();
                }
                '\n' => {
                    let start = self.pos.clone();
                    self.advance();
                    tokens.push(Token::new(TokenKind::Newline, Span::point(start)));
                }
                '#' => self.skip_comment(),
                '0'..='9' => tokens.push(self.make_number()),
                c if c.is_ascii_alphabetic() => tokens.push(self.make_identifier()),
                '"' => tokens.push(self.make_string()?),
                _ => tokens.push(self.make_symbol()?),
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn make_number(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();
        let mut is_float = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.' && !is_float {
                is_float = true;
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let end = self.pos.clone();
        let span = Span::new(start, end);

        if is_float {
            Token::new(TokenKind::Float(text.parse().unwrap_or(0.0)), span)
        } else {
            Token::new(TokenKind::Int(text.parse().unwrap_or(0)), span)
        }
    }

    fn make_identifier(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let span = Span::new(start, self.pos.clone());

        match Keyword::from_str(&text) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), span),
            None => Token::new(TokenKind::Identifier(text), span),
        }
    }

    fn make_string(&mut self) -> Result<Token, SpylangError> {
        let start = self.pos.clone();
        self.advance(); // opening quote
        let mut text = String::new();

        loop {
            match self.peek() {
                None => break,
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(other) => text.push(other),
                        None => break,
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }

        let span = Span::new(start, self.pos.clone());
        Ok(Token::new(TokenKind::Str(text), span))
    }

    fn make_symbol(&mut self) -> Result<Token, SpylangError> {
        let start = self.pos.clone();
        let ch = self.advance().expect("peeked char must exist");

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Mul,
            '/' => TokenKind::Div,
            '%' => TokenKind::Mod,
            '^' => TokenKind::Pow,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LSquare,
            ']' => TokenKind::RSquare,
            '{' => TokenKind::LCurly,
            '}' => TokenKind::RCurly,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Range,
            '=' => {
                if self.advance_if('=') {
                    TokenKind::Ee
                } else {
                    TokenKind::Eq
                }
            }
            '<' => {
                if self.advance_if('=') {
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.advance_if('=') {
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                }
            }
            '!' => {
                if self.advance_if('=') {
                    TokenKind::Ne
                } else {
                    let span = Span::new(start, self.pos.clone());
                    return Err(SpylangError::expected_character(
                        span,
                        "'=' after '!'",
                    ));
                }
            }
            other => {
                let span = Span::new(start, self.pos.clone());
                return Err(SpylangError::illegal_character(span, other));
            }
        };

        let span = Span::new(start, self.pos.clone());
        Ok(Token::new(kind, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<TokenKind> {
        let file: Rc<str> = Rc::from("<test>");
        let source: Rc<str> = Rc::from(src);
        Lexer::new(file, &source)
            .lex()
            .expect("lexing should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_integer_and_float() {
        assert_eq!(lex("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(lex("4.2"), vec![TokenKind::Float(4.2), TokenKind::Eof]);
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            lex("assign foo"),
            vec![
                TokenKind::Keyword(Keyword::Assign),
                TokenKind::Identifier("foo".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexes_string_escapes() {
        assert_eq!(
            lex(r#""a\nb\tc\q""#),
            vec![TokenKind::Str("a\nb\tc q".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_two_char_operators() {
        assert_eq!(
            lex("== != <= >="),
            vec![
                TokenKind::Ee,
                TokenKind::Ne,
                TokenKind::Lte,
                TokenKind::Gte,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn skips_comments_and_tracks_newlines() {
        assert_eq!(
            lex("1 # comment\n2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Int(2),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn bang_without_equals_is_an_error() {
        let file: Rc<str> = Rc::from("<test>");
        let source: Rc<str> = Rc::from("!a");
        assert!(Lexer::new(file, &source).lex().is_err());
    }

    #[test]
    fn single_dot_is_range_token() {
        assert_eq!(lex("."), vec![TokenKind::Range, TokenKind::Eof]);
    }
}
