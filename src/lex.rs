use crate::EOF;

use Delim::*;
use Kind::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: Kind,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Whitespace,
    Newline,
    /// Backslash before an escapable character. The escaped character
    /// follows as a single Text (or Newline) token.
    Escape,
    /// Maximal run of backticks.
    Backticks,
    /// Maximal run of one emphasis-like delimiter character.
    Seq(Delim),
    Lt,
    OpenBracket,
    BangBracket,
    CloseBracket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Asterisk,
    Underscore,
    Tilde,
    Caret,
    Equal,
    Plus,
}

impl Delim {
    pub fn ch(self) -> char {
        match self {
            Asterisk => '*',
            Underscore => '_',
            Tilde => '~',
            Caret => '^',
            Equal => '=',
            Plus => '+',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Asterisk),
            '_' => Some(Underscore),
            '~' => Some(Tilde),
            '^' => Some(Caret),
            '=' => Some(Equal),
            '+' => Some(Plus),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub(crate) struct Lexer<'s> {
    chars: std::str::Chars<'s>,
    escape: bool,
    next: Option<Token>,
    len: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Lexer<'s> {
        Lexer {
            chars: src.chars(),
            escape: false,
            next: None,
            len: 0,
        }
    }

    fn peek(&mut self) -> char {
        self.chars.clone().next().unwrap_or(EOF)
    }

    fn eat(&mut self) -> Option<char> {
        let c = self.chars.next();
        self.len += c.map_or(0, char::len_utf8);
        c
    }

    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while self.peek() != EOF && predicate(self.peek()) {
            self.eat();
        }
    }

    fn token(&mut self) -> Option<Token> {
        self.len = 0;

        let first = self.eat()?;

        let escape = self.escape;

        let kind = match first {
            _ if escape && first == '\n' => Newline,
            _ if escape => Text,

            '\\' => {
                let next = self.peek();
                if next == '\n' || next.is_ascii_punctuation() {
                    self.escape = true;
                    Escape
                } else {
                    Text
                }
            }

            '\n' => Newline,
            ' ' | '\t' => {
                self.eat_while(|c| c == ' ' || c == '\t');
                Whitespace
            }

            '`' => {
                self.eat_while(|c| c == '`');
                Backticks
            }

            '<' => Lt,
            '[' => OpenBracket,
            ']' => CloseBracket,
            '!' => {
                if self.peek() == '[' {
                    self.eat();
                    BangBracket
                } else {
                    Text
                }
            }

            _ => {
                if let Some(d) = Delim::from_char(first) {
                    self.eat_while(|c| c == d.ch());
                    Seq(d)
                } else {
                    Text
                }
            }
        };

        if escape {
            self.escape = false;
        }

        Some(Token {
            kind,
            len: self.len,
        })
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().or_else(|| {
            let mut current = self.token();

            // concatenate text tokens
            if let Some(Token { kind: Text, len }) = &mut current {
                self.next = self.token();
                while let Some(Token { kind: Text, len: l }) = self.next {
                    *len += l;
                    self.next = self.token();
                }
            }

            current
        })
    }
}
