//! Hand-written lexer for one line of Newt source.
//!
//! Lines never span tokens, so the lexer works on a single line and stops
//! at its end (or at a `#`, which comments out the rest of the line).
//
//  Lexical items:
//
//      Keyword  ::= if | for | while | asm | goto | define
//      Type     ::= byte | word | dword | qword
//      Name     ::= [A-Za-z_][A-Za-z0-9_]*     (that is not a keyword or type)
//      Value    ::= [0-9][0-9a-fA-F]* | 0x[0-9a-fA-F]+ | 0b[0-9a-fA-F]+ | '"' [^"]+ '"'
//      Op       ::= != | == | <= | >= | < | >
//      Punct    ::= { } ; = ( ) ,
//
//  Identifiers are read to their full length before being classified, so
//  `format` is a name and not `for` followed by `mat`.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::RelOp;
use crate::error::ErrorKind;
use crate::model::Width;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Name(String),
    Value(String),
    Type(Width),
    Op(RelOp),
    If,
    For,
    While,
    Asm,
    Goto,
    Define,
    LBrace, // '{'
    RBrace, // '}'
    Semi,   // ';'
    Assign, // '='
    LParen, // '('
    RParen, // ')'
    Comma,  // ','
}

impl Token {
    /// Source text of the token.
    pub fn text(&self) -> &str {
        match self {
            Token::Name(s) | Token::Value(s) => s,
            Token::Type(w) => w.keyword(),
            Token::Op(op) => op.symbol(),
            Token::If => "if",
            Token::For => "for",
            Token::While => "while",
            Token::Asm => "asm",
            Token::Goto => "goto",
            Token::Define => "define",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Semi => ";",
            Token::Assign => "=",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
        }
    }

    fn classify(word: String) -> Token {
        match word.as_str() {
            "if" => Token::If,
            "for" => Token::For,
            "while" => Token::While,
            "asm" => Token::Asm,
            "goto" => Token::Goto,
            "define" => Token::Define,
            _ => match Width::parse(&word) {
                Some(width) => Token::Type(width),
                None => Token::Name(word),
            },
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            finished: false,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Byte offset of the next unread character.
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self, start: usize) -> Token {
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let end = self.offset();
        Token::classify(self.src[start..end].to_string())
    }

    fn read_number(&mut self, start: usize, first: char) -> Token {
        if first == '0' && matches!(self.peek_char(), Some('x' | 'b')) {
            // only a prefix if a digit follows; `0b` alone is the hex value 0b
            let rest = &self.src[start + 2..];
            if rest.starts_with(|c: char| c.is_ascii_hexdigit()) {
                self.chars.next();
            }
        }
        self.consume_while(|c| c.is_ascii_hexdigit());
        let end = self.offset();
        Token::Value(self.src[start..end].to_string())
    }

    fn read_string(&mut self, start: usize) -> Result<Token, ErrorKind> {
        let mut empty = true;
        while let Some((i, c)) = self.chars.next() {
            if c == '"' {
                if empty {
                    break;
                }
                return Ok(Token::Value(self.src[start..=i].to_string()));
            }
            empty = false;
        }
        Err(ErrorKind::Lex {
            rest: self.src[start..].to_string(),
        })
    }

    /// Reads `second` as part of a two-character operator if it is next.
    fn pair(&mut self, second: char, long: Token, short: Option<Token>) -> Option<Token> {
        if self.peek_char() == Some(second) {
            self.chars.next();
            Some(long)
        } else {
            short
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, ErrorKind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.consume_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));

        let (start, ch) = match self.chars.next() {
            Some(next) => next,
            None => {
                self.finished = true;
                return None;
            }
        };

        let tok = match ch {
            '#' => {
                self.finished = true;
                return None;
            }
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            ';' => Some(Token::Semi),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            '=' => self.pair('=', Token::Op(RelOp::Eq), Some(Token::Assign)),
            '!' => self.pair('=', Token::Op(RelOp::Ne), None),
            '<' => self.pair('=', Token::Op(RelOp::Le), Some(Token::Op(RelOp::Lt))),
            '>' => self.pair('=', Token::Op(RelOp::Ge), Some(Token::Op(RelOp::Gt))),
            '"' => match self.read_string(start) {
                Ok(tok) => Some(tok),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            },
            c if c.is_ascii_digit() => Some(self.read_number(start, c)),
            c if c.is_ascii_alphabetic() || c == '_' => Some(self.read_word(start)),
            _ => None,
        };

        match tok {
            Some(tok) => Some(Ok(tok)),
            None => {
                self.finished = true;
                Some(Err(ErrorKind::Lex {
                    rest: self.src[start..].trim_end().to_string(),
                }))
            }
        }
    }
}

/// Tokenizes one line. A comment line yields an empty vector.
pub fn tokenize(line: &str) -> Result<Vec<Token>, ErrorKind> {
    Lexer::new(line).collect()
}
