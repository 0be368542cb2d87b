//! Recognizes which statement form a token stream is.
//!
//! Every grammar is tried against the whole stream, in a fixed order, and
//! only counts if it leaves no token behind. The grammars are disjoint on
//! their leading tokens; should two ever both match, the later one wins.

use super::ast::{Condition, Stmt};
use super::lexer::Token;
use crate::error::ErrorKind;
use crate::model::{Param, Width};

/// Position of the token a grammar could not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mismatch(usize);

type Grammar = fn(&mut Parser<'_>) -> Result<Stmt, Mismatch>;

const GRAMMARS: [Grammar; 8] = [
    assign,
    call,
    condition,
    inline_asm,
    while_loop,
    for_loop,
    goto,
    define,
];

/// Recognizes a non-empty token stream.
pub fn parse(tokens: &[Token]) -> Result<Stmt, ErrorKind> {
    let mut matched = None;
    let mut furthest = 0;

    for grammar in GRAMMARS {
        let mut p = Parser::new(tokens);
        match grammar(&mut p).and_then(|stmt| p.finish(stmt)) {
            Ok(stmt) => matched = Some(stmt),
            Err(Mismatch(pos)) => furthest = furthest.max(pos),
        }
    }

    matched.ok_or_else(|| ErrorKind::Parse {
        found: match tokens.get(furthest) {
            Some(token) => format!("`{token}`"),
            None => "end of line".to_string(),
        },
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn mismatch<T>(&self) -> Result<T, Mismatch> {
        Err(Mismatch(self.pos))
    }

    /// Consumes `token` if it is next.
    fn accept(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), Mismatch> {
        if self.accept(&token) {
            Ok(())
        } else {
            self.mismatch()
        }
    }

    fn expect_name(&mut self) -> Result<String, Mismatch> {
        match self.peek() {
            Some(Token::Name(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => self.mismatch(),
        }
    }

    fn expect_type(&mut self) -> Result<Width, Mismatch> {
        match self.peek() {
            Some(Token::Type(width)) => {
                self.pos += 1;
                Ok(*width)
            }
            _ => self.mismatch(),
        }
    }

    /// `<value | name>`
    fn expect_operand(&mut self) -> Result<String, Mismatch> {
        match self.peek() {
            Some(Token::Value(text) | Token::Name(text)) => {
                self.pos += 1;
                Ok(text.clone())
            }
            _ => self.mismatch(),
        }
    }

    /// `<type | value | name>`, as accepted in call argument lists.
    fn expect_arg(&mut self) -> Result<String, Mismatch> {
        match self.peek() {
            Some(Token::Type(width)) => {
                self.pos += 1;
                Ok(width.keyword().to_string())
            }
            _ => self.expect_operand(),
        }
    }

    /// `<operand> <op> <operand>`
    fn expect_condition(&mut self) -> Result<Condition, Mismatch> {
        let lhs = self.expect_operand()?;
        let op = match self.peek() {
            Some(Token::Op(op)) => {
                self.pos += 1;
                *op
            }
            _ => return self.mismatch(),
        };
        let rhs = self.expect_operand()?;
        Ok(Condition { lhs, op, rhs })
    }

    /// `( [item (, item)*] )`
    fn expect_list<T>(
        &mut self,
        item: fn(&mut Self) -> Result<T, Mismatch>,
    ) -> Result<Vec<T>, Mismatch> {
        self.expect(Token::LParen)?;
        let mut items = Vec::new();
        if self.accept(&Token::RParen) {
            return Ok(items);
        }
        loop {
            items.push(item(self)?);
            if self.accept(&Token::RParen) {
                return Ok(items);
            }
            self.expect(Token::Comma)?;
        }
    }

    /// A grammar only matches if it consumed the whole stream.
    fn finish(&self, stmt: Stmt) -> Result<Stmt, Mismatch> {
        if self.pos == self.tokens.len() {
            Ok(stmt)
        } else {
            self.mismatch()
        }
    }
}

fn assign(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    let width = match p.peek() {
        Some(Token::Type(_)) => Some(p.expect_type()?),
        _ => None,
    };
    let name = p.expect_name()?;
    p.expect(Token::Assign)?;
    let value = p.expect_operand()?;
    p.expect(Token::Semi)?;
    Ok(Stmt::Assign { width, name, value })
}

fn call(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    let name = p.expect_name()?;
    let args = p.expect_list(Parser::expect_arg)?;
    p.expect(Token::Semi)?;
    Ok(Stmt::Call { name, args })
}

fn condition(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    p.expect(Token::If)?;
    p.expect(Token::LParen)?;
    let condition = p.expect_condition()?;
    p.expect(Token::RParen)?;
    p.expect(Token::LBrace)?;
    Ok(Stmt::If { condition })
}

fn inline_asm(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    p.expect(Token::Asm)?;
    p.expect(Token::LBrace)?;
    Ok(Stmt::Asm)
}

fn while_loop(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    p.expect(Token::While)?;
    p.expect(Token::LParen)?;
    let condition = p.expect_condition()?;
    p.expect(Token::RParen)?;
    p.expect(Token::LBrace)?;
    Ok(Stmt::While { condition })
}

fn for_loop(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    p.expect(Token::For)?;
    p.expect(Token::LParen)?;
    let var = p.expect_name()?;
    p.expect(Token::Comma)?;
    let min = p.expect_operand()?;
    p.expect(Token::Comma)?;
    let max = p.expect_operand()?;
    p.expect(Token::RParen)?;
    p.expect(Token::LBrace)?;
    Ok(Stmt::For { var, min, max })
}

fn goto(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    p.expect(Token::Goto)?;
    let target = p.expect_operand()?;
    p.expect(Token::Semi)?;
    Ok(Stmt::Goto { target })
}

fn define(p: &mut Parser<'_>) -> Result<Stmt, Mismatch> {
    p.expect(Token::Define)?;
    let name = p.expect_name()?;
    let params = p.expect_list(|p| {
        let width = p.expect_type()?;
        let name = p.expect_name()?;
        Ok(Param { width, name })
    })?;
    p.expect(Token::LBrace)?;
    Ok(Stmt::Define { name, params })
}
