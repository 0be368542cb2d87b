//! Recognized statement forms, one variant per grammar.

use crate::model::{Param, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl RelOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        }
    }

    /// Conditional jump taken when the comparison holds.
    pub fn jump(self) -> &'static str {
        match self {
            RelOp::Eq => "je",
            RelOp::Ne => "jne",
            RelOp::Lt => "jl",
            RelOp::Gt => "jg",
            RelOp::Le => "jle",
            RelOp::Ge => "jge",
        }
    }
}

/// `<operand> <op> <operand>` inside `if (...)` / `while (...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub lhs: String,
    pub op: RelOp,
    pub rhs: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `[<type>] <name> = <value | name>;`
    Assign {
        width: Option<Width>,
        name: String,
        value: String,
    },

    /// `<name>(<arg>, ...);` – a function call, or a raw instruction when
    /// `name` is not a defined function.
    Call { name: String, args: Vec<String> },

    /// `if (<condition>) {`
    If { condition: Condition },

    /// `asm {`
    Asm,

    /// `while (<condition>) {`
    While { condition: Condition },

    /// `for (<name>, <min>, <max>) {`
    For {
        var: String,
        min: String,
        max: String,
    },

    /// `goto <line | name>;`
    Goto { target: String },

    /// `define <name>(<type> <name>, ...) {`
    Define { name: String, params: Vec<Param> },
}
