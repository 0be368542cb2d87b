//! Errors raised while compiling a Newt program.
//!
//! The pipeline stops at the first error. Inner stages report an
//! [`ErrorKind`]; the environment attaches the offending line before it
//! leaves the core as a [`CompileError`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("no token matches `{rest}`")]
    Lex { rest: String },

    #[error("unexpected {found}")]
    Parse { found: String },

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("`{name}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("goto target `{target}` is not a line in 0..{lines}")]
    InvalidGotoTarget { target: String, lines: usize },

    #[error("block is never closed with `}}`")]
    UnterminatedBlock,

    #[error("compilation did not finish within {0} steps")]
    StepLimit(usize),

    #[error("blocks nested more than {0} deep; does a `goto` jump back into its own block?")]
    NestingLimit(usize),
}

/// An [`ErrorKind`] anchored to a source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}\n    {text}")]
pub struct CompileError {
    /// Index into the non-empty line list (the same numbering `goto` uses).
    pub line: usize,
    pub text: String,
    pub kind: ErrorKind,
}

pub type CompileResult<T> = Result<T, CompileError>;
