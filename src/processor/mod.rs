//! The functional core: source lines in, assembly out.
//!
//! Works on already-preprocessed text and never touches the filesystem.
pub mod ast;
pub mod codegen;
pub mod env;
pub mod lexer;
pub mod output;
pub mod stmt_parser;

use crate::error::CompileResult;
use crate::model::{Compiled, Options};

/// Compiles a whole program, stopping at the first error.
pub fn run(source: &str, options: &Options) -> CompileResult<Compiled> {
    env::Env::new(source, options.clone()).run()
}
