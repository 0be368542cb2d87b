//! The compilation environment: everything a statement handler may read or
//! change, owned in one place and handed to handlers by `&mut`.
//!
//! There is no ambient program counter. Every lowering step receives the
//! index of the line it is compiling and returns the index to continue at,
//! which is how blocks skip past their bodies and how `goto` redirects.

use indexmap::IndexMap;

use super::output::Output;
use super::{codegen, lexer, stmt_parser};
use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::model::{Compiled, Options, Param, SymbolTable, Variable, Width};

/// Deepest block nesting, counting blocks re-entered by a backward `goto`.
pub const MAX_DEPTH: usize = 128;

/// A line whose first non-whitespace character is `}`.
pub fn is_terminator(line: &str) -> bool {
    line.trim_start().starts_with('}')
}

#[derive(Debug)]
pub struct Env {
    lines: Vec<String>,
    pub vars: IndexMap<String, Variable>,
    pub funcs: IndexMap<String, Vec<Param>>,
    pub out: Output,
    pub options: Options,
    loops: usize,
    ifs: usize,
    steps: usize,
    depth: usize,
}

impl Env {
    pub fn new(source: &str, options: Options) -> Self {
        let lines = source
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self {
            lines,
            vars: IndexMap::new(),
            funcs: IndexMap::new(),
            out: Output::new(&options.entry, &options.indent),
            options,
            loops: 0,
            ifs: 0,
            steps: 0,
            depth: 0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, at: usize) -> Option<&str> {
        self.lines.get(at).map(String::as_str)
    }

    /// Anchors `kind` to line `at`.
    pub fn error(&self, at: usize, kind: ErrorKind) -> CompileError {
        CompileError {
            line: at,
            text: self.line(at).unwrap_or_default().to_string(),
            kind,
        }
    }

    /// Compiles every line from the first, following the cursor wherever
    /// statements send it.
    pub fn run(mut self) -> CompileResult<Compiled> {
        let mut cursor = 0;
        while cursor < self.line_count() {
            cursor = self.step(cursor)?;
        }
        Ok(self.finish())
    }

    /// Compiles the statement on line `at` and returns the next cursor.
    pub fn step(&mut self, at: usize) -> CompileResult<usize> {
        self.steps += 1;
        if self.steps > self.options.max_steps {
            return Err(self.error(at, ErrorKind::StepLimit(self.options.max_steps)));
        }

        let Some(line) = self.line(at) else {
            return Err(self.error(at, ErrorKind::UnterminatedBlock));
        };
        if is_terminator(line) {
            return Ok(at + 1);
        }
        let tokens = lexer::tokenize(line).map_err(|kind| self.error(at, kind))?;
        if tokens.is_empty() {
            return Ok(at + 1);
        }
        let stmt = stmt_parser::parse(&tokens).map_err(|kind| self.error(at, kind))?;
        codegen::lower(self, stmt, at)
    }

    /// Compiles the body of the block opened on line `open` and returns the
    /// cursor one past its closing `}`. Nested blocks are compiled by their
    /// own statements, so the first terminator reached here is ours.
    pub fn block(&mut self, open: usize) -> CompileResult<usize> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(open, ErrorKind::NestingLimit(MAX_DEPTH)));
        }
        self.depth += 1;
        let next = self.block_body(open);
        self.depth -= 1;
        next
    }

    fn block_body(&mut self, open: usize) -> CompileResult<usize> {
        let mut cursor = open + 1;
        loop {
            let line = self
                .line(cursor)
                .ok_or_else(|| self.error(open, ErrorKind::UnterminatedBlock))?;
            if is_terminator(line) {
                return Ok(cursor + 1);
            }
            cursor = self.step(cursor)?;
        }
    }

    pub fn next_if(&mut self) -> usize {
        let n = self.ifs;
        self.ifs += 1;
        n
    }

    /// `while` and `for` share one counter.
    pub fn next_loop(&mut self) -> usize {
        let n = self.loops;
        self.loops += 1;
        n
    }

    pub fn width_of(&self, name: &str, at: usize) -> CompileResult<Width> {
        self.vars
            .get(name)
            .map(|var| var.width)
            .ok_or_else(|| self.error(at, ErrorKind::UnknownVariable(name.to_string())))
    }

    /// `[name]` for a variable, the text itself otherwise.
    pub fn operand(&self, text: &str) -> String {
        if self.vars.contains_key(text) {
            format!("[{text}]")
        } else {
            text.to_string()
        }
    }

    /// `<width> [name]` for a variable, the text itself otherwise.
    pub fn sized_operand(&self, text: &str) -> String {
        match self.vars.get(text) {
            Some(var) => format!("{} [{text}]", var.width),
            None => text.to_string(),
        }
    }

    /// Makes `text` usable as the source of an instruction whose other
    /// operand is memory: a variable is first loaded into the accumulator of
    /// `width`, anything else is used as is.
    pub fn load(&mut self, text: &str, width: Width) -> String {
        if self.vars.contains_key(text) {
            let reg = width.register();
            self.out.emit(format!("mov {reg}, [{text}]"));
            reg.to_string()
        } else {
            text.to_string()
        }
    }

    fn finish(self) -> Compiled {
        let assembly = self.out.finish(&self.vars);
        Compiled {
            assembly,
            symbols: SymbolTable {
                variables: self.vars,
                functions: self.funcs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(src: &str) -> Env {
        Env::new(src, Options::default())
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let env = env("byte a = 1;\n\n   \n\tbyte b = 2;\n");
        assert_eq!(env.line_count(), 2);
        assert_eq!(env.line(1), Some("\tbyte b = 2;"));
    }

    #[test]
    fn test_terminators() {
        let test_cases = vec![("}", true), ("   }", true), ("\t} ", true), ("x = 1; }", false)];
        for (line, expected) in test_cases {
            assert_eq!(is_terminator(line), expected, "{line:?}");
        }
    }

    #[test]
    fn test_step_advances_past_simple_statements() {
        let mut env = env("# comment\nbyte a = 1;\n}\n");
        assert_eq!(env.step(0), Ok(1));
        assert_eq!(env.step(1), Ok(2));
        assert_eq!(env.step(2), Ok(3));
        assert!(env.vars.contains_key("a"));
    }

    #[test]
    fn test_block_returns_one_past_terminator() {
        let src = "if (1 == 1) {\n  nop();\n  while (1 == 1) {\n    nop();\n  }\n}\nnop();\n";
        let mut env = env(src);
        assert_eq!(env.step(0), Ok(6));
    }

    #[test]
    fn test_unterminated_block() {
        let mut env = env("nop();\nwhile (1 == 1) {\n  nop();\n");
        let err = env.step(1).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.kind, ErrorKind::UnterminatedBlock);
    }

    #[test]
    fn test_goto_back_into_own_block() {
        let test_cases = vec![
            ("nop();\nif (1 == 1) {\ngoto 0;\n}\n", 1),
            ("while (1 == 1) {\n  goto 0;\n}\n", 0),
        ];

        for (src, line) in test_cases {
            let err = Env::new(src, Options::default()).run().unwrap_err();
            assert_eq!(err.kind, ErrorKind::NestingLimit(MAX_DEPTH), "{src:?}");
            assert_eq!(err.line, line);
        }
    }

    #[test]
    fn test_depth_unwinds_after_block() {
        let mut env = env("while (1 == 1) {\n  nop();\n}\n");
        assert_eq!(env.step(0), Ok(3));
        assert_eq!(env.depth, 0);
    }

    #[test]
    fn test_counters_never_reset() {
        let mut env = env("");
        assert_eq!((env.next_loop(), env.next_loop()), (0, 1));
        assert_eq!(env.next_if(), 0);
        assert_eq!(env.next_loop(), 2);
    }

    #[test]
    fn test_step_limit() {
        let mut env = Env::new(
            "nop();\ngoto 0;\n",
            Options {
                max_steps: 10,
                ..Options::default()
            },
        );
        let mut cursor = 0;
        let err = loop {
            match env.step(cursor) {
                Ok(next) => cursor = next,
                Err(err) => break err,
            }
        };
        assert_eq!(err.kind, ErrorKind::StepLimit(10));
    }

    #[test]
    fn test_operands() {
        let mut env = env("dword n = 3;\n");
        env.step(0).unwrap();
        assert_eq!(env.operand("n"), "[n]");
        assert_eq!(env.operand("rbx"), "rbx");
        assert_eq!(env.sized_operand("n"), "dword [n]");
        assert_eq!(env.sized_operand("7"), "7");
        assert_eq!(env.load("n", Width::Word), "ax");
        assert_eq!(env.load("9", Width::Word), "9");
    }
}
