use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage width of a variable or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    Byte,
    Word,
    Dword,
    Qword,
}

impl Width {
    pub const ALL: [Width; 4] = [Width::Byte, Width::Word, Width::Dword, Width::Qword];

    pub fn parse(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.keyword() == word)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Width::Byte => "byte",
            Width::Word => "word",
            Width::Dword => "dword",
            Width::Qword => "qword",
        }
    }

    /// Accumulator register of this width, used to stage memory-to-memory moves.
    pub fn register(self) -> &'static str {
        match self {
            Width::Byte => "al",
            Width::Word => "ax",
            Width::Dword => "eax",
            Width::Qword => "rax",
        }
    }

    /// Data-section directive (`db`, `dw`, `dd`, `dq`).
    pub fn directive(self) -> &'static str {
        match self {
            Width::Byte => "db",
            Width::Word => "dw",
            Width::Dword => "dd",
            Width::Qword => "dq",
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A variable table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub width: Width,
    /// Last operand assigned: a literal, or the register it was staged through.
    pub value: String,
}

impl Variable {
    pub fn is_string(&self) -> bool {
        self.value.starts_with('"')
    }
}

/// One `<width> <name>` parameter of a `define`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub width: Width,
    pub name: String,
}

/// How `while` / `for` are lowered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopCheck {
    /// Body first, condition after (do-while).
    #[default]
    PostTest,
    /// Jump to the condition before the first iteration.
    PreTest,
}

/// Which parameter width stages each argument of a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marshal {
    /// The last parameter's width is used for every argument.
    #[default]
    LastParam,
    PerParam,
}

/// Compiler options, loaded from JSON and overridden from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Options {
    pub entry: String,
    pub indent: String,
    pub loops: LoopCheck,
    pub marshal: Marshal,
    pub max_steps: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            entry: "_start".into(),
            indent: "\t".into(),
            loops: LoopCheck::default(),
            marshal: Marshal::default(),
            max_steps: 1_000_000,
        }
    }
}

/// Emitted assembly, split into its two sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub text: Vec<String>,
    pub data: Vec<String>,
}

impl Assembly {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.iter().chain(&self.data).map(String::as_str)
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Variable and function tables as they stand at the end of compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    pub variables: IndexMap<String, Variable>,
    pub functions: IndexMap<String, Vec<Param>>,
}

/// Fully processed output handed to `writer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub assembly: Assembly,
    pub symbols: SymbolTable,
}
