//! Append-only assembly writer with caller-controlled indentation.

use indexmap::IndexMap;

use crate::model::{Assembly, Variable};

#[derive(Debug)]
pub struct Output {
    unit: String,
    level: usize,
    text: Vec<String>,
}

impl Output {
    /// Starts the code section with `entry` as the global entry label.
    pub fn new(entry: &str, unit: &str) -> Self {
        let mut out = Self {
            unit: unit.to_string(),
            level: 0,
            text: Vec::new(),
        };
        out.raw("section .text");
        out.level = 1;
        out.emit(format!("global {entry}"));
        out.emit(format!("{entry}:"));
        out.level = 2;
        out
    }

    /// Appends a line at the current indentation.
    pub fn emit(&mut self, line: impl AsRef<str>) {
        let line = format!("{}{}", self.unit.repeat(self.level), line.as_ref());
        self.text.push(line);
    }

    /// Appends a line without indentation.
    pub fn raw(&mut self, line: impl Into<String>) {
        self.text.push(line.into());
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Emits `line` one level deeper than the current indentation.
    pub fn emit_nested(&mut self, line: impl AsRef<str>) {
        self.indent();
        self.emit(line);
        self.dedent();
    }

    /// Closes the code section and lays out one data declaration per
    /// variable. Only string literals become initial values; everything
    /// else starts as zero.
    pub fn finish(mut self, variables: &IndexMap<String, Variable>) -> Assembly {
        self.level = 2;
        self.emit("ret");

        let mut data = vec!["section .data".to_string()];
        for (name, var) in variables {
            let init = if var.is_string() { var.value.as_str() } else { "0" };
            data.push(format!(
                "{}{name}: {} {init}",
                self.unit,
                var.width.directive()
            ));
        }

        Assembly {
            text: self.text,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Width;

    #[test]
    fn test_prologue_and_epilogue() {
        let mut out = Output::new("_start", "\t");
        out.emit("nop");
        let asm = out.finish(&IndexMap::new());
        assert_eq!(
            asm.text,
            vec!["section .text", "\tglobal _start", "\t_start:", "\t\tnop", "\t\tret"]
        );
        assert_eq!(asm.data, vec!["section .data"]);
    }

    #[test]
    fn test_data_section_only_keeps_strings() {
        let mut vars = IndexMap::new();
        vars.insert(
            "count".to_string(),
            Variable {
                width: Width::Dword,
                value: "42".into(),
            },
        );
        vars.insert(
            "msg".to_string(),
            Variable {
                width: Width::Byte,
                value: "\"hi\"".into(),
            },
        );
        vars.insert(
            "copy".to_string(),
            Variable {
                width: Width::Qword,
                value: "rax".into(),
            },
        );

        let asm = Output::new("main", "    ").finish(&vars);
        assert_eq!(
            asm.data,
            vec![
                "section .data",
                "    count: dd 0",
                "    msg: db \"hi\"",
                "    copy: dq 0",
            ]
        );
        assert_eq!(asm.text[1], "    global main");
    }

    #[test]
    fn test_indentation_is_caller_controlled() {
        let mut out = Output::new("_start", "\t");
        out.indent();
        out.emit("inc al");
        out.dedent();
        out.emit_nested("nop");
        out.emit("w0:");
        assert_eq!(&out.text[3..], ["\t\t\tinc al", "\t\t\tnop", "\t\tw0:"]);
    }
}
