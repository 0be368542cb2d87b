use clap::Parser;
use std::path::PathBuf;

use crate::model::{LoopCheck, Marshal, Options};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input Newt source file
    pub input: PathBuf,
    /// Output assembly file [default: <input> with an .asm extension]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// JSON options file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Also write the variable and function tables as JSON
    #[arg(long, value_name = "PATH")]
    pub symbols: Option<PathBuf>,
    /// Global entry label
    #[arg(long)]
    pub entry: Option<String>,
    /// Test loop conditions before the first iteration
    #[arg(long)]
    pub pre_test_loops: bool,
    /// Stage each call argument at its own parameter's width
    #[arg(long)]
    pub per_param_width: bool,
    /// Abort after compiling this many statements
    #[arg(long)]
    pub max_steps: Option<usize>,
    /// Don't print progress
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("asm"))
    }

    /// Flags given on the command line win over the options file.
    pub fn apply(&self, options: &mut Options) {
        if let Some(entry) = &self.entry {
            options.entry = entry.clone();
        }
        if self.pre_test_loops {
            options.loops = LoopCheck::PreTest;
        }
        if self.per_param_width {
            options.marshal = Marshal::PerParam;
        }
        if let Some(max_steps) = self.max_steps {
            options.max_steps = max_steps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["newt", "prog.nwt"]).unwrap();
        assert_eq!(cli.output_path(), PathBuf::from("prog.asm"));

        let mut options = Options::default();
        cli.apply(&mut options);
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_flags_override_options() {
        let cli = Cli::try_parse_from([
            "newt",
            "src/prog.nwt",
            "-o",
            "out/prog.s",
            "--entry",
            "main",
            "--pre-test-loops",
            "--per-param-width",
            "--max-steps",
            "50",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.output_path(), PathBuf::from("out/prog.s"));
        assert!(cli.quiet);

        let mut options = Options {
            indent: "  ".into(),
            ..Options::default()
        };
        cli.apply(&mut options);
        assert_eq!(
            options,
            Options {
                entry: "main".into(),
                indent: "  ".into(),
                loops: LoopCheck::PreTest,
                marshal: Marshal::PerParam,
                max_steps: 50,
            }
        );
    }
}
