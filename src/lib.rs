pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod processor;
pub mod writer;

use anyhow::Context;
use clap::Parser;
use std::path::Path;

use error::CompileError;
use model::{Compiled, Options};

/// Compiles already-expanded Newt source.
pub fn compile(source: &str, options: &Options) -> Result<Compiled, CompileError> {
    processor::run(source, options)
}

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let say = |msg: String| {
        if !args.quiet {
            println!("{msg}");
        }
    };

    // 1. ── Options ────────────────────────────────────────────────────
    let mut options = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Reading {}", path.display()))?;
            config::load_from_json(&json)
                .with_context(|| format!("Parsing options in {}", path.display()))?
        }
        None => Options::default(),
    };
    args.apply(&mut options);

    // 2. ── Read and expand ────────────────────────────────────────────
    say(format!("Reading {}", args.input.display()));
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;

    say("Expanding macros".to_string());
    let base = args.input.parent().unwrap_or(Path::new("."));
    let source = preprocess::expand(&source, |path| {
        let path = base.join(path);
        std::fs::read_to_string(&path).with_context(|| format!("Reading {}", path.display()))
    })?;

    // 3. ── Compile ────────────────────────────────────────────────────
    say(format!(
        "Compiling {} lines",
        source.lines().filter(|l| !l.trim().is_empty()).count()
    ));
    let compiled = compile(&source, &options)
        .with_context(|| format!("Compiling {}", args.input.display()))?;

    // 4. ── Write outputs ──────────────────────────────────────────────
    let output = args.output_path();
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Creating {}", dir.display()))?;
    }
    writer::asm::emit(&compiled.assembly, &output)
        .with_context(|| format!("Writing {}", output.display()))?;
    say(format!("Wrote {}", output.display()));

    if let Some(path) = &args.symbols {
        writer::symbols::emit(&compiled.symbols, path)
            .with_context(|| format!("Writing {}", path.display()))?;
        say(format!("Wrote {}", path.display()));
    }

    Ok(())
}
