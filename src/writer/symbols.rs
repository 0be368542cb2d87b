//! Dump the variable and function tables as JSON.

use crate::model::SymbolTable;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub fn emit(symbols: &SymbolTable, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, symbols)?;
    writeln!(out)?;
    out.flush()
}
