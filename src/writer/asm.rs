//! Write the assembly listing.

use crate::model::Assembly;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub fn emit(assembly: &Assembly, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in assembly.lines() {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
