//! The `verify` command: validate every hash in a module file.

use std::fs;
use std::io::Write;
use std::path::Path;

use modgraph_file::{Event, ModuleFileReader};

use modgraph_cli::Error;

/// Parses and fully drives the reader over the module file at `path`, which
/// verifies every section hash and the whole-file hash. Reports success to `out`.
pub fn verify(path: &Path, out: &mut impl Write) -> Result<(), Error> {
    let bytes = fs::read(path)?;
    let mut reader = ModuleFileReader::parse(&bytes)?;
    loop {
        if reader.next_event()? == Event::EndFile {
            break;
        }
    }
    writeln!(out, "{}: all hashes verified", path.display())?;
    Ok(())
}
