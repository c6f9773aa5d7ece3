//! The `inspect` command: print a module file's sections without installing it.

use std::fs;
use std::io::Write;
use std::path::Path;

use modgraph_file::{Event, ModuleFileReader};

use modgraph_cli::Error;

/// Parses the module file at `path` and prints every section and subsection to `out`.
pub fn inspect(path: &Path, out: &mut impl Write) -> Result<(), Error> {
    let bytes = fs::read(path)?;
    let mut reader = ModuleFileReader::parse(&bytes)?;
    loop {
        match reader.next_event()? {
            Event::StartFile => writeln!(out, "module file {}", path.display())?,
            Event::StartSection {
                section_type,
                compressor,
                has_subsections,
            } => {
                writeln!(out, "  section {section_type:?} compressor={compressor:?}")?;
                if !has_subsections {
                    let content = reader.content()?;
                    writeln!(out, "    {} byte(s)", content.len())?;
                }
            }
            Event::StartSubsection { path } => {
                let content = reader.content()?;
                writeln!(out, "    subsection {path} ({} byte(s))", content.len())?;
            }
            Event::EndSubsection | Event::EndSection => {}
            Event::EndFile => break,
        }
    }
    Ok(())
}
