//! The `catalog` command: list or validate a repository's entries.

use std::io::Write;
use std::path::Path;

use modgraph_repo::Repository;

use modgraph_cli::Error;

/// Lists `repository`'s published entries, or cross-checks them against disk
/// when `validate` is set, writing the result to `out`.
pub fn catalog(repository: &Path, validate: bool, out: &mut impl Write) -> Result<(), Error> {
    let repository = Repository::open(repository)?;

    if validate {
        let report = repository.validate()?;
        for id in &report.missing_on_disk {
            writeln!(out, "missing on disk: {id}")?;
        }
        for id in &report.missing_in_catalog {
            writeln!(out, "missing in catalog: {id}")?;
        }
        for id in &report.size_mismatches {
            writeln!(out, "size mismatch: {id}")?;
        }
        if report.is_clean() {
            writeln!(out, "repository is consistent")?;
            return Ok(());
        }
        return Err(Error::Inconsistent("repository validation found inconsistencies".to_string()));
    }

    for entry in repository.entries()? {
        writeln!(
            out,
            "{} compressed={} uncompressed={} hash={}",
            entry.id(),
            entry.compressed_size(),
            entry.uncompressed_size(),
            entry.hash()
        )?;
    }
    Ok(())
}
