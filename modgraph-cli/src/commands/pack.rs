//! The `pack` command: assemble a directory and a module descriptor into a module file.

use std::fs;
use std::path::Path;

use modgraph_file::{Compressor, ModuleFileWriter, SectionType};

use modgraph_cli::Error;

/// Packs `input_dir` plus the descriptor at `descriptor_path` into a module
/// file, writing the result to `output_path`.
///
/// `input_dir` may contain a `classes.bin` file (the packed classes payload)
/// and any of the `resources/`, `lib/`, `bin/`, `etc/` subdirectories, mapped
/// respectively onto the RESOURCES, NATIVE_LIBS, NATIVE_CMDS, and CONFIG
/// sections, one subsection per file found.
pub fn pack(input_dir: &Path, descriptor_path: &Path, output_path: &Path) -> Result<(), Error> {
    let descriptor_bytes = fs::read(descriptor_path)?;

    let mut writer = ModuleFileWriter::new();
    writer.module_info(descriptor_bytes);

    let classes_path = input_dir.join("classes.bin");
    if classes_path.is_file() {
        writer.classes(fs::read(&classes_path)?, Compressor::Pack200Gzip);
    }

    for (subdir, section_type) in [
        ("resources", SectionType::Resources),
        ("lib", SectionType::NativeLibs),
        ("bin", SectionType::NativeCmds),
        ("etc", SectionType::Config),
    ] {
        let dir = input_dir.join(subdir);
        if !dir.is_dir() {
            continue;
        }
        let files = collect_files(&dir, &dir)?;
        if !files.is_empty() {
            writer.files_section(section_type, Compressor::Gzip, files);
        }
    }

    let bytes = writer.finish()?;
    fs::write(output_path, bytes)?;
    Ok(())
}

fn collect_files(root: &Path, dir: &Path) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_files(root, &path)?);
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let name = relative.to_string_lossy().replace('\\', "/");
        files.push((name, fs::read(&path)?));
    }
    Ok(files)
}
