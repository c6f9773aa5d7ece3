//! The `resolve` command: resolve root queries against a library and print the
//! resulting contexts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use modgraph_catalog::Library;
use modgraph_config::{Configuration, ModuleSystemConfig};
use modgraph_link::ClassManifest;
use modgraph_repo::Repository;
use modgraph_resolve::Resolution;
use modgraph_types::{ModuleId, ModuleIdQuery, Name};

use modgraph_cli::Error;

/// Resolves `queries` against the library at `config.library_path()`, links the
/// result into a [`Configuration`], and prints every context to `out`.
pub fn resolve(
    queries: Vec<ModuleIdQuery>,
    repository: Option<PathBuf>,
    config: &ModuleSystemConfig,
    out: &mut impl Write,
) -> Result<(), Error> {
    let library = Library::open(config.library_path())?;
    let repository = repository.map(Repository::open).transpose()?;

    let resolution = modgraph_resolve::resolve(
        &queries,
        &library,
        repository.as_ref().map(|repo| repo as &dyn modgraph_catalog::RemoteCatalog),
        config.platform_module(),
        config.suppress_platform_default(),
    )?;

    let classes = class_manifest_from_library(config.library_path(), &resolution)?;
    let configuration = Configuration::from_resolution(queries, &resolution, &classes)?;

    for context in configuration.contexts() {
        writeln!(out, "context {}", context.name())?;
        for module in context.modules() {
            writeln!(out, "  module {module}")?;
        }
        for export in context.exports() {
            writeln!(out, "  export {export}")?;
        }
        for (package, supplier) in context.remote_package_to_context() {
            let supplier_name = configuration
                .context(*supplier)
                .map(modgraph_link::Context::name)
                .unwrap_or("?");
            writeln!(out, "  import {package} from {supplier_name}")?;
        }
    }

    if !resolution.modules_needed.is_empty() {
        writeln!(out, "modules to download: {}", resolution.modules_needed.len())?;
        writeln!(out, "download bytes required: {}", resolution.download_required)?;
        writeln!(out, "space bytes required: {}", resolution.space_required)?;
    }

    Ok(())
}

/// Builds a [`ClassManifest`] by walking each resolved module's `classes/`
/// directory under the library's filesystem layout.
fn class_manifest_from_library(library_path: &Path, resolution: &Resolution) -> Result<ClassManifest, Error> {
    let mut manifest = ClassManifest::new();
    for id in &resolution.modules {
        let classes_dir = classes_dir(library_path, id);
        if !classes_dir.is_dir() {
            continue;
        }
        let classes = walk_classes(&classes_dir, &classes_dir)?;
        manifest = manifest.with_classes(id.clone(), classes);
    }
    Ok(manifest)
}

fn classes_dir(library_path: &Path, id: &ModuleId) -> PathBuf {
    library_path
        .join(id.name().as_str())
        .join(id.version().as_str())
        .join("classes")
}

fn walk_classes(root: &Path, dir: &Path) -> Result<Vec<Name>, Error> {
    let mut classes = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            classes.extend(walk_classes(root, &path)?);
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let dotted = relative
            .with_extension("")
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(".");
        if let Ok(name) = Name::new(dotted) {
            classes.push(name);
        }
    }
    Ok(classes)
}
