use std::fs;
use std::path::{Path, PathBuf};

use modgraph_catalog::{Catalog, RemoteCatalog};
use modgraph_common::{atomic_write, ScopedLock};
use modgraph_types::{digests::Sha256, Checksum, ModuleId, ModuleInfo, Name};

use crate::catalog_file::StreamCatalog;
use crate::entry::RepoEntry;
use crate::error::Error;
use crate::validation::ValidationReport;

const CATALOG_FILE: &str = "%catalog";
const LOCK_FILE: &str = "%lock";

/// A read-only [`Catalog`] of published module files, backed by a
/// [`StreamCatalog`] and a directory of module-file bytes on disk.
///
/// Grounded on this workspace's own versioned, lock-protected database
/// layout: a single small metadata file (here, `%catalog`) describes entries
/// that live as separate files under the same root, and every mutation goes
/// through a sibling `%lock` file plus an atomic rename.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Creates a new, empty repository at `root`.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|source| modgraph_common::Error::io_path(root.clone(), "creating repository directory", source))?;
        let repository = Self { root };
        repository.write_catalog(&StreamCatalog::new())?;
        Ok(repository)
    }

    /// Opens an existing repository at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        if !root.join(CATALOG_FILE).is_file() {
            return Err(modgraph_common::Error::NotADirectory { path: root }.into());
        }
        Ok(Self { root })
    }

    fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    fn module_file_path(&self, id: &ModuleId) -> PathBuf {
        self.root
            .join(id.name().as_str())
            .join(format!("{}.modfile", id.version()))
    }

    fn read_catalog(&self) -> Result<StreamCatalog, Error> {
        let path = self.catalog_path();
        let bytes = fs::read(&path)
            .map_err(|source| modgraph_common::Error::io_path(path, "reading catalog", source))?;
        StreamCatalog::from_bytes(&bytes)
    }

    fn write_catalog(&self, catalog: &StreamCatalog) -> Result<(), Error> {
        atomic_write(&self.catalog_path(), &catalog.to_bytes())?;
        Ok(())
    }

    /// Publishes a module file's bytes and descriptor, updating the catalog atomically.
    ///
    /// Acquires the repository lock for the duration of the publish.
    pub fn publish(
        &self,
        info: &ModuleInfo,
        descriptor_text: String,
        module_file_bytes: &[u8],
        uncompressed_size: u64,
    ) -> Result<(), Error> {
        let _lock = ScopedLock::acquire(self.root.join(LOCK_FILE))?;
        let file_path = self.module_file_path(info.id());
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| modgraph_common::Error::io_path(parent.to_path_buf(), "creating module directory", source))?;
        }
        atomic_write(&file_path, module_file_bytes)?;

        let mut catalog = self.read_catalog()?;
        let entry = RepoEntry::new(
            info.id().clone(),
            module_file_bytes.len() as u64,
            uncompressed_size,
            Checksum::<Sha256>::calculate_from(module_file_bytes),
            descriptor_text,
        );
        catalog.insert(entry);
        for view in info.views() {
            if view.id() != info.id() {
                catalog.insert_alias(view.id().clone(), info.id().clone());
            }
            for alias in view.aliases() {
                catalog.insert_alias(alias.clone(), info.id().clone());
            }
        }
        self.write_catalog(&catalog)?;
        log::info!("published {} to repository", info.id());
        Ok(())
    }

    /// Removes a published module, updating the catalog atomically.
    pub fn unpublish(&self, id: &ModuleId) -> Result<(), Error> {
        let _lock = ScopedLock::acquire(self.root.join(LOCK_FILE))?;
        let mut catalog = self.read_catalog()?;
        catalog.remove(id);
        self.write_catalog(&catalog)?;
        let file_path = self.module_file_path(id);
        if file_path.exists() {
            fs::remove_file(&file_path)
                .map_err(|source| modgraph_common::Error::io_path(file_path, "removing module file", source))?;
        }
        Ok(())
    }

    /// Fetches a published module file's raw bytes.
    pub fn fetch(&self, id: &ModuleId) -> Result<Vec<u8>, Error> {
        let path = self.module_file_path(id);
        fs::read(&path).map_err(|source| modgraph_common::Error::io_path(path, "fetching module file", source).into())
    }

    /// Returns a published module's catalog metadata without fetching its bytes.
    pub fn fetch_metadata(&self, id: &ModuleId) -> Result<Option<RepoEntry>, Error> {
        Ok(self.read_catalog()?.get(id).cloned())
    }

    /// Lists every entry currently published in the catalog.
    pub fn entries(&self) -> Result<Vec<RepoEntry>, Error> {
        Ok(self.read_catalog()?.entries().cloned().collect())
    }

    /// Cross-checks the catalog against the directory's actual contents.
    pub fn validate(&self) -> Result<ValidationReport, Error> {
        let catalog = self.read_catalog()?;
        let mut report = ValidationReport::default();

        for entry in catalog.entries() {
            let path = self.module_file_path(entry.id());
            match fs::metadata(&path) {
                Ok(metadata) => {
                    if metadata.len() != entry.compressed_size() {
                        report.size_mismatches.push(entry.id().clone());
                    }
                }
                Err(_) => report.missing_on_disk.push(entry.id().clone()),
            }
        }

        for name_entry in fs::read_dir(&self.root).into_iter().flatten().flatten() {
            if !name_entry.path().is_dir() {
                continue;
            }
            let Some(name) = name_entry.file_name().to_str().and_then(|s| Name::new(s).ok()) else {
                continue;
            };
            for version_entry in fs::read_dir(name_entry.path()).into_iter().flatten().flatten() {
                let file_name = version_entry.file_name();
                let Some(stem) = file_name.to_str().and_then(|s| s.strip_suffix(".modfile")) else {
                    continue;
                };
                let Ok(version) = modgraph_types::Version::new(stem) else {
                    continue;
                };
                let id = ModuleId::new(name.clone(), version);
                if catalog.get(&id).is_none() {
                    report.missing_in_catalog.push(id);
                }
            }
        }

        Ok(report)
    }
}

impl Catalog for Repository {
    fn gather_local_module_ids(&self, name: Option<&Name>) -> Result<Vec<ModuleId>, modgraph_catalog::Error> {
        let catalog = self.read_catalog().map_err(to_catalog_error)?;
        Ok(catalog
            .ids()
            .filter(|id| name.is_none_or(|name| id.name() == name))
            .cloned()
            .collect())
    }

    fn gather_local_declaring_module_ids(&self) -> Result<Vec<Name>, modgraph_catalog::Error> {
        let catalog = self.read_catalog().map_err(to_catalog_error)?;
        let mut names: Vec<Name> = catalog.ids().map(|id| id.name().clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn read_local_module_info(&self, id: &ModuleId) -> Result<Option<ModuleInfo>, modgraph_catalog::Error> {
        let catalog = self.read_catalog().map_err(to_catalog_error)?;
        match catalog.get(id) {
            Some(entry) => Ok(Some(modgraph_catalog::descriptor::from_text(entry.descriptor_text())?)),
            None => Ok(None),
        }
    }

    fn parent(&self) -> Option<&dyn Catalog> {
        None
    }
}

impl RemoteCatalog for Repository {
    fn metadata_sizes(&self, id: &ModuleId) -> Result<Option<(u64, u64)>, modgraph_catalog::Error> {
        let catalog = self.read_catalog().map_err(to_catalog_error)?;
        Ok(catalog
            .get(id)
            .map(|entry| (entry.compressed_size(), entry.uncompressed_size())))
    }
}

fn to_catalog_error(error: Error) -> modgraph_catalog::Error {
    match error {
        Error::Io(inner) => modgraph_catalog::Error::Io(inner),
        Error::Descriptor(inner) => inner,
        other => modgraph_catalog::Error::Io(modgraph_common::Error::io_path(
            Path::new("."),
            "reading repository catalog",
            std::io::Error::other(other.to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn sample_info(id: &str) -> ModuleInfo {
        modgraph_catalog::descriptor::from_text(&format!("module {id}\n")).unwrap()
    }

    #[test]
    fn publish_fetch_round_trip() -> TestResult {
        let dir = tempfile::tempdir()?;
        let repo = Repository::create(dir.path())?;
        let info = sample_info("com.example.widget@1.0.0");
        let bytes = b"pretend module file bytes".to_vec();
        repo.publish(&info, modgraph_catalog::descriptor::to_text(&info), &bytes, 64)?;

        let fetched = repo.fetch(info.id())?;
        assert_eq!(fetched, bytes);

        let metadata = repo.fetch_metadata(info.id())?.unwrap();
        assert_eq!(metadata.compressed_size(), bytes.len() as u64);
        Ok(())
    }

    #[test]
    fn validate_reports_missing_on_disk() -> TestResult {
        let dir = tempfile::tempdir()?;
        let repo = Repository::create(dir.path())?;
        let info = sample_info("a@1.0.0");
        repo.publish(&info, modgraph_catalog::descriptor::to_text(&info), b"bytes", 5)?;
        fs::remove_file(repo.module_file_path(info.id()))?;

        let report = repo.validate()?;
        assert_eq!(report.missing_on_disk, vec![info.id().clone()]);
        assert!(!report.is_clean());
        Ok(())
    }

    #[test]
    fn unpublish_removes_entry_and_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let repo = Repository::create(dir.path())?;
        let info = sample_info("a@1.0.0");
        repo.publish(&info, modgraph_catalog::descriptor::to_text(&info), b"bytes", 5)?;
        repo.unpublish(info.id())?;
        assert!(repo.fetch_metadata(info.id())?.is_none());
        assert!(!repo.module_file_path(info.id()).exists());
        Ok(())
    }
}
