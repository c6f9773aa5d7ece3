use std::fs;
use std::path::{Path, PathBuf};

use modgraph_common::{atomic_write, ScopedLock};
use modgraph_types::{ModuleId, ModuleInfo, Name};

use crate::catalog::Catalog;
use crate::descriptor;
use crate::error::Error;

const LIBRARY_HEADER_FILE: &str = "%jigsaw-library";
const LOCK_FILE: &str = "%lock";
const DESCRIPTOR_FILE: &str = "info";

/// A writable, on-disk [`Catalog`].
///
/// Modules are stored under `<root>/<name>/<version>/info`, one descriptor
/// text file per module, following the filesystem layout this design
/// specifies for the reference library. Mutating operations acquire the
/// library's `%lock` file for their duration; reads do not.
///
/// Grounded on the create/open/entries/create_entry/delete_entry shape of
/// this workspace's own on-disk, lock-protected database type.
#[derive(Debug)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    /// Creates a new, empty library at `root`, writing its header file.
    ///
    /// Fails if `root` already contains a library header.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|source| modgraph_common::Error::io_path(root.clone(), "creating library directory", source))?;
        let header_path = root.join(LIBRARY_HEADER_FILE);
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&header_path)
            .map_err(|source| {
                modgraph_common::Error::io_path(header_path.clone(), "creating library header", source)
            })?;
        log::info!("created library at {}", root.display());
        Ok(Self { root })
    }

    /// Opens an existing library at `root`.
    ///
    /// Fails if `root` does not contain a library header.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let header_path = root.join(LIBRARY_HEADER_FILE);
        if !header_path.is_file() {
            return Err(modgraph_common::Error::NotADirectory { path: root }.into());
        }
        Ok(Self { root })
    }

    /// Returns the library's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn module_dir(&self, id: &ModuleId) -> PathBuf {
        self.root
            .join(id.name().as_str())
            .join(id.version().as_str())
    }

    /// Stores `info` under its own id, overwriting any previous entry for that id.
    ///
    /// Acquires the library lock for the duration of the write.
    pub fn create_entry(&self, info: &ModuleInfo) -> Result<(), Error> {
        let _lock = ScopedLock::acquire(self.root.join(LOCK_FILE))?;
        let dir = self.module_dir(info.id());
        fs::create_dir_all(&dir)
            .map_err(|source| modgraph_common::Error::io_path(dir.clone(), "creating module directory", source))?;
        let descriptor_path = dir.join(DESCRIPTOR_FILE);
        atomic_write(&descriptor_path, descriptor::to_text(info).as_bytes())?;
        log::debug!("wrote descriptor for {}", info.id());
        Ok(())
    }

    /// Removes a module's entry, if present.
    ///
    /// Acquires the library lock for the duration of the removal.
    pub fn delete_entry(&self, id: &ModuleId) -> Result<(), Error> {
        let _lock = ScopedLock::acquire(self.root.join(LOCK_FILE))?;
        let dir = self.module_dir(id);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|source| modgraph_common::Error::io_path(dir, "removing module directory", source))?;
            log::debug!("removed entry for {id}");
        }
        Ok(())
    }

    fn read_descriptor(&self, id: &ModuleId) -> Result<Option<ModuleInfo>, Error> {
        let descriptor_path = self.module_dir(id).join(DESCRIPTOR_FILE);
        if !descriptor_path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&descriptor_path)
            .map_err(|source| modgraph_common::Error::io_path(descriptor_path, "reading descriptor", source))?;
        Ok(Some(descriptor::from_text(&text)?))
    }

    fn list_names(&self) -> Result<Vec<Name>, Error> {
        let mut names = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(source) => {
                return Err(modgraph_common::Error::io_path(self.root.clone(), "listing library", source).into())
            }
        };
        for entry in entries {
            let entry = entry.map_err(|source| modgraph_common::Error::io_path(self.root.clone(), "reading library entry", source))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str().and_then(|s| Name::new(s).ok()) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn list_versions(&self, name: &Name) -> Result<Vec<ModuleId>, Error> {
        let name_dir = self.root.join(name.as_str());
        let mut ids = Vec::new();
        let entries = match fs::read_dir(&name_dir) {
            Ok(entries) => entries,
            Err(ref source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(source) => {
                return Err(modgraph_common::Error::io_path(name_dir, "listing module versions", source).into())
            }
        };
        for entry in entries {
            let entry = entry.map_err(|source| modgraph_common::Error::io_path(name_dir.clone(), "reading version entry", source))?;
            if let Some(version) = entry
                .file_name()
                .to_str()
                .and_then(|s| modgraph_types::Version::new(s).ok())
            {
                ids.push(ModuleId::new(name.clone(), version));
            }
        }
        Ok(ids)
    }
}

impl Catalog for Library {
    fn gather_local_module_ids(&self, name: Option<&Name>) -> Result<Vec<ModuleId>, Error> {
        match name {
            Some(name) => self.list_versions(name),
            None => {
                let mut ids = Vec::new();
                for name in self.list_names()? {
                    ids.extend(self.list_versions(&name)?);
                }
                Ok(ids)
            }
        }
    }

    fn gather_local_declaring_module_ids(&self) -> Result<Vec<Name>, Error> {
        self.list_names()
    }

    fn read_local_module_info(&self, id: &ModuleId) -> Result<Option<ModuleInfo>, Error> {
        self.read_descriptor(id)
    }

    fn parent(&self) -> Option<&dyn Catalog> {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    fn sample_info(id: &str) -> ModuleInfo {
        descriptor::from_text(&format!("module {id}\nexport com.example.api\n")).unwrap()
    }

    #[test]
    fn create_open_round_trip() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lib");
        Library::create(&path)?;
        let library = Library::open(&path)?;
        assert_eq!(library.root(), path);
        Ok(())
    }

    #[test]
    fn create_and_read_entry() -> TestResult {
        let dir = tempfile::tempdir()?;
        let library = Library::create(dir.path())?;
        let info = sample_info("com.example.widget@1.0.0");
        library.create_entry(&info)?;

        let id = ModuleId::from_str("com.example.widget@1.0.0")?;
        let read_back = library.read_local_module_info(&id)?.unwrap();
        assert_eq!(read_back, info);
        Ok(())
    }

    #[test]
    fn delete_entry_removes_descriptor() -> TestResult {
        let dir = tempfile::tempdir()?;
        let library = Library::create(dir.path())?;
        let info = sample_info("a@1.0.0");
        library.create_entry(&info)?;
        let id = ModuleId::from_str("a@1.0.0")?;
        library.delete_entry(&id)?;
        assert!(library.read_local_module_info(&id)?.is_none());
        Ok(())
    }

    #[test]
    fn gather_local_module_ids_lists_all_versions() -> TestResult {
        let dir = tempfile::tempdir()?;
        let library = Library::create(dir.path())?;
        library.create_entry(&sample_info("a@1.0.0"))?;
        library.create_entry(&sample_info("a@2.0.0"))?;
        library.create_entry(&sample_info("b@1.0.0"))?;

        let a_name = Name::from_str("a")?;
        let a_ids = library.gather_local_module_ids(Some(&a_name))?;
        assert_eq!(a_ids.len(), 2);

        let all_ids = library.gather_local_module_ids(None)?;
        assert_eq!(all_ids.len(), 3);
        Ok(())
    }

    #[test]
    fn open_without_header_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Library::open(dir.path()).is_err());
    }
}
