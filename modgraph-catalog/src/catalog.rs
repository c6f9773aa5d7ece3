use modgraph_types::{ModuleId, ModuleIdQuery, ModuleInfo, Name};

use crate::error::Error;

/// A read-only source of module metadata, with optional parent delegation.
///
/// A chain of catalogs (e.g. a [`crate::Library`] with a parent repository
/// mirror) is walked uniformly through the default methods here, which defer
/// to [`Catalog::gatherLocalModuleIds`]-style "local" methods and recurse into
/// [`Catalog::parent`].
pub trait Catalog {
    /// Returns the ids of every locally known module, optionally filtered by name.
    fn gather_local_module_ids(&self, name: Option<&Name>) -> Result<Vec<ModuleId>, Error>;

    /// Returns the names of every module this catalog declares locally.
    fn gather_local_declaring_module_ids(&self) -> Result<Vec<Name>, Error>;

    /// Reads a locally stored module's full descriptor.
    fn read_local_module_info(&self, id: &ModuleId) -> Result<Option<ModuleInfo>, Error>;

    /// Returns this catalog's parent, if any.
    fn parent(&self) -> Option<&dyn Catalog>;

    /// Returns every id matching `query`, across this catalog and its ancestors.
    fn find_module_ids(&self, query: &ModuleIdQuery) -> Result<Vec<ModuleId>, Error> {
        let mut ids = self.gather_local_module_ids(Some(query.name()))?;
        ids.retain(|id| query.matches(id));
        if let Some(parent) = self.parent() {
            ids.extend(parent.find_module_ids(query)?);
        }
        Ok(ids)
    }

    /// Returns the latest id matching `query` across this catalog and its ancestors,
    /// using [`ModuleId`]'s total order and preferring the newest version on ties.
    fn find_latest_module_id(&self, query: &ModuleIdQuery) -> Result<Option<ModuleId>, Error> {
        let mut candidates = self.find_module_ids(query)?;
        candidates.sort_by(|a, b| b.version().cmp(a.version()).then_with(|| a.cmp(b)));
        Ok(candidates.into_iter().next())
    }

    /// Reads a module's descriptor, checking this catalog before delegating to the parent.
    fn read_module_info(&self, id: &ModuleId) -> Result<Option<ModuleInfo>, Error> {
        if let Some(info) = self.read_local_module_info(id)? {
            return Ok(Some(info));
        }
        match self.parent() {
            Some(parent) => parent.read_module_info(id),
            None => Ok(None),
        }
    }
}

/// A [`Catalog`] that can additionally report the download and installed sizes of a
/// module it has not yet delivered locally.
///
/// Implemented by [`crate::Library`]'s remote counterpart (a repository of
/// module files); the resolver consults this only when a dependence cannot be
/// satisfied from an already-installed catalog.
pub trait RemoteCatalog: Catalog {
    /// Returns `(compressed_size, uncompressed_size)` for `id`, if known.
    fn metadata_sizes(&self, id: &ModuleId) -> Result<Option<(u64, u64)>, Error>;
}

/// A catalog that chains several catalogs with no locally declared modules of its own,
/// consulting them in order.
pub struct CompositeChain {
    members: Vec<Box<dyn Catalog>>,
}

impl std::fmt::Debug for CompositeChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeChain")
            .field("members", &self.members.len())
            .finish()
    }
}

impl CompositeChain {
    /// Creates a composite from an ordered list of member catalogs.
    pub fn new(members: Vec<Box<dyn Catalog>>) -> Self {
        Self { members }
    }
}

impl Catalog for CompositeChain {
    fn gather_local_module_ids(&self, name: Option<&Name>) -> Result<Vec<ModuleId>, Error> {
        let mut ids = Vec::new();
        for member in &self.members {
            ids.extend(member.gather_local_module_ids(name)?);
        }
        Ok(ids)
    }

    fn gather_local_declaring_module_ids(&self) -> Result<Vec<Name>, Error> {
        let mut names = Vec::new();
        for member in &self.members {
            names.extend(member.gather_local_declaring_module_ids()?);
        }
        Ok(names)
    }

    fn read_local_module_info(&self, id: &ModuleId) -> Result<Option<ModuleInfo>, Error> {
        for member in &self.members {
            if let Some(info) = member.read_local_module_info(id)? {
                return Ok(Some(info));
            }
        }
        Ok(None)
    }

    fn parent(&self) -> Option<&dyn Catalog> {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use super::*;

    struct FixedCatalog {
        modules: BTreeMap<ModuleId, ModuleInfo>,
    }

    impl Catalog for FixedCatalog {
        fn gather_local_module_ids(&self, name: Option<&Name>) -> Result<Vec<ModuleId>, Error> {
            Ok(self
                .modules
                .keys()
                .filter(|id| name.is_none_or(|name| id.name() == name))
                .cloned()
                .collect())
        }

        fn gather_local_declaring_module_ids(&self) -> Result<Vec<Name>, Error> {
            Ok(self.modules.keys().map(|id| id.name().clone()).collect())
        }

        fn read_local_module_info(&self, id: &ModuleId) -> Result<Option<ModuleInfo>, Error> {
            Ok(self.modules.get(id).cloned())
        }

        fn parent(&self) -> Option<&dyn Catalog> {
            None
        }
    }

    fn info(id: &str) -> ModuleInfo {
        crate::descriptor::from_text(&format!("module {id}\n")).unwrap()
    }

    #[test]
    fn finds_latest_matching_version() {
        let mut modules = BTreeMap::new();
        for version in ["1.0", "2.0", "3.0"] {
            let id = ModuleId::from_str(&format!("b@{version}")).unwrap();
            modules.insert(id.clone(), info(&id.to_string()));
        }
        let catalog = FixedCatalog { modules };
        let query = ModuleIdQuery::from_str("b@>=2.0").unwrap();
        let latest = catalog.find_latest_module_id(&query).unwrap().unwrap();
        assert_eq!(latest.to_string(), "b@3.0");
    }

    #[test]
    fn missing_module_returns_none() {
        let catalog = FixedCatalog {
            modules: BTreeMap::new(),
        };
        let id = ModuleId::from_str("a@1.0").unwrap();
        assert!(catalog.read_module_info(&id).unwrap().is_none());
    }
}
