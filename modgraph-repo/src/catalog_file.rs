use std::collections::BTreeMap;

use modgraph_types::ModuleId;

use crate::entry::RepoEntry;
use crate::error::Error;
use crate::wire::{put_u16, put_u32, Cursor};

/// Shared with `modgraph-file`'s `MAGIC`: both formats open every binary
/// artifact in this workspace with the same four bytes.
const MAGIC: u32 = 0xCAFE_00FA;
const ARTIFACT_STREAM_CATALOG: u16 = 4;

/// The in-memory, serializable contents of a repository's `%catalog` file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StreamCatalog {
    entries: BTreeMap<ModuleId, RepoEntry>,
    aliases: BTreeMap<ModuleId, ModuleId>,
}

impl StreamCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, entry: RepoEntry) {
        self.entries.insert(entry.id().clone(), entry);
    }

    /// Removes an entry, returning it if present.
    pub fn remove(&mut self, id: &ModuleId) -> Option<RepoEntry> {
        self.entries.remove(id)
    }

    /// Registers `alias` as an additional view id resolving to `target`.
    pub fn insert_alias(&mut self, alias: ModuleId, target: ModuleId) {
        self.aliases.insert(alias, target);
    }

    /// Looks up an entry by id, resolving aliases first.
    pub fn get(&self, id: &ModuleId) -> Option<&RepoEntry> {
        let resolved = self.aliases.get(id).unwrap_or(id);
        self.entries.get(resolved)
    }

    /// Returns every entry's id.
    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.entries.keys()
    }

    /// Returns every entry.
    pub fn entries(&self) -> impl Iterator<Item = &RepoEntry> {
        self.entries.values()
    }

    /// Serializes the catalog to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_be_bytes());
        put_u16(&mut out, ARTIFACT_STREAM_CATALOG);
        put_u16(&mut out, self.entries.len() as u16);
        for entry in self.entries.values() {
            entry.write(&mut out);
        }
        put_u16(&mut out, self.aliases.len() as u16);
        for (alias, target) in &self.aliases {
            put_u32(&mut out, alias.to_string().len() as u32);
            out.extend_from_slice(alias.to_string().as_bytes());
            put_u32(&mut out, target.to_string().len() as u32);
            out.extend_from_slice(target.to_string().as_bytes());
        }
        out
    }

    /// Parses a catalog previously produced by [`Self::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(data);
        let magic = cursor.read_u32("magic")?;
        if magic != MAGIC {
            return Err(Error::NotAStreamCatalog);
        }
        let artifact_type = cursor.read_u16("artifact type")?;
        if artifact_type != ARTIFACT_STREAM_CATALOG {
            return Err(Error::NotAStreamCatalog);
        }
        let module_count = cursor.read_u16("module count")?;
        let mut entries = BTreeMap::new();
        for _ in 0..module_count {
            let entry = RepoEntry::read(&mut cursor)?;
            entries.insert(entry.id().clone(), entry);
        }
        let alias_count = cursor.read_u16("alias count")?;
        let mut aliases = BTreeMap::new();
        for _ in 0..alias_count {
            use std::str::FromStr;
            let alias_text = cursor.read_str("alias id")?;
            let target_text = cursor.read_str("alias target")?;
            let alias = ModuleId::from_str(&alias_text).map_err(|_| Error::UnexpectedEof("alias id"))?;
            let target = ModuleId::from_str(&target_text).map_err(|_| Error::UnexpectedEof("alias target"))?;
            aliases.insert(alias, target);
        }
        Ok(Self { entries, aliases })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use modgraph_types::{digests::Sha256, Checksum};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn round_trips_entries_and_aliases() -> TestResult {
        let mut catalog = StreamCatalog::new();
        let id = ModuleId::from_str("com.example.widget@1.0.0")?;
        let entry = RepoEntry::new(
            id.clone(),
            128,
            256,
            Checksum::<Sha256>::calculate_from(b"module file bytes"),
            "module com.example.widget@1.0.0\n".to_string(),
        );
        catalog.insert(entry.clone());
        let alias = ModuleId::from_str("com.example.widget.legacy@1.0.0")?;
        catalog.insert_alias(alias.clone(), id.clone());

        let bytes = catalog.to_bytes();
        let restored = StreamCatalog::from_bytes(&bytes)?;
        assert_eq!(restored.get(&id), Some(&entry));
        assert_eq!(restored.get(&alias), Some(&entry));
        Ok(())
    }
}
