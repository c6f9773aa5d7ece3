use modgraph_types::ModuleId;

/// The outcome of cross-checking a repository's catalog against its directory contents.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReport {
    /// Ids listed in the catalog with no corresponding module file on disk.
    pub missing_on_disk: Vec<ModuleId>,
    /// Module files on disk with no corresponding catalog entry.
    pub missing_in_catalog: Vec<ModuleId>,
    /// Ids present in both but whose on-disk size disagrees with the catalog.
    pub size_mismatches: Vec<ModuleId>,
}

impl ValidationReport {
    /// Returns whether the repository is fully consistent.
    pub fn is_clean(&self) -> bool {
        self.missing_on_disk.is_empty()
            && self.missing_in_catalog.is_empty()
            && self.size_mismatches.is_empty()
    }
}
