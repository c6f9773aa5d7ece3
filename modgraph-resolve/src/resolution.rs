use std::collections::{BTreeMap, BTreeSet};

use modgraph_types::{ModuleId, ModuleIdQuery, ModuleInfo, Name};

use crate::location::Location;

/// The outcome of resolving a set of root dependence queries.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// The queries resolution started from.
    pub root_queries: Vec<ModuleIdQuery>,
    /// Every module id selected into the graph.
    pub modules: BTreeSet<ModuleId>,
    /// The descriptor selected for each resolved module name.
    pub module_info_for_name: BTreeMap<Name, ModuleInfo>,
    /// Where each resolved module name's bytes were found.
    pub location_for_name: BTreeMap<Name, Location>,
    /// Modules that must still be fetched from a remote repository before launch.
    pub modules_needed: BTreeSet<ModuleId>,
    /// Total compressed bytes that must be downloaded to satisfy [`Self::modules_needed`].
    pub download_required: u64,
    /// Total uncompressed bytes [`Self::modules_needed`] will occupy once installed.
    pub space_required: u64,
}

impl Resolution {
    /// Returns the id this resolution selected for `name`, if any.
    pub fn module_for_name(&self, name: &Name) -> Option<&ModuleId> {
        self.module_info_for_name.get(name).map(ModuleInfo::id)
    }
}
