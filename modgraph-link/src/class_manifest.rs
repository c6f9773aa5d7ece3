use std::collections::{BTreeMap, BTreeSet};

use modgraph_types::{ModuleId, Name};

/// The classes each resolved module defines, supplied by the caller.
///
/// A module's descriptor says what it exports and requires, but not what
/// classes live inside it; that listing comes from the module file's class
/// section at pack time, or from a test fixture. The linker only needs the
/// listing, not how it was obtained, so it takes this small map rather than
/// reaching into a catalog or module-file reader itself.
#[derive(Clone, Debug, Default)]
pub struct ClassManifest {
    classes_by_module: BTreeMap<ModuleId, BTreeSet<Name>>,
}

impl ClassManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the classes `id` defines.
    pub fn with_classes(mut self, id: ModuleId, classes: impl IntoIterator<Item = Name>) -> Self {
        self.classes_by_module.insert(id, classes.into_iter().collect());
        self
    }

    /// Returns the classes `id` defines, or an empty set if unknown.
    pub fn classes_of(&self, id: &ModuleId) -> &BTreeSet<Name> {
        static EMPTY: BTreeSet<Name> = BTreeSet::new();
        self.classes_by_module.get(id).unwrap_or(&EMPTY)
    }
}
