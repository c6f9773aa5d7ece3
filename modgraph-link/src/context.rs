use std::collections::{BTreeMap, BTreeSet};

use modgraph_types::{ModuleId, Name};

/// The identity of a [`Context`] within one linking run.
///
/// Assigned sequentially by the context builder; a `ContextId`'s numeric
/// value is also its index into the `Vec<Context>` the builder returns,
/// which lets the linker address contexts by id without a lookup table.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContextId(pub(crate) usize);

impl ContextId {
    /// Returns the numeric index this id corresponds to in the builder's context list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A group of modules whose internal class definitions are mutually visible.
///
/// Built by the context builder (module membership and name), then
/// populated by the linker's two phases (local class ownership, then
/// cross-context package suppliers).
#[derive(Clone, Debug)]
pub struct Context {
    id: ContextId,
    name: String,
    modules: BTreeSet<ModuleId>,
    pub(crate) local_class_to_module: BTreeMap<Name, ModuleId>,
    pub(crate) packages: BTreeSet<Name>,
    pub(crate) exports: BTreeSet<Name>,
    pub(crate) suppliers: BTreeSet<ContextId>,
    pub(crate) re_exported_suppliers: BTreeSet<ContextId>,
    pub(crate) remote_package_to_context: BTreeMap<Name, ContextId>,
    pub(crate) services: BTreeMap<Name, BTreeSet<Name>>,
}

impl Context {
    pub(crate) fn new(id: ContextId, name: String, modules: BTreeSet<ModuleId>) -> Self {
        Self {
            id,
            name,
            modules,
            local_class_to_module: BTreeMap::new(),
            packages: BTreeSet::new(),
            exports: BTreeSet::new(),
            suppliers: BTreeSet::new(),
            re_exported_suppliers: BTreeSet::new(),
            remote_package_to_context: BTreeMap::new(),
            services: BTreeMap::new(),
        }
    }

    /// Returns this context's id.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Returns this context's interned name, `+m1+m2+...` over its sorted module ids.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the modules assigned to this context.
    pub fn modules(&self) -> &BTreeSet<ModuleId> {
        &self.modules
    }

    /// Returns the defining module for each locally owned class.
    pub fn local_class_to_module(&self) -> &BTreeMap<Name, ModuleId> {
        &self.local_class_to_module
    }

    /// Returns the packages defined by modules in this context.
    pub fn packages(&self) -> &BTreeSet<Name> {
        &self.packages
    }

    /// Returns the packages this context makes available to contexts that import from it.
    pub fn exports(&self) -> &BTreeSet<Name> {
        &self.exports
    }

    /// Returns the contexts this context has a non-local dependence on.
    pub fn suppliers(&self) -> &BTreeSet<ContextId> {
        &self.suppliers
    }

    /// Returns the subset of [`Self::suppliers`] this context re-exports.
    pub fn re_exported_suppliers(&self) -> &BTreeSet<ContextId> {
        &self.re_exported_suppliers
    }

    /// Returns the context chosen to supply each imported package.
    pub fn remote_package_to_context(&self) -> &BTreeMap<Name, ContextId> {
        &self.remote_package_to_context
    }

    /// Returns the aggregated service-provider map over every module in this context.
    pub fn services(&self) -> &BTreeMap<Name, BTreeSet<Name>> {
        &self.services
    }
}
