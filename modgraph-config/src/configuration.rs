use std::collections::BTreeMap;

use modgraph_catalog::{Catalog, RemoteCatalog};
use modgraph_link::{link_graph, ClassManifest, Context, ContextId};
use modgraph_resolve::Resolution;
use modgraph_types::{ModuleId, ModuleIdQuery, Name};

use crate::config::ModuleSystemConfig;
use crate::error::Error;

/// The frozen, queryable result of resolving, partitioning, and linking one
/// set of root queries.
///
/// Independent `Configuration`s may coexist in the same process; nothing
/// here is shared mutable state.
#[derive(Debug)]
pub struct Configuration {
    root_queries: Vec<ModuleIdQuery>,
    contexts: Vec<Context>,
    context_for_module: BTreeMap<ModuleId, ContextId>,
    context_name_to_id: BTreeMap<String, ContextId>,
}

impl Configuration {
    /// Resolves `root_queries` against `catalog` (falling back to `remote`
    /// when a dependence cannot be satisfied locally), then partitions and
    /// links the result into a `Configuration`.
    pub fn build(
        root_queries: Vec<ModuleIdQuery>,
        catalog: &dyn Catalog,
        remote: Option<&dyn RemoteCatalog>,
        classes: &ClassManifest,
        config: &ModuleSystemConfig,
    ) -> Result<Self, Error> {
        let resolution = modgraph_resolve::resolve(
            &root_queries,
            catalog,
            remote,
            config.platform_module(),
            config.suppress_platform_default(),
        )?;
        Self::from_resolution(root_queries, &resolution, classes)
    }

    /// Builds a `Configuration` from an already-computed [`Resolution`].
    pub fn from_resolution(
        root_queries: Vec<ModuleIdQuery>,
        resolution: &Resolution,
        classes: &ClassManifest,
    ) -> Result<Self, Error> {
        let graph = link_graph(resolution, classes)?;
        let context_name_to_id = graph
            .contexts
            .iter()
            .map(|context| (context.name().to_string(), context.id()))
            .collect();
        log::debug!(
            "built configuration with {} module(s) in {} context(s)",
            resolution.modules.len(),
            graph.contexts.len()
        );
        Ok(Self {
            root_queries,
            contexts: graph.contexts,
            context_for_module: graph.context_for_module,
            context_name_to_id,
        })
    }

    /// Returns the root queries this configuration was built from.
    pub fn root_queries(&self) -> &[ModuleIdQuery] {
        &self.root_queries
    }

    /// Returns every context in this configuration.
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Looks up a context by id.
    pub fn context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(id.index())
    }

    /// Returns the context a module was assigned to.
    pub fn context_for_module(&self, id: &ModuleId) -> Option<&Context> {
        self.context_for_module
            .get(id)
            .and_then(|&context_id| self.context(context_id))
    }

    /// Finds the context containing a resolved module named `name`, regardless of version.
    pub fn find_context_for_module_name(&self, name: &Name) -> Option<&Context> {
        self.context_for_module
            .keys()
            .find(|id| id.name() == name)
            .and_then(|id| self.context_for_module(id))
    }

    /// Finds the context that locally defines `class`.
    pub fn context_for_class(&self, class: &Name) -> Option<&Context> {
        self.contexts
            .iter()
            .find(|context| context.local_class_to_module().contains_key(class))
    }

    /// Returns the name of the context chosen to supply `package` to `context`.
    pub fn context_for_remote_package<'a>(&'a self, context: &Context, package: &Name) -> Option<&'a str> {
        let supplier_id = *context.remote_package_to_context().get(package)?;
        self.context(supplier_id).map(Context::name)
    }

    /// Looks up a context by its interned name.
    pub fn context_named(&self, name: &str) -> Option<&Context> {
        self.context_name_to_id.get(name).and_then(|&id| self.context(id))
    }

    /// Iterates over every `(interface, providers)` pair aggregated across all contexts.
    ///
    /// Unlike [`Context::services`], this merges the same interface's
    /// providers across every context in the configuration, matching how a
    /// consumer discovers every advertised implementation platform-wide.
    pub fn services(&self) -> BTreeMap<Name, Vec<Name>> {
        let mut aggregated: BTreeMap<Name, std::collections::BTreeSet<Name>> = BTreeMap::new();
        for context in &self.contexts {
            for (interface, providers) in context.services() {
                aggregated
                    .entry(interface.clone())
                    .or_default()
                    .extend(providers.iter().cloned());
            }
        }
        aggregated
            .into_iter()
            .map(|(interface, providers)| (interface, providers.into_iter().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use modgraph_types::{Dependence, DependenceModifier, ModuleInfo, ModuleView};
    use testresult::TestResult;

    use super::*;

    fn id(text: &str) -> ModuleId {
        ModuleId::from_str(text).unwrap()
    }

    fn name(text: &str) -> Name {
        Name::from_str(text).unwrap()
    }

    fn resolution_of(infos: Vec<ModuleInfo>) -> Resolution {
        let modules = infos.iter().map(|info| info.id().clone()).collect();
        let module_info_for_name = infos
            .into_iter()
            .map(|info| (info.id().name().clone(), info))
            .collect();
        Resolution {
            root_queries: vec![],
            modules,
            module_info_for_name,
            location_for_name: BTreeMap::new(),
            modules_needed: BTreeSet::new(),
            download_required: 0,
            space_required: 0,
        }
    }

    #[test]
    fn queries_context_for_module_and_class() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(
                ModuleIdQuery::from_str("b")?,
                [DependenceModifier::Local],
            )],
        );
        let b = ModuleInfo::new(ModuleView::new(id("b@1.0")), vec![]);
        let resolution = resolution_of(vec![a, b]);
        let classes = ClassManifest::new().with_classes(id("b@1.0"), [name("com.example.Widget")]);
        let root = vec![ModuleIdQuery::from_str("a")?];
        let configuration = Configuration::from_resolution(root, &resolution, &classes)?;

        assert_eq!(configuration.contexts().len(), 1);
        let context = configuration.context_for_module(&id("a@1.0")).unwrap();
        assert!(context.modules().contains(&id("b@1.0")));
        let class_context = configuration.context_for_class(&name("com.example.Widget")).unwrap();
        assert_eq!(class_context.id(), context.id());
        assert_eq!(
            configuration.find_context_for_module_name(&name("a")).unwrap().id(),
            context.id()
        );
        Ok(())
    }

    #[test]
    fn aggregates_services_across_all_contexts() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")).with_service(name("com.example.Plugin"), name("com.example.a.Impl")),
            vec![],
        );
        let b = ModuleInfo::new(
            ModuleView::new(id("b@1.0")).with_service(name("com.example.Plugin"), name("com.example.b.Impl")),
            vec![],
        );
        let resolution = resolution_of(vec![a, b]);
        let configuration =
            Configuration::from_resolution(vec![], &resolution, &ClassManifest::new())?;
        assert_eq!(configuration.contexts().len(), 2, "no LOCAL edge between a and b");
        let providers = &configuration.services()[&name("com.example.Plugin")];
        assert_eq!(providers.len(), 2);
        Ok(())
    }
}
