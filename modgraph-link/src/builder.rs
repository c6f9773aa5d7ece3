use std::collections::{BTreeMap, BTreeSet};

use modgraph_resolve::Resolution;
use modgraph_types::ModuleId;

use crate::context::{Context, ContextId};

/// The connected-component partitioning of a [`Resolution`] into contexts.
#[derive(Debug)]
pub struct ContextGraph {
    /// Every context, indexed by [`ContextId`].
    pub contexts: Vec<Context>,
    /// The context each resolved module was assigned to.
    pub context_for_module: BTreeMap<ModuleId, ContextId>,
}

/// Partitions a resolution's modules into contexts: the connected components
/// of the undirected graph whose edges are `LOCAL` dependences.
///
/// A `LOCAL` dependence on a module the resolver left unresolved (only
/// possible when the dependence was also `OPTIONAL`) contributes no edge.
pub fn build_contexts(resolution: &Resolution) -> ContextGraph {
    let mut adjacency: BTreeMap<ModuleId, BTreeSet<ModuleId>> = BTreeMap::new();
    for info in resolution.module_info_for_name.values() {
        for dependence in info.requires() {
            if !dependence.is_local() {
                continue;
            }
            let Some(target) = resolution.module_for_name(dependence.query().name()) else {
                continue;
            };
            adjacency
                .entry(info.id().clone())
                .or_default()
                .insert(target.clone());
            adjacency
                .entry(target.clone())
                .or_default()
                .insert(info.id().clone());
        }
    }

    let mut visited = BTreeSet::new();
    let mut contexts = Vec::new();
    let mut context_for_module = BTreeMap::new();

    for module in &resolution.modules {
        if visited.contains(module) {
            continue;
        }
        let mut component = BTreeSet::new();
        let mut stack = vec![module.clone()];
        while let Some(current) = stack.pop() {
            if !component.insert(current.clone()) {
                continue;
            }
            visited.insert(current.clone());
            if let Some(neighbors) = adjacency.get(&current) {
                for neighbor in neighbors {
                    if !component.contains(neighbor) {
                        stack.push(neighbor.clone());
                    }
                }
            }
        }

        let id = ContextId(contexts.len());
        let name = context_name(&component);
        for member in &component {
            context_for_module.insert(member.clone(), id);
        }
        log::debug!("assigned context {name} ({} module(s))", component.len());
        contexts.push(Context::new(id, name, component));
    }

    ContextGraph {
        contexts,
        context_for_module,
    }
}

fn context_name(modules: &BTreeSet<ModuleId>) -> String {
    let mut name = String::new();
    for module in modules {
        name.push('+');
        name.push_str(&module.to_string());
    }
    name
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use modgraph_types::{Dependence, DependenceModifier, ModuleIdQuery, ModuleInfo, ModuleView};
    use testresult::TestResult;

    use super::*;

    fn id(text: &str) -> ModuleId {
        ModuleId::from_str(text).unwrap()
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
    fn modules_without_local_edges_are_separate_contexts() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(ModuleIdQuery::from_str("b")?, [])],
        );
        let b = ModuleInfo::new(ModuleView::new(id("b@1.0")), vec![]);
        let resolution = resolution_of(vec![a, b]);
        let graph = build_contexts(&resolution);
        assert_eq!(graph.contexts.len(), 2);
        assert_ne!(
            graph.context_for_module[&id("a@1.0")],
            graph.context_for_module[&id("b@1.0")]
        );
        Ok(())
    }

    #[test]
    fn local_dependence_merges_contexts() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(
                ModuleIdQuery::from_str("b")?,
                [DependenceModifier::Local],
            )],
        );
        let b = ModuleInfo::new(ModuleView::new(id("b@1.0")), vec![]);
        let resolution = resolution_of(vec![a, b]);
        let graph = build_contexts(&resolution);
        assert_eq!(graph.contexts.len(), 1);
        assert_eq!(
            graph.context_for_module[&id("a@1.0")],
            graph.context_for_module[&id("b@1.0")]
        );
        Ok(())
    }

    #[test]
    fn optional_local_dependence_to_unresolved_module_drops_the_edge() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(
                ModuleIdQuery::from_str("missing")?,
                [DependenceModifier::Local, DependenceModifier::Optional],
            )],
        );
        let resolution = resolution_of(vec![a]);
        let graph = build_contexts(&resolution);
        assert_eq!(graph.contexts.len(), 1);
        Ok(())
    }
}
