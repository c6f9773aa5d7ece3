use std::collections::{BTreeMap, BTreeSet};

use modgraph_resolve::Resolution;
use modgraph_types::Name;

use crate::builder::{build_contexts, ContextGraph};
use crate::class_manifest::ClassManifest;
use crate::context::{Context, ContextId};
use crate::error::Error;

/// Partitions `resolution` into contexts and links them: computes each
/// context's local class ownership, then propagates remote package
/// suppliers to a fixed point.
pub fn link(resolution: &Resolution, classes: &ClassManifest) -> Result<Vec<Context>, Error> {
    Ok(link_graph(resolution, classes)?.contexts)
}

/// Same as [`link`], but also returns the module-to-context assignment
/// computed while partitioning, so callers that need both don't pay for
/// partitioning twice.
pub fn link_graph(resolution: &Resolution, classes: &ClassManifest) -> Result<ContextGraph, Error> {
    let ContextGraph {
        mut contexts,
        context_for_module,
    } = build_contexts(resolution);

    compute_local_suppliers(&mut contexts, classes)?;
    compute_remote_suppliers(&mut contexts, &context_for_module, resolution)?;
    compute_services(&mut contexts, resolution);

    Ok(ContextGraph {
        contexts,
        context_for_module,
    })
}

fn compute_services(contexts: &mut [Context], resolution: &Resolution) {
    for context in contexts.iter_mut() {
        for module in context.modules().clone() {
            let info = &resolution.module_info_for_name[module.name()];
            for (interface, providers) in info.declared_view().services() {
                context
                    .services
                    .entry(interface.clone())
                    .or_default()
                    .extend(providers.iter().cloned());
            }
        }
    }
}

fn compute_local_suppliers(contexts: &mut [Context], classes: &ClassManifest) -> Result<(), Error> {
    for context in contexts.iter_mut() {
        for module in context.modules().clone() {
            for class in classes.classes_of(&module) {
                if let Some(existing) = context.local_class_to_module.get(class) {
                    return Err(Error::MultipleLocalDefinitions {
                        context: context.name().to_string(),
                        class: class.clone(),
                        first: existing.clone(),
                        second: module.clone(),
                    });
                }
                context.local_class_to_module.insert(class.clone(), module.clone());
                if let Some(package) = class.package() {
                    let package = Name::new(package).expect("prefix of a valid name is valid");
                    context.packages.insert(package);
                }
            }
        }
        context.exports = context.packages.clone();
    }
    Ok(())
}

fn compute_remote_suppliers(
    contexts: &mut [Context],
    context_for_module: &BTreeMap<modgraph_types::ModuleId, ContextId>,
    resolution: &Resolution,
) -> Result<(), Error> {
    for context_index in 0..contexts.len() {
        let own_id = contexts[context_index].id();
        let mut suppliers = BTreeSet::new();
        let mut re_exported = BTreeSet::new();
        for module in contexts[context_index].modules().clone() {
            let info = &resolution.module_info_for_name[module.name()];
            for dependence in info.requires() {
                if dependence.is_local() {
                    continue;
                }
                let Some(target) = resolution.module_for_name(dependence.query().name()) else {
                    continue;
                };
                let Some(&target_context) = context_for_module.get(target) else {
                    continue;
                };
                if target_context == own_id {
                    continue;
                }
                suppliers.insert(target_context);
                if dependence.is_public() {
                    re_exported.insert(target_context);
                }
            }
        }
        contexts[context_index].suppliers = suppliers;
        contexts[context_index].re_exported_suppliers = re_exported;
    }

    let mut changed = true;
    while changed {
        changed = false;
        for context_index in 0..contexts.len() {
            let suppliers: Vec<ContextId> = contexts[context_index].suppliers.iter().copied().collect();
            for supplier_id in suppliers {
                let supplier_index = supplier_id.index();
                let supplier_exports = contexts[supplier_index].exports.clone();
                let supplier_packages = contexts[supplier_index].packages.clone();
                let supplier_remote_map = contexts[supplier_index].remote_package_to_context.clone();
                let is_reexported = contexts[context_index].re_exported_suppliers.contains(&supplier_id);

                for package in supplier_exports {
                    if contexts[context_index].packages.contains(&package) {
                        return Err(Error::PackageConflict {
                            package,
                            first: contexts[context_index].name().to_string(),
                            second: contexts[supplier_index].name().to_string(),
                        });
                    }
                    match contexts[context_index].remote_package_to_context.get(&package).copied() {
                        None => {
                            let chosen = if supplier_packages.contains(&package) {
                                Some(supplier_id)
                            } else {
                                supplier_remote_map.get(&package).copied()
                            };
                            let Some(chosen) = chosen else {
                                continue;
                            };
                            contexts[context_index]
                                .remote_package_to_context
                                .insert(package.clone(), chosen);
                            if is_reexported {
                                contexts[context_index].exports.insert(package);
                            }
                            changed = true;
                        }
                        Some(existing) if existing == supplier_id => {}
                        Some(existing) => {
                            let supplier_target = supplier_remote_map.get(&package).copied();
                            if Some(existing) != supplier_target {
                                return Err(Error::PackageConflict {
                                    package,
                                    first: contexts[existing.index()].name().to_string(),
                                    second: contexts[supplier_index].name().to_string(),
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use modgraph_types::{Dependence, DependenceModifier, ModuleId, ModuleIdQuery, ModuleInfo, ModuleView};
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
    fn duplicate_local_class_definitions_fail() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(
                ModuleIdQuery::from_str("b")?,
                [DependenceModifier::Local],
            )],
        );
        let b = ModuleInfo::new(ModuleView::new(id("b@1.0")), vec![]);
        let resolution = resolution_of(vec![a, b]);
        let classes = ClassManifest::new()
            .with_classes(id("a@1.0"), [name("com.example.Widget")])
            .with_classes(id("b@1.0"), [name("com.example.Widget")]);
        let err = link(&resolution, &classes).unwrap_err();
        assert!(matches!(err, Error::MultipleLocalDefinitions { .. }));
        Ok(())
    }

    #[test]
    fn remote_package_propagates_across_separate_contexts() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(ModuleIdQuery::from_str("b")?, [])],
        );
        let b = ModuleInfo::new(ModuleView::new(id("b@1.0")), vec![]);
        let resolution = resolution_of(vec![a, b]);
        let classes = ClassManifest::new().with_classes(id("b@1.0"), [name("com.example.lib.Widget")]);
        let contexts = link(&resolution, &classes)?;
        assert_eq!(contexts.len(), 2);
        let a_context = contexts
            .iter()
            .find(|context| context.modules().contains(&id("a@1.0")))
            .unwrap();
        let b_context = contexts
            .iter()
            .find(|context| context.modules().contains(&id("b@1.0")))
            .unwrap();
        assert_eq!(
            a_context.remote_package_to_context().get(&name("com.example.lib")),
            Some(&b_context.id())
        );
        Ok(())
    }

    #[test]
    fn package_conflict_between_defined_and_imported() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(ModuleIdQuery::from_str("b")?, [])],
        );
        let b = ModuleInfo::new(ModuleView::new(id("b@1.0")), vec![]);
        let resolution = resolution_of(vec![a, b]);
        let classes = ClassManifest::new()
            .with_classes(id("a@1.0"), [name("com.example.lib.Other")])
            .with_classes(id("b@1.0"), [name("com.example.lib.Widget")]);
        let err = link(&resolution, &classes).unwrap_err();
        assert!(matches!(err, Error::PackageConflict { .. }));
        Ok(())
    }

    #[test]
    fn services_are_aggregated_across_context_modules() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")).with_service(name("com.example.Plugin"), name("com.example.a.Impl")),
            vec![Dependence::new(
                ModuleIdQuery::from_str("b")?,
                [DependenceModifier::Local],
            )],
        );
        let b = ModuleInfo::new(
            ModuleView::new(id("b@1.0")).with_service(name("com.example.Plugin"), name("com.example.b.Impl")),
            vec![],
        );
        let resolution = resolution_of(vec![a, b]);
        let contexts = link(&resolution, &ClassManifest::new())?;
        assert_eq!(contexts.len(), 1);
        let providers = &contexts[0].services()[&name("com.example.Plugin")];
        assert!(providers.contains(&name("com.example.a.Impl")));
        assert!(providers.contains(&name("com.example.b.Impl")));
        Ok(())
    }

    #[test]
    fn public_dependence_re_exports_package_transitively() -> TestResult {
        let a = ModuleInfo::new(
            ModuleView::new(id("a@1.0")),
            vec![Dependence::new(
                ModuleIdQuery::from_str("b")?,
                [DependenceModifier::Public],
            )],
        );
        let b = ModuleInfo::new(
            ModuleView::new(id("b@1.0")),
            vec![Dependence::new(
                ModuleIdQuery::from_str("c")?,
                [DependenceModifier::Public],
            )],
        );
        let c = ModuleInfo::new(ModuleView::new(id("c@1.0")), vec![]);
        let resolution = resolution_of(vec![a, b, c]);
        let classes = ClassManifest::new().with_classes(id("c@1.0"), [name("com.example.core.Thing")]);
        let contexts = link(&resolution, &classes)?;
        let a_context = contexts
            .iter()
            .find(|context| context.modules().contains(&id("a@1.0")))
            .unwrap();
        assert!(a_context
            .remote_package_to_context()
            .contains_key(&name("com.example.core")));
        Ok(())
    }
}
