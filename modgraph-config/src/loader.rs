use std::collections::BTreeSet;

use modgraph_link::Context;
use modgraph_types::Name;

use crate::configuration::Configuration;

/// The contract a run-time class loader consumes from a built [`Configuration`].
///
/// This workspace does not implement a class loader — loading bytecode,
/// defining classes in a JVM-like runtime, and caching loader instances are
/// all out of scope here. This trait is the seam such a loader would plug
/// into: given a caller's context and a class name, find the context that
/// should define it.
pub trait ClassLoaderBoundary {
    /// Returns the context that should define `class` as seen from `caller`:
    /// the caller's own context if it defines the class locally, otherwise
    /// the context its package was linked to. Returns `None` if neither
    /// applies (the class is undefined) or the class is a bootstrap class,
    /// which the caller should check with [`Self::is_bootstrap_class`] first.
    fn defining_context<'a>(
        &self,
        configuration: &'a Configuration,
        caller: &Context,
        class: &Name,
    ) -> Option<&'a Context>;

    /// Returns whether `class` belongs to a fixed bootstrap/platform package
    /// prefix, which short-circuits to the runtime's built-in loader instead
    /// of any context's loader.
    fn is_bootstrap_class(&self, class: &Name) -> bool;
}

/// A [`ClassLoaderBoundary`] driven by a configured set of bootstrap package prefixes.
#[derive(Clone, Debug, Default)]
pub struct DefaultClassLoaderBoundary {
    bootstrap_prefixes: BTreeSet<Name>,
}

impl DefaultClassLoaderBoundary {
    /// Creates a boundary with no bootstrap prefixes configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `prefix` as a bootstrap package prefix.
    pub fn with_bootstrap_prefix(mut self, prefix: Name) -> Self {
        self.bootstrap_prefixes.insert(prefix);
        self
    }
}

impl ClassLoaderBoundary for DefaultClassLoaderBoundary {
    fn defining_context<'a>(
        &self,
        configuration: &'a Configuration,
        caller: &Context,
        class: &Name,
    ) -> Option<&'a Context> {
        if self.is_bootstrap_class(class) {
            return None;
        }
        if caller.local_class_to_module().contains_key(class) {
            return configuration.context(caller.id());
        }
        let package = class.package()?;
        let package = Name::new(package).ok()?;
        let supplier_name = configuration.context_for_remote_package(caller, &package)?;
        configuration.context_named(supplier_name)
    }

    fn is_bootstrap_class(&self, class: &Name) -> bool {
        self.bootstrap_prefixes.iter().any(|prefix| {
            class.as_str() == prefix.as_str()
                || class
                    .as_str()
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use modgraph_resolve::Resolution;
    use modgraph_types::{ModuleId, ModuleIdQuery, ModuleInfo, ModuleView};
    use testresult::TestResult;

    use super::*;

    fn id(text: &str) -> ModuleId {
        ModuleId::from_str(text).unwrap()
    }

    fn name(text: &str) -> Name {
        Name::from_str(text).unwrap()
    }

    #[test]
    fn bootstrap_classes_are_detected_by_prefix() {
        let boundary = DefaultClassLoaderBoundary::new().with_bootstrap_prefix(name("java.lang"));
        assert!(boundary.is_bootstrap_class(&name("java.lang.Object")));
        assert!(!boundary.is_bootstrap_class(&name("java.langish.Other")));
        assert!(!boundary.is_bootstrap_class(&name("com.example.Widget")));
    }

    #[test]
    fn resolves_local_class_to_caller_context() -> TestResult {
        let a = ModuleInfo::new(ModuleView::new(id("a@1.0")), vec![]);
        let modules = BTreeSet::from([id("a@1.0")]);
        let module_info_for_name = BTreeMap::from([(a.id().name().clone(), a)]);
        let resolution = Resolution {
            root_queries: vec![ModuleIdQuery::from_str("a")?],
            modules,
            module_info_for_name,
            location_for_name: BTreeMap::new(),
            modules_needed: BTreeSet::new(),
            download_required: 0,
            space_required: 0,
        };
        let classes = modgraph_link::ClassManifest::new().with_classes(id("a@1.0"), [name("com.example.Widget")]);
        let configuration = Configuration::from_resolution(
            vec![ModuleIdQuery::from_str("a")?],
            &resolution,
            &classes,
        )?;
        let caller = configuration.context_for_module(&id("a@1.0")).unwrap();
        let boundary = DefaultClassLoaderBoundary::new();
        let found = boundary
            .defining_context(&configuration, caller, &name("com.example.Widget"))
            .unwrap();
        assert_eq!(found.id(), caller.id());
        Ok(())
    }
}
