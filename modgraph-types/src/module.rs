use std::collections::{BTreeMap, BTreeSet};

use crate::dependence::{Dependence, DependenceModifier};
use crate::id::ModuleId;
use crate::name::Name;

/// One identity under which a module's bytes may be presented.
///
/// A [`ModuleInfo`] declares one or more views; exactly one view's `id` equals
/// the `ModuleInfo`'s own declared identity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleView {
    id: ModuleId,
    aliases: BTreeSet<ModuleId>,
    main_class: Option<Name>,
    permits: BTreeSet<Name>,
    exports: BTreeSet<Name>,
    services: BTreeMap<Name, BTreeSet<Name>>,
}

impl ModuleView {
    /// Creates a new view for `id` with no aliases, exports, or services.
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            aliases: BTreeSet::new(),
            main_class: None,
            permits: BTreeSet::new(),
            exports: BTreeSet::new(),
            services: BTreeMap::new(),
        }
    }

    /// Returns the view's identity.
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Returns the view's declared main class, if any.
    pub fn main_class(&self) -> Option<&Name> {
        self.main_class.as_ref()
    }

    /// Sets the view's main class.
    pub fn with_main_class(mut self, main_class: Name) -> Self {
        self.main_class = Some(main_class);
        self
    }

    /// Returns the set of module names permitted to request this view with a
    /// [`DependenceModifier::Local`] dependence. An empty set means no restriction.
    pub fn permits(&self) -> &BTreeSet<Name> {
        &self.permits
    }

    /// Adds a name to the view's permits set.
    pub fn with_permit(mut self, name: Name) -> Self {
        self.permits.insert(name);
        self
    }

    /// Returns the set of packages this view exports.
    pub fn exports(&self) -> &BTreeSet<Name> {
        &self.exports
    }

    /// Adds a package to the view's exports.
    pub fn with_export(mut self, package: Name) -> Self {
        self.exports.insert(package);
        self
    }

    /// Returns the view's alternate identities.
    pub fn aliases(&self) -> &BTreeSet<ModuleId> {
        &self.aliases
    }

    /// Adds an alias identity to the view.
    pub fn with_alias(mut self, alias: ModuleId) -> Self {
        self.aliases.insert(alias);
        self
    }

    /// Returns the view's service-provider map: interface name to provider class names.
    pub fn services(&self) -> &BTreeMap<Name, BTreeSet<Name>> {
        &self.services
    }

    /// Registers `provider` as an implementation of `interface`.
    pub fn with_service(mut self, interface: Name, provider: Name) -> Self {
        self.services.entry(interface).or_default().insert(provider);
        self
    }

    /// Returns whether `requestor` is permitted to depend on this view with
    /// [`DependenceModifier::Local`].
    ///
    /// Holds when `requestor` is `None` (a root query), when this view's
    /// `permits` set names the requestor, or when `permits` is empty and the
    /// dependence is not `Local`.
    pub fn permits_requestor(&self, requestor: Option<&Name>, dependence: &Dependence) -> bool {
        match requestor {
            None => true,
            Some(requestor) => {
                if self.permits.contains(requestor) {
                    true
                } else {
                    self.permits.is_empty() && !dependence.has(DependenceModifier::Local)
                }
            }
        }
    }
}

/// A parsed module descriptor: one or more views plus a list of dependences.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleInfo {
    declared_id: ModuleId,
    views: BTreeMap<ModuleId, ModuleView>,
    requires: Vec<Dependence>,
}

impl ModuleInfo {
    /// Creates a `ModuleInfo` whose sole view is `view`, which becomes the declared identity.
    pub fn new(view: ModuleView, requires: Vec<Dependence>) -> Self {
        let declared_id = view.id().clone();
        let mut views = BTreeMap::new();
        views.insert(declared_id.clone(), view);
        Self {
            declared_id,
            views,
            requires,
        }
    }

    /// Adds an additional view to this module info.
    ///
    /// Panics if a view with the same id has already been added; this is a
    /// programmer error in descriptor construction, not a runtime input error.
    pub fn with_view(mut self, view: ModuleView) -> Self {
        let id = view.id().clone();
        assert!(
            self.views.insert(id.clone(), view).is_none(),
            "duplicate view id {id} in module info"
        );
        self
    }

    /// Returns the module's declared identity.
    pub fn id(&self) -> &ModuleId {
        &self.declared_id
    }

    /// Returns the module's declared view.
    pub fn declared_view(&self) -> &ModuleView {
        self.views
            .get(&self.declared_id)
            .expect("declared id always has a view")
    }

    /// Returns all views, including the declared one.
    pub fn views(&self) -> impl Iterator<Item = &ModuleView> {
        self.views.values()
    }

    /// Looks up a view by id.
    pub fn view(&self, id: &ModuleId) -> Option<&ModuleView> {
        self.views.get(id)
    }

    /// Returns the module's declared dependences.
    pub fn requires(&self) -> &[Dependence] {
        &self.requires
    }

    /// Returns whether any declared dependence targets `platform_module`, the
    /// platform-default module name.
    pub fn has_platform_dependence(&self, platform_module: &Name) -> bool {
        self.requires
            .iter()
            .any(|dep| dep.query().name() == platform_module)
    }

    /// Returns a copy of this module info with a synthetic dependence on
    /// `platform_module` appended, unless one is already present or
    /// `suppress` is set.
    ///
    /// This mutation must be performed at most once, before resolution; callers
    /// are responsible for calling it only while building a catalog's working set.
    pub fn with_synthetic_platform_dependence(
        mut self,
        platform_module: &Name,
        suppress: bool,
    ) -> Self {
        if suppress || self.has_platform_dependence(platform_module) {
            return self;
        }
        let query = crate::id::ModuleIdQuery::any(platform_module.clone());
        self.requires
            .push(Dependence::new(query, [DependenceModifier::Synthetic]));
        self
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::id::ModuleIdQuery;
    use crate::version::Version;

    fn mid(name: &str, version: &str) -> ModuleId {
        ModuleId::new(
            Name::from_str(name).unwrap(),
            Version::from_str(version).unwrap(),
        )
    }

    #[test]
    fn permits_requestor_defaults_open_for_non_local() {
        let view = ModuleView::new(mid("b", "1.0"));
        let dep = Dependence::new(ModuleIdQuery::any(Name::from_str("b").unwrap()), []);
        let requestor = Name::from_str("a").unwrap();
        assert!(view.permits_requestor(Some(&requestor), &dep));
    }

    #[test]
    fn permits_requestor_closed_for_local_without_explicit_permit() {
        let view = ModuleView::new(mid("b", "1.0"));
        let dep = Dependence::new(
            ModuleIdQuery::any(Name::from_str("b").unwrap()),
            [DependenceModifier::Local],
        );
        let requestor = Name::from_str("a").unwrap();
        assert!(!view.permits_requestor(Some(&requestor), &dep));
    }

    #[test]
    fn permits_requestor_named_explicitly() {
        let requestor = Name::from_str("a").unwrap();
        let view = ModuleView::new(mid("b", "1.0")).with_permit(requestor.clone());
        let dep = Dependence::new(
            ModuleIdQuery::any(Name::from_str("b").unwrap()),
            [DependenceModifier::Local],
        );
        assert!(view.permits_requestor(Some(&requestor), &dep));
        let other = Name::from_str("c").unwrap();
        assert!(!view.permits_requestor(Some(&other), &dep));
    }

    #[test]
    fn synthetic_platform_dependence_added_once() {
        let view = ModuleView::new(mid("a", "1.0"));
        let info = ModuleInfo::new(view, vec![]);
        let platform = Name::from_str("platform").unwrap();
        let info = info.with_synthetic_platform_dependence(&platform, false);
        assert!(info.has_platform_dependence(&platform));
        assert_eq!(info.requires().len(), 1);
        let info = info.with_synthetic_platform_dependence(&platform, false);
        assert_eq!(info.requires().len(), 1, "not added twice");
    }

    #[test]
    fn synthetic_platform_dependence_suppressed() {
        let view = ModuleView::new(mid("a", "1.0"));
        let info = ModuleInfo::new(view, vec![]);
        let platform = Name::from_str("platform").unwrap();
        let info = info.with_synthetic_platform_dependence(&platform, true);
        assert!(!info.has_platform_dependence(&platform));
    }
}
