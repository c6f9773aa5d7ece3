use std::collections::{BTreeMap, BTreeSet};

use modgraph_catalog::{Catalog, RemoteCatalog};
use modgraph_types::{Dependence, ModuleId, ModuleIdQuery, ModuleInfo, Name};

use crate::error::Error;
use crate::location::Location;
use crate::resolution::Resolution;

/// State threaded through resolution, snapshotted and restored around each
/// candidate attempt so a rejected candidate leaves no trace.
///
/// This plays the role of the requestor/dependence choice stack: rather than
/// a hand-rolled linked list of pending choices, each candidate is tried by
/// an ordinary recursive call, and backtracking is an early return after
/// restoring a cloned snapshot of this struct.
#[derive(Clone, Debug, Default)]
struct State {
    modules: BTreeSet<ModuleId>,
    module_for_name: BTreeMap<Name, ModuleId>,
    info_for_name: BTreeMap<Name, ModuleInfo>,
    location_for_name: BTreeMap<Name, Location>,
    download_required: u64,
    space_required: u64,
}

/// Resolves `root_queries` against `catalog` (and, if a dependence cannot be
/// satisfied locally, `remote`) into a complete module graph.
///
/// `platform_module` names the module every resolved module implicitly
/// requires unless it already declares a dependence on it or
/// `suppress_platform_default` is set.
pub fn resolve(
    root_queries: &[ModuleIdQuery],
    catalog: &dyn Catalog,
    remote: Option<&dyn RemoteCatalog>,
    platform_module: &Name,
    suppress_platform_default: bool,
) -> Result<Resolution, Error> {
    let mut state = State::default();
    for query in root_queries {
        let dependence = Dependence::new(query.clone(), []);
        satisfy(
            &mut state,
            None,
            &dependence,
            catalog,
            remote,
            platform_module,
            suppress_platform_default,
        )?;
    }

    let modules_needed: BTreeSet<ModuleId> = state
        .location_for_name
        .iter()
        .filter(|(_, location)| matches!(location, Location::Remote))
        .filter_map(|(name, _)| state.module_for_name.get(name).cloned())
        .collect();

    Ok(Resolution {
        root_queries: root_queries.to_vec(),
        modules: state.modules,
        module_info_for_name: state.info_for_name,
        location_for_name: state.location_for_name,
        modules_needed,
        download_required: state.download_required,
        space_required: state.space_required,
    })
}

/// Satisfies a single dependence, trying candidates newest-version-first and
/// backtracking on failure.
fn satisfy(
    state: &mut State,
    requestor: Option<&Name>,
    dependence: &Dependence,
    catalog: &dyn Catalog,
    remote: Option<&dyn RemoteCatalog>,
    platform_module: &Name,
    suppress_platform_default: bool,
) -> Result<(), Error> {
    let query = dependence.query();

    if let Some(existing_id) = state.module_for_name.get(query.name()).cloned() {
        return reconcile_with_existing(state, requestor, dependence, &existing_id);
    }

    let mut candidates = catalog.find_module_ids(query)?;
    if candidates.is_empty() {
        if let Some(remote) = remote {
            candidates = remote.find_module_ids(query)?;
        }
    }
    candidates.sort_by(|a, b| b.version().cmp(a.version()).then_with(|| a.cmp(b)));

    let mut last_err = None;
    for candidate in candidates {
        let snapshot = state.clone();
        match try_candidate(
            state,
            requestor,
            dependence,
            &candidate,
            catalog,
            remote,
            platform_module,
            suppress_platform_default,
        ) {
            Ok(()) => return Ok(()),
            Err(err) => {
                *state = snapshot;
                last_err = Some(err);
            }
        }
    }

    if dependence.is_optional() {
        return Ok(());
    }
    Err(last_err.unwrap_or_else(|| Error::ModuleNotFound {
        query: query.clone(),
    }))
}

fn reconcile_with_existing(
    state: &mut State,
    requestor: Option<&Name>,
    dependence: &Dependence,
    existing_id: &ModuleId,
) -> Result<(), Error> {
    let query = dependence.query();
    if !query.matches(existing_id) {
        if dependence.is_optional() {
            return Ok(());
        }
        return Err(Error::CannotResolve {
            query: query.clone(),
        });
    }
    let info = state
        .info_for_name
        .get(existing_id.name())
        .expect("resolved module name always has cached info");
    let view = info.view(existing_id).unwrap_or_else(|| info.declared_view());
    if view.permits_requestor(requestor, dependence) {
        return Ok(());
    }
    if dependence.is_optional() {
        return Ok(());
    }
    Err(Error::Permits {
        candidate: existing_id.clone(),
        requestor: requestor.cloned(),
    })
}

#[allow(clippy::too_many_arguments)]
fn try_candidate(
    state: &mut State,
    requestor: Option<&Name>,
    dependence: &Dependence,
    candidate: &ModuleId,
    catalog: &dyn Catalog,
    remote: Option<&dyn RemoteCatalog>,
    platform_module: &Name,
    suppress_platform_default: bool,
) -> Result<(), Error> {
    let info = read_info(state, candidate, catalog, remote)?;
    let view = info.view(candidate).unwrap_or_else(|| info.declared_view());
    if !view.permits_requestor(requestor, dependence) {
        return Err(Error::Permits {
            candidate: candidate.clone(),
            requestor: requestor.cloned(),
        });
    }

    state.modules.insert(info.id().clone());
    state
        .module_for_name
        .insert(candidate.name().clone(), info.id().clone());

    let info = info.with_synthetic_platform_dependence(platform_module, suppress_platform_default);
    state.info_for_name.insert(candidate.name().clone(), info.clone());

    let child_requestor = info.id().name().clone();
    for child_dependence in info.requires() {
        satisfy(
            state,
            Some(&child_requestor),
            child_dependence,
            catalog,
            remote,
            platform_module,
            suppress_platform_default,
        )?;
    }
    Ok(())
}

fn read_info(
    state: &mut State,
    id: &ModuleId,
    catalog: &dyn Catalog,
    remote: Option<&dyn RemoteCatalog>,
) -> Result<ModuleInfo, Error> {
    if let Some(info) = catalog.read_module_info(id)? {
        state
            .location_for_name
            .insert(id.name().clone(), Location::Installed);
        log::debug!("resolved {id} from installed catalog");
        return Ok(info);
    }
    if let Some(remote) = remote {
        if let Some(info) = remote.read_module_info(id)? {
            if let Some((compressed, uncompressed)) = remote.metadata_sizes(id)? {
                state.download_required += compressed;
                state.space_required += uncompressed;
            }
            state
                .location_for_name
                .insert(id.name().clone(), Location::Remote);
            log::debug!("resolved {id} from remote repository");
            return Ok(info);
        }
    }
    Err(Error::ModuleNotFound {
        query: ModuleIdQuery::any(id.name().clone()),
    })
}
