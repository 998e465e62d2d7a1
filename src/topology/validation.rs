//! Construction-time validation of topology descriptions.
//!
//! Structural checks (ids, adjacency, arity, labels, lookup ranges,
//! periodicity) always run. The exhaustive checks enumerate entities and are
//! bounded by [`ValidationOptions::exhaustive_limit`]; the `strict-invariants`
//! feature lifts the bound.

use crate::mesh_error::MeshStructureError;
use crate::topology::FastSet;
use crate::topology::entity_set::{EntitySet, EntitySetId};
use crate::topology::reference_map::{Component, MapEntry, ReferenceElementMap};
use crate::topology::structure::Topology;
use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Optional validation toggles for topology assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Check that every cone pair is found again by `support`, and back.
    pub check_inverse_consistency: bool,
    /// Check that the cone images of each map cover its target class.
    pub check_cardinality: bool,
    /// Classes larger than this are skipped by the exhaustive checks.
    pub exhaustive_limit: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_inverse_consistency: true,
            check_cardinality: false,
            exhaustive_limit: 4096,
        }
    }
}

impl ValidationOptions {
    /// Enable all checks without a size limit.
    pub fn all() -> Self {
        Self {
            check_inverse_consistency: true,
            check_cardinality: true,
            exhaustive_limit: usize::MAX,
        }
    }

    /// Structural checks only.
    pub fn none() -> Self {
        Self {
            check_inverse_consistency: false,
            check_cardinality: false,
            exhaustive_limit: 0,
        }
    }

    fn admits(&self, set: &EntitySet) -> bool {
        cfg!(feature = "strict-invariants") || set.size() <= self.exhaustive_limit
    }
}

/// No two classes share `(dimension, tag)`.
pub(crate) fn check_entity_sets(sets: &[EntitySet]) -> Result<(), MeshStructureError> {
    let mut seen = FastSet::default();
    for set in sets {
        if !seen.insert((set.dimension(), set.tag().clone())) {
            return Err(MeshStructureError::MalformedMap(format!(
                "duplicate entity set `{}` of dimension {}",
                set.tag(),
                set.dimension()
            )));
        }
    }
    Ok(())
}

/// Structural checks of one map description.
pub(crate) fn check_map(
    sets: &[EntitySet],
    source: EntitySetId,
    target: EntitySetId,
    entries: &[MapEntry],
) -> Result<(), MeshStructureError> {
    let src = sets
        .get(source.index())
        .ok_or(MeshStructureError::UnknownEntitySet(source))?;
    let tgt = sets
        .get(target.index())
        .ok_or(MeshStructureError::UnknownEntitySet(target))?;
    if src.dimension() != tgt.dimension() + 1 {
        return Err(MeshStructureError::MalformedMap(format!(
            "`{}` (dim {}) and `{}` (dim {}) are not adjacent",
            src.tag(),
            src.dimension(),
            tgt.tag(),
            tgt.dimension()
        )));
    }
    let src_bounds = src.polyhedral_set().axis_bounds();
    let tgt_bounds = tgt.polyhedral_set().axis_bounds();
    let mut distinct = FastSet::default();
    for entry in entries {
        if entry.components.len() != tgt.axes() {
            return Err(MeshStructureError::MalformedMap(format!(
                "entry {} of `{}` -> `{}` has {} components, target has {} axes",
                entry.label,
                src.tag(),
                tgt.tag(),
                entry.components.len(),
                tgt.axes()
            )));
        }
        if !distinct.insert(&entry.components) {
            return Err(MeshStructureError::MalformedMap(format!(
                "duplicate entry {:?} in `{}` -> `{}`",
                entry.components,
                src.tag(),
                tgt.tag()
            )));
        }
        for (k, c) in entry.components.iter().enumerate() {
            if let Some(axis) = c.source_axis() {
                if axis >= src.axes() {
                    return Err(MeshStructureError::MalformedMap(format!(
                        "component {k} of entry {} reads axis {axis} of `{}` ({} axes)",
                        entry.label,
                        src.tag(),
                        src.axes()
                    )));
                }
            }
            check_component(c, k, src, tgt, &src_bounds, &tgt_bounds)?;
        }
    }
    Ok(())
}

fn check_component(
    c: &Component,
    k: usize,
    src: &EntitySet,
    tgt: &EntitySet,
    src_bounds: &[(i64, i64)],
    tgt_bounds: &[(i64, i64)],
) -> Result<(), MeshStructureError> {
    let in_target = |v: i64| tgt.size() == 0 || (tgt_bounds[k].0..=tgt_bounds[k].1).contains(&v);
    match c {
        Component::Shift { axis, .. } => {
            let from = src.polyhedral_set().periodic_extent(*axis);
            let to = tgt.polyhedral_set().periodic_extent(k);
            if from != to {
                return Err(MeshStructureError::MalformedMap(format!(
                    "shift from axis {axis} of `{}` to axis {k} of `{}` mixes periodicity",
                    src.tag(),
                    tgt.tag()
                )));
            }
        }
        Component::Fixed(v) => {
            if !in_target(*v) {
                return Err(MeshStructureError::MalformedMap(format!(
                    "fixed component {v} outside axis {k} of `{}`",
                    tgt.tag()
                )));
            }
        }
        Component::Lookup {
            table,
            axis,
            pre,
            post,
        } => {
            if src.polyhedral_set().periodic_extent(*axis).is_some() {
                return Err(MeshStructureError::MalformedMap(format!(
                    "lookup reads periodic axis {axis} of `{}`",
                    src.tag()
                )));
            }
            let (lo, hi) = src_bounds[*axis];
            if src.size() > 0 && (lo + pre < 0 || hi + pre >= table.len() as i64) {
                return Err(MeshStructureError::MalformedMap(format!(
                    "lookup table of length {} cannot be indexed by axis {axis} of `{}`",
                    table.len(),
                    src.tag()
                )));
            }
            if let Some(v) = table.iter().map(|v| v + post).find(|&v| !in_target(v)) {
                return Err(MeshStructureError::MalformedMap(format!(
                    "lookup value {v} outside axis {k} of `{}`",
                    tgt.tag()
                )));
            }
        }
    }
    Ok(())
}

/// Cone labels of every source class form a permutation of `0..k`.
pub(crate) fn check_labels(
    sets: &[EntitySet],
    maps: &[ReferenceElementMap],
) -> Result<(), MeshStructureError> {
    let mut labels: Vec<Vec<usize>> = vec![Vec::new(); sets.len()];
    let mut pairs = FastSet::default();
    for map in maps {
        if !pairs.insert((map.source(), map.target())) {
            return Err(MeshStructureError::MalformedMap(format!(
                "duplicate map {} -> {}",
                map.source(),
                map.target()
            )));
        }
        labels[map.source().index()].extend(map.labels());
    }
    for (s, mut l) in labels.into_iter().enumerate() {
        l.sort_unstable();
        if l.iter().enumerate().any(|(k, &label)| k != label) {
            return Err(MeshStructureError::MalformedMap(format!(
                "cone labels of `{}` are {l:?}, not a permutation",
                sets[s].tag()
            )));
        }
    }
    Ok(())
}

/// Exhaustive checks on an assembled topology.
pub fn validate_topology(
    topology: &Topology,
    options: &ValidationOptions,
) -> Result<(), MeshStructureError> {
    if options.check_inverse_consistency {
        for map in topology.maps() {
            check_inverse_consistency(topology, map, options)?;
        }
    }
    if options.check_cardinality {
        for id in topology.ids() {
            check_cardinality(topology, id, options)?;
        }
    }
    Ok(())
}

fn check_inverse_consistency(
    topology: &Topology,
    map: &ReferenceElementMap,
    options: &ValidationOptions,
) -> Result<(), MeshStructureError> {
    let src = topology.entity_set(map.source())?;
    let tgt = topology.entity_set(map.target())?;
    if !options.admits(src) || !options.admits(tgt) {
        log::warn!(
            "skipping inverse-consistency check of `{}` -> `{}` ({} x {} entities exceed limit {})",
            src.tag(),
            tgt.tag(),
            src.size(),
            tgt.size(),
            options.exhaustive_limit
        );
        return Ok(());
    }
    let sources: Vec<Vec<i64>> = src.polyhedral_set().points().collect();
    let targets: Vec<Vec<i64>> = tgt.polyhedral_set().points().collect();

    let down = |a: &Vec<i64>| -> Result<(), MeshStructureError> {
        for (b, label, _) in map.forward(a, tgt) {
            let up = map.backward(&b, src, tgt)?;
            if !up.iter().any(|(s, l, _)| s == a && *l == label) {
                return Err(MeshStructureError::MalformedMap(format!(
                    "`{}`{a:?} has `{}`{b:?} at label {label} but not vice versa",
                    src.tag(),
                    tgt.tag()
                )));
            }
        }
        Ok(())
    };
    let up = |b: &Vec<i64>| -> Result<(), MeshStructureError> {
        for (a, label, _) in map.backward(b, src, tgt)? {
            let cone = map.forward(&a, tgt);
            if !cone.iter().any(|(t, l, _)| t == b && *l == label) {
                return Err(MeshStructureError::MalformedMap(format!(
                    "support of `{}`{b:?} lists `{}`{a:?} whose cone misses it",
                    tgt.tag(),
                    src.tag()
                )));
            }
        }
        Ok(())
    };

    #[cfg(feature = "rayon")]
    {
        sources.par_iter().try_for_each(down)?;
        targets.par_iter().try_for_each(up)?;
    }
    #[cfg(not(feature = "rayon"))]
    {
        sources.iter().try_for_each(down)?;
        targets.iter().try_for_each(up)?;
    }
    log::debug!(
        "inverse consistency of `{}` -> `{}` checked on {} + {} entities",
        src.tag(),
        tgt.tag(),
        sources.len(),
        targets.len()
    );
    Ok(())
}

fn check_cardinality(
    topology: &Topology,
    id: EntitySetId,
    options: &ValidationOptions,
) -> Result<(), MeshStructureError> {
    let tgt = topology.entity_set(id)?;
    let incoming: Vec<&ReferenceElementMap> = topology.support_maps(id).collect();
    if incoming.is_empty() {
        return Ok(());
    }
    let too_big = !options.admits(tgt)
        || incoming
            .iter()
            .any(|m| topology.entity_set(m.source()).map_or(true, |s| !options.admits(s)));
    if too_big {
        log::warn!(
            "skipping cardinality check of `{}` ({} entities exceed limit {})",
            tgt.tag(),
            tgt.size(),
            options.exhaustive_limit
        );
        return Ok(());
    }
    let mut hit = FastSet::default();
    for map in &incoming {
        let src = topology.entity_set(map.source())?;
        for a in src.polyhedral_set().points() {
            hit.extend(map.forward(&a, tgt).into_iter().map(|(b, _, _)| b));
        }
    }
    if hit.len() != tgt.size() {
        return Err(MeshStructureError::MalformedMap(format!(
            "cone images cover {} of {} entities of `{}`",
            hit.len(),
            tgt.size(),
            tgt.tag()
        )));
    }
    Ok(())
}
