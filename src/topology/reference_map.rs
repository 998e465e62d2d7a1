//! Incidence maps between entity classes of adjacent dimension.
//!
//! A [`ReferenceElementMap`] stores, for a pair `source -> target`, one
//! [`MapEntry`] per local boundary entity: how each target index component
//! is computed from the source index, plus the reference-element label of
//! that boundary entity. Components are
//!
//! * `Shift { axis, by }`: `source[axis] + by`, a structured offset;
//! * `Fixed(c)`: a constant, used by unstructured reference cells whose
//!   source has no axis to offset from;
//! * `Lookup { table, axis, pre, post }`: `table[source[axis] + pre] + post`,
//!   reference-cell connectivity tables.
//!
//! Offsets are relative to the zero multiindex and added to, not substituted
//! into, a concrete multiindex, so applying an entry is O(axes) and yields
//! either numbers or symbolic expressions depending on [`IndexValue`].
//!
//! The support rule is not stored separately: each entry is inverted once at
//! construction into an [`InversePlan`] recovering every source axis from a
//! `Shift` component (preferred) or by inverting a `Lookup` table. Remaining
//! components become equality guards. Entries whose source cannot be
//! recovered are rejected as `MalformedMap`.
//!
//! Components are closed under composition (`Shift ∘ Shift` adds offsets,
//! `Lookup ∘ Fixed` folds to `Fixed`, `Lookup ∘ Lookup` composes tables), so
//! relations of any codimension are again lists of components.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshStructureError;
use crate::topology::entity_set::{EntitySet, EntitySetId};
use crate::topology::index_expr::{Guard, IndexValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How one target index component is obtained from a source index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Shift { axis: usize, by: i64 },
    Fixed(i64),
    Lookup {
        table: Arc<[i64]>,
        axis: usize,
        pre: i64,
        post: i64,
    },
}

impl Component {
    /// `source[axis]` unchanged.
    pub fn identity(axis: usize) -> Self {
        Component::Shift { axis, by: 0 }
    }

    pub fn lookup(table: impl Into<Arc<[i64]>>, axis: usize) -> Self {
        Component::Lookup {
            table: table.into(),
            axis,
            pre: 0,
            post: 0,
        }
    }

    /// Source axis read by this component.
    pub fn source_axis(&self) -> Option<usize> {
        match self {
            Component::Shift { axis, .. } | Component::Lookup { axis, .. } => Some(*axis),
            Component::Fixed(_) => None,
        }
    }

    /// The same rule reading source axis `axis + by`; places a factor's
    /// component inside a product index.
    pub fn offset_axes(&self, by: usize) -> Component {
        match self {
            Component::Shift { axis, by: b } => Component::Shift {
                axis: axis + by,
                by: *b,
            },
            Component::Fixed(c) => Component::Fixed(*c),
            Component::Lookup {
                table,
                axis,
                pre,
                post,
            } => Component::Lookup {
                table: table.clone(),
                axis: axis + by,
                pre: *pre,
                post: *post,
            },
        }
    }

    /// Value at `source`; `None` when a lookup argument leaves its table.
    pub fn evaluate<I: IndexValue>(&self, source: &[I]) -> Option<I> {
        match self {
            Component::Shift { axis, by } => Some(source[*axis].shifted(*by)),
            Component::Fixed(c) => Some(I::constant(*c)),
            Component::Lookup {
                table,
                axis,
                pre,
                post,
            } => I::lookup(table, &source[*axis].shifted(*pre)).map(|v| v.shifted(*post)),
        }
    }

    /// Key of this component relative to the zero source: the offset of a
    /// shift, the constant, or the looked-up value when the argument is
    /// concrete.
    pub(crate) fn local_key<I: IndexValue>(&self, source: &[I]) -> Option<i64> {
        match self {
            Component::Shift { by, .. } => Some(*by),
            Component::Fixed(c) => Some(*c),
            Component::Lookup { .. } => self.evaluate(source)?.as_constant(),
        }
    }

    /// Substitute `inner` (source -> mid) into `self` (mid -> target).
    /// `None` when a lookup is evaluated outside its table.
    pub fn compose(&self, inner: &[Component]) -> Option<Component> {
        Some(match self {
            Component::Fixed(c) => Component::Fixed(*c),
            Component::Shift { axis, by } => match &inner[*axis] {
                Component::Shift { axis, by: b } => Component::Shift {
                    axis: *axis,
                    by: b + by,
                },
                Component::Fixed(c) => Component::Fixed(c + by),
                Component::Lookup {
                    table,
                    axis,
                    pre,
                    post,
                } => Component::Lookup {
                    table: table.clone(),
                    axis: *axis,
                    pre: *pre,
                    post: post + by,
                },
            },
            Component::Lookup {
                table,
                axis,
                pre,
                post,
            } => match &inner[*axis] {
                Component::Fixed(c) => Component::Fixed(i64::lookup(table, &(c + pre))? + post),
                Component::Shift { axis, by } => Component::Lookup {
                    table: table.clone(),
                    axis: *axis,
                    pre: by + pre,
                    post: *post,
                },
                Component::Lookup {
                    table: inner_table,
                    axis,
                    pre: inner_pre,
                    post: inner_post,
                } => {
                    let composed = inner_table
                        .iter()
                        .map(|v| i64::lookup(table, &(v + inner_post + pre)).map(|t| t + post))
                        .collect::<Option<Vec<i64>>>()?;
                    Component::Lookup {
                        table: composed.into(),
                        axis: *axis,
                        pre: *inner_pre,
                        post: 0,
                    }
                }
            },
        })
    }
}

/// Apply `components` to `source` and reduce periodic axes of `target`.
pub fn apply_components<I: IndexValue>(
    components: &[Component],
    source: &[I],
    target: &EntitySet,
) -> Option<Vec<I>> {
    let raw = components
        .iter()
        .map(|c| c.evaluate(source))
        .collect::<Option<Vec<I>>>()?;
    Some(target.polyhedral_set().wrap(&raw))
}

/// Compose a chain given innermost-last: `outer ∘ inner`.
pub fn compose_components(outer: &[Component], inner: &[Component]) -> Option<Vec<Component>> {
    outer.iter().map(|c| c.compose(inner)).collect()
}

/// One local boundary entity: target components and reference label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapEntry {
    pub components: Vec<Component>,
    pub label: usize,
}

impl MapEntry {
    pub fn new(components: Vec<Component>, label: usize) -> Self {
        Self { components, label }
    }

    /// Pure structured offset: target axis `k` is `source[k] + offset[k]`.
    pub fn offset(offset: &[i64], label: usize) -> Self {
        Self::new(
            offset
                .iter()
                .enumerate()
                .map(|(axis, &by)| Component::Shift { axis, by })
                .collect(),
            label,
        )
    }
}

/// How one source axis is recovered from a target index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum Recovery {
    /// `source[axis] = target[component] - by`.
    Shift { component: usize, by: i64 },
    /// `source[axis] = p - pre` for every `p` with `table[p] + post == target[component]`.
    Lookup {
        component: usize,
        table: Arc<[i64]>,
        pre: i64,
        post: i64,
    },
}

/// Inverse of one map entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InversePlan {
    recover: Vec<Recovery>,
    /// Components not used for recovery; they must reproduce the target.
    checks: Vec<usize>,
}

impl InversePlan {
    fn new(entry: &MapEntry, source_axes: usize) -> Result<Self, MeshStructureError> {
        let mut recover = Vec::with_capacity(source_axes);
        let mut used = vec![false; entry.components.len()];
        for axis in 0..source_axes {
            let shift = entry.components.iter().position(|c| {
                matches!(c, Component::Shift { axis: a, .. } if *a == axis)
            });
            let lookup = entry.components.iter().position(|c| {
                matches!(c, Component::Lookup { axis: a, .. } if *a == axis)
            });
            match (shift, lookup) {
                (Some(k), _) => {
                    if let Component::Shift { by, .. } = entry.components[k] {
                        recover.push(Recovery::Shift { component: k, by });
                    }
                    used[k] = true;
                }
                (None, Some(k)) => {
                    if let Component::Lookup {
                        table, pre, post, ..
                    } = &entry.components[k]
                    {
                        recover.push(Recovery::Lookup {
                            component: k,
                            table: table.clone(),
                            pre: *pre,
                            post: *post,
                        });
                    }
                    used[k] = true;
                }
                (None, None) => {
                    return Err(MeshStructureError::MalformedMap(format!(
                        "entry with label {} does not determine source axis {axis}",
                        entry.label
                    )));
                }
            }
        }
        let checks = (0..entry.components.len()).filter(|&k| !used[k]).collect();
        Ok(Self { recover, checks })
    }

    /// Candidate sources for `target` before guards are applied.
    fn candidates<I: IndexValue>(&self, target: &[I]) -> Result<Vec<Vec<I>>, MeshStructureError> {
        let mut out: Vec<Vec<I>> = vec![Vec::with_capacity(self.recover.len())];
        for r in &self.recover {
            let options: Vec<I> = match r {
                Recovery::Shift { component, by } => vec![target[*component].shifted(-by)],
                Recovery::Lookup {
                    component,
                    table,
                    pre,
                    post,
                } => {
                    let t = target[*component]
                        .as_constant()
                        .ok_or(MeshStructureError::SymbolicUnsupported(
                            "inverting reference-cell lookup tables",
                        ))?;
                    table
                        .iter()
                        .enumerate()
                        .filter(|&(_, &v)| v + post == t)
                        .map(|(p, _)| I::constant(p as i64 - pre))
                        .collect()
                }
            };
            out = out
                .into_iter()
                .flat_map(|prefix| {
                    options.iter().map(move |o| {
                        let mut p = prefix.clone();
                        p.push(o.clone());
                        p
                    })
                })
                .collect();
        }
        Ok(out)
    }
}

/// Incidence rule `source -> target` between classes of adjacent dimension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceElementMap {
    source: EntitySetId,
    target: EntitySetId,
    entries: Vec<MapEntry>,
    inverse: Vec<InversePlan>,
}

impl ReferenceElementMap {
    /// Build the map and derive its inverse plan. `source_axes` is the
    /// arity of the source class.
    pub fn new(
        source: EntitySetId,
        target: EntitySetId,
        mut entries: Vec<MapEntry>,
        source_axes: usize,
    ) -> Result<Self, MeshStructureError> {
        entries.sort_by_key(|e| e.label);
        let inverse = entries
            .iter()
            .map(|e| InversePlan::new(e, source_axes))
            .collect::<Result<Vec<_>, _>>()?;
        let map = Self {
            source,
            target,
            entries,
            inverse,
        };
        crate::debug_invariants!(map.validate_invariants(), "ReferenceElementMap::new");
        Ok(map)
    }

    #[inline]
    pub fn source(&self) -> EntitySetId {
        self.source
    }

    #[inline]
    pub fn target(&self) -> EntitySetId {
        self.target
    }

    /// Entries ordered by label.
    #[inline]
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    /// Labels in entry order.
    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|e| e.label)
    }

    /// Cone candidates of `source` with their labels and membership guards.
    /// Concrete candidates outside `target_set` are dropped.
    pub(crate) fn forward<I: IndexValue>(
        &self,
        source: &[I],
        target_set: &EntitySet,
    ) -> Vec<(Vec<I>, usize, Vec<Guard<I>>)> {
        self.entries
            .iter()
            .filter_map(|e| {
                let candidate = apply_components(&e.components, source, target_set)?;
                let guards = membership_guards(target_set, &candidate)?;
                Some((candidate, e.label, guards))
            })
            .collect()
    }

    /// Sources whose cone contains `target`, each with the label `target`
    /// carries in that cone, plus the guards that could not be decided.
    pub(crate) fn backward<I: IndexValue>(
        &self,
        target: &[I],
        source_set: &EntitySet,
        target_set: &EntitySet,
    ) -> Result<Vec<(Vec<I>, usize, Vec<Guard<I>>)>, MeshStructureError> {
        let mut out = Vec::new();
        for (entry, plan) in self.entries.iter().zip(&self.inverse) {
            for candidate in plan.candidates(target)? {
                let candidate = source_set.polyhedral_set().wrap(&candidate);
                let Some(mut guards) = membership_guards(source_set, &candidate) else {
                    continue;
                };
                let Some(image) = apply_components(&entry.components, &candidate, target_set)
                else {
                    continue;
                };
                let mut consistent = true;
                for &k in &plan.checks {
                    let g = Guard::Zero(image[k].minus(&target[k]));
                    match g.decide() {
                        Some(true) => {}
                        Some(false) => {
                            consistent = false;
                            break;
                        }
                        None => guards.push(g),
                    }
                }
                if consistent {
                    out.push((candidate, entry.label, guards));
                }
            }
        }
        Ok(out)
    }
}

/// Undecided membership guards of `point`, or `None` if one is violated.
pub(crate) fn membership_guards<I: IndexValue>(
    set: &EntitySet,
    point: &[I],
) -> Option<Vec<Guard<I>>> {
    let mut open = Vec::new();
    for g in set.polyhedral_set().guards(point) {
        let g = Guard::NonNegative(g);
        match g.decide() {
            Some(false) => return None,
            Some(true) => {}
            None => open.push(g),
        }
    }
    Some(open)
}

impl DebugInvariants for ReferenceElementMap {
    const DESCRIPTOR: &'static str = "ReferenceElementMap";

    fn validate_invariants(&self) -> Result<(), MeshStructureError> {
        if self.entries.len() != self.inverse.len() {
            return Err(MeshStructureError::MalformedMap(format!(
                "{} entries but {} inverse plans",
                self.entries.len(),
                self.inverse.len()
            )));
        }
        if self.entries.windows(2).any(|w| w[0].label == w[1].label) {
            return Err(MeshStructureError::MalformedMap(format!(
                "duplicate label in map {} -> {}",
                self.source, self.target
            )));
        }
        Ok(())
    }
}
