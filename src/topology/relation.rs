//! Incidence queries on a [`Topology`].
//!
//! All queries are generic over [`IndexValue`]: with `i64` multiindices every
//! membership and equality guard is decided and failing candidates are
//! dropped; with [`IndexExpr`](crate::topology::index_expr::IndexExpr)
//! multiindices the same code returns expressions, and the `*_guarded`
//! variants report the conditions a code generator must still emit.
//!
//! Downward relations of any codimension are read off the cached composite
//! relation of the source class (offset accumulation, no per-query
//! recursion). Upward relations step through `support` one codimension at a
//! time, following only classes from which the target is reachable.

use crate::mesh_error::MeshStructureError;
use crate::topology::FastSet;
use crate::topology::entity_set::{EntitySet, EntitySetId};
use crate::topology::index_expr::{Guard, Guarded, IndexValue};
use crate::topology::multiindex::Multiindex;
use crate::topology::reference_map::{apply_components, membership_guards};
use crate::topology::structure::{CompositeRelation, Topology};

/// A cone or support entry: the related entity and the local label of the
/// boundary entity within the higher-dimensional one.
pub type Labelled<I> = (Multiindex<I>, usize);

impl Topology {
    fn no_relation(&self, from: EntitySetId, to: EntitySetId) -> MeshStructureError {
        let tag = |id: EntitySetId| {
            self.entity_sets
                .get(id.index())
                .map(|s| s.tag().clone())
                .unwrap_or_else(|| id.to_string().as_str().into())
        };
        MeshStructureError::NoRelation {
            from: tag(from),
            to: tag(to),
        }
    }

    /// Cone of `mi` ordered by local label, with undecided guards.
    pub fn cone_guarded<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Guarded<Labelled<I>, I>>, MeshStructureError> {
        self.check(mi)?;
        let mut out = Vec::with_capacity(self.cone_size(mi.entity_set()));
        for &(m, e) in &self.cone_entries[mi.entity_set().index()] {
            let map = &self.maps[m];
            let entry = &map.entries()[e];
            let target = &self.entity_sets[map.target().index()];
            let Some(index) = apply_components(&entry.components, mi.index(), target) else {
                continue;
            };
            let Some(guards) = membership_guards(target, &index) else {
                continue;
            };
            out.push(Guarded {
                value: (Multiindex::new(map.target(), index), entry.label),
                guards,
            });
        }
        log::trace!("cone of {mi:?}: {} entries", out.len());
        Ok(out)
    }

    /// Cone of `mi` with local labels. Undecided symbolic guards are dropped.
    pub fn labelled_cone<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Labelled<I>>, MeshStructureError> {
        Ok(self
            .cone_guarded(mi)?
            .into_iter()
            .map(|g| g.value)
            .collect())
    }

    /// Boundary entities of codimension one more than `mi`, by local label.
    pub fn cone<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        Ok(self
            .cone_guarded(mi)?
            .into_iter()
            .map(|g| g.value.0)
            .collect())
    }

    /// The part of the cone of `mi` lying in `target`.
    pub fn incidence<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        target: EntitySetId,
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        if self.map(mi.entity_set(), target).is_none() {
            self.check(mi)?;
            return Err(self.no_relation(mi.entity_set(), target));
        }
        Ok(self
            .cone(mi)?
            .into_iter()
            .filter(|b| b.entity_set() == target)
            .collect())
    }

    /// Entities having `mi` in their cone, each with the label `mi` carries
    /// there, with undecided guards.
    pub fn support_guarded<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Guarded<Labelled<I>, I>>, MeshStructureError> {
        let target = self.check(mi)?;
        let mut out = Vec::new();
        for map in self.support_maps(mi.entity_set()) {
            let source = &self.entity_sets[map.source().index()];
            for (index, label, guards) in map.backward(mi.index(), source, target)? {
                out.push(Guarded {
                    value: (Multiindex::new(map.source(), index), label),
                    guards,
                });
            }
        }
        log::trace!("support of {mi:?}: {} entries", out.len());
        Ok(out)
    }

    /// `(neighbour, local index of mi in the neighbour's cone)` pairs.
    pub fn support<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Labelled<I>>, MeshStructureError> {
        Ok(self
            .support_guarded(mi)?
            .into_iter()
            .map(|g| g.value)
            .collect())
    }

    /// Entities of `target` related to `mi`, deduplicated in
    /// first-discovery order, with undecided guards.
    ///
    /// * `target` below `mi`'s class: composite cone relation.
    /// * `target` above: support stepping.
    /// * same class: `mi` itself.
    /// * otherwise `NoRelation`.
    pub fn index_relation_guarded<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        target: EntitySetId,
    ) -> Result<Vec<Guarded<Multiindex<I>, I>>, MeshStructureError> {
        self.check(mi)?;
        self.entity_set(target)?;
        let source = mi.entity_set();
        let out = if source == target {
            vec![Guarded {
                value: mi.clone(),
                guards: Vec::new(),
            }]
        } else if self.reaches(source, target) {
            self.relation_down(mi, Some(target))?
        } else if self.reaches(target, source) {
            self.relation_up(mi, Some(target))?
        } else {
            return Err(self.no_relation(source, target));
        };
        log::trace!(
            "index relation {mi:?} -> {}: {} entities",
            self.entity_sets[target.index()].tag(),
            out.len()
        );
        Ok(out)
    }

    /// [`index_relation_guarded`](Self::index_relation_guarded) without the
    /// guards.
    pub fn index_relation<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        target: EntitySetId,
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        Ok(self
            .index_relation_guarded(mi, target)?
            .into_iter()
            .map(|g| g.value)
            .collect())
    }

    /// Relation along an explicit chain of classes, each adjacent to the
    /// previous one (in either direction). `path` excludes `mi`'s class.
    pub fn compose_path<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        path: &[EntitySetId],
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        self.check(mi)?;
        let mut frontier = vec![mi.clone()];
        let mut current = mi.entity_set();
        for &next in path {
            let step_down = self.map(current, next).is_some();
            if !step_down && self.map(next, current).is_none() {
                return Err(self.no_relation(current, next));
            }
            let mut seen = FastSet::default();
            let mut reached = Vec::new();
            for entity in &frontier {
                let related: Vec<Multiindex<I>> = if step_down {
                    self.incidence(entity, next)?
                } else {
                    self.support(entity)?
                        .into_iter()
                        .map(|(a, _)| a)
                        .filter(|a| a.entity_set() == next)
                        .collect()
                };
                for r in related {
                    if seen.insert(r.clone()) {
                        reached.push(r);
                    }
                }
            }
            frontier = reached;
            current = next;
        }
        Ok(frontier)
    }

    /// `mi` and every entity on its boundary, by increasing codimension.
    pub fn closure<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        self.check(mi)?;
        let mut out = vec![mi.clone()];
        out.extend(self.relation_down(mi, None)?.into_iter().map(|g| g.value));
        Ok(out)
    }

    /// Vertices of `mi` in the local numbering of its class.
    pub fn closure_vertices<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        let set = self.check(mi)?;
        let vertices = self.vertex_set()?;
        if mi.entity_set() == vertices {
            return Ok(vec![mi.clone()]);
        }
        if !self.reaches(mi.entity_set(), vertices) {
            return Err(self.no_relation(mi.entity_set(), vertices));
        }
        let composite = self.composite(mi.entity_set());
        let mut keyed = Vec::new();
        for (node, value) in alive_nodes(composite, mi, &self.entity_sets) {
            let node = &composite.levels[node.0][node.1];
            if node.set != vertices {
                continue;
            }
            let key = node
                .components
                .iter()
                .map(|c| c.local_key(mi.index()))
                .collect::<Option<Vec<i64>>>()
                .ok_or(MeshStructureError::SymbolicUnsupported(
                    "local numbering of lookup-indexed vertices",
                ))?;
            keyed.push((key, Multiindex::new(vertices, value.value)));
        }
        let keys: Vec<Vec<i64>> = keyed.iter().map(|(k, _)| k.clone()).collect();
        let order = set.numbering().order(&keys);
        Ok(order
            .as_slice()
            .iter()
            .map(|&k| keyed[k].1.clone())
            .collect())
    }

    /// `mi` and every entity having it on its boundary, by decreasing
    /// codimension.
    pub fn star<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        self.check(mi)?;
        let mut out = vec![mi.clone()];
        out.extend(self.relation_up(mi, None)?.into_iter().map(|g| g.value));
        Ok(out)
    }

    /// Entities sharing a facet with `mi`, in first-discovery order. They
    /// have `mi`'s dimension but may belong to another class (Kuhn cells
    /// only border cells of the opposite orientation).
    pub fn face_neighbours<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Multiindex<I>>, MeshStructureError> {
        let mut seen = FastSet::default();
        let mut out = Vec::new();
        for face in self.cone(mi)? {
            for (neighbour, _) in self.support(&face)? {
                if neighbour != *mi && seen.insert(neighbour.clone()) {
                    out.push(neighbour);
                }
            }
        }
        Ok(out)
    }

    /// Evaluate the composite relation of `mi`'s class. `None` collects every
    /// class below `mi`.
    fn relation_down<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        target: Option<EntitySetId>,
    ) -> Result<Vec<Guarded<Multiindex<I>, I>>, MeshStructureError> {
        let composite = self.composite(mi.entity_set());
        let mut seen = FastSet::default();
        let mut out = Vec::new();
        for ((level, k), value) in alive_nodes(composite, mi, &self.entity_sets) {
            if level == 0 {
                continue;
            }
            let set = composite.levels[level][k].set;
            if target.is_some_and(|t| t != set) {
                continue;
            }
            let entity = Multiindex::new(set, value.value);
            if seen.insert(entity.clone()) {
                out.push(Guarded {
                    value: entity,
                    guards: value.guards,
                });
            }
        }
        Ok(out)
    }

    /// Iterated support of `mi`, restricted to classes from which `target`
    /// is reachable. `None` collects every class above `mi`.
    fn relation_up<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        target: Option<EntitySetId>,
    ) -> Result<Vec<Guarded<Multiindex<I>, I>>, MeshStructureError> {
        let wanted = |set: EntitySetId| target.is_none_or(|t| self.reaches(t, set));
        let mut seen = FastSet::default();
        let mut frontier: Vec<Guarded<Multiindex<I>, I>> = vec![Guarded {
            value: mi.clone(),
            guards: Vec::new(),
        }];
        let mut out = Vec::new();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for entity in &frontier {
                for up in self.support_guarded(&entity.value)? {
                    let (neighbour, _) = up.value;
                    if !wanted(neighbour.entity_set()) || !seen.insert(neighbour.clone()) {
                        continue;
                    }
                    let mut guards = entity.guards.clone();
                    guards.extend(up.guards);
                    next.push(Guarded {
                        value: neighbour,
                        guards,
                    });
                }
            }
            out.extend(
                next.iter()
                    .filter(|g| target.is_none_or(|t| g.value.entity_set() == t))
                    .cloned(),
            );
            frontier = next;
        }
        Ok(out)
    }
}

/// Nodes of `composite` evaluated at `mi` whose entity exists and is reached
/// through existing entities, as `((level, position), value)` in level order.
///
/// Only a node's own undecided guards are attached; intermediate entities
/// prune but do not contribute guards.
fn alive_nodes<I: IndexValue>(
    composite: &CompositeRelation,
    mi: &Multiindex<I>,
    sets: &[EntitySet],
) -> Vec<((usize, usize), Guarded<Vec<I>, I>)> {
    let mut out = Vec::new();
    let mut alive_prev: Vec<bool> = Vec::new();
    for (level, nodes) in composite.levels.iter().enumerate() {
        let mut alive = vec![false; nodes.len()];
        for (k, node) in nodes.iter().enumerate() {
            if level == 0 {
                alive[k] = true;
                out.push((
                    (0, k),
                    Guarded {
                        value: mi.index().to_vec(),
                        guards: Vec::new(),
                    },
                ));
                continue;
            }
            if !node.parents.iter().any(|&p| alive_prev[p]) {
                continue;
            }
            let set = &sets[node.set.index()];
            let Some(value) = apply_components(&node.components, mi.index(), set) else {
                continue;
            };
            let Some(guards) = membership_guards(set, &value) else {
                continue;
            };
            alive[k] = true;
            out.push(((level, k), Guarded { value, guards }));
        }
        alive_prev = alive;
    }
    out
}

impl<T, I: IndexValue> Guarded<T, I> {
    /// Whether every remaining guard is decided (always true for concrete
    /// queries).
    pub fn is_unconditional(&self) -> bool {
        self.guards.is_empty()
    }

    /// The guards as displayable conditions, `expr >= 0` or `expr == 0`.
    pub fn conditions(&self) -> Vec<String>
    where
        I: std::fmt::Display,
    {
        self.guards
            .iter()
            .map(|g| match g {
                Guard::NonNegative(e) => format!("{e} >= 0"),
                Guard::Zero(e) => format!("{e} == 0"),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::builder::TopologyBuilder;
    use crate::topology::cell_type::CellType;
    use crate::topology::index_expr::{Bindings, IndexExpr};
    use crate::topology::polyhedral::PolyhedralSet;
    use crate::topology::structure::Base;

    /// `n` cells on a line: cell -> vertex.
    fn line(n: usize) -> (Topology, EntitySetId, EntitySetId) {
        let mut b = TopologyBuilder::new(1, Base::Shape(CellType::Segment));
        let c = b.entity_set(EntitySet::new(
            PolyhedralSet::interval(n),
            1,
            "cell",
            CellType::Segment,
        ));
        let v = b.entity_set(EntitySet::new(
            PolyhedralSet::interval(n + 1),
            0,
            "vertex",
            CellType::Vertex,
        ));
        b.offsets(c, v, &[([0], 0), ([1], 1)]);
        (b.build().unwrap(), c, v)
    }

    #[test]
    fn cone_is_ordered_by_label() {
        let (t, c, v) = line(3);
        let cone = t.labelled_cone(&Multiindex::new(c, vec![1i64])).unwrap();
        assert_eq!(
            cone,
            vec![
                (Multiindex::new(v, vec![1]), 0),
                (Multiindex::new(v, vec![2]), 1)
            ]
        );
    }

    #[test]
    fn out_of_domain_query_is_an_error() {
        let (t, c, _) = line(3);
        let err = t.cone(&Multiindex::new(c, vec![3i64])).unwrap_err();
        assert!(matches!(err, MeshStructureError::OutOfDomain { .. }));
    }

    #[test]
    fn support_reports_local_labels() {
        let (t, c, v) = line(3);
        let up = t.support(&Multiindex::new(v, vec![1i64])).unwrap();
        assert_eq!(
            up,
            vec![
                (Multiindex::new(c, vec![1]), 0),
                (Multiindex::new(c, vec![0]), 1)
            ]
        );
        assert_eq!(t.support(&Multiindex::new(v, vec![0i64])).unwrap().len(), 1);
        assert_eq!(t.support(&Multiindex::new(v, vec![3i64])).unwrap().len(), 1);
    }

    #[test]
    fn relation_between_unrelated_classes_fails() {
        let (t, c, v) = line(2);
        assert_eq!(
            t.index_relation(&Multiindex::new(c, vec![0i64]), c).unwrap(),
            vec![Multiindex::new(c, vec![0])]
        );
        assert_eq!(
            t.index_relation(&Multiindex::new(v, vec![1i64]), c).unwrap().len(),
            2
        );
        assert!(matches!(
            t.incidence(&Multiindex::new(v, vec![1i64]), c),
            Err(MeshStructureError::NoRelation { .. })
        ));
    }

    #[test]
    fn symbolic_cone_carries_membership_guards() {
        let (t, c, _) = line(4);
        let mi = Multiindex::variables(c, &["i"]);
        let cone = t.cone_guarded(&mi).unwrap();
        assert_eq!(cone.len(), 2);
        assert_eq!(cone[1].value.0.index()[0].to_string(), "(i + 1)");
        assert_eq!(cone[1].conditions(), vec!["(i + 1) >= 0", "(((i + 1) * -1) + 4) >= 0"]);

        let concrete = t.cone(&Multiindex::new(c, vec![2i64])).unwrap();
        let bound: Vec<_> = cone
            .iter()
            .map(|g| g.value.0.bind(&Bindings::new().with("i", 2)).unwrap())
            .collect();
        assert_eq!(bound, concrete);
        assert!(concrete.iter().all(|m| m.index()[0] <= 4));
        let _: Vec<Multiindex<IndexExpr>> = t.cone(&mi).unwrap();
    }

    #[test]
    fn face_neighbours_of_line_cells() {
        let (t, c, _) = line(3);
        let n = |i: i64| {
            t.face_neighbours(&Multiindex::new(c, vec![i]))
                .unwrap()
                .len()
        };
        assert_eq!((n(0), n(1), n(2)), (1, 2, 1));
    }

    #[test]
    fn closure_and_star_are_dual() {
        let (t, c, v) = line(3);
        let closure = t.closure(&Multiindex::new(c, vec![1i64])).unwrap();
        assert_eq!(closure.len(), 3);
        assert!(closure.contains(&Multiindex::new(v, vec![2])));
        let star = t.star(&Multiindex::new(v, vec![2i64])).unwrap();
        assert_eq!(
            star,
            vec![
                Multiindex::new(v, vec![2]),
                Multiindex::new(c, vec![2]),
                Multiindex::new(c, vec![1])
            ]
        );
    }
}
