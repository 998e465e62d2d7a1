//! DataLayout: degrees of freedom attached to the entity classes of a
//! topology.
//!
//! Every entity of class `A` carries `dofs(A)` contiguous values. Classes are
//! laid out one after another, by increasing codimension and then in
//! declared order, so that all dofs of one codimension form one range:
//!
//! ```text
//! dof_index(mi, k) = offset(A) + linear_index_map(mi) * dofs(A) + k
//! ```
//!
//! Dof counts live here and not on [`EntitySet`]; a topology can carry any
//! number of layouts.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshStructureError;
use crate::topology::entity_set::{EntitySet, EntitySetId};
use crate::topology::index_expr::IndexValue;
use crate::topology::multiindex::Multiindex;
use crate::topology::structure::Topology;
use std::ops::Range;
use std::sync::Arc;

/// Flat dof numbering over a [`Topology`].
///
/// # Invariants
///
/// - `dofs` and `offsets` have one entry per entity class.
/// - Offsets are contiguous in layout order and `size` equals the sum of
///   `class size * dofs` over all classes.
#[derive(Clone, Debug)]
pub struct DataLayout {
    topology: Arc<Topology>,
    dofs: Vec<usize>,
    offsets: Vec<usize>,
    /// Classes in layout order.
    order: Vec<EntitySetId>,
    size: usize,
}

impl DataLayout {
    /// Layout with `dofs(id, set)` values per entity of each class.
    pub fn new<F>(topology: Arc<Topology>, mut dofs: F) -> Self
    where
        F: FnMut(EntitySetId, &EntitySet) -> usize,
    {
        let counts: Vec<usize> = topology
            .ids()
            .zip(topology.all_entity_sets())
            .map(|(id, set)| dofs(id, set))
            .collect();
        let mut order: Vec<EntitySetId> = topology.ids().collect();
        let dimension = topology.dimension();
        // stable: declared order within a codimension
        order.sort_by_key(|id| dimension - topology.all_entity_sets()[id.index()].dimension());

        let mut offsets = vec![0; counts.len()];
        let mut size = 0;
        for id in &order {
            offsets[id.index()] = size;
            size += topology.all_entity_sets()[id.index()].size() * counts[id.index()];
        }
        log::debug!(
            "data layout over {} classes: {size} dofs",
            counts.len()
        );
        let layout = Self {
            topology,
            dofs: counts,
            offsets,
            order,
            size,
        };
        crate::debug_invariants!(layout.validate_invariants(), "DataLayout::new");
        layout
    }

    /// `per_codimension[c]` values on every entity of codimension `c`;
    /// codimensions past the end carry none.
    pub fn per_codimension(topology: Arc<Topology>, per_codimension: &[usize]) -> Self {
        let dimension = topology.dimension();
        Self::new(topology, |_, set| {
            per_codimension
                .get(set.codimension(dimension))
                .copied()
                .unwrap_or(0)
        })
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Total number of dofs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Dofs per entity of class `id`.
    pub fn dofs(&self, id: EntitySetId) -> Result<usize, MeshStructureError> {
        self.dofs
            .get(id.index())
            .copied()
            .ok_or(MeshStructureError::UnknownEntitySet(id))
    }

    /// First dof of class `id`.
    pub fn offset(&self, id: EntitySetId) -> Result<usize, MeshStructureError> {
        self.offsets
            .get(id.index())
            .copied()
            .ok_or(MeshStructureError::UnknownEntitySet(id))
    }

    /// Dofs of all entities of codimension `codim`. Empty when there are
    /// none.
    pub fn range_of_codimension(&self, codim: usize) -> Range<usize> {
        let dimension = self.topology.dimension();
        let mut start = self.size;
        let mut end = self.size;
        let mut found = false;
        for id in &self.order {
            let set = &self.topology.all_entity_sets()[id.index()];
            let c = set.codimension(dimension);
            let span = set.size() * self.dofs[id.index()];
            if c == codim {
                if !found {
                    start = self.offsets[id.index()];
                    found = true;
                }
                end = self.offsets[id.index()] + span;
            } else if c > codim && !found {
                start = self.offsets[id.index()];
                end = start;
                break;
            }
        }
        start..end
    }

    /// Flat index of dof `k` on `mi`. Symbolic indices give the index
    /// expression.
    pub fn dof_index<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        k: usize,
    ) -> Result<I, MeshStructureError> {
        let id = mi.entity_set();
        let dofs = self.dofs(id)?;
        if k >= dofs {
            let tag = self.topology.entity_set(id)?.tag().clone();
            return Err(MeshStructureError::OutOfDomain {
                tag,
                index: format!("{mi} dof {k}"),
            });
        }
        let linear = self.topology.entity_set(id)?.linear_index_map(mi.index())?;
        Ok(linear
            .scaled(dofs as i64)
            .shifted((self.offset(id)? + k) as i64))
    }

    /// Dofs on the closure of `mi`: entity by entity in closure order, each
    /// entity's dofs ascending.
    pub fn closure_dofs<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<I>, MeshStructureError> {
        let mut out = Vec::new();
        for entity in self.topology.closure(mi)? {
            for k in 0..self.dofs(entity.entity_set())? {
                out.push(self.dof_index(&entity, k)?);
            }
        }
        Ok(out)
    }
}

impl DebugInvariants for DataLayout {
    const DESCRIPTOR: &'static str = "DataLayout";

    fn validate_invariants(&self) -> Result<(), MeshStructureError> {
        let n = self.topology.all_entity_sets().len();
        if self.dofs.len() != n || self.offsets.len() != n || self.order.len() != n {
            return Err(MeshStructureError::InvalidLayout(format!(
                "{n} entity classes, {} dof counts, {} offsets",
                self.dofs.len(),
                self.offsets.len()
            )));
        }
        let mut next = 0usize;
        for id in &self.order {
            let i = id.index();
            if self.offsets[i] != next {
                return Err(MeshStructureError::InvalidLayout(format!(
                    "class {id} starts at {}, expected {next}",
                    self.offsets[i]
                )));
            }
            next = self.topology.all_entity_sets()[i]
                .size()
                .checked_mul(self.dofs[i])
                .and_then(|span| next.checked_add(span))
                .ok_or_else(|| {
                    MeshStructureError::InvalidLayout(format!("class {id} overflows usize"))
                })?;
        }
        if next != self.size {
            return Err(MeshStructureError::InvalidLayout(format!(
                "offsets end at {next}, size is {}",
                self.size
            )));
        }
        Ok(())
    }
}
