//! Declarative assembly of a [`Topology`].
//!
//! Entity classes are registered first (each registration returns its
//! [`EntitySetId`]), then the cone maps between adjacent classes. `build`
//! runs every structural check, derives the support plans, and runs the
//! exhaustive checks selected by [`ValidationOptions`]. Any failure aborts
//! assembly; a partially valid topology is never returned.

use crate::debug_invariants::DebugInvariants;
use crate::geometry::parametrization::Parametrization;
use crate::mesh_error::MeshStructureError;
use crate::topology::entity_set::{EntitySet, EntitySetId};
use crate::topology::reference_map::{MapEntry, ReferenceElementMap};
use crate::topology::structure::{Base, ProductStructure, Topology};
use crate::topology::validation::{self, ValidationOptions};

#[derive(Debug)]
pub struct TopologyBuilder {
    dimension: usize,
    base: Base,
    entity_sets: Vec<EntitySet>,
    maps: Vec<(EntitySetId, EntitySetId, Vec<MapEntry>)>,
    parametrization: Option<Parametrization>,
    product: Option<ProductStructure>,
    options: ValidationOptions,
}

impl TopologyBuilder {
    pub fn new(dimension: usize, base: Base) -> Self {
        Self {
            dimension,
            base,
            entity_sets: Vec::new(),
            maps: Vec::new(),
            parametrization: None,
            product: None,
            options: ValidationOptions::default(),
        }
    }

    /// Register a class; ids are assigned in declaration order.
    pub fn entity_set(&mut self, set: EntitySet) -> EntitySetId {
        self.entity_sets.push(set);
        EntitySetId::new(self.entity_sets.len() - 1)
    }

    /// Declare the cone map `source -> target`.
    pub fn map(
        &mut self,
        source: EntitySetId,
        target: EntitySetId,
        entries: Vec<MapEntry>,
    ) -> &mut Self {
        self.maps.push((source, target, entries));
        self
    }

    /// Declare a structured cone map by `(offset, label)` pairs; source and
    /// target must have the same number of axes.
    pub fn offsets<O: AsRef<[i64]>>(
        &mut self,
        source: EntitySetId,
        target: EntitySetId,
        offsets: &[(O, usize)],
    ) -> &mut Self {
        let entries = offsets
            .iter()
            .map(|(offset, label)| MapEntry::offset(offset.as_ref(), *label))
            .collect();
        self.map(source, target, entries)
    }

    pub fn parametrization(&mut self, parametrization: Parametrization) -> &mut Self {
        self.parametrization = Some(parametrization);
        self
    }

    pub fn options(&mut self, options: ValidationOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub(crate) fn product_structure(&mut self, product: ProductStructure) -> &mut Self {
        self.product = Some(product);
        self
    }

    pub fn build(self) -> Result<Topology, MeshStructureError> {
        if let Some(set) = self
            .entity_sets
            .iter()
            .find(|s| s.dimension() > self.dimension)
        {
            return Err(MeshStructureError::MalformedMap(format!(
                "entity set `{}` has dimension {} > {}",
                set.tag(),
                set.dimension(),
                self.dimension
            )));
        }
        validation::check_entity_sets(&self.entity_sets)?;
        let mut maps = Vec::with_capacity(self.maps.len());
        for (source, target, entries) in self.maps {
            validation::check_map(&self.entity_sets, source, target, &entries)?;
            let axes = self.entity_sets[source.index()].axes();
            maps.push(ReferenceElementMap::new(source, target, entries, axes)?);
        }
        validation::check_labels(&self.entity_sets, &maps)?;
        if let Some(p) = &self.parametrization {
            let vertices = self
                .entity_sets
                .iter()
                .filter(|s| s.dimension() == 0)
                .find(|s| s.axes() != p.axes());
            if let Some(v) = vertices {
                return Err(MeshStructureError::InvalidGeometry(format!(
                    "parametrization reads {} axes, vertex set `{}` has {}",
                    p.axes(),
                    v.tag(),
                    v.axes()
                )));
            }
        }

        let topology = Topology::assemble(
            self.dimension,
            self.base,
            self.entity_sets,
            maps,
            self.parametrization,
            self.product,
        );
        crate::debug_invariants!(topology.validate_invariants(), "TopologyBuilder::build");
        validation::validate_topology(&topology, &self.options)?;
        Ok(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::cell_type::CellType;
    use crate::topology::polyhedral::PolyhedralSet;
    use crate::topology::reference_map::Component;

    fn segment(n: usize) -> (TopologyBuilder, EntitySetId, EntitySetId) {
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
        (b, c, v)
    }

    #[test]
    fn well_formed_interval_builds() {
        let (mut b, c, v) = segment(3);
        b.offsets(c, v, &[([0], 0), ([1], 1)])
            .options(ValidationOptions::all());
        let t = b.build().unwrap();
        assert_eq!(t.cone_size(c), 2);
        assert!(t.reaches(c, v));
        assert!(!t.reaches(v, c));
    }

    #[test]
    fn labels_must_be_a_permutation() {
        let (mut b, c, v) = segment(3);
        b.offsets(c, v, &[([0], 0), ([1], 2)]);
        assert!(matches!(b.build(), Err(MeshStructureError::MalformedMap(_))));
    }

    #[test]
    fn maps_must_join_adjacent_dimensions() {
        let (mut b, c, _) = segment(3);
        let p = b.entity_set(EntitySet::new(
            PolyhedralSet::interval(2),
            1,
            "other",
            CellType::Segment,
        ));
        b.offsets(c, p, &[([0], 0)]);
        assert!(matches!(b.build(), Err(MeshStructureError::MalformedMap(_))));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (mut b, c, _) = segment(3);
        b.offsets(c, EntitySetId::new(9), &[([0], 0)]);
        assert_eq!(
            b.build().unwrap_err(),
            MeshStructureError::UnknownEntitySet(EntitySetId::new(9))
        );
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let (mut b, _, _) = segment(3);
        b.entity_set(EntitySet::new(
            PolyhedralSet::interval(1),
            0,
            "vertex",
            CellType::Vertex,
        ));
        assert!(b.build().is_err());
    }

    #[test]
    fn inverse_inconsistency_is_caught() {
        // cell i -> vertex 0 for every i: support of vertex 0 recovers only
        // the sources that actually map there, but the inverse plan cannot
        // determine the source axis at all.
        let (mut b, c, v) = segment(3);
        b.map(
            c,
            v,
            vec![
                MapEntry::new(vec![Component::Fixed(0)], 0),
                MapEntry::offset(&[1], 1),
            ],
        );
        assert!(matches!(b.build(), Err(MeshStructureError::MalformedMap(_))));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let (mut b, c, v) = segment(3);
        b.map(
            c,
            v,
            vec![MapEntry::new(
                vec![Component::identity(0), Component::identity(0)],
                0,
            )],
        );
        assert!(matches!(b.build(), Err(MeshStructureError::MalformedMap(_))));
    }
}
