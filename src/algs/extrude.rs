//! Products of topologies, and extrusion of a topology into columns.
//!
//! The product of `L` and `R` has one class `A x B` per pair of classes
//! (`A` from `L`, `B` from `R`), indexed by the concatenated axes. Its cone
//! factors as
//!
//! - `∂A x B`: the cone entries of `A`, identity on the `B` axes, keeping
//!   the labels of `A`;
//! - `A x ∂B`: identity on the `A` axes, the cone entries of `B` read from
//!   the shifted axes, labels offset by the cone size of `A`.
//!
//! This is the tensor-product numbering of
//! [`numbering`](crate::topology::numbering): for a prism the three
//! vertical faces come first (labels 0..2), then bottom and top (3, 4).
//!
//! # Example
//! ```rust
//! # fn try_main() -> Result<(), mesh_structure::mesh_error::MeshStructureError> {
//! use mesh_structure::algs::extrude::extrude;
//! use mesh_structure::topology::{CellType, Multiindex, reference_cell};
//! use std::sync::Arc;
//!
//! let column = extrude(Arc::new(reference_cell(CellType::Triangle)?), 3)?;
//! let cell = column.entity_set_by_codim(0, None)?;
//! assert_eq!(column.cone_size(cell), 5);
//! assert_eq!(column.cone(&Multiindex::new(cell, vec![1i64]))?.len(), 5);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use crate::geometry::parametrization::Parametrization;
use crate::mesh_error::MeshStructureError;
use crate::topology::builder::TopologyBuilder;
use crate::topology::entity_set::EntitySetId;
use crate::topology::reference_map::{Component, MapEntry};
use crate::topology::refine::interval;
use crate::topology::structure::{Base, ProductStructure, Topology};
use crate::topology::validation::ValidationOptions;
use std::sync::Arc;

/// Options for [`product_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ProductOptions {
    /// Validation applied to the assembled product.
    pub validation: ValidationOptions,
}

/// `left x right` with default validation.
pub fn product(left: Arc<Topology>, right: Arc<Topology>) -> Result<Topology, MeshStructureError> {
    product_with(left, right, ProductOptions::default())
}

/// `left x right`.
pub fn product_with(
    left: Arc<Topology>,
    right: Arc<Topology>,
    opts: ProductOptions,
) -> Result<Topology, MeshStructureError> {
    let mut b = TopologyBuilder::new(
        left.dimension() + right.dimension(),
        Base::Extruded(left.clone()),
    );
    let mut pairs = Vec::new();
    for a in left.ids() {
        for r in right.ids() {
            let set = left.entity_set(a)?.product(right.entity_set(r)?);
            b.entity_set(set);
            pairs.push((a, r));
        }
    }
    let id_of = |a: EntitySetId, r: EntitySetId| {
        EntitySetId::new(a.index() * right.all_entity_sets().len() + r.index())
    };

    for &(a, r) in &pairs {
        let left_axes = left.entity_set(a)?.axes();
        let right_axes = right.entity_set(r)?.axes();
        let source = id_of(a, r);

        // ∂A x B
        for map in left.maps().iter().filter(|m| m.source() == a) {
            let entries = map
                .entries()
                .iter()
                .map(|e| {
                    let mut components = e.components.clone();
                    components.extend((0..right_axes).map(|k| Component::identity(left_axes + k)));
                    MapEntry::new(components, e.label)
                })
                .collect();
            b.map(source, id_of(map.target(), r), entries);
        }

        // A x ∂B
        let shift = left.cone_size(a);
        for map in right.maps().iter().filter(|m| m.source() == r) {
            let entries = map
                .entries()
                .iter()
                .map(|e| {
                    let mut components: Vec<Component> =
                        (0..left_axes).map(Component::identity).collect();
                    components.extend(e.components.iter().map(|c| c.offset_axes(left_axes)));
                    MapEntry::new(components, e.label + shift)
                })
                .collect();
            b.map(source, id_of(a, map.target()), entries);
        }
    }

    if let (Some(l), Some(r)) = (left.parametrization(), right.parametrization()) {
        b.parametrization(Parametrization::product(l.clone(), r.clone()));
    }
    b.options(opts.validation);
    b.product_structure(ProductStructure {
        left: left.clone(),
        right: right.clone(),
        pairs,
    });
    let topology = b.build()?;
    log::debug!(
        "product of {}D and {}D topologies: {} classes",
        left.dimension(),
        right.dimension(),
        topology.all_entity_sets().len()
    );
    Ok(topology)
}

/// Columns of `layers` cells over every entity of `base`.
pub fn extrude(base: Arc<Topology>, layers: usize) -> Result<Topology, MeshStructureError> {
    product(base, Arc::new(interval(layers)?))
}
