#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-structure
//!
//! mesh-structure describes block-structured and extruded meshes
//! symbolically, as a frontend for finite-element code generation. A mesh is
//! never enumerated: each class of entities (all horizontal edges of a
//! refined quad, all vertical faces of an extruded column, ...) is an
//! integer polyhedral set, and incidence between classes is a short list of
//! index offsets. Queries return index tuples, either concrete (`i64`) or as
//! symbolic expressions over loop variables.
//!
//! ## Features
//! - Polyhedral index domains with closed-form flattening
//! - Offset-based cone rules with derived support and composite relations
//! - Refinement patterns for intervals, hypercubes, the Kuhn-refined
//!   triangle and unstructured reference cells, plus products and extrusion
//! - Macro-element geometry: vertex coordinates, point evaluation, Jacobians
//! - Dof layouts over entity classes
//!
//! ## Usage
//!
//! ```rust
//! # fn try_main() -> Result<(), mesh_structure::mesh_error::MeshStructureError> {
//! use mesh_structure::prelude::*;
//!
//! let quad = hypercube(&[4, 4])?;
//! let cell = quad.entity_set_by_codim(0, None)?;
//! let edges = quad.cone(&Multiindex::new(cell, vec![1i64, 2]))?;
//! assert_eq!(edges.len(), 4);
//!
//! // the same query, symbolically
//! let ij = Multiindex::<IndexExpr>::variables(cell, &["i", "j"]);
//! let symbolic = quad.cone(&ij)?;
//! let bound = Bindings::new().with("i", 1).with("j", 2);
//! for (s, c) in symbolic.iter().zip(&edges) {
//!     assert_eq!(&s.bind(&bound)?, c);
//! }
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```
//!
//! ## Determinism
//!
//! Every query returns entities in a fixed order: cones by local label,
//! composite relations by first discovery along the precomputed adjacency
//! graph.

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::extrude::{extrude, product};
    pub use crate::data::layout::DataLayout;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::basis::CoordinateElement;
    pub use crate::geometry::mapping::{Geometry, GeometryIndex};
    pub use crate::geometry::symbolic::SymbolicPoint;
    pub use crate::mesh_error::MeshStructureError;
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::entity_set::{EntitySet, EntitySetId};
    pub use crate::topology::index_expr::{Bindings, IndexExpr, IndexValue};
    pub use crate::topology::multiindex::Multiindex;
    pub use crate::topology::reference_cell::reference_cell;
    pub use crate::topology::refine::{hypercube, interval, kuhn_triangle, periodic_interval};
    pub use crate::topology::structure::Topology;
    pub use crate::topology::validation::ValidationOptions;
}
