//! Top-level module for structured mesh topologies.
//!
//! This module provides the index-domain and incidence machinery:
//! - [`PolyhedralSet`] and [`EntitySet`]: the integer domain and metadata of
//!   one class of entities
//! - [`ReferenceElementMap`]: offset-based cone rules between classes of
//!   adjacent dimension, with derived support rules
//! - [`Topology`] and [`TopologyBuilder`]: assembly, validation and the
//!   `cone` / `support` / `index_relation` queries
//! - refinement patterns ([`refine`], [`reference_cell`]) producing the
//!   topologies of common macro elements
//!
//! Most users build a topology from a pattern and query it with concrete
//! `Multiindex<i64>` or symbolic `Multiindex<IndexExpr>` indices.

pub mod builder;
pub mod cell_type;
pub mod entity_set;
pub mod index_expr;
pub mod multiindex;
pub mod numbering;
pub mod orientation;
pub mod polyhedral;
pub mod reference_cell;
pub mod reference_map;
pub mod refine;
pub mod relation;
pub mod structure;
pub mod validation;

pub use builder::TopologyBuilder;
pub use cell_type::CellType;
pub use entity_set::{EntitySet, EntitySetId, LocalNumbering, Tag};
pub use index_expr::{Bindings, Guard, Guarded, IndexExpr, IndexValue};
pub use multiindex::Multiindex;
pub use orientation::*;
pub use polyhedral::{AffineConstraint, Factor, PolyhedralSet};
pub use reference_cell::reference_cell;
pub use reference_map::{Component, MapEntry, ReferenceElementMap};
pub use relation::Labelled;
pub use structure::{Base, Topology};
pub use validation::ValidationOptions;

/// Hash set used for deduplication throughout the topology code.
pub type FastSet<T> = hashbrown::HashSet<T>;
