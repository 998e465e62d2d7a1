//! MeshStructureError: unified error type for mesh-structure public APIs
//!
//! Query-time failures (`OutOfDomain`, `NoRelation`, `AmbiguousTag`, ...) are
//! recoverable and returned to the caller. `MalformedMap` is only produced while
//! a topology is assembled; a topology that fails assembly is never returned.

use crate::topology::entity_set::{EntitySetId, Tag};
use thiserror::Error;

/// Unified error type for mesh-structure operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshStructureError {
    /// The multiindex violates the polyhedral constraints of its entity set.
    #[error("multiindex {index} lies outside entity set `{tag}`")]
    OutOfDomain { tag: Tag, index: String },
    /// No adjacency path exists between the requested entity sets.
    #[error("no incidence relation from `{from}` to `{to}`")]
    NoRelation { from: Tag, to: Tag },
    /// A structural invariant of an incidence map was violated at construction.
    #[error("malformed reference element map: {0}")]
    MalformedMap(String),
    /// More than one entity set matched a lookup that expected exactly one.
    #[error("{count} entity sets of codimension {codimension} match tag {tag:?}")]
    AmbiguousTag {
        codimension: usize,
        tag: Option<String>,
        count: usize,
    },
    /// No entity set matched a `(codimension, tag)` lookup.
    #[error("no entity set of codimension {codimension} with tag {tag:?}")]
    NoSuchEntitySet {
        codimension: usize,
        tag: Option<String>,
    },
    /// An `EntitySetId` that does not belong to this topology.
    #[error("unknown entity set {0}")]
    UnknownEntitySet(EntitySetId),
    /// Index tuple length does not match the number of axes.
    #[error("index arity mismatch: expected {expected} indices, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    /// A symbolic index referenced a variable with no binding.
    #[error("unbound index variable `{0}`")]
    UnboundVariable(String),
    /// The operation needs concrete indices (e.g. inverting a lookup table).
    #[error("symbolic indices are not supported for {0}")]
    SymbolicUnsupported(&'static str),
    /// A polyhedral set description is not finite or not well formed.
    #[error("invalid polyhedral set: {0}")]
    InvalidSet(String),
    /// Geometry descriptor is inconsistent with its topology or element.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Dof offsets of a data layout do not tile its size.
    #[error("invalid data layout: {0}")]
    InvalidLayout(String),
}

impl MeshStructureError {
    /// Attribute a domain violation raised by a bare polyhedral set to the
    /// entity class owning it.
    pub(crate) fn in_set(self, tag: &Tag) -> Self {
        match self {
            MeshStructureError::OutOfDomain { index, .. } => MeshStructureError::OutOfDomain {
                tag: tag.clone(),
                index,
            },
            e => e,
        }
    }
}
