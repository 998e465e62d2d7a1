//! `Multiindex`: the identifier of one entity instance.
//!
//! A multiindex pairs an index tuple with the [`EntitySetId`] of the class it
//! belongs to. The tuple is generic over [`IndexValue`]: `Multiindex<i64>`
//! names a concrete entity, `Multiindex<IndexExpr>` a family of entities
//! parameterized by loop variables, as seen by a code generator.

use crate::mesh_error::MeshStructureError;
use crate::topology::entity_set::EntitySetId;
use crate::topology::index_expr::{Bindings, IndexExpr, IndexValue};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiindex<I = i64> {
    entity_set: EntitySetId,
    index: Vec<I>,
}

impl<I: IndexValue> Multiindex<I> {
    #[inline]
    pub fn new(entity_set: EntitySetId, index: Vec<I>) -> Self {
        Self { entity_set, index }
    }

    #[inline]
    pub fn entity_set(&self) -> EntitySetId {
        self.entity_set
    }

    #[inline]
    pub fn index(&self) -> &[I] {
        &self.index
    }

    pub fn into_index(self) -> Vec<I> {
        self.index
    }

    /// The concrete tuple, if every component is known.
    pub fn as_concrete(&self) -> Option<Vec<i64>> {
        self.index.iter().map(|x| x.as_constant()).collect()
    }
}

impl Multiindex<IndexExpr> {
    /// A multiindex whose components are the free variables `names`.
    pub fn variables(entity_set: EntitySetId, names: &[&str]) -> Self {
        Self::new(entity_set, names.iter().map(|n| IndexExpr::var(n)).collect())
    }

    /// Evaluate every component under `bindings`.
    pub fn bind(&self, bindings: &Bindings) -> Result<Multiindex<i64>, MeshStructureError> {
        let index = self
            .index
            .iter()
            .map(|x| x.evaluate(bindings))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Multiindex::new(self.entity_set, index))
    }
}

impl<I: fmt::Display> fmt::Display for Multiindex<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.entity_set)?;
        for (k, x) in self.index.iter().enumerate() {
            if k > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str(")")
    }
}

impl<I: fmt::Display> fmt::Debug for Multiindex<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiindex{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_needs_tuple_and_set() {
        let a = Multiindex::new(EntitySetId::new(0), vec![1i64, 2]);
        let b = Multiindex::new(EntitySetId::new(1), vec![1i64, 2]);
        assert_ne!(a, b);
        assert_eq!(a, Multiindex::new(EntitySetId::new(0), vec![1, 2]));
        assert_eq!(a.to_string(), "#0(1, 2)");
    }

    #[test]
    fn bind_evaluates_symbolic_components() {
        let sym = Multiindex::new(
            EntitySetId::new(3),
            vec![IndexExpr::var("i").shifted(1), IndexExpr::var("j")],
        );
        let concrete = sym.bind(&Bindings::new().with("i", 2).with("j", 0)).unwrap();
        assert_eq!(concrete, Multiindex::new(EntitySetId::new(3), vec![3, 0]));
        assert!(sym.as_concrete().is_none());
        assert!(sym.bind(&Bindings::new()).is_err());
    }
}
