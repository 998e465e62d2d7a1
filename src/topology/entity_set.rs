//! Entity classes: a tagged polyhedral index domain of fixed dimension.
//!
//! An [`EntitySet`] is a value: two sets are interchangeable when their
//! domain, dimension, tag, shape and numbering agree. Inside a
//! [`Topology`](crate::topology::structure::Topology) sets are addressed by
//! [`EntitySetId`], an arena index into the topology's set list.

use crate::mesh_error::MeshStructureError;
use crate::topology::cell_type::CellType;
use crate::topology::index_expr::IndexValue;
use crate::topology::orientation::Perm;
use crate::topology::polyhedral::PolyhedralSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Name distinguishing entity classes of equal dimension
/// (e.g. `"edge_x"` and `"edge_y"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Arc<str>);

impl Tag {
    pub fn new(name: &str) -> Self {
        Tag(Arc::from(name))
    }

    /// Placeholder tag for errors raised below the entity-set level.
    pub(crate) fn anonymous() -> Self {
        Tag::new("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag of the product class `self x other`.
    pub fn product(&self, other: &Tag) -> Tag {
        Tag::new(&format!("{}*{}", self.0, other.0))
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::new(name)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", &*self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle of an entity set within one topology.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntitySetId(usize);

impl EntitySetId {
    #[inline]
    pub const fn new(raw: usize) -> Self {
        EntitySetId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for EntitySetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntitySetId").field(&self.0).finish()
    }
}

impl fmt::Display for EntitySetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A run of vertex-key axes compared lexicographically, ascending or
/// descending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberingGroup {
    pub axes: usize,
    pub reversed: bool,
}

/// How the closure vertices of one entity are numbered locally.
///
/// Vertices are identified by their offset key relative to the entity. Keys
/// are split into consecutive groups; groups are compared in order, each
/// lexicographically ascending or (for *high* Kuhn simplices) descending.
/// Products concatenate the groups of their factors, which yields the
/// tensor-product vertex order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LocalNumbering {
    groups: Vec<NumberingGroup>,
}

impl LocalNumbering {
    /// Plain lexicographic order on `axes`-component keys.
    pub fn lexicographic(axes: usize) -> Self {
        Self {
            groups: vec![NumberingGroup {
                axes,
                reversed: false,
            }],
        }
    }

    /// Reverse lexicographic order on `axes`-component keys.
    pub fn reverse_lexicographic(axes: usize) -> Self {
        Self {
            groups: vec![NumberingGroup {
                axes,
                reversed: true,
            }],
        }
    }

    pub fn groups(&self) -> &[NumberingGroup] {
        &self.groups
    }

    pub fn key_axes(&self) -> usize {
        self.groups.iter().map(|g| g.axes).sum()
    }

    /// Numbering of the product class: `self` on the leading key axes,
    /// `other` on the trailing ones.
    pub fn product(&self, other: &LocalNumbering) -> Self {
        Self {
            groups: self.groups.iter().chain(&other.groups).copied().collect(),
        }
    }

    /// Compare two keys under this numbering. Keys longer than the declared
    /// groups compare their remaining axes ascending.
    pub fn compare(&self, a: &[i64], b: &[i64]) -> Ordering {
        let mut start = 0;
        for g in &self.groups {
            let end = (start + g.axes).min(a.len()).min(b.len());
            let ord = a[start..end].cmp(&b[start..end]);
            let ord = if g.reversed { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
            start = end;
        }
        a[start.min(a.len())..].cmp(&b[start.min(b.len())..])
    }

    /// Permutation listing `keys` in local order.
    pub fn order(&self, keys: &[Vec<i64>]) -> Perm {
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| self.compare(&keys[a], &keys[b]));
        Perm::from_image(order).unwrap_or_else(|| Perm::identity(keys.len()))
    }
}

/// A class of topological entities of one dimension, indexed by a
/// polyhedral integer domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    set: PolyhedralSet,
    dimension: usize,
    tag: Tag,
    cell_type: CellType,
    numbering: LocalNumbering,
}

impl EntitySet {
    /// A class with lexicographic local numbering over `set`'s axes.
    pub fn new(set: PolyhedralSet, dimension: usize, tag: impl Into<Tag>, cell_type: CellType) -> Self {
        let numbering = LocalNumbering::lexicographic(set.axes());
        Self {
            set,
            dimension,
            tag: tag.into(),
            cell_type,
            numbering,
        }
    }

    pub fn with_numbering(mut self, numbering: LocalNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Cross product of two classes; the tag is `"a*b"`.
    pub fn product(&self, other: &EntitySet) -> Self {
        Self {
            set: self.set.product(&other.set),
            dimension: self.dimension + other.dimension,
            tag: self.tag.product(&other.tag),
            cell_type: self.cell_type.product(other.cell_type),
            numbering: self.numbering.product(&other.numbering),
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Codimension within an ambient topology of dimension `ambient`.
    #[inline]
    pub fn codimension(&self, ambient: usize) -> usize {
        ambient.saturating_sub(self.dimension)
    }

    #[inline]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    #[inline]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    #[inline]
    pub fn numbering(&self) -> &LocalNumbering {
        &self.numbering
    }

    #[inline]
    pub fn polyhedral_set(&self) -> &PolyhedralSet {
        &self.set
    }

    /// Number of index axes.
    #[inline]
    pub fn axes(&self) -> usize {
        self.set.axes()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.set.size()
    }

    #[inline]
    pub fn contains(&self, point: &[i64]) -> bool {
        self.set.contains(point)
    }

    /// `Ok` iff `point` lies in the domain; the error names this class.
    pub fn require(&self, point: &[i64]) -> Result<(), MeshStructureError> {
        self.set.require(point).map_err(|e| e.in_set(&self.tag))
    }

    /// Flat position of `point` in `[0, size)`.
    pub fn linear_index_map<I: IndexValue>(&self, point: &[I]) -> Result<I, MeshStructureError> {
        self.set
            .linear_index_map(point)
            .map_err(|e| e.in_set(&self.tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_class_concatenates_structure() {
        let tri = EntitySet::new(PolyhedralSet::simplex(2, 3), 2, "cell_high", CellType::Triangle)
            .with_numbering(LocalNumbering::reverse_lexicographic(2));
        let layer = EntitySet::new(PolyhedralSet::interval(4), 1, "cell", CellType::Segment);
        let prism = tri.product(&layer);
        assert_eq!(prism.tag().as_str(), "cell_high*cell");
        assert_eq!(prism.dimension(), 3);
        assert_eq!(prism.cell_type(), CellType::Prism);
        assert_eq!(prism.axes(), 3);
        assert_eq!(prism.size(), 6 * 4);
        assert_eq!(prism.numbering().groups().len(), 2);
    }

    #[test]
    fn reversed_groups_order_descending() {
        let keys = vec![vec![1, 0], vec![0, 1], vec![1, 1]];
        let high = LocalNumbering::reverse_lexicographic(2);
        assert_eq!(
            high.order(&keys).apply(&keys),
            vec![vec![1, 1], vec![1, 0], vec![0, 1]]
        );
        let tensor = LocalNumbering::reverse_lexicographic(1).product(&LocalNumbering::lexicographic(1));
        let keys = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
        assert_eq!(
            tensor.order(&keys).apply(&keys),
            vec![vec![1, 0], vec![1, 1], vec![0, 0], vec![0, 1]]
        );
    }

    #[test]
    fn out_of_domain_names_the_class() {
        let edges = EntitySet::new(PolyhedralSet::interval(2), 1, "edge", CellType::Segment);
        match edges.require(&[2]) {
            Err(MeshStructureError::OutOfDomain { tag, .. }) => assert_eq!(tag.as_str(), "edge"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
