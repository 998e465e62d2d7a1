//! Reference cell shapes of entity classes and macro elements.

use serde::{Deserialize, Serialize};

/// Reference shapes known to the numbering rules.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 0D vertex.
    Vertex,
    /// 1D segment/edge.
    Segment,
    /// 2D simplex (triangle).
    Triangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
    /// 3D tensor-product cell (hex).
    Hexahedron,
    /// 3D wedge/prism (triangle x segment).
    Prism,
    /// Generic simplex with dimension `d`.
    Simplex(u8),
    /// Generic hypercube with dimension `d`.
    Hypercube(u8),
    /// Tensor product of a simplex and hypercubes that has no dedicated name.
    TensorProduct(u8),
}

impl Default for CellType {
    fn default() -> Self {
        CellType::Vertex
    }
}

impl CellType {
    /// Returns the topological dimension of the cell.
    pub fn dimension(self) -> u8 {
        match self {
            CellType::Vertex => 0,
            CellType::Segment => 1,
            CellType::Triangle | CellType::Quadrilateral => 2,
            CellType::Tetrahedron | CellType::Hexahedron | CellType::Prism => 3,
            CellType::Simplex(d) | CellType::Hypercube(d) | CellType::TensorProduct(d) => d,
        }
    }

    /// Canonical simplex of dimension `d`.
    pub fn simplex(d: u8) -> Self {
        match d {
            0 => CellType::Vertex,
            1 => CellType::Segment,
            2 => CellType::Triangle,
            3 => CellType::Tetrahedron,
            d => CellType::Simplex(d),
        }
    }

    /// Canonical hypercube of dimension `d`.
    pub fn hypercube(d: u8) -> Self {
        match d {
            0 => CellType::Vertex,
            1 => CellType::Segment,
            2 => CellType::Quadrilateral,
            3 => CellType::Hexahedron,
            d => CellType::Hypercube(d),
        }
    }

    /// Vertices and segments count as both simplex and hypercube.
    pub fn is_simplex(self) -> bool {
        matches!(
            self,
            CellType::Vertex
                | CellType::Segment
                | CellType::Triangle
                | CellType::Tetrahedron
                | CellType::Simplex(_)
        )
    }

    pub fn is_hypercube(self) -> bool {
        matches!(
            self,
            CellType::Vertex
                | CellType::Segment
                | CellType::Quadrilateral
                | CellType::Hexahedron
                | CellType::Hypercube(_)
        )
    }

    /// Shape of the cartesian product `self x other`.
    pub fn product(self, other: CellType) -> CellType {
        let d = self.dimension() + other.dimension();
        match (self, other) {
            (CellType::Vertex, c) | (c, CellType::Vertex) => c,
            (a, b) if a.is_hypercube() && b.is_hypercube() => CellType::hypercube(d),
            (CellType::Triangle, CellType::Segment) => CellType::Prism,
            _ => CellType::TensorProduct(d),
        }
    }

    /// Number of vertices, when well-defined.
    pub fn vertex_count(self) -> Option<usize> {
        let d = self.dimension() as u32;
        match self {
            CellType::Prism => Some(6),
            CellType::TensorProduct(_) => None,
            c if c.is_simplex() => Some(d as usize + 1),
            _ => Some(1usize << d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_name_the_usual_shapes() {
        assert_eq!(
            CellType::Segment.product(CellType::Segment),
            CellType::Quadrilateral
        );
        assert_eq!(
            CellType::Quadrilateral.product(CellType::Segment),
            CellType::Hexahedron
        );
        assert_eq!(CellType::Triangle.product(CellType::Segment), CellType::Prism);
        assert_eq!(CellType::Vertex.product(CellType::Triangle), CellType::Triangle);
        assert_eq!(
            CellType::Prism.product(CellType::Segment),
            CellType::TensorProduct(4)
        );
    }

    #[test]
    fn vertex_counts() {
        assert_eq!(CellType::Tetrahedron.vertex_count(), Some(4));
        assert_eq!(CellType::Hexahedron.vertex_count(), Some(8));
        assert_eq!(CellType::Prism.vertex_count(), Some(6));
        assert_eq!(CellType::Vertex.vertex_count(), Some(1));
    }
}
