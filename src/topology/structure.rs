//! `Topology`: entity classes, their adjacency maps and the derived
//! relation graph.
//!
//! A topology owns its [`EntitySet`]s (addressed by [`EntitySetId`]) and the
//! [`ReferenceElementMap`]s between classes of adjacent dimension. Nothing
//! else is stored: relations across several codimensions are composed from
//! the maps on demand and cached per source class, and the refinement
//! structure lives in the polyhedral sets themselves.
//!
//! Topologies are immutable once built (see
//! [`TopologyBuilder`](crate::topology::builder::TopologyBuilder)) and shared
//! read-only between threads.

use crate::debug_invariants::{DebugInvariants, validate_each};
use crate::geometry::parametrization::Parametrization;
use crate::mesh_error::MeshStructureError;
use crate::topology::cell_type::CellType;
use crate::topology::entity_set::{EntitySet, EntitySetId};
use crate::topology::index_expr::IndexValue;
use crate::topology::multiindex::Multiindex;
use crate::topology::reference_map::{Component, ReferenceElementMap, compose_components};
use crate::topology::FastSet;
use hashbrown::HashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// What a topology structures.
#[derive(Clone, Debug)]
pub enum Base {
    /// A single reference shape (the macro element of a refinement, or an
    /// unstructured reference cell).
    Shape(CellType),
    /// Columns over another topology (product or extrusion).
    Extruded(Arc<Topology>),
}

/// Factorization of a product topology.
#[derive(Clone, Debug)]
pub struct ProductStructure {
    pub(crate) left: Arc<Topology>,
    pub(crate) right: Arc<Topology>,
    /// `pairs[id]` = factor classes of product class `id`.
    pub(crate) pairs: Vec<(EntitySetId, EntitySetId)>,
}

/// One node of a composite relation: a class reachable from the source,
/// the composed components, and the nodes of the previous level it was
/// reached from.
#[derive(Clone, Debug)]
pub(crate) struct CompositeNode {
    pub(crate) set: EntitySetId,
    pub(crate) components: Vec<Component>,
    pub(crate) parents: Vec<usize>,
}

/// All downward relations of one source class, one level per codimension
/// step, in first-discovery order.
#[derive(Clone, Debug, Default)]
pub(crate) struct CompositeRelation {
    pub(crate) levels: Vec<Vec<CompositeNode>>,
}

#[derive(Debug)]
pub struct Topology {
    pub(crate) dimension: usize,
    pub(crate) base: Base,
    pub(crate) entity_sets: Vec<EntitySet>,
    pub(crate) maps: Vec<ReferenceElementMap>,
    /// Per source class: `(map, entry)` of every cone entry, by label.
    pub(crate) cone_entries: Vec<Vec<(usize, usize)>>,
    /// Per target class: maps ending there, in declared order.
    pub(crate) support_maps: Vec<Vec<usize>>,
    /// Per class: classes reachable by cone steps, itself included.
    pub(crate) reach_down: Vec<FastSet<EntitySetId>>,
    pub(crate) composites: Vec<OnceCell<CompositeRelation>>,
    pub(crate) parametrization: Option<Parametrization>,
    pub(crate) product: Option<ProductStructure>,
}

static_assertions::assert_impl_all!(Topology: Send, Sync);

impl Topology {
    /// Wire up the relation graph of already validated parts.
    pub(crate) fn assemble(
        dimension: usize,
        base: Base,
        entity_sets: Vec<EntitySet>,
        maps: Vec<ReferenceElementMap>,
        parametrization: Option<Parametrization>,
        product: Option<ProductStructure>,
    ) -> Self {
        let n = entity_sets.len();
        let mut cone_entries: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        let mut support_maps: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (m, map) in maps.iter().enumerate() {
            support_maps[map.target().index()].push(m);
            cone_entries[map.source().index()]
                .extend((0..map.entries().len()).map(|e| (m, e)));
        }
        for entries in &mut cone_entries {
            entries.sort_by_key(|&(m, e)| maps[m].entries()[e].label);
        }

        // iterative closure over the cone graph
        let mut reach_down = Vec::with_capacity(n);
        for s in 0..n {
            let mut seen = FastSet::default();
            let mut stack = vec![EntitySetId::new(s)];
            while let Some(id) = stack.pop() {
                if seen.insert(id) {
                    stack.extend(
                        cone_entries[id.index()]
                            .iter()
                            .map(|&(m, _)| maps[m].target()),
                    );
                }
            }
            reach_down.push(seen);
        }

        log::debug!(
            "assembled {dimension}D topology: {} entity sets, {} maps, {} cone entries",
            n,
            maps.len(),
            cone_entries.iter().map(Vec::len).sum::<usize>()
        );
        Self {
            dimension,
            base,
            entity_sets,
            maps,
            cone_entries,
            support_maps,
            reach_down,
            composites: (0..n).map(|_| OnceCell::new()).collect(),
            parametrization,
            product,
        }
    }

    /// Topological dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn base(&self) -> &Base {
        &self.base
    }

    /// Shape of the macro element this topology structures.
    pub fn macro_cell(&self) -> CellType {
        match (&self.base, &self.product) {
            (_, Some(p)) => p.left.macro_cell().product(p.right.macro_cell()),
            (Base::Shape(c), None) => *c,
            (Base::Extruded(t), None) => t.macro_cell(),
        }
    }

    /// All classes in declared order.
    #[inline]
    pub fn all_entity_sets(&self) -> &[EntitySet] {
        &self.entity_sets
    }

    pub fn ids(&self) -> impl Iterator<Item = EntitySetId> + '_ {
        (0..self.entity_sets.len()).map(EntitySetId::new)
    }

    pub fn entity_set(&self, id: EntitySetId) -> Result<&EntitySet, MeshStructureError> {
        self.entity_sets
            .get(id.index())
            .ok_or(MeshStructureError::UnknownEntitySet(id))
    }

    pub fn codimension(&self, id: EntitySetId) -> Result<usize, MeshStructureError> {
        Ok(self.entity_set(id)?.codimension(self.dimension))
    }

    /// Classes of codimension `codim`, optionally with tag `tag`, in
    /// declared order.
    pub fn entity_sets(&self, codim: usize, tag: Option<&str>) -> Vec<EntitySetId> {
        self.ids()
            .filter(|id| {
                let set = &self.entity_sets[id.index()];
                set.codimension(self.dimension) == codim
                    && tag.is_none_or(|t| set.tag().as_str() == t)
            })
            .collect()
    }

    /// The unique class matching `(codim, tag)`.
    pub fn entity_set_by_codim(
        &self,
        codim: usize,
        tag: Option<&str>,
    ) -> Result<EntitySetId, MeshStructureError> {
        let found = self.entity_sets(codim, tag);
        match found.as_slice() {
            [id] => Ok(*id),
            [] => Err(MeshStructureError::NoSuchEntitySet {
                codimension: codim,
                tag: tag.map(String::from),
            }),
            many => Err(MeshStructureError::AmbiguousTag {
                codimension: codim,
                tag: tag.map(String::from),
                count: many.len(),
            }),
        }
    }

    /// The unique vertex class.
    pub fn vertex_set(&self) -> Result<EntitySetId, MeshStructureError> {
        self.entity_set_by_codim(self.dimension, None)
    }

    #[inline]
    pub fn maps(&self) -> &[ReferenceElementMap] {
        &self.maps
    }

    /// The stored map `source -> target`, if the classes are adjacent.
    pub fn map(&self, source: EntitySetId, target: EntitySetId) -> Option<&ReferenceElementMap> {
        self.cone_entries
            .get(source.index())?
            .iter()
            .map(|&(m, _)| &self.maps[m])
            .find(|m| m.target() == target)
    }

    /// Number of local boundary entities of one entity of `id`.
    pub fn cone_size(&self, id: EntitySetId) -> usize {
        self.cone_entries.get(id.index()).map_or(0, Vec::len)
    }

    /// Maps into `id`, in declared order.
    pub fn support_maps(&self, id: EntitySetId) -> impl Iterator<Item = &ReferenceElementMap> {
        self.support_maps
            .get(id.index())
            .into_iter()
            .flatten()
            .map(|&m| &self.maps[m])
    }

    /// Whether `to` is reachable from `from` by cone steps.
    pub fn reaches(&self, from: EntitySetId, to: EntitySetId) -> bool {
        self.reach_down
            .get(from.index())
            .is_some_and(|s| s.contains(&to))
    }

    /// Map from vertex indices to macro-element reference coordinates.
    pub fn parametrization(&self) -> Option<&Parametrization> {
        self.parametrization.as_ref()
    }

    /// The product class `left x right`, for product topologies.
    pub fn product_of(&self, left: EntitySetId, right: EntitySetId) -> Option<EntitySetId> {
        let p = self.product.as_ref()?;
        p.pairs
            .iter()
            .position(|&pair| pair == (left, right))
            .map(EntitySetId::new)
    }

    /// The factor classes of product class `id`.
    pub fn factors_of(&self, id: EntitySetId) -> Option<(EntitySetId, EntitySetId)> {
        self.product.as_ref()?.pairs.get(id.index()).copied()
    }

    /// Factor topologies of a product topology.
    pub fn factor_topologies(&self) -> Option<(&Arc<Topology>, &Arc<Topology>)> {
        self.product.as_ref().map(|p| (&p.left, &p.right))
    }

    /// Validate a query multiindex: known class, arity, and membership when
    /// every component is concrete.
    pub(crate) fn check<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<&EntitySet, MeshStructureError> {
        let set = self.entity_set(mi.entity_set())?;
        set.polyhedral_set().check_arity(mi.index().len())?;
        if let Some(point) = mi.as_concrete() {
            set.require(&point)?;
        }
        Ok(set)
    }

    /// Cached composite relation of `source`.
    pub(crate) fn composite(&self, source: EntitySetId) -> &CompositeRelation {
        static EMPTY: CompositeRelation = CompositeRelation { levels: Vec::new() };
        match self.composites.get(source.index()) {
            Some(cell) => cell.get_or_init(|| self.compose_all(source)),
            None => &EMPTY,
        }
    }

    /// Breadth-first composition of every cone path starting at `source`.
    fn compose_all(&self, source: EntitySetId) -> CompositeRelation {
        let axes = self.entity_sets[source.index()].axes();
        let mut levels = vec![vec![CompositeNode {
            set: source,
            components: (0..axes).map(Component::identity).collect(),
            parents: Vec::new(),
        }]];
        loop {
            let current = &levels[levels.len() - 1];
            let mut next: Vec<CompositeNode> = Vec::new();
            let mut position: HashMap<(EntitySetId, Vec<Component>), usize> = HashMap::new();
            for (p, node) in current.iter().enumerate() {
                for &(m, e) in &self.cone_entries[node.set.index()] {
                    let map = &self.maps[m];
                    let entry = &map.entries()[e];
                    let Some(components) = compose_components(&entry.components, &node.components)
                    else {
                        continue;
                    };
                    let key = (map.target(), components);
                    match position.get(&key) {
                        Some(&k) => {
                            if !next[k].parents.contains(&p) {
                                next[k].parents.push(p);
                            }
                        }
                        None => {
                            position.insert(key.clone(), next.len());
                            next.push(CompositeNode {
                                set: key.0,
                                components: key.1,
                                parents: vec![p],
                            });
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            levels.push(next);
        }
        log::debug!(
            "composite relation of {} ({}): {} levels, {} nodes",
            source,
            self.entity_sets[source.index()].tag(),
            levels.len(),
            levels.iter().map(Vec::len).sum::<usize>()
        );
        CompositeRelation { levels }
    }
}

impl DebugInvariants for Topology {
    const DESCRIPTOR: &'static str = "Topology";

    fn validate_invariants(&self) -> Result<(), MeshStructureError> {
        let n = self.entity_sets.len();
        if self.cone_entries.len() != n
            || self.support_maps.len() != n
            || self.reach_down.len() != n
            || self.composites.len() != n
        {
            return Err(MeshStructureError::MalformedMap(format!(
                "relation tables do not cover the {n} entity sets"
            )));
        }
        if let Some(set) = self.entity_sets.iter().find(|s| s.dimension() > self.dimension) {
            return Err(MeshStructureError::MalformedMap(format!(
                "entity set `{}` has dimension {} > {}",
                set.tag(),
                set.dimension(),
                self.dimension
            )));
        }
        validate_each(self.entity_sets.iter().map(EntitySet::polyhedral_set))?;
        validate_each(&self.maps)?;
        for map in &self.maps {
            let source = self.entity_set(map.source())?;
            let target = self.entity_set(map.target())?;
            if source.dimension() != target.dimension() + 1 {
                return Err(MeshStructureError::MalformedMap(format!(
                    "map `{}` -> `{}` spans dimensions {} -> {}",
                    source.tag(),
                    target.tag(),
                    source.dimension(),
                    target.dimension()
                )));
            }
        }
        match &self.product {
            Some(p) if p.pairs.len() != n => Err(MeshStructureError::MalformedMap(format!(
                "{} factor pairs for {n} product classes",
                p.pairs.len()
            ))),
            _ => Ok(()),
        }
    }
}
