//! Axis-aligned bounding box trees over mesh entities.
//!
//! A [`BoundingBoxTree`] is a balanced binary hierarchy of axis-aligned bounding boxes, built
//! once over a fixed collection of entities (typically the vertices, edges, faces or cells of
//! a [`Mesh`]) and read-only afterwards. It answers
//!
//! - point collision queries ([`compute_collisions`](BoundingBoxTree::compute_collisions)
//!   and friends),
//! - collision queries between two trees
//!   ([`compute_collisions_with_tree`](BoundingBoxTree::compute_collisions_with_tree)),
//! - nearest entity queries ([`compute_closest_entity`](BoundingBoxTree::compute_closest_entity)).
//!
//! Queries on boxes only need the tree itself. Queries that are refined with the exact entity
//! geometry take the entities as an extra [`GeometryCollection`] argument, which must contain
//! (at least) the entities the tree was built over, with the same indices.
//!
//! # Tolerances
//!
//! Containment and overlap tests are closed and widened by a small tolerance, so that points
//! on a face shared by two entities are reported for both entities regardless of round-off.
//! The tolerances in [`TreeOptions`] are relative to the *scale* of the tree, the largest
//! extent of its root box.
use crate::error::{Error, Result};
use crate::geometry::{AxisAlignedBoundingBox, BoundedGeometry, GeometryCollection};
use crate::mesh::{Mesh, MeshEntities};
use crate::Real;
use log::debug;
use meshtree_traits::allocators::DimAllocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

mod nearest;
mod query;

/// Tolerances used by tree queries, relative to the scale of the tree.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeOptions<T> {
    /// Slack for box containment and box overlap tests.
    pub box_tolerance: T,
    /// Slack for the exact point-in-entity and entity-entity intersection tests.
    pub geometry_tolerance: T,
}

impl<T: Real> Default for TreeOptions<T> {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn default() -> Self {
        Self {
            box_tolerance: 1e-14,
            geometry_tolerance: 1e-12,
        }
    }
}

impl<T> TreeOptions<T> {
    pub fn with_box_tolerance(self, box_tolerance: T) -> Self {
        Self { box_tolerance, ..self }
    }

    pub fn with_geometry_tolerance(self, geometry_tolerance: T) -> Self {
        Self {
            geometry_tolerance,
            ..self
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Leaf { entity: usize },
    Internal { children: [usize; 2] },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    pub(crate) bounding_box: AxisAlignedBoundingBox<T, D>,
    pub(crate) kind: NodeKind,
}

/// A balanced hierarchy of axis-aligned bounding boxes over a fixed collection of entities.
///
/// Nodes are stored in a flat arena and refer to their children by index. Every internal
/// node has exactly two children and its box is the union of the boxes of its children.
/// Every leaf holds a single entity and its box is the exact bounding box of that entity.
#[derive(Debug, Clone)]
pub struct BoundingBoxTree<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    nodes: Vec<Node<T, D>>,
    root: Option<usize>,
    num_entities: usize,
    entity_dim: Option<usize>,
    options: TreeOptions<T>,
    scale: T,
}

impl<T, D> BoundingBoxTree<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Builds a tree over the entities of dimension `dim` of the mesh, with default options.
    pub fn build(mesh: &Mesh<T, D>, dim: usize) -> Result<Self> {
        Self::build_with_options(mesh, dim, TreeOptions::default())
    }

    pub fn build_with_options(mesh: &Mesh<T, D>, dim: usize, options: TreeOptions<T>) -> Result<Self> {
        let entities = mesh.entities(dim)?;
        Self::from_geometry_collection(&entities, options)
    }

    /// Builds a tree over all geometries in the collection.
    ///
    /// Entity `i` of the tree is geometry `i` of the collection. The tree takes over the
    /// entity dimension of the collection, if it has one.
    pub fn from_geometry_collection<C>(collection: &C, options: TreeOptions<T>) -> Result<Self>
    where
        C: GeometryCollection + ?Sized,
        C::Geometry: BoundedGeometry<T, Dimension = D>,
    {
        let num_entities = collection.num_geometries();
        let boxes = (0..num_entities)
            .map(|entity| {
                collection
                    .get_geometry(entity)
                    .map(|geometry| geometry.bounding_box())
                    .ok_or(Error::EntityOutOfBounds { entity, num_entities })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut tree = Self::from_bounding_boxes(boxes, options);
        tree.entity_dim = collection.entity_dim();
        Ok(tree)
    }

    /// Builds a tree directly from entity bounding boxes, where entity `i` has box `boxes[i]`.
    pub fn from_bounding_boxes(boxes: Vec<AxisAlignedBoundingBox<T, D>>, options: TreeOptions<T>) -> Self {
        let num_entities = boxes.len();
        let centers: Vec<_> = boxes.iter().map(|b| b.center()).collect();
        let mut entities: Vec<usize> = (0..num_entities).collect();
        let mut nodes = Vec::with_capacity((2 * num_entities).saturating_sub(1));

        let root = if entities.is_empty() {
            None
        } else {
            Some(build_subtree(&boxes, &centers, &mut entities, &mut nodes))
        };
        let scale = root
            .map(|root| nodes[root].bounding_box.max_extent())
            .unwrap_or_else(T::zero);

        let tree = Self {
            nodes,
            root,
            num_entities,
            entity_dim: None,
            options,
            scale,
        };
        debug!(
            "Built bounding box tree with {} leaves, {} nodes and depth {}.",
            tree.num_entities(),
            tree.num_nodes(),
            tree.depth()
        );
        tree
    }

    /// Builds a tree over a point cloud, where entity `i` is `points[i]`.
    pub fn from_points(points: &[OPoint<T, D>], options: TreeOptions<T>) -> Self {
        let boxes = points
            .iter()
            .map(|p| AxisAlignedBoundingBox::from(p.clone()))
            .collect();
        Self::from_bounding_boxes(boxes, options)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The number of entities (leaves) in the tree.
    pub fn num_entities(&self) -> usize {
        self.num_entities
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The topological dimension of the mesh entities the tree was built over.
    ///
    /// `None` for trees built from boxes, points or collections without an entity dimension.
    pub fn entity_dim(&self) -> Option<usize> {
        self.entity_dim
    }

    pub fn options(&self) -> &TreeOptions<T> {
        &self.options
    }

    /// The largest extent of the root box, or zero for an empty tree.
    pub fn scale(&self) -> T {
        self.scale
    }

    pub fn root_bounding_box(&self) -> Option<&AxisAlignedBoundingBox<T, D>> {
        self.root.map(|root| &self.nodes[root].bounding_box)
    }

    /// The number of edges on the longest path from the root to a leaf.
    ///
    /// The tree is balanced, so this is `ceil(log2(n))` for `n` entities. Zero for trees
    /// with at most one entity.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|root| (root, 0)).into_iter().collect();
        while let Some((node, node_depth)) = stack.pop() {
            depth = depth.max(node_depth);
            if let NodeKind::Internal { children } = self.nodes[node].kind {
                stack.extend(children.map(|child| (child, node_depth + 1)));
            }
        }
        depth
    }

    /// Bounding boxes of all leaves, indexed by entity.
    pub fn entity_bounding_boxes(&self) -> Vec<AxisAlignedBoundingBox<T, D>> {
        let mut boxes = vec![None; self.num_entities];
        for node in &self.nodes {
            if let NodeKind::Leaf { entity } = node.kind {
                boxes[entity] = Some(node.bounding_box.clone());
            }
        }
        boxes.into_iter().flatten().collect()
    }

    /// The entities of `mesh` this tree refers to: those of the tree's entity dimension, or
    /// the cells if the tree was not built over mesh entities.
    pub(crate) fn mesh_entities<'a>(&self, mesh: &'a Mesh<T, D>) -> Result<MeshEntities<'a, T, D>> {
        mesh.entities(self.entity_dim.unwrap_or_else(|| mesh.cell_dim()))
    }

    pub(crate) fn root(&self) -> Option<usize> {
        self.root
    }

    pub(crate) fn node(&self, index: usize) -> &Node<T, D> {
        &self.nodes[index]
    }

    /// Absolute slack for box tests.
    pub(crate) fn box_tolerance(&self) -> T {
        self.options.box_tolerance * self.scale
    }

    /// Absolute slack for exact geometry tests.
    pub(crate) fn geometry_tolerance(&self) -> T {
        self.options.geometry_tolerance * self.scale
    }
}

/// Builds the subtree over `entities` and returns the index of its root node.
///
/// Nodes are appended to `nodes` in post-order, so the root of the whole tree is the last node.
fn build_subtree<T, D>(
    boxes: &[AxisAlignedBoundingBox<T, D>],
    centers: &[OPoint<T, D>],
    entities: &mut [usize],
    nodes: &mut Vec<Node<T, D>>,
) -> usize
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    debug_assert!(!entities.is_empty());
    if entities.len() == 1 {
        let entity = entities[0];
        nodes.push(Node {
            bounding_box: boxes[entity].clone(),
            kind: NodeKind::Leaf { entity },
        });
        return nodes.len() - 1;
    }

    let axis = split_axis(centers, entities);
    // The first half gets the ceil(m / 2) entities with smallest center coordinate
    let mid = (entities.len() + 1) / 2;
    entities.select_nth_unstable_by(mid, |&a, &b| {
        centers[a][axis]
            .partial_cmp(&centers[b][axis])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let (first, second) = entities.split_at_mut(mid);
    let left = build_subtree(boxes, centers, first, nodes);
    let right = build_subtree(boxes, centers, second, nodes);
    let bounding_box = nodes[left].bounding_box.enclose(&nodes[right].bounding_box);
    nodes.push(Node {
        bounding_box,
        kind: NodeKind::Internal { children: [left, right] },
    });
    nodes.len() - 1
}

/// The axis along which the entity centers are spread the most, lowest axis on ties.
fn split_axis<T, D>(centers: &[OPoint<T, D>], entities: &[usize]) -> usize
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    let first = &centers[entities[0]].coords;
    let (min, max) = entities[1..].iter().fold(
        (first.clone(), first.clone()),
        |(min, max): (OVector<T, D>, OVector<T, D>), &entity| {
            let c = &centers[entity].coords;
            (min.zip_map(c, T::min), max.zip_map(c, T::max))
        },
    );
    (max - min).imax()
}

/// Converts a raw coordinate slice into a point, checking that the number of coordinates
/// matches the dimension.
pub fn point_from_coordinates<T, D>(coordinates: &[T]) -> Result<OPoint<T, D>>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    if coordinates.len() != D::dim() {
        return Err(Error::DimensionMismatch {
            expected: D::dim(),
            actual: coordinates.len(),
        });
    }
    Ok(OPoint::from(OVector::<T, D>::from_column_slice(coordinates)))
}
