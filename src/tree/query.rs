use crate::error::{Error, Result};
use crate::geometry::{Distance, GeometryCollection};
use crate::mesh::Mesh;
use crate::tree::{BoundingBoxTree, NodeKind};
use crate::Real;
use log::warn;
use meshtree_traits::allocators::DimAllocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector};
use rayon::prelude::*;

impl<T, D> BoundingBoxTree<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Computes all entities whose bounding box contains the point.
    ///
    /// The entities are returned in ascending order.
    pub fn compute_collisions(&self, point: &OPoint<T, D>) -> Vec<usize> {
        let mut entities = Vec::new();
        self.visit_point_collisions(point, |entity| {
            entities.push(entity);
            false
        });
        entities.sort_unstable();
        entities
    }

    /// Computes some entity whose bounding box contains the point, if any.
    ///
    /// Which entity is returned when several boxes contain the point is unspecified.
    pub fn compute_first_collision(&self, point: &OPoint<T, D>) -> Option<usize> {
        let mut first = None;
        self.visit_point_collisions(point, |entity| {
            first = Some(entity);
            true
        });
        first
    }

    /// Computes all entities that contain the point.
    ///
    /// Unlike [`compute_collisions`](Self::compute_collisions), candidates are checked against
    /// the exact geometry of the entities, which must be given by `entities`.
    pub fn compute_entity_collisions<C>(&self, point: &OPoint<T, D>, entities: &C) -> Result<Vec<usize>>
    where
        C: GeometryCollection + ?Sized,
        C::Geometry: Distance<T, OPoint<T, D>>,
    {
        self.check_collection_matches_tree(entities)?;
        let tolerance = self.geometry_tolerance();
        let mut result = Vec::new();
        let mut error = None;
        self.visit_point_collisions(point, |entity| {
            match contains_point(entities, entity, point, tolerance) {
                Ok(true) => result.push(entity),
                Ok(false) => {}
                Err(err) => error = Some(err),
            }
            error.is_some()
        });
        if let Some(err) = error {
            return Err(err);
        }
        result.sort_unstable();
        Ok(result)
    }

    /// Computes some entity that contains the point, if any.
    pub fn compute_first_entity_collision<C>(&self, point: &OPoint<T, D>, entities: &C) -> Result<Option<usize>>
    where
        C: GeometryCollection + ?Sized,
        C::Geometry: Distance<T, OPoint<T, D>>,
    {
        self.check_collection_matches_tree(entities)?;
        let tolerance = self.geometry_tolerance();
        let mut result = Ok(None);
        self.visit_point_collisions(point, |entity| match contains_point(entities, entity, point, tolerance) {
            Ok(false) => false,
            Ok(true) => {
                result = Ok(Some(entity));
                true
            }
            Err(err) => {
                result = Err(err);
                true
            }
        });
        result
    }

    /// Computes all entities of `mesh` that contain the point.
    ///
    /// The entities are those of the dimension the tree was built for, see
    /// [`Mesh::entities`]. Edges and faces are recomputed on every call, so prefer
    /// [`compute_entity_collisions`](Self::compute_entity_collisions) with precomputed
    /// entities for repeated queries on them.
    pub fn compute_entity_collisions_in_mesh(&self, point: &OPoint<T, D>, mesh: &Mesh<T, D>) -> Result<Vec<usize>> {
        self.compute_entity_collisions(point, &self.mesh_entities(mesh)?)
    }

    pub fn compute_first_entity_collision_in_mesh(
        &self,
        point: &OPoint<T, D>,
        mesh: &Mesh<T, D>,
    ) -> Result<Option<usize>> {
        self.compute_first_entity_collision(point, &self.mesh_entities(mesh)?)
    }

    /// Computes all pairs `(a, b)` of entities of this tree and `other` with overlapping boxes.
    ///
    /// The pairs are returned in ascending lexicographic order. Box tests use the tolerance of
    /// this tree's options, relative to the larger scale of the two trees.
    pub fn compute_collisions_with_tree(&self, other: &BoundingBoxTree<T, D>) -> Vec<(usize, usize)> {
        let (Some(root_a), Some(root_b)) = (self.root(), other.root()) else {
            return Vec::new();
        };

        let tolerance = self.options.box_tolerance * T::max(self.scale, other.scale);
        let mut pairs = Vec::new();
        let mut stack = vec![(root_a, root_b)];
        while let Some((a, b)) = stack.pop() {
            let node_a = self.node(a);
            let node_b = other.node(b);
            if !node_a
                .bounding_box
                .intersects_with_tolerance(&node_b.bounding_box, tolerance)
            {
                continue;
            }

            match (node_a.kind, node_b.kind) {
                (NodeKind::Leaf { entity: entity_a }, NodeKind::Leaf { entity: entity_b }) => {
                    pairs.push((entity_a, entity_b))
                }
                (NodeKind::Leaf { .. }, NodeKind::Internal { children }) => {
                    stack.extend(children.map(|child| (a, child)));
                }
                (NodeKind::Internal { children }, NodeKind::Leaf { .. }) => {
                    stack.extend(children.map(|child| (child, b)));
                }
                (NodeKind::Internal { children: children_a }, NodeKind::Internal { children: children_b }) => {
                    // Expand the node with the larger box, the node of this tree on ties
                    if node_a.bounding_box.volume() >= node_b.bounding_box.volume() {
                        stack.extend(children_a.map(|child| (child, b)));
                    } else {
                        stack.extend(children_b.map(|child| (a, child)));
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }

    /// Computes all pairs `(a, b)` of intersecting entities of this tree and `other`.
    ///
    /// Candidate pairs from [`compute_collisions_with_tree`](Self::compute_collisions_with_tree)
    /// are checked against the exact geometry of the entities, given by `entities_a` for this
    /// tree and `entities_b` for `other`.
    pub fn compute_entity_collisions_with_tree<CA, CB>(
        &self,
        other: &BoundingBoxTree<T, D>,
        entities_a: &CA,
        entities_b: &CB,
    ) -> Result<Vec<(usize, usize)>>
    where
        CA: GeometryCollection + ?Sized,
        CB: GeometryCollection + ?Sized,
        CA::Geometry: Distance<T, CB::Geometry>,
    {
        self.check_collection_matches_tree(entities_a)?;
        other.check_collection_matches_tree(entities_b)?;

        let tolerance = self.options.geometry_tolerance * T::max(self.scale, other.scale);
        let mut pairs = Vec::new();
        for (a, b) in self.compute_collisions_with_tree(other) {
            let geometry_a = get_geometry(entities_a, a)?;
            let geometry_b = get_geometry(entities_b, b)?;
            if geometry_a.distance(&geometry_b) <= tolerance {
                pairs.push((a, b));
            }
        }
        Ok(pairs)
    }

    /// Computes all pairs `(a, b)` of intersecting entities of this tree over `mesh_a` and
    /// `other` over `mesh_b`, with entities resolved as in
    /// [`compute_entity_collisions_in_mesh`](Self::compute_entity_collisions_in_mesh).
    pub fn compute_entity_collisions_with_tree_in_meshes(
        &self,
        other: &BoundingBoxTree<T, D>,
        mesh_a: &Mesh<T, D>,
        mesh_b: &Mesh<T, D>,
    ) -> Result<Vec<(usize, usize)>> {
        let entities_a = self.mesh_entities(mesh_a)?;
        let entities_b = other.mesh_entities(mesh_b)?;
        self.compute_entity_collisions_with_tree(other, &entities_a, &entities_b)
    }

    /// Computes [`compute_collisions`](Self::compute_collisions) for each point in parallel.
    pub fn compute_collisions_for_points(&self, points: &[OPoint<T, D>]) -> Vec<Vec<usize>>
    where
        OVector<T, D>: Sync,
    {
        points
            .par_iter()
            .map(|point| self.compute_collisions(point))
            .collect()
    }

    /// Depth-first traversal over all leaves whose box contains the point.
    ///
    /// The traversal stops as soon as `visit` returns `true`.
    fn visit_point_collisions(&self, point: &OPoint<T, D>, mut visit: impl FnMut(usize) -> bool) {
        let tolerance = self.box_tolerance();
        let mut stack: Vec<usize> = self.root().into_iter().collect();
        while let Some(index) = stack.pop() {
            let node = self.node(index);
            if !node
                .bounding_box
                .contains_point_with_tolerance(point, tolerance)
            {
                continue;
            }

            match node.kind {
                NodeKind::Leaf { entity } => {
                    if visit(entity) {
                        return;
                    }
                }
                // Push the second child first, so that the first child is visited first
                NodeKind::Internal { children: [first, second] } => stack.extend([second, first]),
            }
        }
    }

    /// Checks that the collection holds entities of the tree's dimension and that every
    /// entity of the tree has a geometry in the collection.
    pub(crate) fn check_collection_matches_tree<C>(&self, collection: &C) -> Result<()>
    where
        C: GeometryCollection + ?Sized,
    {
        if let (Some(tree_dim), Some(collection_dim)) = (self.entity_dim, collection.entity_dim()) {
            if tree_dim != collection_dim {
                return Err(Error::EntityDimensionMismatch {
                    tree_dim,
                    collection_dim,
                });
            }
        }

        let num_geometries = collection.num_geometries();
        if num_geometries < self.num_entities {
            return Err(Error::EntityOutOfBounds {
                entity: num_geometries,
                num_entities: num_geometries,
            });
        }
        if num_geometries > self.num_entities {
            warn!(
                "Geometry collection has {} entities, but the tree only has {}. Extra entities are ignored.",
                num_geometries, self.num_entities
            );
        }
        Ok(())
    }
}

pub(crate) fn get_geometry<C>(collection: &C, entity: usize) -> Result<C::Geometry>
where
    C: GeometryCollection + ?Sized,
{
    collection
        .get_geometry(entity)
        .ok_or(Error::EntityOutOfBounds {
            entity,
            num_entities: collection.num_geometries(),
        })
}

fn contains_point<T, D, C>(collection: &C, entity: usize, point: &OPoint<T, D>, tolerance: T) -> Result<bool>
where
    T: Real,
    D: DimName,
    C: GeometryCollection + ?Sized,
    C::Geometry: Distance<T, OPoint<T, D>>,
    DefaultAllocator: DimAllocator<T, D>,
{
    Ok(get_geometry(collection, entity)?.distance(point) <= tolerance)
}
