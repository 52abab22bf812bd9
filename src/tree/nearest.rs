use crate::error::Result;
use crate::geometry::{AxisAlignedBoundingBox, Distance, GeometryCollection};
use crate::mesh::Mesh;
use crate::tree::query::get_geometry;
use crate::tree::{BoundingBoxTree, NodeKind};
use crate::Real;
use log::trace;
use meshtree_traits::allocators::DimAllocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::convert::Infallible;

/// Entry of the search queue, ordered so that `BinaryHeap` pops the smallest lower bound first.
#[derive(Debug, Copy, Clone)]
struct QueueEntry<T> {
    dist2_lower_bound: T,
    node: usize,
}

impl<T: Real> PartialEq for QueueEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Real> Eq for QueueEntry<T> {}

impl<T: Real> PartialOrd for QueueEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Real> Ord for QueueEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, since BinaryHeap is a max-heap
        other
            .dist2_lower_bound
            .partial_cmp(&self.dist2_lower_bound)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<T, D> BoundingBoxTree<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Computes the entity closest to the point, together with its exact distance.
    ///
    /// If several entities are equally close, the one with the lowest index is returned.
    /// Returns `None` only if the tree is empty.
    pub fn compute_closest_entity<C>(&self, point: &OPoint<T, D>, entities: &C) -> Result<Option<(usize, T)>>
    where
        C: GeometryCollection + ?Sized,
        C::Geometry: Distance<T, OPoint<T, D>>,
    {
        self.check_collection_matches_tree(entities)?;
        self.find_closest(point, |entity, _| -> Result<T> { Ok(get_geometry(entities, entity)?.distance(point)) })
    }

    /// Computes the entity of `mesh` closest to the point, with entities resolved as in
    /// [`compute_entity_collisions_in_mesh`](Self::compute_entity_collisions_in_mesh).
    pub fn compute_closest_entity_in_mesh(
        &self,
        point: &OPoint<T, D>,
        mesh: &Mesh<T, D>,
    ) -> Result<Option<(usize, T)>> {
        self.compute_closest_entity(point, &self.mesh_entities(mesh)?)
    }

    /// Computes the entity whose bounding box is closest to the point, together with the
    /// distance to the box.
    ///
    /// For a tree built with [`from_points`](Self::from_points) this is the closest point of the
    /// point cloud and its exact distance. Ties are broken by lowest entity index.
    pub fn compute_closest_point(&self, point: &OPoint<T, D>) -> Option<(usize, T)> {
        let closest = self.find_closest(point, |_, bounding_box| {
            Ok::<_, Infallible>(bounding_box.dist2_to(point).sqrt())
        });
        match closest {
            Ok(closest) => closest,
            Err(never) => match never {},
        }
    }

    /// Computes [`compute_closest_entity`](Self::compute_closest_entity) for each point in
    /// parallel.
    pub fn compute_closest_entities<C>(
        &self,
        points: &[OPoint<T, D>],
        entities: &C,
    ) -> Result<Vec<Option<(usize, T)>>>
    where
        C: GeometryCollection + Sync + ?Sized,
        C::Geometry: Distance<T, OPoint<T, D>>,
        OVector<T, D>: Sync,
    {
        points
            .par_iter()
            .map(|point| self.compute_closest_entity(point, entities))
            .collect()
    }

    /// Best-first search for the leaf with the smallest distance as computed by
    /// `leaf_distance`, which is given the entity and the box of the leaf.
    ///
    /// The squared box distance must be a lower bound for the squared leaf distance.
    fn find_closest<E, F>(
        &self,
        point: &OPoint<T, D>,
        mut leaf_distance: F,
    ) -> std::result::Result<Option<(usize, T)>, E>
    where
        F: FnMut(usize, &AxisAlignedBoundingBox<T, D>) -> std::result::Result<T, E>,
    {
        let Some(root) = self.root() else {
            return Ok(None);
        };

        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry {
            dist2_lower_bound: self.node(root).bounding_box.dist2_to(point),
            node: root,
        });

        let mut closest: Option<(usize, T)> = None;
        let mut num_visited_nodes = 0;
        let mut num_visited_leaves = 0;
        while let Some(QueueEntry { dist2_lower_bound, node }) = queue.pop() {
            if let Some((_, distance)) = closest {
                // Everything left in the queue is provably farther away. Compared as distances,
                // since squaring the best distance may round below an equal lower bound.
                if dist2_lower_bound.sqrt() > distance {
                    break;
                }
            }

            num_visited_nodes += 1;
            let node = self.node(node);
            match node.kind {
                NodeKind::Leaf { entity } => {
                    num_visited_leaves += 1;
                    let distance = leaf_distance(entity, &node.bounding_box)?;
                    let is_closer = match closest {
                        None => true,
                        Some((closest_entity, closest_distance)) => {
                            distance < closest_distance || (distance == closest_distance && entity < closest_entity)
                        }
                    };
                    if is_closer {
                        closest = Some((entity, distance));
                    }
                }
                NodeKind::Internal { children } => {
                    for child in children {
                        queue.push(QueueEntry {
                            dist2_lower_bound: self.node(child).bounding_box.dist2_to(point),
                            node: child,
                        });
                    }
                }
            }
        }

        trace!(
            "Closest entity search visited {} of {} nodes ({} leaves).",
            num_visited_nodes,
            self.num_nodes(),
            num_visited_leaves
        );
        Ok(closest)
    }
}
