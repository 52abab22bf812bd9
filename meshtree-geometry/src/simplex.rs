use crate::gjk::{closest_points, ClosestPoints};
use crate::{AxisAlignedBoundingBox, BoundedGeometry, Distance};
use meshtree_traits::allocators::DimAllocator;
use meshtree_traits::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, Scalar};
use std::array;
use std::slice;

/// The largest number of vertices a [`Simplex`] can hold (a tetrahedron).
pub const MAX_SIMPLEX_VERTICES: usize = 4;

/// A vertex, segment, triangle or tetrahedron embedded in `D`-dimensional space.
///
/// The simplex is the convex hull of its vertices. Degenerate simplices (e.g. a triangle
/// with collinear vertices) are allowed and behave like the convex hull they span.
#[derive(Debug, Clone, PartialEq)]
pub struct Simplex<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    // Unused slots repeat the last vertex, which leaves the convex hull unchanged
    vertices: [OPoint<T, D>; MAX_SIMPLEX_VERTICES],
    num_vertices: usize,
}

impl<T, D> Copy for Simplex<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    OPoint<T, D>: Copy,
{
}

impl<T, D> Simplex<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// Construct a simplex from one to four vertices.
    ///
    /// # Panics
    ///
    /// Panics if `vertices` is empty or holds more than four vertices.
    pub fn from_vertices(vertices: &[OPoint<T, D>]) -> Self {
        let num_vertices = vertices.len();
        assert!(
            (1..=MAX_SIMPLEX_VERTICES).contains(&num_vertices),
            "A simplex must have between 1 and {} vertices, got {}.",
            MAX_SIMPLEX_VERTICES,
            num_vertices
        );
        let last = &vertices[num_vertices - 1];
        let vertices = array::from_fn(|i| vertices.get(i).unwrap_or(last).clone());
        Self { vertices, num_vertices }
    }

    /// Construct a simplex from the vertices referenced by `indices`.
    ///
    /// Returns `None` if any index is out of bounds.
    ///
    /// # Panics
    ///
    /// Panics if `indices` is empty or holds more than four indices.
    pub fn from_indexed_vertices(vertices: &[OPoint<T, D>], indices: &[usize]) -> Option<Self> {
        let num_vertices = indices.len();
        assert!(
            (1..=MAX_SIMPLEX_VERTICES).contains(&num_vertices),
            "A simplex must have between 1 and {} vertices, got {}.",
            MAX_SIMPLEX_VERTICES,
            num_vertices
        );
        if indices.iter().any(|&index| index >= vertices.len()) {
            return None;
        }
        let last = indices[num_vertices - 1];
        let vertices = array::from_fn(|i| vertices[indices.get(i).copied().unwrap_or(last)].clone());
        Some(Self { vertices, num_vertices })
    }

    pub fn from_point(point: OPoint<T, D>) -> Self {
        Self::from_vertices(slice::from_ref(&point))
    }

    pub fn vertices(&self) -> &[OPoint<T, D>] {
        &self.vertices[..self.num_vertices]
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Topological dimension: 0 for a vertex, 1 for a segment and so on.
    pub fn topological_dim(&self) -> usize {
        self.num_vertices - 1
    }
}

impl<T, D> Simplex<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    pub fn centroid(&self) -> OPoint<T, D> {
        let weight = T::one() / T::from_usize(self.num_vertices).unwrap();
        let mut centroid = OPoint::origin();
        for v in self.vertices() {
            centroid.coords += &v.coords * weight;
        }
        centroid
    }

    /// Closest points between this simplex and another, together with their distance.
    pub fn closest_points_to(&self, other: &Simplex<T, D>) -> ClosestPoints<T, D> {
        closest_points(self.vertices(), other.vertices()).expect("Simplices are never empty")
    }

    /// The point in the simplex closest to `point`.
    pub fn closest_point(&self, point: &OPoint<T, D>) -> OPoint<T, D> {
        closest_points(self.vertices(), slice::from_ref(point))
            .expect("Simplices are never empty")
            .point_a
    }

    /// Tests whether the point lies in the simplex, allowing it to be up to `tolerance` away.
    pub fn contains_point_with_tolerance(&self, point: &OPoint<T, D>, tolerance: T) -> bool {
        self.distance(point) <= tolerance
    }

    /// Tests whether the two simplices intersect, allowing a gap of at most `tolerance`.
    ///
    /// Simplices that only touch (e.g. share a vertex) intersect.
    pub fn intersects_with_tolerance(&self, other: &Simplex<T, D>, tolerance: T) -> bool {
        self.distance(other) <= tolerance
    }
}

impl<T, D> BoundedGeometry<T> for Simplex<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    type Dimension = D;

    fn bounding_box(&self) -> AxisAlignedBoundingBox<T, D> {
        AxisAlignedBoundingBox::from_points(self.vertices()).expect("Simplices are never empty")
    }
}

impl<T, D> Distance<T, OPoint<T, D>> for Simplex<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn distance(&self, point: &OPoint<T, D>) -> T {
        closest_points(self.vertices(), slice::from_ref(point))
            .expect("Simplices are never empty")
            .distance
    }
}

impl<T, D> Distance<T, Simplex<T, D>> for Simplex<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn distance(&self, other: &Simplex<T, D>) -> T {
        self.closest_points_to(other).distance
    }
}
