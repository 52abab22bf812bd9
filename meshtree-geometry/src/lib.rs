use meshtree_traits::allocators::DimAllocator;
use meshtree_traits::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector, Scalar, U1, U2, U3};
use serde::{Deserialize, Serialize};

mod simplex;
pub use simplex::*;

pub mod gjk;

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub trait BoundedGeometry<T>
where
    T: Scalar,
    DefaultAllocator: Allocator<T, Self::Dimension>,
{
    type Dimension: DimName;

    fn bounding_box(&self) -> AxisAlignedBoundingBox<T, Self::Dimension>;
}

pub trait Distance<T, QueryGeometry>
where
    T: Scalar,
{
    fn distance(&self, query_geometry: &QueryGeometry) -> T;
}

/// A collection of geometries addressed by contiguous indices `0 .. num_geometries()`.
pub trait GeometryCollection {
    type Geometry;

    fn num_geometries(&self) -> usize;
    fn get_geometry(&self, index: usize) -> Option<Self::Geometry>;

    /// The topological dimension shared by all geometries, if the collection holds the
    /// entities of a single dimension of a mesh.
    ///
    /// Queries use it to reject collections that do not describe the entities a tree was
    /// built over. `None` disables the check.
    fn entity_dim(&self) -> Option<usize> {
        None
    }
}

impl<G: Clone> GeometryCollection for [G] {
    type Geometry = G;

    fn num_geometries(&self) -> usize {
        self.len()
    }

    fn get_geometry(&self, index: usize) -> Option<G> {
        self.get(index).cloned()
    }
}

impl<G: Clone> GeometryCollection for Vec<G> {
    type Geometry = G;

    fn num_geometries(&self) -> usize {
        self.len()
    }

    fn get_geometry(&self, index: usize) -> Option<G> {
        self.get(index).cloned()
    }
}

impl<'a, C> GeometryCollection for &'a C
where
    C: GeometryCollection + ?Sized,
{
    type Geometry = C::Geometry;

    fn num_geometries(&self) -> usize {
        C::num_geometries(self)
    }

    fn get_geometry(&self, index: usize) -> Option<Self::Geometry> {
        C::get_geometry(self, index)
    }

    fn entity_dim(&self) -> Option<usize> {
        C::entity_dim(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OVector<T, D>: Serialize",
    deserialize = "OVector<T, D>: Deserialize<'de>"
))]
pub struct AxisAlignedBoundingBox<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    min: OVector<T, D>,
    max: OVector<T, D>,
}

impl<T, D> Copy for AxisAlignedBoundingBox<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    OVector<T, D>: Copy,
{
}

pub type AxisAlignedBoundingBox1d<T> = AxisAlignedBoundingBox<T, U1>;
pub type AxisAlignedBoundingBox2d<T> = AxisAlignedBoundingBox<T, U2>;
pub type AxisAlignedBoundingBox3d<T> = AxisAlignedBoundingBox<T, U3>;

impl<T, D> AxisAlignedBoundingBox<T, D>
where
    T: Scalar + PartialOrd,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn new(min: OVector<T, D>, max: OVector<T, D>) -> Self {
        for i in 0..D::dim() {
            assert!(min[i] <= max[i], "Box must satisfy min <= max along every axis.");
        }
        Self { min, max }
    }

    pub fn min(&self) -> &OVector<T, D> {
        &self.min
    }

    pub fn max(&self) -> &OVector<T, D> {
        &self.max
    }
}

impl<T, D> From<OPoint<T, D>> for AxisAlignedBoundingBox<T, D>
where
    T: Scalar + PartialOrd,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn from(point: OPoint<T, D>) -> Self {
        AxisAlignedBoundingBox::new(point.coords.clone(), point.coords)
    }
}

impl<T, D> AxisAlignedBoundingBox<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Computes the minimal bounding box which encloses both `this` and `other`.
    pub fn enclose(&self, other: &AxisAlignedBoundingBox<T, D>) -> Self {
        let min = self.min.zip_map(&other.min, T::min);
        let max = self.max.zip_map(&other.max, T::max);
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a OPoint<T, D>>) -> Option<Self> {
        let mut points = points.into_iter();
        points.next().map(|first_point| {
            points.fold(AxisAlignedBoundingBox::from(first_point.clone()), |aabb, point| {
                aabb.enclose(&AxisAlignedBoundingBox::from(point.clone()))
            })
        })
    }

    pub fn extents(&self) -> OVector<T, D> {
        &self.max - &self.min
    }

    pub fn max_extent(&self) -> T {
        self.extents().max()
    }

    /// The product of the extents along all axes.
    ///
    /// Zero for boxes that are flat along at least one axis.
    pub fn volume(&self) -> T {
        self.extents().product()
    }

    pub fn center(&self) -> OPoint<T, D> {
        OPoint::from((&self.max + &self.min) * T::from_f64(0.5).unwrap())
    }

    /// Strict interior test. Points on the boundary are *not* contained.
    pub fn contains_point(&self, point: &OPoint<T, D>) -> bool {
        (0..D::dim()).all(|dim| point[dim] > self.min[dim] && point[dim] < self.max[dim])
    }

    /// Closed containment test, with every interval widened by `tolerance`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use meshtree_geometry::AxisAlignedBoundingBox;
    /// # use nalgebra::{point, vector};
    /// let aabb = AxisAlignedBoundingBox::new(vector![0.0, 0.0], vector![1.0, 1.0]);
    /// assert!(aabb.contains_point_with_tolerance(&point![1.0, 0.5], 0.0));
    /// assert!(!aabb.contains_point_with_tolerance(&point![1.1, 0.5], 0.05));
    /// assert!(aabb.contains_point_with_tolerance(&point![1.1, 0.5], 0.2));
    /// ```
    pub fn contains_point_with_tolerance(&self, point: &OPoint<T, D>, tolerance: T) -> bool {
        (0..D::dim()).all(|dim| point[dim] >= self.min[dim] - tolerance && point[dim] <= self.max[dim] + tolerance)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.intersects_with_tolerance(other, T::zero())
    }

    /// Closed overlap test, with every interval widened by `tolerance`.
    pub fn intersects_with_tolerance(&self, other: &Self, tolerance: T) -> bool {
        (0..D::dim()).all(|i| {
            intervals_intersect(
                [self.min[i] - tolerance, self.max[i] + tolerance],
                [other.min[i], other.max[i]],
            )
        })
    }

    /// Squared Euclidean distance from the point to the box, zero if the point is inside.
    ///
    /// Never larger than the squared distance to any geometry enclosed by the box.
    pub fn dist2_to(&self, point: &OPoint<T, D>) -> T {
        let mut dist2 = T::zero();
        for i in 0..D::dim() {
            let below = self.min[i] - point[i];
            let above = point[i] - self.max[i];
            let d = T::max(T::max(below, above), T::zero());
            dist2 += d * d;
        }
        dist2
    }

    /// Grows the bounding box by `distance` in all directions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use meshtree_geometry::AxisAlignedBoundingBox;
    /// # use nalgebra::vector;
    /// let aabb = AxisAlignedBoundingBox::new(vector![0.0, 0.0], vector![1.0, 1.0]);
    /// let grown = aabb.grow_uniformly(1.0);
    /// assert_eq!(grown.min(), &vector![-1.0, -1.0]);
    /// assert_eq!(grown.max(), &vector![2.0, 2.0]);
    /// ```
    ///
    pub fn grow_uniformly(&self, distance: T) -> Self {
        let min = self.min().map(|b_i| b_i - distance);
        let max = self.max().map(|b_i| b_i + distance);
        Self::new(min, max)
    }
}

fn intervals_intersect<T: Real>([l1, u1]: [T; 2], [l2, u2]: [T; 2]) -> bool {
    l2 <= u1 && u2 >= l1
}

impl<T, D> BoundedGeometry<T> for AxisAlignedBoundingBox<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    type Dimension = D;

    fn bounding_box(&self) -> AxisAlignedBoundingBox<T, D> {
        self.clone()
    }
}

impl<T, D> Distance<T, OPoint<T, D>> for AxisAlignedBoundingBox<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn distance(&self, point: &OPoint<T, D>) -> T {
        self.dist2_to(point).sqrt()
    }
}
