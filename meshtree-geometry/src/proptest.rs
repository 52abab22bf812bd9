//! Proptest strategies for geometric primitives.
use crate::{AxisAlignedBoundingBox, Simplex, MAX_SIMPLEX_VERTICES};
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector};
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use std::ops::Range;

/// Coordinate range used by the default strategies.
///
/// Pick a reasonably small range to pick coordinates from, otherwise we can easily get
/// floating point numbers that are so ridiculously large as to break anything we might
/// want to do with them.
pub fn default_coordinate_range() -> Range<f64> {
    -10.0..10.0
}

pub fn point_in<D>(range: Range<f64>) -> impl Strategy<Value = OPoint<f64, D>>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    vec(range, D::dim()).prop_map(|coords| OPoint::from(OVector::<f64, D>::from_iterator(coords)))
}

pub fn point<D>() -> impl Strategy<Value = OPoint<f64, D>>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    point_in(default_coordinate_range())
}

pub fn aabb<D>() -> impl Strategy<Value = AxisAlignedBoundingBox<f64, D>>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    (point::<D>(), point::<D>()).prop_map(|(a, b)| {
        let min = a.coords.zip_map(&b.coords, f64::min);
        let max = a.coords.zip_map(&b.coords, f64::max);
        AxisAlignedBoundingBox::new(min, max)
    })
}

/// Simplices with between one and four vertices drawn from the given coordinate range.
pub fn simplex_in<D>(range: Range<f64>) -> impl Strategy<Value = Simplex<f64, D>>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    vec(point_in::<D>(range), 1..=MAX_SIMPLEX_VERTICES).prop_map(|vertices| Simplex::from_vertices(&vertices))
}

pub fn simplex<D>() -> impl Strategy<Value = Simplex<f64, D>>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    simplex_in(default_coordinate_range())
}
