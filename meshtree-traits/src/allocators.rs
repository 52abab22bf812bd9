//! Helper traits for allocator trait bounds.
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Scalar};

/// An allocator for points and vectors in the ambient dimension `D`.
pub trait DimAllocator<T: Scalar, D: DimName>: Allocator<T, D> {}

impl<T, D> DimAllocator<T, D> for DefaultAllocator
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
}
