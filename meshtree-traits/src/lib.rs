use nalgebra::RealField;

pub use nalgebra;

/// Scalar type used for all geometric computations.
///
/// Trees are read concurrently, so the scalar must be shareable between threads.
pub trait Real: RealField + Copy + Send + Sync {}

impl<T: RealField + Copy + Send + Sync> Real for T {}

pub mod allocators;
