//! Proptest strategies for meshes and entity collections.
use crate::geometry::proptest::{point_in, simplex_in};
use crate::geometry::Simplex;
use crate::mesh::procedural::{create_unit_cube_mesh, create_unit_interval_mesh, create_unit_square_mesh};
use crate::mesh::{Mesh1d, Mesh2d, Mesh3d};
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Vector1, Vector2, Vector3};
use std::ops::Range;

/// Range used for translating generated meshes.
fn translation_range() -> Range<f64> {
    -1.0..1.0
}

/// Unit interval meshes with between 1 and `max_cells` cells, translated by a random offset.
pub fn interval_mesh(max_cells: usize) -> impl Strategy<Value = Mesh1d<f64>> {
    (1..=max_cells.max(1), translation_range()).prop_map(|(n, offset)| {
        let mut mesh = create_unit_interval_mesh(n);
        mesh.translate(&Vector1::new(offset));
        mesh
    })
}

/// Unit square triangle meshes with at most `max_cells_per_dim` squares along each axis,
/// translated by a random offset.
pub fn square_mesh(max_cells_per_dim: usize) -> impl Strategy<Value = Mesh2d<f64>> {
    let n = 1..=max_cells_per_dim.max(1);
    (n.clone(), n, translation_range(), translation_range()).prop_map(|(nx, ny, x, y)| {
        let mut mesh = create_unit_square_mesh(nx, ny);
        mesh.translate(&Vector2::new(x, y));
        mesh
    })
}

/// Unit cube tetrahedral meshes with at most `max_cells_per_dim` cubes along each axis,
/// translated by a random offset.
pub fn cube_mesh(max_cells_per_dim: usize) -> impl Strategy<Value = Mesh3d<f64>> {
    let n = 1..=max_cells_per_dim.max(1);
    let t = translation_range();
    (n.clone(), n.clone(), n, t.clone(), t.clone(), t).prop_map(|(nx, ny, nz, x, y, z)| {
        let mut mesh = create_unit_cube_mesh(nx, ny, nz);
        mesh.translate(&Vector3::new(x, y, z));
        mesh
    })
}

/// Collections of up to `max_count` small simplices scattered in `[-2, 2]^D`.
///
/// Unlike mesh cells, the simplices overlap arbitrarily and may be degenerate.
pub fn simplex_soup<D>(max_count: usize) -> impl Strategy<Value = Vec<Simplex<f64, D>>>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    let offsets = vec(point_in::<D>(-2.0..2.0), 0..=max_count);
    offsets.prop_flat_map(|offsets| {
        let count = offsets.len();
        (Just(offsets), vec(simplex_in::<D>(-0.5..0.5), count))
    })
    .prop_map(|(offsets, simplices)| {
        offsets
            .iter()
            .zip(simplices)
            .map(|(offset, simplex)| {
                let vertices: Vec<_> = simplex
                    .vertices()
                    .iter()
                    .map(|v| v + &offset.coords)
                    .collect();
                Simplex::from_vertices(&vertices)
            })
            .collect()
    })
}
