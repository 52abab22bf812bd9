use crate::error::Error;
use crate::geometry::{GeometryCollection, Simplex, MAX_SIMPLEX_VERTICES};
use crate::mesh::Mesh;
use crate::Real;
use itertools::Itertools;
use meshtree_traits::allocators::DimAllocator;
use nalgebra::{DefaultAllocator, DimName, OPoint};
use rustc_hash::FxHashMap;
use std::borrow::Cow;

/// The entities of a single topological dimension of a [`Mesh`].
///
/// Entity `i` of dimension `dim` is the simplex spanned by `dim + 1` mesh vertices:
///
/// - for `dim == 0`, entity `i` is vertex `i`,
/// - for `dim == mesh.cell_dim()`, entity `i` is cell `i` (with the cell's vertex order),
/// - otherwise the entities are the distinct `(dim + 1)`-subsets of cell vertices, stored
///   with sorted vertex indices and numbered in order of first appearance when visiting
///   cells in order and the subsets of each cell in lexicographic order.
#[derive(Debug, Clone)]
pub struct MeshEntities<'a, T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    vertices: &'a [OPoint<T, D>],
    dim: usize,
    connectivity: Cow<'a, [usize]>,
}

impl<'a, T, D> MeshEntities<'a, T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    pub(crate) fn from_mesh(mesh: &'a Mesh<T, D>, dim: usize) -> Result<Self, Error> {
        let cell_dim = mesh.cell_dim();
        let connectivity = if dim > cell_dim {
            return Err(Error::InvalidEntityDimension {
                entity_dim: dim,
                mesh_dim: cell_dim,
            });
        } else if dim == cell_dim {
            Cow::Borrowed(mesh.connectivity())
        } else if dim == 0 {
            Cow::Owned((0..mesh.num_vertices()).collect())
        } else {
            Cow::Owned(compute_sub_entity_connectivity(mesh, dim))
        };

        Ok(Self {
            vertices: mesh.vertices(),
            dim,
            connectivity,
        })
    }

    /// Topological dimension of the entities.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.connectivity.len() / (self.dim + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.connectivity.is_empty()
    }

    pub fn entity_vertices(&self, index: usize) -> Option<&[usize]> {
        let n = self.dim + 1;
        self.connectivity.get(n * index..n * (index + 1))
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = &[usize]> {
        self.connectivity.chunks_exact(self.dim + 1)
    }
}

impl<'a, T, D> GeometryCollection for MeshEntities<'a, T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    type Geometry = Simplex<T, D>;

    fn num_geometries(&self) -> usize {
        self.len()
    }

    fn get_geometry(&self, index: usize) -> Option<Self::Geometry> {
        self.entity_vertices(index)
            .and_then(|indices| Simplex::from_indexed_vertices(self.vertices, indices))
    }

    fn entity_dim(&self) -> Option<usize> {
        Some(self.dim)
    }
}

fn compute_sub_entity_connectivity<T, D>(mesh: &Mesh<T, D>, dim: usize) -> Vec<usize>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    debug_assert!(dim > 0 && dim < mesh.cell_dim());
    let n = dim + 1;
    let mut entity_indices = FxHashMap::default();
    let mut connectivity = Vec::new();

    for cell in mesh.cell_iter() {
        for subset in cell.iter().copied().sorted_unstable().combinations(n) {
            // Unused key slots are padded so that keys of equal length compare correctly
            let mut key = [usize::MAX; MAX_SIMPLEX_VERTICES];
            key[..n].copy_from_slice(&subset);
            let next_index = entity_indices.len();
            entity_indices.entry(key).or_insert_with(|| {
                connectivity.extend_from_slice(&subset);
                next_index
            });
        }
    }

    connectivity
}
