use crate::error::{Error, MeshError};
use crate::geometry::{AxisAlignedBoundingBox, GeometryCollection, Simplex, MAX_SIMPLEX_VERTICES};
use crate::Real;
use meshtree_traits::allocators::DimAllocator;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector, Scalar, U1, U2, U3};
use serde::{Deserialize, Serialize};
use std::cmp::min;

pub mod procedural;
mod topology;

pub use topology::MeshEntities;

/// Index-based simplicial mesh.
///
/// Every cell is a simplex with `cell_dim + 1` vertices, stored contiguously in a flat
/// connectivity array. The cell dimension is a runtime property, so the same type holds
/// interval, triangle and tetrahedral meshes (and lower-dimensional meshes embedded in
/// higher-dimensional space).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Mesh<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    // serde's not able correctly determine the necessary trait bounds in this case,
    // so write our own
    #[serde(bound(
        serialize = "<DefaultAllocator as Allocator<T, D>>::Buffer: Serialize",
        deserialize = "<DefaultAllocator as Allocator<T, D>>::Buffer: Deserialize<'de>"
    ))]
    vertices: Vec<OPoint<T, D>>,
    cell_dim: usize,
    cells: Vec<usize>,
}

pub type Mesh1d<T> = Mesh<T, U1>;
pub type Mesh2d<T> = Mesh<T, U2>;
pub type Mesh3d<T> = Mesh<T, U3>;

impl<T, D> Mesh<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// Construct a mesh from vertices and a flat cell connectivity.
    ///
    /// Cell `i` consists of the vertices `cells[i * (cell_dim + 1) .. (i + 1) * (cell_dim + 1)]`.
    /// The connectivity is validated, so that every later use of the mesh may rely on
    /// in-bounds vertex indices.
    pub fn from_vertices_and_cells(
        vertices: Vec<OPoint<T, D>>,
        cell_dim: usize,
        cells: Vec<usize>,
    ) -> Result<Self, MeshError> {
        let geometric_dim = D::dim();
        if cell_dim > min(geometric_dim, MAX_SIMPLEX_VERTICES - 1) {
            return Err(MeshError::InvalidCellDimension { cell_dim, geometric_dim });
        }

        let vertices_per_cell = cell_dim + 1;
        if cells.len() % vertices_per_cell != 0 {
            return Err(MeshError::InvalidConnectivityLength {
                len: cells.len(),
                vertices_per_cell,
            });
        }

        let num_vertices = vertices.len();
        if let Some(position) = cells.iter().position(|&v| v >= num_vertices) {
            return Err(MeshError::VertexIndexOutOfBounds {
                cell: position / vertices_per_cell,
                vertex: cells[position],
                num_vertices,
            });
        }

        Ok(Self::from_valid_parts(vertices, cell_dim, cells))
    }

    /// Constructs a mesh from data that is valid by construction, such as procedurally
    /// generated meshes.
    pub(crate) fn from_valid_parts(vertices: Vec<OPoint<T, D>>, cell_dim: usize, cells: Vec<usize>) -> Self {
        debug_assert_eq!(cells.len() % (cell_dim + 1), 0);
        debug_assert!(cells.iter().all(|&v| v < vertices.len()));
        Self {
            vertices,
            cell_dim,
            cells,
        }
    }

    pub fn vertices(&self) -> &[OPoint<T, D>] {
        &self.vertices
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The topological dimension of the cells.
    pub fn cell_dim(&self) -> usize {
        self.cell_dim
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len() / (self.cell_dim + 1)
    }

    /// The flat cell connectivity.
    pub fn connectivity(&self) -> &[usize] {
        &self.cells
    }

    /// Vertex indices of the given cell.
    pub fn cell_vertices(&self, cell_index: usize) -> Option<&[usize]> {
        let n = self.cell_dim + 1;
        self.cells.get(n * cell_index..n * (cell_index + 1))
    }

    pub fn cell_iter(&self) -> impl '_ + Iterator<Item = &[usize]> {
        self.cells.chunks_exact(self.cell_dim + 1)
    }

    /// Transform all vertices of the mesh by the given transformation function.
    pub fn transform_vertices<F>(&mut self, mut transformation: F)
    where
        F: FnMut(&mut OPoint<T, D>),
    {
        for p in &mut self.vertices {
            transformation(p);
        }
    }
}

impl<T, D> Mesh<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Translates all vertices of the mesh by the given translation vector.
    pub fn translate(&mut self, translation: &OVector<T, D>) {
        self.transform_vertices(|p| *p += translation);
    }

    /// The smallest box enclosing all vertices, or `None` if the mesh has no vertices.
    pub fn bounding_box(&self) -> Option<AxisAlignedBoundingBox<T, D>> {
        AxisAlignedBoundingBox::from_points(&self.vertices)
    }

    pub fn get_cell(&self, cell_index: usize) -> Option<Simplex<T, D>> {
        self.cell_vertices(cell_index)
            .and_then(|indices| Simplex::from_indexed_vertices(&self.vertices, indices))
    }

    /// All entities of the given topological dimension.
    ///
    /// Dimension `0` gives the vertices and dimension [`cell_dim`](Self::cell_dim) the cells.
    /// Intermediate entities (edges and faces) are numbered in order of first appearance, see
    /// [`MeshEntities`].
    pub fn entities(&self, dim: usize) -> Result<MeshEntities<'_, T, D>, Error> {
        MeshEntities::from_mesh(self, dim)
    }
}

impl<T, D> GeometryCollection for Mesh<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    type Geometry = Simplex<T, D>;

    fn num_geometries(&self) -> usize {
        self.num_cells()
    }

    fn get_geometry(&self, index: usize) -> Option<Self::Geometry> {
        self.get_cell(index)
    }

    fn entity_dim(&self) -> Option<usize> {
        Some(self.cell_dim)
    }
}
