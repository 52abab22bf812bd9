//! Error types for mesh construction and tree queries.
use thiserror::Error;

/// Errors raised when constructing a [`Mesh`](crate::mesh::Mesh) from raw data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("cells of dimension {cell_dim} are not supported in {geometric_dim}-dimensional space")]
    InvalidCellDimension { cell_dim: usize, geometric_dim: usize },
    #[error("connectivity length {len} is not a multiple of the number of vertices per cell ({vertices_per_cell})")]
    InvalidConnectivityLength { len: usize, vertices_per_cell: usize },
    #[error("cell {cell} references vertex {vertex}, but the mesh only has {num_vertices} vertices")]
    VertexIndexOutOfBounds {
        cell: usize,
        vertex: usize,
        num_vertices: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("expected {expected} coordinates, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("mesh of topological dimension {mesh_dim} has no entities of dimension {entity_dim}")]
    InvalidEntityDimension { entity_dim: usize, mesh_dim: usize },
    #[error("tree was built over entities of dimension {tree_dim}, but the collection holds entities of dimension {collection_dim}")]
    EntityDimensionMismatch { tree_dim: usize, collection_dim: usize },
    #[error("entity {entity} is out of bounds for a collection of {num_entities} entities")]
    EntityOutOfBounds { entity: usize, num_entities: usize },
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub type Result<T> = std::result::Result<T, Error>;
