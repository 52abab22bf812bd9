//! Bounding box trees for point location, collision detection and closest entity queries on
//! simplicial meshes.
//!
//! The main entry point is [`BoundingBoxTree`](tree::BoundingBoxTree), which is built over the
//! entities of one topological dimension of a [`Mesh`](mesh::Mesh):
//!
//! ```rust
//! use meshtree::mesh::procedural::create_unit_square_mesh;
//! use meshtree::tree::BoundingBoxTree;
//! use nalgebra::point;
//!
//! let mesh = create_unit_square_mesh::<f64>(16, 16);
//! let tree = BoundingBoxTree::build(&mesh, 2).unwrap();
//! let p = point![0.3, 0.3];
//! assert_eq!(tree.compute_collisions(&p), vec![136, 137]);
//! assert_eq!(tree.compute_entity_collisions(&p, &mesh).unwrap(), vec![136, 137]);
//! ```
pub mod error;
pub mod mesh;
pub mod tree;

pub mod geometry {
    pub use meshtree_geometry::*;
}

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub extern crate nalgebra;

pub use meshtree_traits::Real;
