//! Basic procedural mesh generation routines.
//!
//! Vertex and cell numbering is fixed and documented per generator, so that index-based
//! query results on generated meshes are reproducible.
use crate::mesh::{Mesh1d, Mesh2d, Mesh3d};
use crate::Real;
use nalgebra::{Point1, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// How each square of a rectangle mesh is split into triangles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Diagonal {
    /// Split along the diagonal from the lower left to the upper right corner.
    #[default]
    Right,
    /// Split along the diagonal from the lower right to the upper left corner.
    Left,
    /// Alternate between left and right diagonals, starting each even row with `Left`.
    RightLeft,
    /// Alternate between right and left diagonals, starting each even row with `Right`.
    LeftRight,
    /// Split into four triangles meeting at an additional vertex in the middle of the square.
    Crossed,
}

fn to_real<T: Real>(n: usize) -> T {
    T::from_usize(n).expect("Must be able to fit usize in T")
}

/// Creates a mesh of `n` equally sized intervals between `a` and `b`.
///
/// Vertex `i` is located at `a + i (b - a) / n` and cell `i` is `(i, i + 1)`. Returns an
/// empty mesh if `n == 0`.
pub fn create_interval_mesh<T: Real>(a: T, b: T, n: usize) -> Mesh1d<T> {
    if n == 0 {
        return Mesh1d::from_valid_parts(Vec::new(), 1, Vec::new());
    }

    let h = (b - a) / to_real(n);
    let vertices = (0..=n).map(|i| Point1::new(a + h * to_real(i))).collect();
    let cells = (0..n).flat_map(|i| [i, i + 1]).collect();
    Mesh1d::from_valid_parts(vertices, 1, cells)
}

pub fn create_unit_interval_mesh<T: Real>(n: usize) -> Mesh1d<T> {
    create_interval_mesh(T::zero(), T::one(), n)
}

/// Creates a triangle mesh of the axis-aligned rectangle spanned by the corners `p0` and `p1`.
///
/// The rectangle is divided into `nx * ny` squares. Vertices are numbered row by row with
/// `x` varying fastest. Square `k = iy * nx + ix` has the corners
/// `v0 = iy (nx + 1) + ix`, `v1 = v0 + 1`, `v2 = v0 + nx + 1` and `v3 = v1 + nx + 1`,
/// and is split into the triangles `2k` and `2k + 1`. With the [`Diagonal::Right`] split these
/// are `(v0, v1, v3)` and `(v0, v2, v3)`, and with [`Diagonal::Left`] they are
/// `(v0, v1, v2)` and `(v1, v2, v3)`.
///
/// [`Diagonal::Crossed`] instead gives four triangles `4k .. 4k + 4` per square, sharing a
/// midpoint vertex numbered `(nx + 1)(ny + 1) + k`.
///
/// Returns an empty mesh if `nx` or `ny` is zero.
pub fn create_rectangle_mesh<T: Real>(
    p0: &Point2<T>,
    p1: &Point2<T>,
    nx: usize,
    ny: usize,
    diagonal: Diagonal,
) -> Mesh2d<T> {
    if nx == 0 || ny == 0 {
        return Mesh2d::from_valid_parts(Vec::new(), 2, Vec::new());
    }

    let x0 = T::min(p0.x, p1.x);
    let x1 = T::max(p0.x, p1.x);
    let y0 = T::min(p0.y, p1.y);
    let y1 = T::max(p0.y, p1.y);
    let hx = (x1 - x0) / to_real(nx);
    let hy = (y1 - y0) / to_real(ny);

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for iy in 0..=ny {
        let y = y0 + hy * to_real(iy);
        for ix in 0..=nx {
            vertices.push(Point2::new(x0 + hx * to_real(ix), y));
        }
    }

    let mut cells = Vec::new();
    if diagonal == Diagonal::Crossed {
        let half = T::from_f64(0.5).expect("Must be able to fit 0.5 in T");
        for iy in 0..ny {
            let y = y0 + hy * (to_real::<T>(iy) + half);
            for ix in 0..nx {
                vertices.push(Point2::new(x0 + hx * (to_real::<T>(ix) + half), y));
            }
        }

        for iy in 0..ny {
            for ix in 0..nx {
                let v0 = iy * (nx + 1) + ix;
                let v1 = v0 + 1;
                let v2 = v0 + nx + 1;
                let v3 = v1 + nx + 1;
                let mid = (nx + 1) * (ny + 1) + iy * nx + ix;
                cells.extend_from_slice(&[v0, v1, mid, v0, v2, mid, v1, v3, mid, v2, v3, mid]);
            }
        }
    } else {
        for iy in 0..ny {
            let mut local = match diagonal {
                Diagonal::RightLeft if iy % 2 == 0 => Diagonal::Left,
                Diagonal::RightLeft => Diagonal::Right,
                Diagonal::LeftRight if iy % 2 == 0 => Diagonal::Right,
                Diagonal::LeftRight => Diagonal::Left,
                other => other,
            };
            let alternating = matches!(diagonal, Diagonal::RightLeft | Diagonal::LeftRight);

            for ix in 0..nx {
                let v0 = iy * (nx + 1) + ix;
                let v1 = v0 + 1;
                let v2 = v0 + nx + 1;
                let v3 = v1 + nx + 1;
                if local == Diagonal::Left {
                    cells.extend_from_slice(&[v0, v1, v2, v1, v2, v3]);
                    if alternating {
                        local = Diagonal::Right;
                    }
                } else {
                    cells.extend_from_slice(&[v0, v1, v3, v0, v2, v3]);
                    if alternating {
                        local = Diagonal::Left;
                    }
                }
            }
        }
    }

    Mesh2d::from_valid_parts(vertices, 2, cells)
}

/// Creates a triangle mesh of the unit square with the [`Diagonal::Right`] split.
pub fn create_unit_square_mesh<T: Real>(nx: usize, ny: usize) -> Mesh2d<T> {
    create_rectangle_mesh(
        &Point2::origin(),
        &Point2::new(T::one(), T::one()),
        nx,
        ny,
        Diagonal::Right,
    )
}

/// Creates a tetrahedral mesh of the axis-aligned box spanned by the corners `p0` and `p1`.
///
/// The box is divided into `nx * ny * nz` cubes and vertices are numbered with `x` varying
/// fastest, then `y`, then `z`. Cube `k = (iz * ny + iy) * nx + ix` with lower corner
/// `v0 = (iz (ny + 1) + iy) (nx + 1) + ix` and
///
/// ```text
/// v1 = v0 + 1, v2 = v0 + nx + 1, v3 = v1 + nx + 1, v4..v7 = v0..v3 + (nx + 1)(ny + 1)
/// ```
///
/// is split into the six tetrahedra `6k .. 6k + 6`:
/// `(v0, v1, v3, v7)`, `(v0, v1, v7, v5)`, `(v0, v5, v7, v4)`, `(v0, v3, v2, v7)`,
/// `(v0, v6, v4, v7)` and `(v0, v2, v6, v7)`.
///
/// Returns an empty mesh if any of `nx`, `ny` or `nz` is zero.
pub fn create_box_mesh<T: Real>(p0: &Point3<T>, p1: &Point3<T>, nx: usize, ny: usize, nz: usize) -> Mesh3d<T> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Mesh3d::from_valid_parts(Vec::new(), 3, Vec::new());
    }

    let min = p0.coords.zip_map(&p1.coords, T::min);
    let max = p0.coords.zip_map(&p1.coords, T::max);
    let h = (max - min).component_div(&Vector3::new(to_real(nx), to_real(ny), to_real(nz)));

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for iz in 0..=nz {
        let z = min.z + h.z * to_real(iz);
        for iy in 0..=ny {
            let y = min.y + h.y * to_real(iy);
            for ix in 0..=nx {
                vertices.push(Point3::new(min.x + h.x * to_real(ix), y, z));
            }
        }
    }

    let layer = (nx + 1) * (ny + 1);
    let mut cells = Vec::with_capacity(24 * nx * ny * nz);
    for iz in 0..nz {
        for iy in 0..ny {
            for ix in 0..nx {
                let v0 = iz * layer + iy * (nx + 1) + ix;
                let v1 = v0 + 1;
                let v2 = v0 + nx + 1;
                let v3 = v1 + nx + 1;
                let [v4, v5, v6, v7] = [v0, v1, v2, v3].map(|v| v + layer);

                #[rustfmt::skip]
                let tetrahedra = [
                    v0, v1, v3, v7,
                    v0, v1, v7, v5,
                    v0, v5, v7, v4,
                    v0, v3, v2, v7,
                    v0, v6, v4, v7,
                    v0, v2, v6, v7,
                ];
                cells.extend_from_slice(&tetrahedra);
            }
        }
    }

    Mesh3d::from_valid_parts(vertices, 3, cells)
}

pub fn create_unit_cube_mesh<T: Real>(nx: usize, ny: usize, nz: usize) -> Mesh3d<T> {
    create_box_mesh(
        &Point3::origin(),
        &Point3::new(T::one(), T::one(), T::one()),
        nx,
        ny,
        nz,
    )
}
