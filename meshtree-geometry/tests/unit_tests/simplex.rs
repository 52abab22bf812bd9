use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use meshtree_geometry::proptest::{point, simplex};
use meshtree_geometry::{BoundedGeometry, Distance, Simplex};
use nalgebra::{point, Point1, Point3, U2, U3};
use proptest::prelude::*;

fn reference_tetrahedron() -> Simplex<f64, U3> {
    Simplex::from_vertices(&[
        point![0.0, 0.0, 0.0],
        point![1.0, 0.0, 0.0],
        point![0.0, 1.0, 0.0],
        point![0.0, 0.0, 1.0],
    ])
}

#[test]
fn simplex_vertex_bookkeeping() {
    let triangle = Simplex::from_vertices(&[point![0.0, 0.0], point![1.0, 0.0], point![0.0, 1.0]]);
    assert_eq!(triangle.num_vertices(), 3);
    assert_eq!(triangle.topological_dim(), 2);
    assert_eq!(triangle.vertices().len(), 3);
    assert_eq!(triangle.centroid(), point![1.0 / 3.0, 1.0 / 3.0]);

    let vertex = Simplex::from_point(point![2.0, 3.0]);
    assert_eq!(vertex.topological_dim(), 0);
    assert_eq!(vertex.vertices(), &[point![2.0, 3.0]]);
}

#[test]
fn simplex_from_indexed_vertices() {
    let vertices = [point![0.0, 0.0], point![1.0, 0.0], point![1.0, 1.0], point![0.0, 1.0]];
    let triangle = Simplex::from_indexed_vertices(&vertices, &[0, 2, 3]).unwrap();
    assert_eq!(triangle.vertices(), &[vertices[0], vertices[2], vertices[3]]);
    assert!(Simplex::from_indexed_vertices(&vertices, &[0, 4]).is_none());
}

#[test]
#[should_panic]
fn simplex_rejects_empty_vertex_list() {
    let _ = Simplex::<f64, U2>::from_vertices(&[]);
}

#[test]
#[should_panic]
fn simplex_rejects_five_vertices() {
    let _ = Simplex::from_vertices(&[Point1::new(0.0); 5]);
}

#[test]
fn interval_point_distance() {
    let interval = Simplex::from_vertices(&[Point1::new(0.25), Point1::new(0.3125)]);
    assert!(interval.distance(&Point1::new(0.3)) <= 1e-12);
    assert_scalar_eq!(interval.distance(&Point1::new(-1.0)), 1.25, comp = abs, tol = 1e-14);
    assert_scalar_eq!(interval.distance(&Point1::new(1.3125)), 1.0, comp = abs, tol = 1e-14);
    assert!(interval.contains_point_with_tolerance(&Point1::new(0.25), 0.0));
}

#[test]
fn triangle_point_distance_2d() {
    let h = 1.0 / 16.0;
    let lower_right = Simplex::from_vertices(&[point![0.0, 0.0], point![h, 0.0], point![h, h]]);
    let upper_left = Simplex::from_vertices(&[point![0.0, 0.0], point![0.0, h], point![h, h]]);

    // Point to the left of the shared vertical edge of the upper left triangle
    let p = point![-1.0, 0.01];
    assert_scalar_eq!(upper_left.distance(&p), 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(lower_right.distance(&p), (1.0f64 + 0.01 * 0.01).sqrt(), comp = abs, tol = 1e-14);

    // Points on the shared diagonal belong to both triangles
    let on_diagonal = point![0.3 * h, 0.3 * h];
    assert!(upper_left.contains_point_with_tolerance(&on_diagonal, 1e-12));
    assert!(lower_right.contains_point_with_tolerance(&on_diagonal, 1e-12));

    let interior = point![0.75 * h, 0.25 * h];
    assert!(lower_right.distance(&interior) <= 1e-12);
    assert!(!upper_left.contains_point_with_tolerance(&interior, 1e-14));
}

#[test]
fn tetrahedron_point_distance_and_closest_point() {
    let tet = reference_tetrahedron();

    assert_scalar_eq!(tet.distance(&point![0.2, 0.2, -0.5]), 0.5, comp = abs, tol = 1e-14);
    assert!(tet.distance(&point![0.1, 0.1, 0.1]) <= 1e-12);

    // Closest point on the slanted face
    let p = point![1.0, 1.0, 1.0];
    assert_scalar_eq!(tet.distance(&p), 2.0 / 3.0f64.sqrt(), comp = abs, tol = 1e-12);
    let closest = tet.closest_point(&p);
    assert_matrix_eq!(closest.coords, point![1.0, 1.0, 1.0].coords / 3.0, comp = abs, tol = 1e-12);

    // Closest point is a vertex
    let p = point![3.0, -1.0, -1.0];
    assert_matrix_eq!(tet.closest_point(&p).coords, point![1.0, 0.0, 0.0].coords, comp = abs, tol = 1e-12);
    assert_scalar_eq!(tet.distance(&p), 6.0f64.sqrt(), comp = abs, tol = 1e-12);
}

#[test]
fn degenerate_triangle_behaves_like_segment() {
    let collinear = Simplex::from_vertices(&[point![0.0, 0.0], point![1.0, 0.0], point![2.0, 0.0]]);
    let segment = Simplex::from_vertices(&[point![0.0, 0.0], point![2.0, 0.0]]);
    let p = point![1.5, 1.0];
    assert_scalar_eq!(collinear.distance(&p), segment.distance(&p), comp = abs, tol = 1e-14);
    assert_scalar_eq!(collinear.distance(&p), 1.0, comp = abs, tol = 1e-14);
}

#[test]
fn triangles_on_opposite_sides_of_a_diagonal_do_not_intersect() {
    // Lower right triangle of one cell and upper left triangle of a shifted cell
    let a = Simplex::from_vertices(&[point![0.75, 0.0], point![1.0, 0.0], point![1.0, 0.25]]);
    let b = Simplex::from_vertices(&[point![0.9, -0.15], point![0.9, 0.1], point![1.15, 0.1]]);
    let c = Simplex::from_vertices(&[point![0.9, -0.15], point![1.15, -0.15], point![1.15, 0.1]]);

    assert!(a.intersects_with_tolerance(&b, 1e-12));
    assert!(b.intersects_with_tolerance(&a, 1e-12));
    assert!(!a.intersects_with_tolerance(&c, 1e-12));
    assert!(a.distance(&c) > 0.0);
}

#[test]
fn tetrahedra_sharing_a_face_intersect() {
    let a = reference_tetrahedron();
    let b = Simplex::from_vertices(&[
        point![1.0, 0.0, 0.0],
        point![0.0, 1.0, 0.0],
        point![0.0, 0.0, 1.0],
        point![1.0, 1.0, 1.0],
    ]);
    assert!(a.intersects_with_tolerance(&b, 1e-12));

    let far = Simplex::from_vertices(&[
        point![3.0, 0.0, 0.0],
        point![4.0, 0.0, 0.0],
        point![3.0, 1.0, 0.0],
        point![3.0, 0.0, 1.0],
    ]);
    assert_scalar_eq!(a.distance(&far), 2.0, comp = abs, tol = 1e-12);
    assert!(!a.intersects_with_tolerance(&far, 1e-12));
}

#[test]
fn segments_crossing_in_3d() {
    let a = Simplex::from_vertices(&[point![-1.0, 0.0, 0.0], point![1.0, 0.0, 0.0]]);
    let b = Simplex::from_vertices(&[point![0.0, -1.0, 0.5], point![0.0, 1.0, 0.5]]);
    let closest = a.closest_points_to(&b);
    assert_scalar_eq!(closest.distance, 0.5, comp = abs, tol = 1e-12);
    assert_matrix_eq!(closest.point_a.coords, Point3::origin().coords, comp = abs, tol = 1e-12);
    assert_matrix_eq!(closest.point_b.coords, point![0.0, 0.0, 0.5].coords, comp = abs, tol = 1e-12);
}

proptest! {
    #[test]
    fn simplex_distance_is_symmetric(a in simplex::<U3>(), b in simplex::<U3>()) {
        let d_ab = a.distance(&b);
        let d_ba = b.distance(&a);
        prop_assert!(d_ab >= 0.0);
        prop_assert!((d_ab - d_ba).abs() <= 1e-7 * (1.0 + d_ab));
    }

    #[test]
    fn simplex_distance_is_bounded_by_vertex_distances(s in simplex::<U2>(), p in point::<U2>()) {
        let d = s.distance(&p);
        for v in s.vertices() {
            prop_assert!(d <= (v - p).norm() + 1e-9);
        }
        // The bounding box distance is a lower bound
        prop_assert!(s.bounding_box().dist2_to(&p).sqrt() <= d + 1e-9);
    }

    #[test]
    fn simplex_contains_its_vertices_and_centroid(s in simplex::<U3>()) {
        for v in s.vertices() {
            prop_assert!(s.distance(v) <= 1e-9);
        }
        prop_assert!(s.distance(&s.centroid()) <= 1e-7);
    }

    #[test]
    fn closest_point_realizes_distance(s in simplex::<U3>(), p in point::<U3>()) {
        let closest = s.closest_point(&p);
        let d = s.distance(&p);
        prop_assert!(((closest - p).norm() - d).abs() <= 1e-8);
        prop_assert!(s.distance(&closest) <= 1e-8);
    }

    #[test]
    fn segment_distance_matches_projection_formula(
        a in point::<U2>(),
        b in point::<U2>(),
        p in point::<U2>()
    ) {
        let segment = Simplex::from_vertices(&[a, b]);
        let d = b - a;
        let t = if d.norm_squared() > 0.0 { ((p - a).dot(&d) / d.norm_squared()).clamp(0.0, 1.0) } else { 0.0 };
        let expected = (a + d * t - p).norm();
        prop_assert!((segment.distance(&p) - expected).abs() <= 1e-9);
    }
}

