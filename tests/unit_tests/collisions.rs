use meshtree::error::Error;
use meshtree::geometry::{BoundedGeometry, Distance, GeometryCollection};
use meshtree::mesh::procedural::{create_unit_cube_mesh, create_unit_interval_mesh, create_unit_square_mesh};
use meshtree::proptest::{simplex_soup, square_mesh};
use meshtree::tree::{BoundingBoxTree, TreeOptions};
use meshtree::geometry::proptest::point_in;
use nalgebra::{point, Point1, U2, U3};
use proptest::collection::vec;
use proptest::prelude::*;

#[test]
fn interval_mesh_point_collisions() {
    let mesh = create_unit_interval_mesh::<f64>(16);
    let cells = mesh.entities(1).unwrap();
    let tree = BoundingBoxTree::build(&mesh, 1).unwrap();
    let p = Point1::new(0.3);

    assert_eq!(tree.compute_collisions(&p), vec![4]);
    assert_eq!(tree.compute_first_collision(&p), Some(4));
    assert_eq!(tree.compute_entity_collisions(&p, &cells).unwrap(), vec![4]);
    assert_eq!(tree.compute_first_entity_collision(&p, &cells).unwrap(), Some(4));
}

#[test]
fn square_mesh_point_collisions() {
    let mesh = create_unit_square_mesh::<f64>(16, 16);
    let cells = mesh.entities(2).unwrap();
    let tree = BoundingBoxTree::build(&mesh, 2).unwrap();
    let p = point![0.3, 0.3];

    assert_eq!(tree.compute_collisions(&p), vec![136, 137]);
    assert_eq!(tree.compute_entity_collisions(&p, &cells).unwrap(), vec![136, 137]);

    let first = tree.compute_first_collision(&p).unwrap();
    assert!([136, 137].contains(&first));
    let first = tree.compute_first_entity_collision(&p, &cells).unwrap().unwrap();
    assert!([136, 137].contains(&first));
}

#[test]
fn cube_mesh_point_collisions() {
    let mesh = create_unit_cube_mesh::<f64>(8, 8, 8);
    let cells = mesh.entities(3).unwrap();
    let tree = BoundingBoxTree::build(&mesh, 3).unwrap();
    let p = point![0.3, 0.3, 0.3];

    let expected: Vec<_> = (876..882).collect();
    assert_eq!(tree.compute_collisions(&p), expected);
    assert_eq!(tree.compute_entity_collisions(&p, &cells).unwrap(), expected);

    let first = tree.compute_first_collision(&p).unwrap();
    assert!(expected.contains(&first));
    let first = tree.compute_first_entity_collision(&p, &cells).unwrap().unwrap();
    assert!(expected.contains(&first));
}

#[test]
fn point_collisions_can_be_checked_against_the_mesh_itself() {
    let mesh = create_unit_square_mesh::<f64>(16, 16);
    let tree = BoundingBoxTree::build(&mesh, 2).unwrap();
    assert_eq!(tree.compute_entity_collisions(&point![0.3, 0.3], &mesh).unwrap(), vec![136, 137]);
}

#[test]
fn cube_mesh_lower_dimensional_entity_collisions() {
    let mesh = create_unit_cube_mesh::<f64>(8, 8, 8);
    let p = point![0.3, 0.3, 0.3];

    // The point lies in the interior of the diagonal edge from (0.25, 0.25, 0.25) to
    // (0.375, 0.375, 0.375)
    let edges = mesh.entities(1).unwrap();
    let edge_tree = BoundingBoxTree::build(&mesh, 1).unwrap();
    let colliding_edges = edge_tree.compute_entity_collisions(&p, &edges).unwrap();
    assert_eq!(colliding_edges.len(), 1);
    assert_eq!(edges.entity_vertices(colliding_edges[0]), Some([182, 273].as_slice()));

    // The six tetrahedra around the diagonal meet in six faces sharing the diagonal
    let faces = mesh.entities(2).unwrap();
    let face_tree = BoundingBoxTree::build(&mesh, 2).unwrap();
    let colliding_faces = face_tree.compute_entity_collisions(&p, &faces).unwrap();
    assert_eq!(colliding_faces.len(), 6);
    for face in colliding_faces {
        let face_vertices = faces.entity_vertices(face).unwrap();
        assert!(face_vertices.contains(&182));
        assert!(face_vertices.contains(&273));
    }

    let vertices = mesh.entities(0).unwrap();
    let vertex_tree = BoundingBoxTree::build(&mesh, 0).unwrap();
    assert_eq!(vertex_tree.compute_entity_collisions(&p, &vertices).unwrap(), Vec::<usize>::new());
    let q = point![0.25, 0.25, 0.25];
    assert_eq!(vertex_tree.compute_collisions(&q), vec![182]);
    assert_eq!(vertex_tree.compute_entity_collisions(&q, &vertices).unwrap(), vec![182]);
}

#[test]
fn square_and_interval_mesh_lower_dimensional_entity_collisions() {
    let mesh = create_unit_square_mesh::<f64>(16, 16);
    let edges = mesh.entities(1).unwrap();
    let edge_tree = BoundingBoxTree::build(&mesh, 1).unwrap();
    let colliding_edges = edge_tree
        .compute_entity_collisions(&point![0.3, 0.3], &edges)
        .unwrap();
    assert_eq!(colliding_edges.len(), 1);
    assert_eq!(edges.entity_vertices(colliding_edges[0]), Some([72, 90].as_slice()));

    let mesh = create_unit_interval_mesh::<f64>(16);
    let vertex_tree = BoundingBoxTree::build(&mesh, 0).unwrap();
    assert_eq!(vertex_tree.compute_collisions(&Point1::new(0.25)), vec![4]);
    assert_eq!(vertex_tree.compute_collisions(&Point1::new(0.3)), Vec::<usize>::new());
}

#[test]
fn vertex_tree_queries_resolve_mesh_vertices() {
    let mesh = create_unit_square_mesh::<f64>(4, 4);
    let vertices = mesh.entities(0).unwrap();
    let vertex_tree = BoundingBoxTree::build(&mesh, 0).unwrap();

    for (p, expected) in [(point![0.5, 0.5], vec![12]), (point![1.0, 1.0], vec![24])] {
        assert_eq!(vertex_tree.compute_entity_collisions(&p, &vertices).unwrap(), expected);
        assert_eq!(vertex_tree.compute_entity_collisions_in_mesh(&p, &mesh).unwrap(), expected);
        assert_eq!(
            vertex_tree.compute_first_entity_collision_in_mesh(&p, &mesh).unwrap(),
            Some(expected[0])
        );
    }
    assert_eq!(
        vertex_tree
            .compute_entity_collisions_in_mesh(&point![0.6, 0.5], &mesh)
            .unwrap(),
        Vec::<usize>::new()
    );

    // The mesh itself describes cells, not vertices
    let mismatch = Error::EntityDimensionMismatch {
        tree_dim: 0,
        collection_dim: 2,
    };
    assert_eq!(
        vertex_tree.compute_entity_collisions(&point![0.5, 0.5], &mesh),
        Err(mismatch.clone())
    );
    assert_eq!(
        vertex_tree.compute_first_entity_collision(&point![0.5, 0.5], &mesh),
        Err(mismatch)
    );
}

#[test]
fn edge_tree_queries_in_mesh_match_precomputed_edges() {
    let mesh = create_unit_square_mesh::<f64>(8, 8);
    let edges = mesh.entities(1).unwrap();
    let edge_tree = BoundingBoxTree::build(&mesh, 1).unwrap();
    for p in [point![0.3, 0.3], point![0.25, 0.25], point![0.5, 0.1], point![0.9, 0.3]] {
        assert_eq!(
            edge_tree.compute_entity_collisions_in_mesh(&p, &mesh).unwrap(),
            edge_tree.compute_entity_collisions(&p, &edges).unwrap()
        );
    }

    let vertices = mesh.entities(0).unwrap();
    assert_eq!(
        edge_tree.compute_entity_collisions(&point![0.25, 0.25], &vertices),
        Err(Error::EntityDimensionMismatch {
            tree_dim: 1,
            collection_dim: 0,
        })
    );
}

#[test]
fn points_outside_the_mesh_have_no_collisions() {
    let mesh = create_unit_square_mesh::<f64>(4, 4);
    let cells = mesh.entities(2).unwrap();
    let tree = BoundingBoxTree::build(&mesh, 2).unwrap();
    for p in [point![2.0, 0.5], point![-0.5, -0.5], point![0.5, 1.0 + 1e-6]] {
        assert_eq!(tree.compute_collisions(&p), Vec::<usize>::new());
        assert_eq!(tree.compute_first_collision(&p), None);
        assert_eq!(tree.compute_entity_collisions(&p, &cells).unwrap(), Vec::<usize>::new());
        assert_eq!(tree.compute_first_entity_collision(&p, &cells).unwrap(), None);
    }
}

#[test]
fn points_on_the_boundary_collide_within_tolerance() {
    let mesh = create_unit_square_mesh::<f64>(2, 2);
    let cells = mesh.entities(2).unwrap();
    let tree = BoundingBoxTree::build(&mesh, 2).unwrap();

    // The corner is a vertex of both triangles of the first square
    let corner = point![0.0, 0.0];
    assert_eq!(tree.compute_collisions(&corner), vec![0, 1]);
    assert_eq!(tree.compute_entity_collisions(&corner, &cells).unwrap(), vec![0, 1]);

    let slightly_outside = point![1.0 + 1e-15, 0.25];
    assert_eq!(tree.compute_collisions(&slightly_outside), vec![2, 3]);
    assert_eq!(tree.compute_entity_collisions(&slightly_outside, &cells).unwrap(), vec![2]);

    let loose = TreeOptions::default().with_box_tolerance(0.1).with_geometry_tolerance(0.1);
    let loose_tree = BoundingBoxTree::build_with_options(&mesh, 2, loose).unwrap();
    let outside = point![1.05, 0.25];
    assert!(tree.compute_collisions(&outside).is_empty());
    assert_eq!(loose_tree.compute_collisions(&outside), vec![2, 3]);
    assert_eq!(loose_tree.compute_entity_collisions(&outside, &cells).unwrap(), vec![2]);
}

#[test]
fn entity_collisions_need_all_tree_entities() {
    let mesh = create_unit_square_mesh::<f64>(4, 4);
    let tree = BoundingBoxTree::build(&mesh, 2).unwrap();
    let small_mesh = create_unit_square_mesh::<f64>(2, 2);
    let cells = small_mesh.entities(2).unwrap();

    let p = point![0.3, 0.3];
    let expected_error = Error::EntityOutOfBounds {
        entity: 8,
        num_entities: 8,
    };
    assert_eq!(tree.compute_entity_collisions(&p, &cells).unwrap_err(), expected_error);
    assert_eq!(tree.compute_first_entity_collision(&p, &cells).unwrap_err(), expected_error);

    // Larger collections are fine, extra entities are never reported
    let large_mesh = create_unit_square_mesh::<f64>(8, 4);
    let small_tree = BoundingBoxTree::build(&small_mesh, 2).unwrap();
    let collisions = small_tree
        .compute_entity_collisions(&p, &large_mesh.entities(2).unwrap())
        .unwrap();
    assert!(collisions.iter().all(|&entity| entity < 8));
}

#[test]
fn batch_point_collisions() {
    let mesh = create_unit_cube_mesh::<f64>(4, 4, 4);
    let tree = BoundingBoxTree::build(&mesh, 3).unwrap();
    let points = vec![
        point![0.3, 0.3, 0.3],
        point![0.0, 0.0, 0.0],
        point![0.9, 0.1, 0.5],
        point![2.0, 0.0, 0.0],
    ];
    let collisions = tree.compute_collisions_for_points(&points);
    assert_eq!(collisions.len(), points.len());
    for (p, p_collisions) in points.iter().zip(collisions) {
        assert_eq!(p_collisions, tree.compute_collisions(p));
    }
    assert!(tree.compute_collisions_for_points(&[]).is_empty());
}

proptest! {
    #[test]
    fn point_collisions_match_brute_force(
        simplices in simplex_soup::<U2>(40),
        points in vec(point_in::<U2>(-3.0..3.0), 1..10)
    ) {
        let tree = BoundingBoxTree::from_geometry_collection(&simplices, TreeOptions::default()).unwrap();
        let box_tolerance = tree.options().box_tolerance * tree.scale();
        let geometry_tolerance = tree.options().geometry_tolerance * tree.scale();

        for p in &points {
            let expected_box_collisions: Vec<_> = (0..simplices.len())
                .filter(|&i| simplices[i].bounding_box().contains_point_with_tolerance(p, box_tolerance))
                .collect();
            let expected_entity_collisions: Vec<_> = expected_box_collisions
                .iter()
                .copied()
                .filter(|&i| simplices[i].distance(p) <= geometry_tolerance)
                .collect();

            prop_assert_eq!(&tree.compute_collisions(p), &expected_box_collisions);
            prop_assert_eq!(&tree.compute_entity_collisions(p, &simplices).unwrap(), &expected_entity_collisions);

            match tree.compute_first_collision(p) {
                Some(first) => prop_assert!(expected_box_collisions.contains(&first)),
                None => prop_assert!(expected_box_collisions.is_empty()),
            }
            match tree.compute_first_entity_collision(p, &simplices).unwrap() {
                Some(first) => prop_assert!(expected_entity_collisions.contains(&first)),
                None => prop_assert!(expected_entity_collisions.is_empty()),
            }
        }
    }

    #[test]
    fn mesh_vertices_collide_with_their_cells(mesh in square_mesh(5)) {
        let tree = BoundingBoxTree::build(&mesh, 2).unwrap();
        for (cell_index, cell) in mesh.cell_iter().enumerate() {
            for &vertex in cell {
                let p = &mesh.vertices()[vertex];
                let collisions = tree.compute_entity_collisions(p, &mesh).unwrap();
                prop_assert!(collisions.contains(&cell_index));
            }
        }
        prop_assert_eq!(tree.num_entities(), mesh.num_geometries());
    }

    #[test]
    fn batch_collisions_match_serial_collisions(
        simplices in simplex_soup::<U3>(30),
        points in vec(point_in::<U3>(-3.0..3.0), 0..20)
    ) {
        let tree = BoundingBoxTree::from_geometry_collection(&simplices, TreeOptions::default()).unwrap();
        let serial: Vec<_> = points.iter().map(|p| tree.compute_collisions(p)).collect();
        prop_assert_eq!(tree.compute_collisions_for_points(&points), serial);
    }
}
