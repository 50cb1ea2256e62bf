// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::collections::HashSet;

use dynremesh::{
    MeshError, Vec3,
    geometry::VectorOps,
    mesh::{Mesh, PolygonMesh},
};

/// `n x n` unit quads in the z = 0 plane, each cut into two triangles.
fn create_grid_mesh(n: usize) -> Mesh {
    let mut positions = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            positions.push(Vec3::new(i as f64, j as f64, 0.0));
        }
    }
    let idx = |i: usize, j: usize| j * (n + 1) + i;
    let mut faces = Vec::new();
    for j in 0..n {
        for i in 0..n {
            faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            faces.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }
    Mesh::from_polygons(&positions, &faces).unwrap()
}

fn create_square_mesh() -> Mesh {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    Mesh::from_polygons(&positions, &[[0usize, 1, 2], [0, 2, 3]]).unwrap()
}

#[test]
fn test_single_triangle() {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    let mut mesh = Mesh::from_polygons(&positions, &[[0usize, 1, 2]]).unwrap();
    mesh.validate_connectivity();

    assert_eq!(mesh.live_vertex_count(), 3);
    assert_eq!(mesh.live_edge_count(), 3);
    assert_eq!(mesh.live_face_count(), 1);
    assert_eq!(mesh.half_edges.len(), 6);

    // Check cycle
    let face = &mesh.faces[0];
    let he0 = face.half_edge;
    let he1 = mesh.half_edges[he0].next;
    let he2 = mesh.half_edges[he1].next;
    assert_eq!(mesh.half_edges[he2].next, he0);
    assert_eq!(mesh.half_edges[he0].prev, he2);

    for v in 0..3 {
        assert!(mesh.is_boundary_vertex(v));
        assert_eq!(mesh.vertex_degree(v), 2);
        let he = mesh.vertices[v].half_edge.unwrap();
        assert!(mesh.half_edges[he].face.is_none(), "vertex {} should start on its border", v);
    }
    assert_eq!(mesh.holes().len(), 1);
    assert_eq!(mesh.face_normal(0), Some(Vec3::new(0.0, 0.0, 1.0)));
}

#[test]
fn test_twins_are_paired() {
    let mesh = create_grid_mesh(3);
    for (h, he) in mesh.half_edges.iter().enumerate() {
        assert_eq!(he.twin, h ^ 1);
        assert_eq!(mesh.half_edges[he.twin].twin, h);
        assert_eq!(Mesh::edge_index(h), h / 2);
    }
}

#[test]
fn test_grid_counts() {
    let mesh = create_grid_mesh(3);
    mesh.validate_connectivity();
    assert_eq!(mesh.live_vertex_count(), 16);
    assert_eq!(mesh.live_face_count(), 18);
    // 3 * 4 horizontal + 3 * 4 vertical + 9 diagonals
    assert_eq!(mesh.live_edge_count(), 33);

    let interior = (0..16).filter(|&v| !mesh.is_boundary_vertex(v)).count();
    assert_eq!(interior, 4);
    for v in [5, 6, 9, 10] {
        assert_eq!(mesh.vertex_degree(v), 6);
    }
}

#[test]
fn test_one_ring_neighbors() {
    let mesh = create_grid_mesh(2);
    let ring: HashSet<usize> = mesh.one_ring_neighbors(4).into_iter().collect();
    assert_eq!(ring, [0, 1, 3, 5, 7, 8].into_iter().collect());
    assert!(mesh.half_edge_between(4, 8).is_some());
    assert!(mesh.half_edge_between(4, 2).is_none());
}

#[test]
fn test_quad_takes_shortest_diagonal() {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(4.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
    ];
    let mut mesh = Mesh::from_polygons(&positions, &[vec![0usize, 1, 2, 3]]).unwrap();
    assert_eq!(mesh.face_degree(0), 4);

    assert_eq!(mesh.triangulate(), 1);
    mesh.validate_connectivity();
    assert_eq!(mesh.live_face_count(), 2);
    assert!(mesh.half_edge_between(1, 3).is_some());
    assert!(mesh.half_edge_between(0, 2).is_none());
    assert!((0..2).all(|f| mesh.face_degree(f) == 3));

    // Already triangulated: no-op
    assert_eq!(mesh.triangulate(), 0);
}

#[test]
fn test_pentagon_and_hexagon_triangulation() {
    let ngon = |n: usize| -> Vec<Vec3> {
        (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                Vec3::new(a.cos(), a.sin(), 0.0)
            })
            .collect()
    };
    for n in [5usize, 6, 9] {
        let face: Vec<usize> = (0..n).collect();
        let mut mesh = Mesh::from_polygons(&ngon(n), &[face]).unwrap();
        assert_eq!(mesh.triangulate(), n - 3);
        mesh.validate_connectivity();
        assert_eq!(mesh.live_face_count(), n - 2);
        assert_eq!(mesh.live_edge_count(), 2 * n - 3);
        assert_eq!(mesh.holes().len(), 1);
    }
}

#[test]
fn test_construction_errors() {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
    ];
    let empty: [[usize; 3]; 0] = [];
    assert_eq!(Mesh::from_polygons(&positions, &empty).unwrap_err(), MeshError::NoFaces);
    assert_eq!(
        Mesh::from_polygons(&positions, &[[0usize, 1, 7]]).unwrap_err(),
        MeshError::InvalidVertexIndex { face: 0, vertex: 7, count: 4 }
    );
    assert_eq!(
        Mesh::from_polygons(&positions, &[[0usize, 1, 1]]).unwrap_err(),
        MeshError::DegenerateFace(0)
    );
    assert_eq!(
        Mesh::from_polygons(&positions, &[[0usize, 1, 2], [0, 1, 3]]).unwrap_err(),
        MeshError::NonManifoldEdge { from: 0, to: 1 }
    );

    let bad = [Vec3::new(f64::NAN, 0.0, 0.0), positions[1], positions[2]];
    assert_eq!(
        Mesh::from_polygons(&bad, &[[0usize, 1, 2]]).unwrap_err(),
        MeshError::NonFinitePosition(0)
    );
}

#[test]
fn test_bowtie_vertex_is_rejected() {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(-1.0, -1.0, 0.0),
    ];
    // Two triangles touching only at vertex 0.
    assert_eq!(
        Mesh::from_polygons(&positions, &[[0usize, 1, 2], [0, 3, 4]]).unwrap_err(),
        MeshError::NonManifoldVertex(0)
    );

    // Closing the gap with a third triangle makes the fan single again.
    let mesh = Mesh::from_polygons(&positions, &[[0usize, 1, 2], [0, 2, 3], [0, 3, 4]]).unwrap();
    assert_eq!(mesh.outgoing_half_edges(0).len(), 4);
    mesh.validate_connectivity();
}

#[test]
fn test_isolated_vertex_is_removed() {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(9.0, 9.0, 9.0),
    ];
    let mesh = Mesh::from_polygons(&positions, &[[0usize, 1, 2]]).unwrap();
    assert!(mesh.vertices[3].removed);
    assert_eq!(mesh.live_vertex_count(), 3);
    assert_eq!(mesh.to_polygon_mesh().positions.len(), 3);
}

#[test]
fn test_holes_of_annulus() {
    // 3x3 quads with the centre one missing
    let mut positions = Vec::new();
    for j in 0..4 {
        for i in 0..4 {
            positions.push(Vec3::new(i as f64, j as f64, 0.0));
        }
    }
    let idx = |i: usize, j: usize| j * 4 + i;
    let mut faces = Vec::new();
    for j in 0..3 {
        for i in 0..3 {
            if (i, j) != (1, 1) {
                faces.push(vec![idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
    }
    let mut mesh = Mesh::from_polygons(&positions, &faces).unwrap();
    mesh.validate_connectivity();

    let holes = mesh.holes();
    assert_eq!(holes.len(), 2);
    let mut loop_lengths: Vec<usize> = holes.iter().map(|&h| mesh.boundary_loop(h).len()).collect();
    loop_lengths.sort_unstable();
    assert_eq!(loop_lengths, vec![4, 12]);

    // Tags from the previous call must not hide loops
    assert_eq!(mesh.holes().len(), 2);

    mesh.triangulate();
    mesh.validate_connectivity();
    assert_eq!(mesh.holes().len(), 2);
}

#[test]
fn test_polygon_mesh_snapshot() {
    let mesh = create_grid_mesh(2);
    let snapshot = mesh.to_polygon_mesh();
    assert_eq!(snapshot.vertex_count(), 9);
    assert_eq!(snapshot.face_count(), 8);

    let rebuilt = Mesh::from_polygon_mesh(&snapshot).unwrap();
    rebuilt.validate_connectivity();
    assert_eq!(rebuilt.live_edge_count(), mesh.live_edge_count());

    let input = PolygonMesh::new(snapshot.positions.clone(), snapshot.faces.clone());
    assert_eq!(input, snapshot);
}

#[test]
fn test_normals_and_statistics() {
    let mesh = create_square_mesh();
    for v in 0..4 {
        let n = mesh.vertex_normal(v).unwrap();
        assert!((n.dot(&Vec3::new(0.0, 0.0, 1.0)) - 1.0).abs() < 1e-12);
    }
    let stats = mesh.edge_statistics();
    assert_eq!(stats.count, 5);
    assert!((stats.min - 1.0).abs() < 1e-12);
    assert!((stats.max - 2f64.sqrt()).abs() < 1e-12);
    assert!((stats.mean - (4.0 + 2f64.sqrt()) / 5.0).abs() < 1e-12);
}

#[test]
#[should_panic(expected = "next -> prev mismatch")]
fn test_validate_detects_corruption() {
    let mut mesh = create_square_mesh();
    let h = mesh.faces[0].half_edge;
    let wrong = mesh.half_edges[h].prev;
    mesh.half_edges[h].next = wrong;
    mesh.validate_connectivity();
}
