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
    Vec3,
    mesh::{CollapseReject, ElementAttribute, Mesh, SpinReject},
};

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

fn create_tetrahedron() -> Mesh {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    Mesh::from_polygons(&positions, &[[0usize, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]).unwrap()
}

fn face_sets(mesh: &Mesh) -> Vec<HashSet<usize>> {
    let mut sets: Vec<HashSet<usize>> = (0..mesh.faces.len())
        .filter(|&f| !mesh.faces[f].removed)
        .map(|f| mesh.face_vertices(f).into_iter().collect())
        .collect();
    sets.sort_by_key(|s| {
        let mut v: Vec<_> = s.iter().copied().collect();
        v.sort_unstable();
        v
    });
    sets
}

#[test]
fn test_split_interior_edge() {
    let mut mesh = create_square_mesh();
    let h = mesh.half_edge_between(0, 2).unwrap();
    let res = mesh.split_edge(h).unwrap();
    mesh.validate_connectivity();

    let w = res.vertex;
    assert_eq!(w, 4);
    assert_eq!(mesh.vertices[w].position, Vec3::new(0.5, 0.5, 0.0));
    assert_eq!(res.new_faces.len(), 2);
    assert_eq!(res.new_edges.len(), 3);
    assert_eq!(mesh.live_face_count(), 4);
    assert_eq!(mesh.live_edge_count(), 8);
    assert_eq!(mesh.vertex_degree(w), 4);
    assert!(!mesh.is_boundary_vertex(w));

    let expected: Vec<HashSet<usize>> = vec![
        [0, 1, w].into_iter().collect(),
        [0, w, 3].into_iter().collect(),
        [1, 2, w].into_iter().collect(),
        [w, 2, 3].into_iter().collect(),
    ];
    let mut expected = expected;
    expected.sort_by_key(|s| {
        let mut v: Vec<_> = s.iter().copied().collect();
        v.sort_unstable();
        v
    });
    assert_eq!(face_sets(&mesh), expected);
}

#[test]
fn test_split_at_given_position() {
    let mut mesh = create_grid_mesh(2);
    let h = mesh.half_edge_between(4, 5).unwrap();
    let p = Vec3::new(1.25, 1.0, 0.5);
    let res = mesh.split_edge_at(h, p).unwrap();
    mesh.validate_connectivity();
    assert_eq!(mesh.vertices[res.vertex].position, p);
    assert_eq!(mesh.target(res.half_edge), 5);
    assert_eq!(mesh.source(res.half_edge), res.vertex);
}

#[test]
fn test_split_then_collapse_round_trip() {
    let mut mesh = create_grid_mesh(3);
    let vertices_before = mesh.live_vertex_count();
    let faces_before = mesh.live_face_count();
    let holes_before = mesh.holes().len();

    let h = mesh.half_edge_between(5, 6).unwrap();
    let res = mesh.split_edge(h).unwrap();
    mesh.validate_connectivity();
    assert_eq!(mesh.live_vertex_count(), vertices_before + 1);

    // h now runs 5 -> w; collapsing it removes w again
    assert_eq!(mesh.target(h), res.vertex);
    assert!(mesh.collapse_edge(h));
    mesh.validate_connectivity();

    assert_eq!(mesh.live_vertex_count(), vertices_before);
    assert_eq!(mesh.live_face_count(), faces_before);
    assert_eq!(mesh.holes().len(), holes_before);
    assert!(mesh.half_edge_between(5, 6).is_some());
}

#[test]
fn test_collapse_rejects_bridge() {
    let mut mesh = create_square_mesh();
    let h = mesh.half_edge_between(0, 2).unwrap();
    let before = mesh.to_polygon_mesh();
    let half_edges_before = mesh.half_edges.len();

    assert_eq!(mesh.collapse_check(h), Err(CollapseReject::Bridge));
    assert!(!mesh.collapse_edge(h));
    mesh.validate_connectivity();
    assert_eq!(mesh.to_polygon_mesh(), before);
    assert_eq!(mesh.half_edges.len(), half_edges_before);
    assert!(mesh.half_edges.iter().all(|he| !he.removed));
}

#[test]
fn test_collapse_interior_edge() {
    let mut mesh = create_grid_mesh(3);
    let h = mesh.half_edge_between(5, 6).unwrap();
    assert_eq!(mesh.collapse_check(h), Ok(()));
    assert!(mesh.collapse_edge(h));
    mesh.validate_connectivity();

    assert!(mesh.vertices[6].removed);
    assert!(!mesh.vertices[5].removed);
    assert_eq!(mesh.vertices[5].position, Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(mesh.live_vertex_count(), 15);
    assert_eq!(mesh.live_face_count(), 16);
    assert_eq!(mesh.live_edge_count(), 30);
    assert!(mesh.half_edge_between(5, 7).is_some());
    assert_eq!(mesh.holes().len(), 1);
}

#[test]
fn test_collapse_boundary_edge() {
    let mut mesh = create_grid_mesh(3);
    let h = mesh.half_edge_between(1, 2).unwrap();
    assert!(mesh.is_boundary_edge(h));
    assert!(mesh.collapse_edge(h));
    mesh.validate_connectivity();

    assert_eq!(mesh.live_vertex_count(), 15);
    assert_eq!(mesh.live_face_count(), 17);
    assert_eq!(mesh.live_edge_count(), 31);
    assert!(mesh.is_boundary_vertex(1));
    assert_eq!(mesh.holes().len(), 1);
}

#[test]
fn test_collapse_rejects_ear_and_tetrahedron() {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    let mut tri = Mesh::from_polygons(&positions, &[[0usize, 1, 2]]).unwrap();
    assert_eq!(tri.collapse_check(0), Err(CollapseReject::Ear));
    assert!(!tri.collapse_edge(0));

    let mut tet = create_tetrahedron();
    let h = tet.half_edge_between(0, 1).unwrap();
    assert_eq!(tet.collapse_check(h), Err(CollapseReject::OppositeValence));
    assert!(!tet.collapse_edge(h));
    tet.validate_connectivity();
}

#[test]
fn test_collapse_removed_edge_is_rejected() {
    let mut mesh = create_grid_mesh(3);
    let h = mesh.half_edge_between(5, 6).unwrap();
    assert!(mesh.collapse_edge(h));
    assert_eq!(mesh.collapse_check(h), Err(CollapseReject::Removed));
    assert!(!mesh.collapse_edge(h));
}

#[test]
fn test_spin_keeps_vertex_set() {
    let mut mesh = create_square_mesh();
    let h = mesh.half_edge_between(0, 2).unwrap();
    let faces_before = mesh.live_face_count();
    let union_before: HashSet<usize> = face_sets(&mesh).into_iter().flatten().collect();
    let positions_before: Vec<Vec3> = mesh.vertices.iter().map(|v| v.position).collect();

    assert_eq!(mesh.spin_check(h), Ok((3, 1)));
    assert!(mesh.spin_edge(h));
    mesh.validate_connectivity();

    let union_after: HashSet<usize> = face_sets(&mesh).into_iter().flatten().collect();
    assert_eq!(union_before, union_after);
    assert_eq!(mesh.live_face_count(), faces_before);
    assert!(mesh.half_edge_between(0, 2).is_none());
    assert!(mesh.half_edge_between(1, 3).is_some());
    assert_eq!(Mesh::edge_index(mesh.half_edge_between(1, 3).unwrap()), Mesh::edge_index(h));
    let positions_after: Vec<Vec3> = mesh.vertices.iter().map(|v| v.position).collect();
    assert_eq!(positions_before, positions_after);

    let expected: Vec<HashSet<usize>> = vec![[0, 1, 3].into_iter().collect(), [1, 2, 3].into_iter().collect()];
    assert_eq!(face_sets(&mesh), expected);

    // Spinning back restores the original diagonal
    assert!(mesh.spin_edge(h));
    mesh.validate_connectivity();
    assert!(mesh.half_edge_between(0, 2).is_some());
}

#[test]
fn test_spin_rejections() {
    let mut mesh = create_square_mesh();
    let border = mesh.half_edge_between(0, 1).unwrap();
    assert_eq!(mesh.spin_check(border), Err(SpinReject::BorderEdge));
    assert!(!mesh.spin_edge(border));

    let mut tet = create_tetrahedron();
    let h = tet.half_edge_between(0, 1).unwrap();
    assert_eq!(tet.spin_check(h), Err(SpinReject::DuplicateEdge));
    assert!(!tet.spin_edge(h));
    tet.validate_connectivity();
}

#[test]
fn test_spin_grid_interior_edges() {
    let mut mesh = create_grid_mesh(4);
    let edges: Vec<usize> = mesh.live_edges().collect();
    let mut spun = 0;
    for h in edges {
        if mesh.spin_edge(h) {
            spun += 1;
            mesh.validate_connectivity();
        }
    }
    assert!(spun > 0);
    assert_eq!(mesh.live_face_count(), 32);
    assert_eq!(mesh.holes().len(), 1);
}

#[test]
fn test_compact_remaps_attributes() {
    let mut mesh = create_grid_mesh(3);
    let h = mesh.half_edge_between(5, 6).unwrap();
    assert!(mesh.collapse_edge(h));
    let h = mesh.half_edge_between(13, 14).unwrap();
    assert!(mesh.collapse_edge(h));

    let live = (mesh.live_vertex_count(), mesh.live_edge_count(), mesh.live_face_count());
    let positions_before: Vec<Vec3> = mesh.vertices.iter().map(|v| v.position).collect();
    let mut vertex_ids: Vec<usize> = (0..mesh.vertices.len()).collect();
    let mut edge_ids: Vec<usize> = (0..mesh.edge_slots()).collect();
    let mut face_ids: Vec<usize> = (0..mesh.faces.len()).collect();

    let v_attr: &mut dyn ElementAttribute = &mut vertex_ids;
    let e_attr: &mut dyn ElementAttribute = &mut edge_ids;
    let f_attr: &mut dyn ElementAttribute = &mut face_ids;
    let map = mesh.compact_with(&mut [v_attr], &mut [e_attr], &mut [f_attr]);
    mesh.validate_connectivity();

    assert!(!map.is_identity());
    assert_eq!(mesh.vertices.len(), live.0);
    assert_eq!(mesh.half_edges.len(), live.1 * 2);
    assert_eq!(mesh.faces.len(), live.2);
    assert!(mesh.vertices.iter().all(|v| !v.removed));

    assert_eq!(vertex_ids.len(), mesh.vertices.len());
    for (i, &old) in vertex_ids.iter().enumerate() {
        assert_eq!(mesh.vertices[i].position, positions_before[old]);
        assert_eq!(map.vertices[old], i);
    }
    assert!(edge_ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(edge_ids.len(), live.1);
    assert_eq!(face_ids.len(), live.2);
}

#[test]
fn test_compact_is_idempotent() {
    let mut mesh = create_grid_mesh(3);
    let h = mesh.half_edge_between(5, 6).unwrap();
    assert!(mesh.collapse_edge(h));

    mesh.compact();
    let counts = (mesh.vertices.len(), mesh.half_edges.len(), mesh.faces.len());
    let snapshot = mesh.to_polygon_mesh();

    let mut attr: Vec<u8> = vec![7; mesh.vertices.len()];
    let a: &mut dyn ElementAttribute = &mut attr;
    let second = mesh.compact_with(&mut [a], &mut [], &mut []);
    assert!(second.is_identity());
    assert_eq!(counts, (mesh.vertices.len(), mesh.half_edges.len(), mesh.faces.len()));
    assert_eq!(snapshot, mesh.to_polygon_mesh());
    assert_eq!(attr, vec![7; mesh.vertices.len()]);
    mesh.validate_connectivity();
}
