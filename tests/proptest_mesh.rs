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

//! Property-based tests: random edit sequences must keep the halfedge
//! structure consistent.

use dynremesh::{Vec3, field::map_to_length, mesh::Mesh};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Split(usize, f64),
    Collapse(usize),
    Spin(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), 0.1..0.9f64).prop_map(|(e, t)| Op::Split(e, t)),
        any::<usize>().prop_map(Op::Collapse),
        any::<usize>().prop_map(Op::Spin),
    ]
}

/// Grid of `n x n` quads, each cut into two triangles, with per-vertex
/// height jitter.
fn arb_grid() -> impl Strategy<Value = Mesh> {
    (2usize..6).prop_flat_map(|n| {
        prop::collection::vec(-0.3..0.3f64, (n + 1) * (n + 1)).prop_map(move |heights| {
            let positions: Vec<Vec3> = heights
                .iter()
                .enumerate()
                .map(|(k, &z)| Vec3::new((k % (n + 1)) as f64, (k / (n + 1)) as f64, z))
                .collect();
            let idx = |i: usize, j: usize| j * (n + 1) + i;
            let mut faces = Vec::new();
            for j in 0..n {
                for i in 0..n {
                    faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
                    faces.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
                }
            }
            Mesh::from_polygons(&positions, &faces).unwrap()
        })
    })
}

fn euler_characteristic(mesh: &Mesh) -> i64 {
    mesh.live_vertex_count() as i64 - mesh.live_edge_count() as i64 + mesh.live_face_count() as i64
}

fn apply(mesh: &mut Mesh, op: Op) {
    let edges: Vec<usize> = mesh.live_edges().collect();
    match op {
        Op::Split(e, t) => {
            let h = edges[e % edges.len()];
            let p = mesh.vertices[mesh.source(h)]
                .position
                .lerp(&mesh.vertices[mesh.target(h)].position, t);
            assert!(mesh.split_edge_at(h, p).is_some());
        }
        Op::Collapse(e) => {
            let h = edges[e % edges.len()] ^ (e & 1);
            let allowed = mesh.collapse_check(h).is_ok();
            assert_eq!(mesh.collapse_edge(h), allowed);
        }
        Op::Spin(e) => {
            let h = edges[e % edges.len()];
            let allowed = mesh.spin_check(h).is_ok();
            assert_eq!(mesh.spin_edge(h), allowed);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_edits_keep_a_valid_disk(
        mut mesh in arb_grid(),
        ops in prop::collection::vec(arb_op(), 1..40),
    ) {
        for op in ops {
            apply(&mut mesh, op);
            mesh.validate_connectivity();
            prop_assert_eq!(euler_characteristic(&mesh), 1);
            prop_assert!(mesh.live_face_count() >= 1);
        }
        prop_assert_eq!(mesh.holes().len(), 1);
    }

    #[test]
    fn rejected_collapse_changes_nothing(mut mesh in arb_grid(), e in any::<usize>()) {
        let edges: Vec<usize> = mesh.live_edges().collect();
        let h = edges[e % edges.len()];
        if mesh.collapse_check(h).is_err() {
            let before = mesh.to_polygon_mesh();
            prop_assert!(!mesh.collapse_edge(h));
            prop_assert_eq!(before, mesh.to_polygon_mesh());
        }
    }

    #[test]
    fn compaction_preserves_the_live_mesh(
        mut mesh in arb_grid(),
        ops in prop::collection::vec(arb_op(), 1..30),
    ) {
        for op in ops {
            apply(&mut mesh, op);
        }
        let snapshot = mesh.to_polygon_mesh();
        let counts = (mesh.live_vertex_count(), mesh.live_edge_count(), mesh.live_face_count());

        mesh.compact();
        mesh.validate_connectivity();
        prop_assert_eq!(mesh.vertices.len(), counts.0);
        prop_assert_eq!(mesh.half_edges.len(), counts.1 * 2);
        prop_assert_eq!(mesh.faces.len(), counts.2);
        prop_assert_eq!(snapshot, mesh.to_polygon_mesh());
        prop_assert!(mesh.compact().is_identity());
    }

    #[test]
    fn mapped_lengths_stay_in_range(value in -10.0..10.0f64, min in 0.01..1.0f64, extra in 0.0..5.0f64) {
        let max = min + extra;
        let len = map_to_length(value, min, max);
        prop_assert!(len >= min && len <= max);
    }
}
