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


use ahash::AHashSet;
use smallvec::SmallVec;

use crate::{
    geometry::{Real, Vec3, VectorOps, triangle::triangle_area_normal},
    mesh::basic_types::*,
};

impl Mesh {
    #[inline]
    pub fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].twin].vertex
    }

    #[inline]
    pub fn target(&self, he: usize) -> usize {
        self.half_edges[he].vertex
    }

    /// Undirected edge owning half-edge `he`.
    #[inline]
    pub const fn edge_index(he: usize) -> usize {
        he / 2
    }

    /// First half of edge `e`.
    #[inline]
    pub const fn edge_half_edge(e: usize) -> usize {
        e * 2
    }

    /// Edge slots in the arena, live or not.
    #[inline]
    pub fn edge_slots(&self) -> usize {
        self.half_edges.len() / 2
    }

    #[inline]
    pub fn is_edge_removed(&self, e: usize) -> bool {
        self.half_edges[Self::edge_half_edge(e)].removed
    }

    #[inline]
    pub fn is_boundary_half_edge(&self, he: usize) -> bool {
        self.half_edges[he].face.is_none()
    }

    /// True if either side of the edge of `he` is a border.
    #[inline]
    pub fn is_boundary_edge(&self, he: usize) -> bool {
        self.half_edges[he].face.is_none() || self.half_edges[self.half_edges[he].twin].face.is_none()
    }

    /// Enumerate all outgoing half-edges from `v` exactly once, by stepping
    /// `twin.next`. Works across open boundaries because border loops are
    /// wired.
    pub fn outgoing_half_edges(&self, v: usize) -> SmallVec<[usize; 8]> {
        let mut result = SmallVec::new();
        let Some(start) = self.vertices[v].half_edge else { return result };
        let mut h = start;
        loop {
            result.push(h);
            h = self.half_edges[self.half_edges[h].twin].next;
            if h == start {
                break;
            }
            debug_assert!(
                result.len() <= self.half_edges.len(),
                "rotation around vertex {} does not close",
                v
            );
        }
        result
    }

    pub fn is_boundary_vertex(&self, v: usize) -> bool {
        self.outgoing_half_edges(v)
            .into_iter()
            .any(|he| self.half_edges[he].face.is_none())
    }

    pub fn vertex_degree(&self, v: usize) -> usize {
        self.outgoing_half_edges(v).len()
    }

    pub fn one_ring_neighbors(&self, v: usize) -> SmallVec<[usize; 8]> {
        self.outgoing_half_edges(v)
            .iter()
            .map(|&he| self.half_edges[he].vertex)
            .collect()
    }

    /// Faces around `v` (border wedges skipped).
    pub fn incident_faces(&self, v: usize) -> SmallVec<[usize; 8]> {
        self.outgoing_half_edges(v)
            .iter()
            .filter_map(|&he| self.half_edges[he].face)
            .collect()
    }

    pub fn half_edge_between(&self, from: usize, to: usize) -> Option<usize> {
        self.outgoing_half_edges(from)
            .into_iter()
            .find(|&he| self.half_edges[he].vertex == to)
    }

    /// Half-edges bounding face `f`, in loop order.
    pub fn face_half_edges(&self, f: usize) -> SmallVec<[usize; 4]> {
        debug_assert!(!self.faces[f].removed, "face_half_edges called on removed face {}", f);
        let mut result = SmallVec::new();
        let start = self.faces[f].half_edge;
        let mut h = start;
        loop {
            result.push(h);
            h = self.half_edges[h].next;
            if h == start {
                break;
            }
            debug_assert!(result.len() <= self.half_edges.len(), "face {} loop does not close", f);
        }
        result
    }

    /// Vertices of face `f`, starting at the tail of its representative
    /// half-edge.
    pub fn face_vertices(&self, f: usize) -> SmallVec<[usize; 4]> {
        self.face_half_edges(f)
            .iter()
            .map(|&he| self.source(he))
            .collect()
    }

    #[inline]
    pub fn triangle_vertices(&self, f: usize) -> [usize; 3] {
        let he0 = self.faces[f].half_edge;
        let he1 = self.half_edges[he0].next;
        let he2 = self.half_edges[he1].next;
        debug_assert_eq!(self.half_edges[he2].next, he0);
        [self.source(he0), self.half_edges[he0].vertex, self.half_edges[he1].vertex]
    }

    pub fn face_degree(&self, f: usize) -> usize {
        self.face_half_edges(f).len()
    }

    #[inline]
    pub fn edge_vector(&self, he: usize) -> Vec3 {
        self.vertices[self.target(he)].position - self.vertices[self.source(he)].position
    }

    #[inline]
    pub fn edge_length_sq(&self, he: usize) -> Real {
        self.edge_vector(he).norm2()
    }

    #[inline]
    pub fn edge_length(&self, he: usize) -> Real {
        self.edge_length_sq(he).sqrt()
    }

    #[inline]
    pub fn edge_midpoint(&self, he: usize) -> Vec3 {
        let a = &self.vertices[self.source(he)].position;
        let b = &self.vertices[self.target(he)].position;
        a.midpoint(b)
    }

    /// Area vector of face `f` (fan sum), length = area.
    pub fn face_area_vector(&self, f: usize) -> Vec3 {
        let vs = self.face_vertices(f);
        let p0 = self.vertices[vs[0]].position;
        let mut acc = Vec3::zero();
        for i in 1..vs.len() - 1 {
            acc += triangle_area_normal(
                &p0,
                &self.vertices[vs[i]].position,
                &self.vertices[vs[i + 1]].position,
            );
        }
        acc * 0.5
    }

    pub fn face_normal(&self, f: usize) -> Option<Vec3> {
        self.face_area_vector(f).normalized()
    }

    /// Area-weighted vertex normal; `None` when the incident area vanishes.
    pub fn vertex_normal(&self, v: usize) -> Option<Vec3> {
        let mut acc = Vec3::zero();
        for f in self.incident_faces(v) {
            acc += self.face_area_vector(f);
        }
        acc.normalized()
    }

    /// First half of every live edge.
    pub fn live_edges(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.half_edges.len())
            .step_by(2)
            .filter(move |&h| !self.half_edges[h].removed)
    }

    pub fn live_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| !v.removed).count()
    }

    pub fn live_face_count(&self) -> usize {
        self.faces.iter().filter(|f| !f.removed).count()
    }

    pub fn live_edge_count(&self) -> usize {
        self.live_edges().count()
    }

    /// Recomputes the cached degree of every live vertex.
    pub fn update_degrees(&mut self) {
        for v in 0..self.vertices.len() {
            if !self.vertices[v].removed {
                self.vertices[v].degree = self.vertex_degree(v);
            }
        }
    }

    /// One border half-edge per boundary loop (hole). Visited border
    /// half-edges are tagged with a fresh generation, so every loop is
    /// reported once.
    pub fn holes(&mut self) -> Vec<usize> {
        let generation = self.new_generation();
        let mut holes = Vec::new();
        for h in 0..self.half_edges.len() {
            let he = &self.half_edges[h];
            if he.removed || he.face.is_some() || he.stamp == generation {
                continue;
            }
            holes.push(h);
            let mut cur = h;
            loop {
                self.half_edges[cur].stamp = generation;
                cur = self.half_edges[cur].next;
                if cur == h {
                    break;
                }
            }
        }
        holes
    }

    /// Border half-edges of the loop containing `he`, in `next` order.
    pub fn boundary_loop(&self, he: usize) -> Vec<usize> {
        debug_assert!(self.half_edges[he].face.is_none());
        let mut result = Vec::new();
        let mut cur = he;
        loop {
            result.push(cur);
            cur = self.half_edges[cur].next;
            if cur == he || result.len() > self.half_edges.len() {
                break;
            }
        }
        result
    }

    pub fn edge_statistics(&self) -> EdgeStatistics {
        let mut stats = EdgeStatistics {
            count: 0,
            min: Real::INFINITY,
            max: 0.0,
            mean: 0.0,
        };
        let mut sum = 0.0;
        for h in self.live_edges() {
            let len = self.edge_length(h);
            stats.count += 1;
            stats.min = stats.min.min(len);
            stats.max = stats.max.max(len);
            sum += len;
        }
        if stats.count == 0 {
            return EdgeStatistics::default();
        }
        stats.mean = sum / stats.count as Real;
        stats
    }

    /// Snapshot of the live mesh with dense indices.
    pub fn to_polygon_mesh(&self) -> PolygonMesh {
        let mut old_to_new = vec![INVALID; self.vertices.len()];
        let mut positions = Vec::with_capacity(self.vertices.len());
        for (i, v) in self.vertices.iter().enumerate() {
            if !v.removed {
                old_to_new[i] = positions.len();
                positions.push(v.position);
            }
        }
        let faces = (0..self.faces.len())
            .filter(|&f| !self.faces[f].removed)
            .map(|f| self.face_vertices(f).iter().map(|&v| old_to_new[v]).collect())
            .collect();
        PolygonMesh { positions, faces }
    }

    /// Panics on any broken halfedge invariant. A failure here means the
    /// mesh code itself is defective.
    pub fn validate_connectivity(&self) {
        let m = self.half_edges.len();
        assert_eq!(m % 2, 0, "odd half-edge count {}", m);

        for (i, he) in self.half_edges.iter().enumerate() {
            if he.removed {
                assert!(self.half_edges[i ^ 1].removed, "he {} removed without its twin", i);
                continue;
            }
            assert_eq!(he.twin, i ^ 1, "he {} twin is not its pair", i);
            assert_eq!(self.half_edges[he.twin].twin, i, "he {} twin -> twin mismatch", i);
            assert!(he.next < m && he.prev < m, "he {} next/prev out of range", i);
            assert!(!self.half_edges[he.next].removed, "he {} next is removed", i);
            assert!(!self.half_edges[he.prev].removed, "he {} prev is removed", i);
            assert_eq!(self.half_edges[he.next].prev, i, "he {} next -> prev mismatch", i);
            assert_eq!(self.half_edges[he.prev].next, i, "he {} prev -> next mismatch", i);
            assert_eq!(
                self.half_edges[he.prev].vertex,
                self.source(i),
                "he {} does not start where its prev ends",
                i
            );
            assert_ne!(he.vertex, self.source(i), "he {} is a self-loop", i);
            assert!(!self.vertices[he.vertex].removed, "he {} points at removed vertex", i);
            assert_eq!(
                self.half_edges[he.next].face, he.face,
                "he {} and its next disagree on the face",
                i
            );
            if let Some(f) = he.face {
                assert!(!self.faces[f].removed, "he {} lies on removed face {}", i, f);
            }
        }

        for (fi, face) in self.faces.iter().enumerate() {
            if face.removed {
                continue;
            }
            let start = face.half_edge;
            let mut cur = start;
            let mut steps = 0;
            loop {
                assert_eq!(
                    self.half_edges[cur].face,
                    Some(fi),
                    "face {} half-edge {} points at wrong face",
                    fi,
                    cur
                );
                cur = self.half_edges[cur].next;
                steps += 1;
                assert!(steps <= m, "face {} loop does not close", fi);
                if cur == start {
                    break;
                }
            }
            assert!(steps >= 3, "face {} has degree {}", fi, steps);
        }

        for (vi, v) in self.vertices.iter().enumerate() {
            if v.removed {
                continue;
            }
            let start = v.half_edge.unwrap_or_else(|| panic!("vertex {} has no half-edge", vi));
            assert!(!self.half_edges[start].removed, "vertex {} seeds a removed half-edge", vi);
            let mut cur = start;
            let mut steps = 0;
            loop {
                assert_eq!(self.source(cur), vi, "vertex {}: half-edge {} is not outgoing", vi, cur);
                cur = self.half_edges[self.half_edges[cur].twin].next;
                steps += 1;
                assert!(steps <= m, "rotation around vertex {} does not close", vi);
                if cur == start {
                    break;
                }
            }
        }

        let mut edge_set = AHashSet::new();
        for (i, he) in self.half_edges.iter().enumerate() {
            if he.removed {
                continue;
            }
            let src = self.source(i);
            let dst = he.vertex;
            assert!(edge_set.insert((src, dst)), "duplicate half-edge ({},{})", src, dst);
        }
    }
}
