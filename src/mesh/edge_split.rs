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


use smallvec::SmallVec;

use crate::{
    geometry::Vec3,
    mesh::basic_types::{Mesh, SplitResult},
};

impl Mesh {
    /// Splits the edge of `he` at its midpoint. See [`Mesh::split_edge_at`].
    pub fn split_edge(&mut self, he: usize) -> Option<SplitResult> {
        let mid = self.edge_midpoint(he);
        self.split_edge_at(he, mid)
    }

    /// Inserts a vertex at `position` on the edge of `he`.
    ///
    /// `he: u -> v` becomes `u -> w`, and a new pair `w -> v` / `v -> w` is
    /// spliced into both adjacent loops. Each adjacent face that was a
    /// triangle gets a diagonal from `w` to its opposite vertex, so it ends
    /// up as two triangles. New edges carry default attributes; the caller
    /// propagates target lengths and feature tags.
    ///
    /// Returns `None` if `he` is removed.
    pub fn split_edge_at(&mut self, he: usize, position: Vec3) -> Option<SplitResult> {
        if self.half_edges[he].removed {
            return None;
        }

        let t = self.half_edges[he].twin;
        let v = self.half_edges[he].vertex;
        let he_next = self.half_edges[he].next;
        let t_prev = self.half_edges[t].prev;
        let he_face = self.half_edges[he].face;
        let t_face = self.half_edges[t].face;

        // Triangle test before the loops grow
        let he_tri = he_face.is_some() && self.half_edges[he_next].next == self.half_edges[he].prev;
        let t_tri = t_face.is_some() && self.half_edges[self.half_edges[t].next].next == t_prev;

        let w = self.add_vertex(position);
        let n = self.new_edge(w, v);
        let nt = n + 1;

        self.half_edges[he].vertex = w;

        // he -> n -> old next
        self.link(he, n);
        self.link(n, he_next);
        self.half_edges[n].face = he_face;

        // old prev -> nt -> t
        self.link(t_prev, nt);
        self.link(nt, t);
        self.half_edges[nt].face = t_face;

        if self.vertices[v].half_edge == Some(t) {
            self.vertices[v].half_edge = Some(nt);
        }
        // t now leaves w; prefer whichever spoke of w lies on a border
        self.vertices[w].half_edge = Some(if t_face.is_none() { t } else { n });

        let mut new_edges: SmallVec<[usize; 3]> = SmallVec::new();
        let mut new_faces: SmallVec<[usize; 2]> = SmallVec::new();
        new_edges.push(Self::edge_index(n));

        if he_tri {
            // loop: he(u->w) n(w->v) a(v->x) b(x->u); ear (w, v, x)
            if let Some(f) = self.cut_ear(n) {
                new_faces.push(f);
                new_edges.push(Self::edge_index(self.half_edges[n].prev));
            }
        }
        if t_tri {
            // loop: t(w->u) c(u->y) d(y->v) nt(v->w); ear (w, u, y)
            if let Some(f) = self.cut_ear(t) {
                new_faces.push(f);
                new_edges.push(Self::edge_index(self.half_edges[t].prev));
            }
        }

        Some(SplitResult {
            vertex: w,
            half_edge: n,
            new_edges,
            new_faces,
        })
    }
}
