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


use crate::mesh::basic_types::Mesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinReject {
    Removed,
    /// Spinning needs a face on both sides.
    BorderEdge,
    NotTriangle,
    /// Both triangles share their opposite vertex.
    Degenerate,
    /// The other diagonal is already an edge.
    DuplicateEdge,
}

impl Mesh {
    /// The two opposite vertices `(c, d)` the edge of `he` would spin onto.
    pub fn spin_check(&self, he: usize) -> Result<(usize, usize), SpinReject> {
        let h = &self.half_edges[he];
        if h.removed {
            return Err(SpinReject::Removed);
        }
        let t = h.twin;
        if h.face.is_none() || self.half_edges[t].face.is_none() {
            return Err(SpinReject::BorderEdge);
        }
        let hn = h.next;
        let tn = self.half_edges[t].next;
        if self.half_edges[self.half_edges[hn].next].next != he
            || self.half_edges[self.half_edges[tn].next].next != t
        {
            return Err(SpinReject::NotTriangle);
        }
        let c = self.half_edges[hn].vertex;
        let d = self.half_edges[tn].vertex;
        if c == d {
            return Err(SpinReject::Degenerate);
        }
        if self.half_edge_between(c, d).is_some() {
            return Err(SpinReject::DuplicateEdge);
        }
        Ok((c, d))
    }

    /// Replaces the edge `a - b` of `he` by the other diagonal `d - c` of
    /// the quad formed by its two triangles. Both faces keep their indices
    /// and the edge keeps its index. Returns false if the edge is on the
    /// boundary, a neighbour is not a triangle, or `c - d` already exists.
    pub fn spin_edge(&mut self, he: usize) -> bool {
        if self.spin_check(he).is_err() {
            return false;
        }

        let a0 = he;
        let b0 = he ^ 1;
        let a1 = self.half_edges[a0].next;
        let a2 = self.half_edges[a1].next;
        let b1 = self.half_edges[b0].next;
        let b2 = self.half_edges[b1].next;

        let va0 = self.half_edges[a0].vertex;
        let va1 = self.half_edges[a1].vertex;
        let vb0 = self.half_edges[b0].vertex;
        let vb1 = self.half_edges[b1].vertex;

        let (Some(fa), Some(fb)) = (self.half_edges[a0].face, self.half_edges[b0].face) else {
            return false;
        };

        self.half_edges[a0].vertex = va1;
        self.half_edges[b0].vertex = vb1;

        self.link(a0, a2);
        self.link(a2, b1);
        self.link(b1, a0);

        self.link(b0, b2);
        self.link(b2, a1);
        self.link(a1, b0);

        self.half_edges[a1].face = Some(fb);
        self.half_edges[b1].face = Some(fa);

        self.faces[fa].half_edge = a0;
        self.faces[fb].half_edge = b0;

        if self.vertices[va0].half_edge == Some(b0) {
            self.vertices[va0].half_edge = Some(a1);
        }
        if self.vertices[vb0].half_edge == Some(a0) {
            self.vertices[vb0].half_edge = Some(b1);
        }
        true
    }
}
