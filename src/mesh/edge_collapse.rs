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
use tracing::trace;

use crate::mesh::basic_types::Mesh;

/// Why [`Mesh::collapse_check`] refused an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseReject {
    /// The edge or one of its endpoints is already removed.
    Removed,
    /// An adjacent face is not a triangle.
    NotTriangle,
    /// Interior edge joining two boundary vertices; collapsing tears the
    /// boundary.
    Bridge,
    /// Both remaining edges of an adjacent triangle lie on the boundary.
    Ear,
    /// The two opposite vertices coincide.
    TwoGon,
    /// Common neighbours beyond the opposite vertices.
    LinkCondition,
    /// An interior opposite vertex would drop below valence 3.
    OppositeValence,
}

impl Mesh {
    /// Opposite vertex of `he` within its triangle, if `he` has a face.
    fn opposite_vertex(&self, he: usize) -> Result<Option<usize>, CollapseReject> {
        if self.half_edges[he].face.is_none() {
            return Ok(None);
        }
        let n = self.half_edges[he].next;
        let nn = self.half_edges[n].next;
        if self.half_edges[nn].next != he {
            return Err(CollapseReject::NotTriangle);
        }
        if self.is_boundary_half_edge(n ^ 1) && self.is_boundary_half_edge(nn ^ 1) {
            return Err(CollapseReject::Ear);
        }
        Ok(Some(self.half_edges[n].vertex))
    }

    /// Checks whether collapsing `he` (keeping `source(he)`, removing
    /// `target(he)`) leaves a manifold mesh. Never mutates.
    pub fn collapse_check(&self, he: usize) -> Result<(), CollapseReject> {
        let h = &self.half_edges[he];
        if h.removed {
            return Err(CollapseReject::Removed);
        }
        let keep = self.source(he);
        let gone = h.vertex;
        if self.vertices[keep].removed || self.vertices[gone].removed {
            return Err(CollapseReject::Removed);
        }

        if !self.is_boundary_edge(he)
            && self.is_boundary_vertex(keep)
            && self.is_boundary_vertex(gone)
        {
            return Err(CollapseReject::Bridge);
        }

        let vl = self.opposite_vertex(he)?;
        let vr = self.opposite_vertex(he ^ 1)?;
        if vl == vr {
            return Err(CollapseReject::TwoGon);
        }

        let ring_keep = self.one_ring_neighbors(keep);
        let ring_gone = self.one_ring_neighbors(gone);
        let shared_extra = ring_gone
            .iter()
            .filter(|&&x| Some(x) != vl && Some(x) != vr)
            .any(|x| ring_keep.contains(x));
        if shared_extra {
            return Err(CollapseReject::LinkCondition);
        }

        for x in [vl, vr].into_iter().flatten() {
            if !self.is_boundary_vertex(x) && self.vertex_degree(x) <= 3 {
                return Err(CollapseReject::OppositeValence);
            }
        }
        Ok(())
    }

    /// Collapses the edge of `he` into `source(he)`; `target(he)`, the edge
    /// and the degenerate triangles on both sides are marked removed.
    /// Positions are left untouched. Returns false, with the mesh unchanged,
    /// if [`Mesh::collapse_check`] fails.
    pub fn collapse_edge(&mut self, he: usize) -> bool {
        if let Err(reason) = self.collapse_check(he) {
            trace!(half_edge = he, ?reason, "collapse rejected");
            return false;
        }

        // h0 runs from the removed vertex to the kept one
        let h0 = he ^ 1;
        let h1 = self.half_edges[h0].next;
        let o1 = self.half_edges[he].next;

        self.collapse_edge_core(h0);

        if self.half_edges[self.half_edges[h1].next].next == h1 {
            self.collapse_loop(self.half_edges[h1].next);
        }
        if self.half_edges[self.half_edges[o1].next].next == o1 {
            self.collapse_loop(o1);
        }
        true
    }

    /// Removes `h: vo -> vh` and `vo`, re-targeting every half-edge that
    /// ended at `vo`. May leave 2-gons behind.
    fn collapse_edge_core(&mut self, h: usize) {
        let o = h ^ 1;
        let hn = self.half_edges[h].next;
        let hp = self.half_edges[h].prev;
        let on = self.half_edges[o].next;
        let op = self.half_edges[o].prev;
        let fh = self.half_edges[h].face;
        let fo = self.half_edges[o].face;
        let vh = self.half_edges[h].vertex;
        let vo = self.half_edges[o].vertex;

        let outgoing: SmallVec<[usize; 8]> = self.outgoing_half_edges(vo);
        for out in outgoing {
            self.half_edges[out ^ 1].vertex = vh;
        }

        self.link(hp, hn);
        self.link(op, on);

        if let Some(f) = fh {
            self.faces[f].half_edge = hn;
        }
        if let Some(f) = fo {
            self.faces[f].half_edge = on;
        }

        if self.vertices[vh].half_edge == Some(o) {
            self.vertices[vh].half_edge = Some(hn);
        }
        self.adjust_outgoing_half_edge(vh);

        let gone = &mut self.vertices[vo];
        gone.half_edge = None;
        gone.removed = true;
        self.half_edges[h].removed = true;
        self.half_edges[o].removed = true;
    }

    /// Removes the 2-gon `h0, next(h0)`: the edge of `h0` and its face go
    /// away, `next(h0)` takes the place of `twin(h0)`.
    fn collapse_loop(&mut self, h0: usize) {
        let h1 = self.half_edges[h0].next;
        let o0 = h0 ^ 1;
        let o1 = h1 ^ 1;
        let v0 = self.half_edges[h0].vertex;
        let v1 = self.half_edges[h1].vertex;
        let fh = self.half_edges[h0].face;
        let fo = self.half_edges[o0].face;

        debug_assert!(self.half_edges[h1].next == h0 && h1 != o0, "not a loop");

        let on = self.half_edges[o0].next;
        let op = self.half_edges[o0].prev;
        self.link(h1, on);
        self.link(op, h1);
        self.half_edges[h1].face = fo;

        self.vertices[v0].half_edge = Some(h1);
        self.adjust_outgoing_half_edge(v0);
        self.vertices[v1].half_edge = Some(o1);
        self.adjust_outgoing_half_edge(v1);

        if let Some(f) = fo
            && self.faces[f].half_edge == o0
        {
            self.faces[f].half_edge = h1;
        }
        if let Some(f) = fh {
            self.faces[f].removed = true;
        }
        self.half_edges[h0].removed = true;
        self.half_edges[o0].removed = true;
    }
}
