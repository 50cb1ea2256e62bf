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


use tracing::debug;

use crate::mesh::basic_types::{INVALID, Mesh};

/// A per-element array kept index-aligned with one of the mesh's element
/// collections across [`Mesh::compact_with`].
pub trait ElementAttribute {
    /// Applies a stable compaction: element `i` moves to `old_to_new[i]`
    /// (always `<= i`), entries mapped to [`INVALID`] are dropped, and the
    /// array is truncated to `new_len`.
    fn remap(&mut self, old_to_new: &[usize], new_len: usize);
}

impl<T> ElementAttribute for Vec<T> {
    fn remap(&mut self, old_to_new: &[usize], new_len: usize) {
        assert_eq!(
            self.len(),
            old_to_new.len(),
            "attribute array is not aligned with its element collection"
        );
        for (old, &new) in old_to_new.iter().enumerate() {
            if new != INVALID && new != old {
                self.swap(new, old);
            }
        }
        self.truncate(new_len);
    }
}

/// Old-to-new index maps produced by a compaction. Removed elements map to
/// [`INVALID`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactMap {
    pub vertices: Vec<usize>,
    pub edges: Vec<usize>,
    pub faces: Vec<usize>,
}

impl CompactMap {
    /// True when nothing moved and nothing was dropped.
    pub fn is_identity(&self) -> bool {
        let identity = |m: &[usize]| m.iter().enumerate().all(|(i, &j)| i == j);
        identity(&self.vertices) && identity(&self.edges) && identity(&self.faces)
    }

    /// New index of half-edge `he`, or [`INVALID`].
    #[inline]
    pub fn half_edge(&self, he: usize) -> usize {
        match self.edges[he / 2] {
            INVALID => INVALID,
            e => e * 2 + (he & 1),
        }
    }
}

fn dense_map(removed: impl Iterator<Item = bool>) -> (Vec<usize>, usize) {
    let mut next = 0;
    let map = removed
        .map(|r| {
            if r {
                INVALID
            } else {
                next += 1;
                next - 1
            }
        })
        .collect();
    (map, next)
}

impl Mesh {
    /// Drops removed elements and renumbers the rest densely.
    pub fn compact(&mut self) -> CompactMap {
        self.compact_with(&mut [], &mut [], &mut [])
    }

    /// Like [`Mesh::compact`], also remapping caller arrays indexed by
    /// vertex, by edge (`half_edge / 2`) and by face.
    pub fn compact_with(
        &mut self,
        vertex_attrs: &mut [&mut dyn ElementAttribute],
        edge_attrs: &mut [&mut dyn ElementAttribute],
        face_attrs: &mut [&mut dyn ElementAttribute],
    ) -> CompactMap {
        let (vmap, nv) = dense_map(self.vertices.iter().map(|v| v.removed));
        let (emap, ne) = dense_map(self.half_edges.iter().step_by(2).map(|h| h.removed));
        let (fmap, nf) = dense_map(self.faces.iter().map(|f| f.removed));
        let map = CompactMap {
            vertices: vmap,
            edges: emap,
            faces: fmap,
        };
        let hmap: Vec<usize> = (0..self.half_edges.len()).map(|h| map.half_edge(h)).collect();

        for v in self.vertices.iter_mut().filter(|v| !v.removed) {
            v.half_edge = v.half_edge.map(|h| hmap[h]);
        }
        for he in self.half_edges.iter_mut().filter(|h| !h.removed) {
            he.vertex = map.vertices[he.vertex];
            he.next = hmap[he.next];
            he.prev = hmap[he.prev];
            he.twin = hmap[he.twin];
            he.face = he.face.map(|f| map.faces[f]);
        }
        for f in self.faces.iter_mut().filter(|f| !f.removed) {
            f.half_edge = hmap[f.half_edge];
        }

        let removed = (
            self.vertices.len() - nv,
            self.half_edges.len() / 2 - ne,
            self.faces.len() - nf,
        );

        self.vertices.remap(&map.vertices, nv);
        self.half_edges.remap(&hmap, ne * 2);
        self.faces.remap(&map.faces, nf);

        for attr in vertex_attrs.iter_mut() {
            attr.remap(&map.vertices, nv);
        }
        for attr in edge_attrs.iter_mut() {
            attr.remap(&map.edges, ne);
        }
        for attr in face_attrs.iter_mut() {
            attr.remap(&map.faces, nf);
        }

        debug!(
            vertices = removed.0,
            edges = removed.1,
            faces = removed.2,
            "compacted mesh"
        );
        map
    }
}
