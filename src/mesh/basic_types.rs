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
    geometry::{Real, Vec3},
    mesh::{face::Face, half_edge::HalfEdge, vertex::Vertex},
};

/// Sentinel for "no element" in index fields that are not yet wired.
pub const INVALID: usize = usize::MAX;

/// Feature membership of a vertex or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeatureTag {
    /// Not attached to any feature.
    #[default]
    None,
    /// Attached to the feature at this index of the solver's feature list.
    Index(usize),
    /// Pinned: explicitly fixed, or within reach of two or more features.
    Fixed,
}

impl FeatureTag {
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            FeatureTag::Index(i) => Some(i),
            _ => None,
        }
    }

    #[inline]
    pub fn is_fixed(self) -> bool {
        matches!(self, FeatureTag::Fixed)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        matches!(self, FeatureTag::None)
    }
}

/// Outcome of [`Mesh::split_edge`](crate::mesh::basic_types::Mesh::split_edge).
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// The inserted vertex.
    pub vertex: usize,
    /// Half-edge from the new vertex to the old head of the split half-edge.
    pub half_edge: usize,
    /// Edge indices created by the split (the second half of the split edge
    /// first, then one diagonal per re-triangulated face).
    pub new_edges: SmallVec<[usize; 3]>,
    /// Faces created by re-triangulation.
    pub new_faces: SmallVec<[usize; 2]>,
}

/// Plain indexed polygon mesh: the input and snapshot format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonMesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<Vec<usize>>,
}

impl PolygonMesh {
    pub fn new(positions: Vec<Vec3>, faces: Vec<Vec<usize>>) -> Self {
        Self { positions, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Edge length statistics over live edges.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeStatistics {
    pub count: usize,
    pub min: Real,
    pub max: Real,
    pub mean: Real,
}

/// Index-based halfedge mesh.
///
/// Half-edges are allocated in twin pairs, so `twin(h) == h ^ 1` and the
/// undirected edge of `h` is `h / 2`. Removed elements stay in place until
/// [`Mesh::compact`] runs.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub half_edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,

    pub(crate) generation: u64,
}
