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


use ahash::AHashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    error::{MeshError, MeshResult},
    geometry::{Real, Vec3},
    mesh::{basic_types::*, face::Face, half_edge::HalfEdge, vertex::Vertex},
};

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies an indexed polygon mesh into a halfedge mesh.
    ///
    /// Faces must be consistently oriented; each directed edge may be used
    /// by one face only, and the faces around a vertex must form a single
    /// fan. Vertices referenced by no face are marked removed.
    pub fn from_polygons<F: AsRef<[usize]>>(positions: &[Vec3], faces: &[F]) -> MeshResult<Self> {
        if faces.is_empty() {
            return Err(MeshError::NoFaces);
        }

        let mut mesh = Mesh::new();
        mesh.vertices.reserve(positions.len());
        for (i, p) in positions.iter().enumerate() {
            if !p.is_finite() {
                return Err(MeshError::NonFinitePosition(i));
            }
            mesh.add_vertex(*p);
        }

        let mut edge_map: AHashMap<(usize, usize), usize> =
            AHashMap::with_capacity(faces.len() * 6);

        for (fi, face) in faces.iter().enumerate() {
            let face = face.as_ref();
            if let Some(&bad) = face.iter().find(|&&v| v >= positions.len()) {
                return Err(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: bad,
                    count: positions.len(),
                });
            }
            let mut distinct: SmallVec<[usize; 8]> = face.iter().copied().collect();
            distinct.sort_unstable();
            distinct.dedup();
            if face.len() < 3 || distinct.len() != face.len() {
                return Err(MeshError::DegenerateFace(fi));
            }
            mesh.add_face_loop(face, &mut edge_map)?;
        }

        mesh.link_boundary_loops();
        mesh.seed_vertex_half_edges();
        mesh.check_vertex_fans()?;
        Ok(mesh)
    }

    pub fn from_polygon_mesh(input: &PolygonMesh) -> MeshResult<Self> {
        Self::from_polygons(&input.positions, &input.faces)
    }

    pub fn add_vertex(&mut self, position: Vec3) -> usize {
        let idx = self.vertices.len();
        self.vertices.push(Vertex::new(position));
        idx
    }

    /// Appends the twin pair `from -> to` / `to -> from` and returns the
    /// index of the first half. Links and faces are left unwired.
    pub(crate) fn new_edge(&mut self, from: usize, to: usize) -> usize {
        let h = self.half_edges.len();
        debug_assert_eq!(h % 2, 0, "half-edges must be allocated in pairs");

        let mut he = HalfEdge::new(to);
        he.twin = h + 1;
        let mut twin = HalfEdge::new(from);
        twin.twin = h;

        self.half_edges.push(he);
        self.half_edges.push(twin);
        h
    }

    #[inline]
    pub(crate) fn link(&mut self, a: usize, b: usize) {
        self.half_edges[a].next = b;
        self.half_edges[b].prev = a;
    }

    /// Starts a new stamp generation; elements whose stamp equals the
    /// returned value count as visited in the current pass.
    pub fn new_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn add_face_loop(
        &mut self,
        face: &[usize],
        edge_map: &mut AHashMap<(usize, usize), usize>,
    ) -> MeshResult<usize> {
        let face_idx = self.faces.len();
        // Placeholder; the representative half-edge is set once the loop is wired
        self.faces.push(Face::new(INVALID));

        let n = face.len();
        let mut loop_hes: SmallVec<[usize; 8]> = SmallVec::with_capacity(n);
        for i in 0..n {
            let (from, to) = (face[i], face[(i + 1) % n]);
            let h = match edge_map.get(&(from, to)) {
                Some(&h) => {
                    if self.half_edges[h].face.is_some() {
                        return Err(MeshError::NonManifoldEdge { from, to });
                    }
                    h
                }
                None => {
                    let h = self.new_edge(from, to);
                    edge_map.insert((from, to), h);
                    edge_map.insert((to, from), h + 1);
                    h
                }
            };
            self.half_edges[h].face = Some(face_idx);
            loop_hes.push(h);
        }

        for i in 0..n {
            self.link(loop_hes[i], loop_hes[(i + 1) % n]);
        }
        self.faces[face_idx].half_edge = loop_hes[0];
        Ok(face_idx)
    }

    /// - Border half-edges have `face == None` and an interior twin.
    /// - For each border `b = u->v`, `b.next` is the next border spoke
    ///   leaving `v`, found by rotating through the interior faces at `v`.
    pub(crate) fn link_boundary_loops(&mut self) {
        let borders: Vec<usize> = (0..self.half_edges.len())
            .filter(|&h| !self.half_edges[h].removed && self.half_edges[h].face.is_none())
            .collect();

        let successors: Vec<usize> = borders.iter().map(|&b| self.boundary_successor(b)).collect();
        for (&b, &next) in borders.iter().zip(&successors) {
            self.link(b, next);
        }
    }

    /// Next border half-edge after border `b`, rotating around `head(b)`.
    /// Only interior `prev` links are read.
    fn boundary_successor(&self, b: usize) -> usize {
        let limit = self.half_edges.len();
        let mut t = self.half_edges[b].twin; // interior, origin = head(b)
        for _ in 0..limit {
            let cand = self.half_edges[self.half_edges[t].prev].twin;
            if self.half_edges[cand].face.is_none() {
                return cand;
            }
            t = cand;
        }
        panic!("boundary rotation around half-edge {} did not terminate", b);
    }

    /// Attaches an outgoing half-edge to every vertex, preferring border
    /// spokes. Vertices without incident edges are marked removed.
    fn seed_vertex_half_edges(&mut self) {
        for h in 0..self.half_edges.len() {
            let he = &self.half_edges[h];
            if he.removed {
                continue;
            }
            let src = self.half_edges[he.twin].vertex;
            let is_border = he.face.is_none();
            let v = &mut self.vertices[src];
            match v.half_edge {
                None => v.half_edge = Some(h),
                Some(cur) if is_border && self.half_edges[cur].face.is_some() => {
                    v.half_edge = Some(h)
                }
                _ => {}
            }
        }
        for v in &mut self.vertices {
            if v.half_edge.is_none() {
                v.removed = true;
            }
        }
    }

    /// Every half-edge leaving a vertex must be reached by rotating around
    /// it; otherwise the vertex joins several fans.
    fn check_vertex_fans(&self) -> MeshResult<()> {
        let mut spokes = vec![0usize; self.vertices.len()];
        for h in 0..self.half_edges.len() {
            spokes[self.source(h)] += 1;
        }
        for (v, vertex) in self.vertices.iter().enumerate() {
            if !vertex.removed && self.outgoing_half_edges(v).len() != spokes[v] {
                return Err(MeshError::NonManifoldVertex(v));
            }
        }
        Ok(())
    }

    /// Re-points `v.half_edge` at a border spoke if `v` has one.
    pub(crate) fn adjust_outgoing_half_edge(&mut self, v: usize) {
        let Some(start) = self.vertices[v].half_edge else { return };
        let mut h = start;
        for _ in 0..self.half_edges.len() {
            if self.half_edges[h].face.is_none() {
                self.vertices[v].half_edge = Some(h);
                return;
            }
            h = self.half_edges[self.half_edges[h].twin].next;
            if h == start {
                return;
            }
        }
    }

    /// Splits every polygon into triangles. Returns the number of faces
    /// created.
    pub fn triangulate(&mut self) -> usize {
        let count = self.faces.len();
        let mut created = 0;
        for f in 0..count {
            if !self.faces[f].removed {
                created += self.triangulate_face(f);
            }
        }
        created
    }

    /// Greedy ear clipping: repeatedly cuts the ear whose diagonal
    /// `source(h) -> head(next(h))` is shortest, skipping diagonals that are
    /// already edges. Ties go to the first candidate in loop order. No-op on
    /// triangles.
    pub fn triangulate_face(&mut self, f: usize) -> usize {
        let mut created = 0;
        loop {
            let hes = self.face_half_edges(f);
            if hes.len() <= 3 {
                return created;
            }

            let mut best: Option<(Real, usize)> = None;
            for &h in &hes {
                let a = self.source(h);
                let c = self.target(self.half_edges[h].next);
                if self.half_edge_between(a, c).is_some() {
                    continue;
                }
                let d2 = self.vertices[a].position.distance2(&self.vertices[c].position);
                if best.is_none_or(|(bd, _)| d2 < bd) {
                    best = Some((d2, h));
                }
            }

            let Some((_, h)) = best else {
                trace!(face = f, degree = hes.len(), "no admissible diagonal, face left as is");
                return created;
            };
            if self.cut_ear(h).is_none() {
                return created;
            }
            created += 1;
        }
    }

    /// Cuts the triangle `(source(h0), head(h0), head(next(h0)))` off the
    /// face of `h0` with a new diagonal. Returns the index of the new face;
    /// the old face keeps the remainder of the loop. `None` on border
    /// half-edges.
    pub(crate) fn cut_ear(&mut self, h0: usize) -> Option<usize> {
        let h1 = self.half_edges[h0].next;
        let p0 = self.half_edges[h0].prev;
        let n1 = self.half_edges[h1].next;
        let f = self.half_edges[h0].face?;

        let u = self.source(h0);
        let w = self.half_edges[h1].vertex;

        let e = self.new_edge(w, u); // w -> u closes the ear
        let e_twin = e + 1; // u -> w stays in the old face

        let nf = self.faces.len();
        self.faces.push(Face::new(h0));

        self.link(h1, e);
        self.link(e, h0);
        self.half_edges[h0].face = Some(nf);
        self.half_edges[h1].face = Some(nf);
        self.half_edges[e].face = Some(nf);

        self.link(p0, e_twin);
        self.link(e_twin, n1);
        self.half_edges[e_twin].face = Some(f);
        self.faces[f].half_edge = e_twin;

        Some(nf)
    }
}
