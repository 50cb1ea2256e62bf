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


//! Per-vertex move accumulation and integration.

use smallvec::SmallVec;

use crate::{
    features::Feature,
    geometry::{Real, Vec3, VectorOps},
    mesh::{FeatureTag, Mesh, SpatialHash, vertex::Vertex},
    solver::config::{SmoothingMode, SolverConfig},
};

/// Weighted sum of requested moves for one vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveAccumulator {
    pub sum: Vec3,
    pub weight: Real,
}

impl MoveAccumulator {
    #[inline]
    pub fn add(&mut self, delta: Vec3, weight: Real) {
        self.sum += delta * weight;
        self.weight += weight;
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Displacement that pushes a sphere at `p` out of a sphere at `q`, both
/// of diameter `diameter`: `d * (1 - diameter / |d|)` with `d = q - p` while
/// `|d| < diameter`, zero otherwise. Coincident centres give zero.
#[inline]
pub fn collision_term(p: &Vec3, q: &Vec3, diameter: Real) -> Vec3 {
    let d = *q - *p;
    let len2 = d.norm2();
    if len2 >= diameter * diameter || len2 <= Real::EPSILON * Real::EPSILON {
        return Vec3::zero();
    }
    d * (1.0 - diameter / len2.sqrt())
}

/// Read-only view shared by every worker of the force phase.
pub(crate) struct ForceContext<'a> {
    pub mesh: &'a Mesh,
    pub features: &'a [Box<dyn Feature>],
    pub config: &'a SolverConfig,
    pub grid: Option<&'a SpatialHash<usize>>,
}

impl ForceContext<'_> {
    /// Fills `accumulators[v]` for every vertex `v`. Each worker writes only
    /// its own slot.
    pub fn accumulate(&self, accumulators: &mut [MoveAccumulator]) {
        debug_assert_eq!(accumulators.len(), self.mesh.vertices.len());

        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
            accumulators
                .par_iter_mut()
                .enumerate()
                .for_each(|(v, acc)| self.accumulate_vertex(v, acc));
        }

        #[cfg(not(feature = "parallel"))]
        {
            accumulators
                .iter_mut()
                .enumerate()
                .for_each(|(v, acc)| self.accumulate_vertex(v, acc));
        }
    }

    fn accumulate_vertex(&self, v: usize, acc: &mut MoveAccumulator) {
        let vertex = &self.mesh.vertices[v];
        if vertex.removed || vertex.is_fixed() {
            return;
        }
        let p = vertex.position;
        let config = self.config;

        if config.smoothing_weight > 0.0
            && let Some(delta) = self.smoothing_move(v)
        {
            acc.add(delta, config.smoothing_weight);
        }

        if config.feature_weight > 0.0
            && let FeatureTag::Index(i) = vertex.feature
            && let Some(feature) = self.features.get(i)
        {
            acc.add(feature.closest_point(p) - p, config.feature_weight);
        }

        if let Some(grid) = self.grid {
            let diameter = 2.0 * config.collision_radius;
            for (q, &u) in grid.search(p, diameter) {
                if u == v {
                    continue;
                }
                let term = collision_term(&p, q, diameter);
                if term != Vec3::zero() {
                    acc.add(term, config.collision_weight);
                }
            }
        }
    }

    /// Neighbour-average minus position. Feature vertices average over
    /// neighbours on the same feature, boundary vertices over their boundary
    /// neighbours; the general rule applies when fewer than two qualify.
    /// Tangential mode drops the component along the vertex normal.
    fn smoothing_move(&self, v: usize) -> Option<Vec3> {
        let mesh = self.mesh;
        let vertex = &mesh.vertices[v];
        let spokes = mesh.outgoing_half_edges(v);

        let restricted: SmallVec<[usize; 8]> = match vertex.feature {
            FeatureTag::Index(i) => spokes
                .iter()
                .map(|&h| mesh.target(h))
                .filter(|&u| matches!(mesh.vertices[u].feature, FeatureTag::Index(j) if j == i) || mesh.vertices[u].is_fixed())
                .collect(),
            _ => SmallVec::new(),
        };
        let boundary: SmallVec<[usize; 8]> = spokes
            .iter()
            .filter(|&&h| mesh.is_boundary_edge(h))
            .map(|&h| mesh.target(h))
            .collect();

        let neighbors = if restricted.len() >= 2 {
            restricted
        } else if !boundary.is_empty() {
            boundary
        } else {
            spokes.iter().map(|&h| mesh.target(h)).collect()
        };
        if neighbors.is_empty() {
            return None;
        }

        let mut avg = Vec3::zero();
        for &u in &neighbors {
            avg += mesh.vertices[u].position;
        }
        avg = avg / neighbors.len() as Real;
        let delta = avg - vertex.position;

        if self.config.smoothing == SmoothingMode::Tangential
            && let Some(n) = mesh.vertex_normal(v)
        {
            return Some(delta.reject_from(&n));
        }
        Some(delta)
    }
}

/// Consumes the accumulators: damps and updates velocities, moves
/// positions, resets every accumulator. Returns the largest squared
/// velocity.
pub(crate) fn integrate(
    vertices: &mut [Vertex],
    accumulators: &mut [MoveAccumulator],
    time_step: Real,
    damping: Real,
) -> Real {
    debug_assert_eq!(vertices.len(), accumulators.len());

    let update = |(vertex, acc): (&mut Vertex, &mut MoveAccumulator)| -> Real {
        let a = *acc;
        acc.reset();
        if vertex.removed || vertex.is_fixed() {
            vertex.velocity = Vec3::zero();
            return 0.0;
        }
        if a.weight > 0.0 {
            vertex.velocity = vertex.velocity * damping + a.sum * (time_step / a.weight);
        }
        vertex.position += vertex.velocity * time_step;
        vertex.velocity.norm2()
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
        vertices
            .par_iter_mut()
            .zip(accumulators.par_iter_mut())
            .map(update)
            .reduce(|| 0.0, Real::max)
    }

    #[cfg(not(feature = "parallel"))]
    {
        vertices
            .iter_mut()
            .zip(accumulators.iter_mut())
            .map(update)
            .fold(0.0, Real::max)
    }
}
