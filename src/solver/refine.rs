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


//! Serial topology refinement: split, collapse and spin passes.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    features::{Feature, SplitFeature, classify_point, split_feature},
    field::map_to_length,
    geometry::{Real, Vec3, VectorOps, triangle::triangle_area_normal},
    mesh::{FeatureTag, Mesh},
    solver::{
        Solver,
        config::{BoundaryFeatures, RefineCadence, SolverConfig},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinePass {
    Split,
    Collapse,
    Spin,
}

/// Outcome of one refine invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineReport {
    pub splits: usize,
    pub collapses: usize,
    pub spins: usize,
    /// Candidate edges left alone (feature conflicts, rejected edits).
    pub skipped: usize,
}

/// Passes run by the `index`-th refine invocation.
pub fn passes_for(cadence: RefineCadence, index: usize) -> SmallVec<[RefinePass; 3]> {
    use RefinePass::*;
    match cadence {
        RefineCadence::SplitCollapse => SmallVec::from_slice(&[[Split, Collapse][index % 2]]),
        RefineCadence::RoundRobin => SmallVec::from_slice(&[[Split, Collapse, Spin][index % 3]]),
        RefineCadence::AllPasses => SmallVec::from_slice(&[Split, Collapse, Spin]),
    }
}

#[inline]
fn ideal_valence(boundary: bool) -> i64 {
    if boundary { 4 } else { 6 }
}

impl Solver {
    /// Recomputes the target length of every live edge, mirrored on both
    /// halves.
    pub(crate) fn update_target_lengths(&mut self) {
        let range = self.config.length_range;
        let field = self.field.as_deref();
        let vertices = &self.mesh.vertices;

        let update = |pair: &mut [crate::mesh::half_edge::HalfEdge]| {
            if pair[0].removed {
                return;
            }
            let target = match field {
                None => range.max,
                Some(f) => {
                    let a = &vertices[pair[1].vertex].position;
                    let b = &vertices[pair[0].vertex].position;
                    map_to_length(f.value_at(a.midpoint(b)), range.min, range.max)
                }
            };
            pair[0].target_length = target;
            pair[1].target_length = target;
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::{iter::ParallelIterator, slice::ParallelSliceMut};
            self.mesh.half_edges.par_chunks_mut(2).for_each(update);
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.mesh.half_edges.chunks_mut(2).for_each(update);
        }
    }

    /// One refine invocation per the configured cadence.
    pub(crate) fn refine(&mut self) -> RefineReport {
        let mut report = RefineReport::default();
        for pass in passes_for(self.config.refine_cadence, self.refine_count) {
            self.update_target_lengths();
            match pass {
                RefinePass::Split => {
                    split_pass(&mut self.mesh, &self.features, &self.config, &mut report)
                }
                RefinePass::Collapse => collapse_pass(&mut self.mesh, &self.config, &mut report),
                RefinePass::Spin => spin_pass(&mut self.mesh, &mut report),
            }
        }
        self.refine_count += 1;

        if self.config.compact_after_refine && report.collapses > 0 {
            self.compact();
        }

        debug!(
            invocation = self.refine_count,
            splits = report.splits,
            collapses = report.collapses,
            spins = report.spins,
            skipped = report.skipped,
            "refine pass"
        );
        report
    }
}

/// Splits every edge above its split threshold.
///
/// A boundary edge between two pinned vertices gives a pinned midpoint under
/// [`BoundaryFeatures::Pin`]; otherwise its midpoint is classified against
/// the features again, so it stays on the boundary curve.
pub(crate) fn split_pass(
    mesh: &mut Mesh,
    features: &[Box<dyn Feature>],
    config: &SolverConfig,
    report: &mut RefineReport,
) {
    let candidates: Vec<usize> = mesh
        .live_edges()
        .filter(|&h| mesh.edge_length_sq(h) > config.split_threshold2(mesh.half_edges[h].target_length))
        .collect();

    for h in candidates {
        let a = mesh.source(h);
        let b = mesh.target(h);
        let (fa, fb) = (mesh.vertices[a].feature, mesh.vertices[b].feature);
        let tag = match split_feature(fa, fb) {
            SplitFeature::Inherit(FeatureTag::None)
                if fa.is_fixed() && fb.is_fixed() && mesh.is_boundary_edge(h) =>
            {
                match config.boundary_features {
                    BoundaryFeatures::Pin => FeatureTag::Fixed,
                    _ => classify_point(mesh.edge_midpoint(h), features, config.feature_tolerance),
                }
            }
            SplitFeature::Inherit(tag) => tag,
            SplitFeature::Skip => {
                trace!(half_edge = h, "split skipped across two features");
                report.skipped += 1;
                continue;
            }
        };
        let target_length = mesh.half_edges[h].target_length;
        let edge_feature = mesh.half_edges[h].feature;
        let velocity = mesh.vertices[a].velocity.midpoint(&mesh.vertices[b].velocity);

        let Some(res) = mesh.split_edge(h) else {
            report.skipped += 1;
            continue;
        };

        let w = &mut mesh.vertices[res.vertex];
        w.feature = tag;
        w.velocity = velocity;

        for (k, &e) in res.new_edges.iter().enumerate() {
            let first = Mesh::edge_half_edge(e);
            // The continuation of the split edge keeps its feature; diagonals are free
            let feature = if k == 0 { edge_feature } else { FeatureTag::None };
            for he in [first, first + 1] {
                mesh.half_edges[he].target_length = target_length;
                mesh.half_edges[he].feature = feature;
            }
        }
        report.splits += 1;
    }
}

/// Collapses edges below their collapse threshold, shortest first. A vertex
/// takes part in at most one collapse per pass.
pub(crate) fn collapse_pass(mesh: &mut Mesh, config: &SolverConfig, report: &mut RefineReport) {
    let generation = mesh.new_generation();

    let mut candidates: Vec<(Real, usize)> = mesh
        .live_edges()
        .filter_map(|h| {
            let len2 = mesh.edge_length_sq(h);
            (len2 < config.collapse_threshold2(mesh.half_edges[h].target_length)).then_some((len2, h))
        })
        .collect();
    candidates.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

    for (_, h) in candidates {
        if mesh.half_edges[h].removed {
            continue;
        }
        let a = mesh.source(h);
        let b = mesh.target(h);
        if mesh.vertices[a].stamp == generation || mesh.vertices[b].stamp == generation {
            continue;
        }
        if mesh.edge_length_sq(h) >= config.collapse_threshold2(mesh.half_edges[h].target_length) {
            continue;
        }

        let Some((keep, gone, position)) = collapse_placement(mesh, a, b) else {
            trace!(half_edge = h, "collapse blocked by features");
            report.skipped += 1;
            continue;
        };
        let he = if keep == a { h } else { h ^ 1 };
        let velocity = mesh.vertices[a].velocity.midpoint(&mesh.vertices[b].velocity);
        let gone_feature = mesh.vertices[gone].feature;

        if !mesh.collapse_edge(he) {
            report.skipped += 1;
            continue;
        }

        let kept = &mut mesh.vertices[keep];
        kept.position = position;
        kept.velocity = velocity;
        if kept.feature.is_none() {
            kept.feature = gone_feature;
        }
        kept.stamp = generation;
        report.collapses += 1;
    }
}

/// Surviving vertex and its position for a collapse of `a - b`, or `None`
/// when features forbid it. Featured and boundary vertices stay in place.
fn collapse_placement(mesh: &Mesh, a: usize, b: usize) -> Option<(usize, usize, Vec3)> {
    let fa = mesh.vertices[a].feature;
    let fb = mesh.vertices[b].feature;
    if fa.is_fixed() || fb.is_fixed() {
        return None;
    }
    if let (Some(i), Some(j)) = (fa.index(), fb.index())
        && i != j
    {
        return None;
    }

    let pa = mesh.vertices[a].position;
    let pb = mesh.vertices[b].position;
    let anchored_a = !fa.is_none() || mesh.is_boundary_vertex(a);
    let anchored_b = !fb.is_none() || mesh.is_boundary_vertex(b);

    Some(match (anchored_a, anchored_b) {
        (true, false) => (a, b, pa),
        (false, true) => (b, a, pb),
        (true, true) if fa == fb => (a, b, pa.midpoint(&pb)),
        (true, true) if fb.is_none() => (a, b, pa),
        (true, true) => (b, a, pb),
        (false, false) => (a, b, pa.midpoint(&pb)),
    })
}

/// Squared valence deviation of `a, b, c, d` before and after spinning
/// `a - b` onto `c - d`.
fn valence_error(mesh: &Mesh, quad: [usize; 4]) -> (i64, i64) {
    let delta = [-1, -1, 1, 1];
    let mut before = 0;
    let mut after = 0;
    for (&v, dv) in quad.iter().zip(delta) {
        let ideal = ideal_valence(mesh.is_boundary_vertex(v));
        let deg = mesh.vertices[v].degree as i64;
        before += (deg - ideal).pow(2);
        after += (deg + dv - ideal).pow(2);
    }
    (before, after)
}

/// Spins interior edges whose spin strictly lowers the valence error. Each
/// face takes part in at most one spin per pass; feature edges never spin.
pub(crate) fn spin_pass(mesh: &mut Mesh, report: &mut RefineReport) {
    let generation = mesh.new_generation();
    mesh.update_degrees();

    let edges: Vec<usize> = mesh.live_edges().collect();
    for h in edges {
        if !mesh.half_edges[h].feature.is_none() {
            continue;
        }
        let Ok((c, d)) = mesh.spin_check(h) else { continue };
        let (Some(fa), Some(fb)) = (mesh.half_edges[h].face, mesh.half_edges[h ^ 1].face) else {
            continue;
        };
        if mesh.faces[fa].stamp == generation || mesh.faces[fb].stamp == generation {
            continue;
        }

        let a = mesh.source(h);
        let b = mesh.target(h);
        let (before, after) = valence_error(mesh, [a, b, c, d]);
        if after >= before || !spin_keeps_orientation(mesh, [a, b, c, d]) {
            continue;
        }

        if mesh.spin_edge(h) {
            mesh.vertices[a].degree -= 1;
            mesh.vertices[b].degree -= 1;
            mesh.vertices[c].degree += 1;
            mesh.vertices[d].degree += 1;
            mesh.faces[fa].stamp = generation;
            mesh.faces[fb].stamp = generation;
            report.spins += 1;
        } else {
            report.skipped += 1;
        }
    }
}

/// Both triangles after the spin must have area and face the same way as
/// the pair before it.
fn spin_keeps_orientation(mesh: &Mesh, [a, b, c, d]: [usize; 4]) -> bool {
    let p = |v: usize| &mesh.vertices[v].position;
    let old = triangle_area_normal(p(a), p(b), p(c)) + triangle_area_normal(p(b), p(a), p(d));
    let n1 = triangle_area_normal(p(d), p(c), p(a));
    let n2 = triangle_area_normal(p(c), p(d), p(b));
    n1.dot(&old) > 0.0 && n2.dot(&old) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_schedules() {
        use RefinePass::*;
        let rr: Vec<_> = (0..4).map(|i| passes_for(RefineCadence::RoundRobin, i)[0]).collect();
        assert_eq!(rr, vec![Split, Collapse, Spin, Split]);
        assert_eq!(passes_for(RefineCadence::SplitCollapse, 1).as_slice(), &[Collapse]);
        assert_eq!(passes_for(RefineCadence::AllPasses, 7).as_slice(), &[Split, Collapse, Spin]);
    }

    fn fan(rim: usize) -> Mesh {
        let mut positions = vec![Vec3::zero()];
        for i in 0..rim {
            let angle = std::f64::consts::TAU * i as f64 / rim as f64;
            positions.push(Vec3::new(angle.cos(), angle.sin(), 0.0));
        }
        let faces: Vec<[usize; 3]> = (1..=rim).map(|i| [0, i, i % rim + 1]).collect();
        Mesh::from_polygons(&positions, &faces).unwrap()
    }

    fn total_valence_error(mesh: &Mesh) -> i64 {
        (0..mesh.vertices.len())
            .filter(|&v| !mesh.vertices[v].removed)
            .map(|v| (mesh.vertex_degree(v) as i64 - ideal_valence(mesh.is_boundary_vertex(v))).pow(2))
            .sum()
    }

    #[test]
    fn spin_pass_touches_each_face_once() {
        let mut mesh = fan(12);
        let before = total_valence_error(&mesh);
        let mut report = RefineReport::default();
        spin_pass(&mut mesh, &mut report);

        assert!(report.spins >= 2);
        let stamped = mesh.faces.iter().filter(|f| f.stamp == mesh.generation).count();
        assert_eq!(stamped, 2 * report.spins);
        assert!(total_valence_error(&mesh) < before);
        // Cached degrees follow the spins
        for v in 0..mesh.vertices.len() {
            assert_eq!(mesh.vertices[v].degree, mesh.vertex_degree(v));
        }
        mesh.validate_connectivity();
    }

    #[test]
    fn valence_error_prefers_spoke_spins() {
        let mut mesh = fan(8);
        mesh.update_degrees();
        let h = mesh.outgoing_half_edges(0)[0];
        let (c, d) = mesh.spin_check(h).unwrap();
        let quad = [0, mesh.target(h), c, d];
        // Centre 8 -> 7, spoke end 3 -> 2, both rim neighbours 3 -> 4
        assert_eq!(valence_error(&mesh, quad), (4 + 1 + 1 + 1, 1 + 4));
        assert!(spin_keeps_orientation(&mesh, quad));
    }

    #[test]
    fn spin_orientation_rejects_reflex_quad() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 0.2, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        // Vertex 2 sits inside triangle 0-1-3, so spinning 0-2 onto 1-3 folds
        let mesh = Mesh::from_polygons(&positions, &[[0usize, 1, 2], [0, 2, 3]]).unwrap();
        assert!(!spin_keeps_orientation(&mesh, [0, 2, 3, 1]));
    }
}
