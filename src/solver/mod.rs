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


//! Iterative relaxation with periodic topology refinement.

pub mod config;
pub mod forces;
pub mod refine;

use tracing::{debug, info};

pub use config::{BoundaryFeatures, LengthRange, RefineCadence, SmoothingMode, SolverConfig};
pub use forces::{MoveAccumulator, collision_term};
pub use refine::{RefinePass, RefineReport};

use crate::{
    error::{ConfigResult, SolverError, SolverResult},
    features::{FeatureList, FeatureTag, PolylineFeature, assign_features},
    field::ScalarField,
    geometry::{Real, Vec3},
    mesh::{CompactMap, ElementAttribute, Mesh, PolygonMesh, SpatialHash},
    solver::forces::{ForceContext, integrate},
};

/// Running totals over the solver's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolverStats {
    pub iterations: usize,
    pub refinements: usize,
    pub splits: usize,
    pub collapses: usize,
    pub spins: usize,
    /// Largest squared vertex velocity of the last iteration.
    pub max_velocity2: Option<Real>,
}

/// Owns a triangulated copy of the input mesh and relaxes it.
///
/// Each iteration accumulates smoothing, feature and collision moves per
/// vertex in parallel, integrates them, and every `refine_frequency`
/// iterations rewrites the topology serially.
pub struct Solver {
    mesh: Mesh,
    features: FeatureList,
    field: Option<Box<dyn ScalarField>>,
    config: SolverConfig,
    accumulators: Vec<MoveAccumulator>,
    grid: SpatialHash<usize>,
    refine_count: usize,
    stats: SolverStats,
}

impl Solver {
    pub fn new(input: &PolygonMesh, features: FeatureList, config: SolverConfig) -> SolverResult<Self> {
        let config = config.validated()?;
        let mut mesh = Mesh::from_polygon_mesh(input)?;
        let created = mesh.triangulate();

        let mut solver = Self {
            grid: SpatialHash::new(mesh.vertices.len().next_power_of_two().max(64), 1.0),
            mesh,
            features,
            field: None,
            config,
            accumulators: Vec::new(),
            refine_count: 0,
            stats: SolverStats::default(),
        };
        solver.synthesize_boundary_features();
        let tagged = assign_features(&mut solver.mesh, &solver.features, solver.config.feature_tolerance);
        solver.mesh.update_degrees();
        solver.update_target_lengths();

        info!(
            vertices = solver.mesh.live_vertex_count(),
            faces = solver.mesh.live_face_count(),
            triangulated = created,
            features = solver.features.len(),
            tagged,
            "solver initialised"
        );
        Ok(solver)
    }

    /// Drives target lengths from `field` instead of the constant maximum.
    #[must_use]
    pub fn with_field(mut self, field: impl ScalarField + 'static) -> Self {
        self.set_field(Some(Box::new(field)));
        self
    }

    pub fn set_field(&mut self, field: Option<Box<dyn ScalarField>>) {
        self.field = field;
        self.update_target_lengths();
    }

    fn synthesize_boundary_features(&mut self) {
        match self.config.boundary_features {
            BoundaryFeatures::None => {}
            BoundaryFeatures::Pin => {
                for v in 0..self.mesh.vertices.len() {
                    if !self.mesh.vertices[v].removed && self.mesh.is_boundary_vertex(v) {
                        self.mesh.vertices[v].feature = FeatureTag::Fixed;
                    }
                }
            }
            BoundaryFeatures::Polyline => {
                for h in self.mesh.holes() {
                    let points = self
                        .mesh
                        .boundary_loop(h)
                        .into_iter()
                        .map(|b| self.mesh.vertices[self.mesh.source(b)].position)
                        .collect();
                    if let Some(line) = PolylineFeature::new(points, true) {
                        self.features.push(Box::new(line));
                    }
                }
            }
        }
    }

    /// Runs `sub_steps` iterations. Returns [`Solver::is_converged`].
    pub fn step(&mut self) -> bool {
        for _ in 0..self.config.sub_steps {
            self.iterate();
        }
        self.is_converged()
    }

    fn iterate(&mut self) {
        self.accumulators
            .resize(self.mesh.vertices.len(), MoveAccumulator::default());

        let collide = self.config.collision_enabled()
            && self.stats.iterations % self.config.collision_frequency == 0;
        if collide {
            self.rebuild_grid();
        }

        let ctx = ForceContext {
            mesh: &self.mesh,
            features: &self.features,
            config: &self.config,
            grid: collide.then_some(&self.grid),
        };
        ctx.accumulate(&mut self.accumulators);

        let max_v2 = integrate(
            &mut self.mesh.vertices,
            &mut self.accumulators,
            self.config.time_step,
            self.config.damping,
        );
        self.stats.max_velocity2 = Some(max_v2);
        self.stats.iterations += 1;

        if self.stats.iterations % self.config.refine_frequency == 0 {
            let report = self.refine();
            self.stats.refinements += 1;
            self.stats.splits += report.splits;
            self.stats.collapses += report.collapses;
            self.stats.spins += report.spins;
        }
    }

    fn rebuild_grid(&mut self) {
        let diameter = 2.0 * self.config.collision_radius;
        self.grid.set_cell_scale(diameter);
        self.grid
            .resize(self.mesh.vertices.len().next_power_of_two().max(64));
        self.grid.clear();

        let items: Vec<_> = self
            .mesh
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, v)| (v.position, i))
            .collect();

        #[cfg(feature = "parallel")]
        self.grid.extend_parallel(items);

        #[cfg(not(feature = "parallel"))]
        self.grid.extend(items);
    }

    /// True once the last iteration's largest squared velocity is below the
    /// squared convergence tolerance. False before the first step.
    pub fn is_converged(&self) -> bool {
        let tol = self.config.convergence_tolerance;
        self.stats.max_velocity2.is_some_and(|v2| v2 < tol * tol)
    }

    /// Pins `v` in place; it never moves or collapses afterwards.
    pub fn pin_vertex(&mut self, v: usize) -> SolverResult<()> {
        let count = self.mesh.vertices.len();
        match self.mesh.vertices.get_mut(v) {
            Some(vertex) if !vertex.removed => {
                vertex.feature = FeatureTag::Fixed;
                vertex.velocity = Vec3::zero();
                Ok(())
            }
            _ => Err(SolverError::VertexOutOfRange { vertex: v, count }),
        }
    }

    /// Drops removed elements, keeping the accumulators aligned.
    pub fn compact(&mut self) -> CompactMap {
        self.accumulators
            .resize(self.mesh.vertices.len(), MoveAccumulator::default());
        let accumulators: &mut dyn ElementAttribute = &mut self.accumulators;
        let map = self.mesh.compact_with(&mut [accumulators], &mut [], &mut []);
        debug!(vertices = self.mesh.vertices.len(), "solver compacted");
        map
    }

    pub fn set_config(&mut self, config: SolverConfig) -> ConfigResult<()> {
        self.config = config.validated()?;
        self.update_target_lengths();
        Ok(())
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn features(&self) -> &FeatureList {
        &self.features
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Live mesh with dense indices.
    pub fn snapshot(&self) -> PolygonMesh {
        self.mesh.to_polygon_mesh()
    }

    /// Feature tags of the live vertices, in [`Solver::snapshot`] order.
    pub fn vertex_features(&self) -> Vec<FeatureTag> {
        self.mesh
            .vertices
            .iter()
            .filter(|v| !v.removed)
            .map(|v| v.feature)
            .collect()
    }

    /// Target length of every live edge, in [`Mesh::live_edges`] order.
    pub fn edge_target_lengths(&self) -> Vec<Real> {
        self.mesh
            .live_edges()
            .map(|h| self.mesh.half_edges[h].target_length)
            .collect()
    }
}
