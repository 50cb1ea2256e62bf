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


//! Solver parameters.

use tracing::warn;

use crate::{
    error::{ConfigError, ConfigResult},
    geometry::Real,
};

/// Edges longer than `target * SPLIT_FACTOR * (1 + tolerance)` are split.
pub const SPLIT_FACTOR: Real = 4.0 / 3.0;
/// Edges shorter than `target * COLLAPSE_FACTOR * (1 - tolerance)` are
/// collapsed.
pub const COLLAPSE_FACTOR: Real = 4.0 / 5.0;

/// How the Laplacian smoothing term is applied to interior vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingMode {
    /// Straight move toward the neighbour average.
    Uniform,
    /// Neighbour average with the normal component removed.
    #[default]
    Tangential,
}

/// Which topology passes run at each refine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefineCadence {
    /// Split and collapse alternate; edges are never spun.
    SplitCollapse,
    /// Split, collapse and spin take turns.
    #[default]
    RoundRobin,
    /// Split, collapse and spin all run every time.
    AllPasses,
}

/// Features synthesized from the holes of the input mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryFeatures {
    /// Boundary vertices are free.
    #[default]
    None,
    /// Every boundary vertex is pinned, including those later inserted on
    /// boundary edges.
    Pin,
    /// Each hole becomes a closed polyline feature. Boundary vertices that
    /// also lie on another feature end up pinned; midpoints inserted between
    /// them are classified against the features again.
    Polyline,
}

/// Target edge length bounds. Without a scalar field the solver aims at
/// `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthRange {
    pub min: Real,
    pub max: Real,
}

impl LengthRange {
    pub const fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }

    pub const fn uniform(length: Real) -> Self {
        Self::new(length, length)
    }
}

/// Parameters for [`Solver`](crate::solver::Solver).
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Integration time step.
    pub time_step: Real,

    /// Velocity retained per iteration, saturated to `[0, 1]`.
    pub damping: Real,

    /// Iterations per `step()`.
    pub sub_steps: usize,

    /// Run a refine pass every this many iterations.
    pub refine_frequency: usize,

    pub length_range: LengthRange,

    /// Hysteresis around the split/collapse thresholds, in `[0, 1]`.
    pub length_tolerance: Real,

    pub smoothing_weight: Real,
    pub feature_weight: Real,

    /// Distance within which a vertex is attached to a feature.
    pub feature_tolerance: Real,

    /// Sphere radius for vertex collisions; `0` disables them.
    pub collision_radius: Real,
    pub collision_weight: Real,

    /// Rebuild the collision grid every this many iterations.
    pub collision_frequency: usize,

    /// Converged once every squared velocity is below the square of this.
    pub convergence_tolerance: Real,

    pub smoothing: SmoothingMode,
    pub refine_cadence: RefineCadence,
    pub boundary_features: BoundaryFeatures,

    /// Drop removed elements after every refine invocation.
    pub compact_after_refine: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0,
            damping: 0.5,
            sub_steps: 1,
            refine_frequency: 1,
            length_range: LengthRange::uniform(1.0),
            length_tolerance: 0.1,
            smoothing_weight: 1.0,
            feature_weight: 1.0,
            feature_tolerance: 1e-3,
            collision_radius: 0.0,
            collision_weight: 1.0,
            collision_frequency: 1,
            convergence_tolerance: 1e-3,
            smoothing: SmoothingMode::Tangential,
            refine_cadence: RefineCadence::RoundRobin,
            boundary_features: BoundaryFeatures::None,
            compact_after_refine: true,
        }
    }
}

fn clamp_weight(name: &'static str, value: Real) -> ConfigResult<Real> {
    if value.is_nan() {
        return Err(ConfigError::NonFinite { name, value });
    }
    if value < 0.0 {
        warn!(name, value, "negative weight clamped to 0");
        return Ok(0.0);
    }
    Ok(value)
}

fn non_negative(value: Real, err: fn(f64) -> ConfigError) -> ConfigResult<Real> {
    if value.is_finite() && value >= 0.0 { Ok(value) } else { Err(err(value)) }
}

impl SolverConfig {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform remeshing toward a single edge length.
    #[must_use]
    pub fn with_edge_length(length: Real) -> Self {
        Self {
            length_range: LengthRange::uniform(length),
            ..Self::default()
        }
    }

    /// Field-driven remeshing between `min` and `max`.
    #[must_use]
    pub fn adaptive(min: Real, max: Real) -> Self {
        Self {
            length_range: LengthRange::new(min, max),
            refine_cadence: RefineCadence::AllPasses,
            ..Self::default()
        }
    }

    /// Smoothing and projection only; the topology is never refined.
    #[must_use]
    pub fn relax_only() -> Self {
        Self {
            refine_frequency: usize::MAX,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_time_step(mut self, dt: Real) -> Self {
        self.time_step = dt;
        self
    }

    #[must_use]
    pub const fn with_damping(mut self, damping: Real) -> Self {
        self.damping = damping;
        self
    }

    #[must_use]
    pub const fn with_sub_steps(mut self, n: usize) -> Self {
        self.sub_steps = n;
        self
    }

    #[must_use]
    pub const fn with_refine_frequency(mut self, n: usize) -> Self {
        self.refine_frequency = n;
        self
    }

    #[must_use]
    pub const fn with_length_range(mut self, min: Real, max: Real) -> Self {
        self.length_range = LengthRange::new(min, max);
        self
    }

    #[must_use]
    pub const fn with_length_tolerance(mut self, tol: Real) -> Self {
        self.length_tolerance = tol;
        self
    }

    #[must_use]
    pub const fn with_smoothing_weight(mut self, w: Real) -> Self {
        self.smoothing_weight = w;
        self
    }

    #[must_use]
    pub const fn with_feature_weight(mut self, w: Real) -> Self {
        self.feature_weight = w;
        self
    }

    #[must_use]
    pub const fn with_feature_tolerance(mut self, tol: Real) -> Self {
        self.feature_tolerance = tol;
        self
    }

    #[must_use]
    pub const fn with_collision(mut self, radius: Real, weight: Real) -> Self {
        self.collision_radius = radius;
        self.collision_weight = weight;
        self
    }

    #[must_use]
    pub const fn with_collision_frequency(mut self, n: usize) -> Self {
        self.collision_frequency = n;
        self
    }

    #[must_use]
    pub const fn with_convergence_tolerance(mut self, tol: Real) -> Self {
        self.convergence_tolerance = tol;
        self
    }

    #[must_use]
    pub const fn with_smoothing(mut self, mode: SmoothingMode) -> Self {
        self.smoothing = mode;
        self
    }

    #[must_use]
    pub const fn with_refine_cadence(mut self, cadence: RefineCadence) -> Self {
        self.refine_cadence = cadence;
        self
    }

    #[must_use]
    pub const fn with_boundary_features(mut self, mode: BoundaryFeatures) -> Self {
        self.boundary_features = mode;
        self
    }

    #[must_use]
    pub const fn with_compaction(mut self, enable: bool) -> Self {
        self.compact_after_refine = enable;
        self
    }

    pub fn set_time_step(&mut self, dt: Real) -> ConfigResult<()> {
        self.time_step = non_negative(dt, ConfigError::InvalidTimeStep)?;
        Ok(())
    }

    /// Saturates to `[0, 1]`; NaN is rejected.
    pub fn set_damping(&mut self, damping: Real) -> ConfigResult<()> {
        if damping.is_nan() {
            return Err(ConfigError::NonFinite {
                name: "damping",
                value: damping,
            });
        }
        let clamped = damping.clamp(0.0, 1.0);
        if clamped != damping {
            warn!(damping, clamped, "damping saturated");
        }
        self.damping = clamped;
        Ok(())
    }

    pub fn set_sub_steps(&mut self, n: usize) -> ConfigResult<()> {
        if n == 0 {
            return Err(ConfigError::InvalidSubSteps(n));
        }
        self.sub_steps = n;
        Ok(())
    }

    pub fn set_refine_frequency(&mut self, n: usize) -> ConfigResult<()> {
        if n == 0 {
            return Err(ConfigError::InvalidRefineFrequency(n));
        }
        self.refine_frequency = n;
        Ok(())
    }

    pub fn set_length_range(&mut self, min: Real, max: Real) -> ConfigResult<()> {
        let ok = min.is_finite() && max.is_finite() && min > 0.0 && min <= max;
        if !ok {
            return Err(ConfigError::InvalidLengthRange { min, max });
        }
        self.length_range = LengthRange::new(min, max);
        Ok(())
    }

    pub fn set_length_tolerance(&mut self, tol: Real) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&tol) {
            return Err(ConfigError::InvalidLengthTolerance(tol));
        }
        self.length_tolerance = tol;
        Ok(())
    }

    /// Negative weights clamp to `0`.
    pub fn set_smoothing_weight(&mut self, w: Real) -> ConfigResult<()> {
        self.smoothing_weight = clamp_weight("smoothing_weight", w)?;
        Ok(())
    }

    /// Negative weights clamp to `0`.
    pub fn set_feature_weight(&mut self, w: Real) -> ConfigResult<()> {
        self.feature_weight = clamp_weight("feature_weight", w)?;
        Ok(())
    }

    pub fn set_feature_tolerance(&mut self, tol: Real) -> ConfigResult<()> {
        self.feature_tolerance = non_negative(tol, ConfigError::InvalidFeatureTolerance)?;
        Ok(())
    }

    /// Negative weights clamp to `0`.
    pub fn set_collision(&mut self, radius: Real, weight: Real) -> ConfigResult<()> {
        let radius = non_negative(radius, ConfigError::InvalidCollisionRadius)?;
        self.collision_weight = clamp_weight("collision_weight", weight)?;
        self.collision_radius = radius;
        Ok(())
    }

    pub fn set_collision_frequency(&mut self, n: usize) -> ConfigResult<()> {
        if n == 0 {
            return Err(ConfigError::InvalidCollisionFrequency(n));
        }
        self.collision_frequency = n;
        Ok(())
    }

    pub fn set_convergence_tolerance(&mut self, tol: Real) -> ConfigResult<()> {
        self.convergence_tolerance = non_negative(tol, ConfigError::InvalidConvergenceTolerance)?;
        Ok(())
    }

    /// Runs every setter over the current values: rejects what the setters
    /// reject and applies their clamping.
    pub fn validated(mut self) -> ConfigResult<Self> {
        self.set_time_step(self.time_step)?;
        self.set_damping(self.damping)?;
        self.set_sub_steps(self.sub_steps)?;
        self.set_refine_frequency(self.refine_frequency)?;
        self.set_length_range(self.length_range.min, self.length_range.max)?;
        self.set_length_tolerance(self.length_tolerance)?;
        self.set_smoothing_weight(self.smoothing_weight)?;
        self.set_feature_weight(self.feature_weight)?;
        self.set_feature_tolerance(self.feature_tolerance)?;
        self.set_collision(self.collision_radius, self.collision_weight)?;
        self.set_collision_frequency(self.collision_frequency)?;
        self.set_convergence_tolerance(self.convergence_tolerance)?;
        Ok(self)
    }

    /// Squared split threshold for an edge with target length `target`.
    #[inline]
    pub fn split_threshold2(&self, target: Real) -> Real {
        let t = target * SPLIT_FACTOR * (1.0 + self.length_tolerance);
        t * t
    }

    /// Squared collapse threshold for an edge with target length `target`.
    #[inline]
    pub fn collapse_threshold2(&self, target: Real) -> Real {
        let t = target * COLLAPSE_FACTOR * (1.0 - self.length_tolerance);
        t * t
    }

    #[inline]
    pub fn collision_enabled(&self) -> bool {
        self.collision_radius > 0.0 && self.collision_weight > 0.0
    }
}
