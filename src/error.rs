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


//! Error types for mesh construction, solver configuration and the solver.

use thiserror::Error;

/// Errors raised while building a [`Mesh`](crate::mesh::Mesh) from polygons.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// The input has no faces.
    #[error("Mesh has no faces")]
    NoFaces,

    /// A face references a vertex that does not exist.
    #[error("Face {face} references vertex {vertex}, but the mesh has {count} vertices")]
    InvalidVertexIndex { face: usize, vertex: usize, count: usize },

    /// A face has fewer than three distinct vertices.
    #[error("Face {0} has fewer than three distinct vertices")]
    DegenerateFace(usize),

    /// A directed edge is used by two faces: non-manifold edge or
    /// inconsistent orientation.
    #[error("Edge ({from}, {to}) is shared by more than one face with the same orientation")]
    NonManifoldEdge { from: usize, to: usize },

    /// Faces around a vertex form more than one fan (bowtie vertex).
    #[error("Vertex {0} is shared by more than one fan of faces")]
    NonManifoldVertex(usize),

    /// A vertex position is NaN or infinite.
    #[error("Vertex {0} has a non-finite position")]
    NonFinitePosition(usize),
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid time step: {0} (must be finite and >= 0)")]
    InvalidTimeStep(f64),

    #[error("Invalid sub-step count: {0} (must be >= 1)")]
    InvalidSubSteps(usize),

    #[error("Invalid refine frequency: {0} (must be >= 1)")]
    InvalidRefineFrequency(usize),

    #[error("Invalid length range: [{min}, {max}] (both must be > 0 and min <= max)")]
    InvalidLengthRange { min: f64, max: f64 },

    #[error("Invalid length tolerance: {0} (must be in [0, 1])")]
    InvalidLengthTolerance(f64),

    #[error("Invalid feature tolerance: {0} (must be finite and >= 0)")]
    InvalidFeatureTolerance(f64),

    #[error("Invalid collision radius: {0} (must be finite and >= 0)")]
    InvalidCollisionRadius(f64),

    #[error("Invalid collision frequency: {0} (must be >= 1)")]
    InvalidCollisionFrequency(usize),

    #[error("Invalid convergence tolerance: {0} (must be finite and >= 0)")]
    InvalidConvergenceTolerance(f64),

    #[error("Invalid {name}: {value} (must be finite)")]
    NonFinite { name: &'static str, value: f64 },
}

/// Errors raised while setting up a [`Solver`](crate::solver::Solver).
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Vertex {vertex} is out of range ({count} vertices)")]
    VertexOutOfRange { vertex: usize, count: usize },
}

pub type MeshResult<T> = std::result::Result<T, MeshError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type SolverResult<T> = std::result::Result<T, SolverError>;
