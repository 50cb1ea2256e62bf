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


//! Dynamic remeshing: a halfedge mesh relaxed toward point, curve and
//! surface features while its topology is split, collapsed and spun to keep
//! edge lengths in range and valences near-regular.
//!
//! ```no_run
//! use dynremesh::{PolygonMesh, Solver, SolverConfig, Vec3};
//! use dynremesh::features::{FeatureList, PlaneFeature};
//!
//! let input = PolygonMesh::new(
//!     vec![
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(4.0, 0.0, 0.0),
//!         Vec3::new(4.0, 4.0, 0.0),
//!         Vec3::new(0.0, 4.0, 0.0),
//!     ],
//!     vec![vec![0, 1, 2, 3]],
//! );
//! let features: FeatureList = vec![Box::new(
//!     PlaneFeature::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0)).unwrap(),
//! )];
//! let mut solver = Solver::new(&input, features, SolverConfig::with_edge_length(0.5)).unwrap();
//! for _ in 0..100 {
//!     if solver.step() {
//!         break;
//!     }
//! }
//! let output = solver.snapshot();
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod error;
pub mod features;
pub mod field;
pub mod geometry;
pub mod mesh;
pub mod solver;

pub use error::{ConfigError, MeshError, SolverError};
pub use features::{Feature, FeatureTag};
pub use field::{ConstantField, ScalarField};
pub use geometry::{Real, Vec3};
pub use mesh::{Mesh, PolygonMesh, SpatialHash};
pub use solver::{Solver, SolverConfig};
