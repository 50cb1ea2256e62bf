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


//! Closest-point constraints that pull vertices toward design intent.

pub mod primitives;
pub mod surface;

use tracing::debug;

pub use crate::mesh::FeatureTag;
pub use primitives::{PlaneFeature, PointFeature, PolylineFeature};
pub use surface::{OffsetSurfaceFeature, SphereSurface, TargetFeature, TargetSurface, TriangleSurface};

use crate::{
    geometry::{Real, Vec3},
    mesh::Mesh,
};

/// A closest-point projector.
pub trait Feature: Send + Sync {
    fn closest_point(&self, p: Vec3) -> Vec3;
}

impl<F> Feature for F
where
    F: Fn(Vec3) -> Vec3 + Send + Sync,
{
    fn closest_point(&self, p: Vec3) -> Vec3 {
        self(p)
    }
}

pub type FeatureList = Vec<Box<dyn Feature>>;

/// Feature tag for a vertex near the given features: the single feature
/// within `tolerance`, `Fixed` when two or more are, `None` otherwise.
pub fn classify_point(p: Vec3, features: &[Box<dyn Feature>], tolerance: Real) -> FeatureTag {
    let tol2 = tolerance * tolerance;
    let mut tag = FeatureTag::None;
    for (i, f) in features.iter().enumerate() {
        if f.closest_point(p).distance2(&p) <= tol2 {
            if !tag.is_none() {
                return FeatureTag::Fixed;
            }
            tag = FeatureTag::Index(i);
        }
    }
    tag
}

/// Tags every live vertex by proximity. Vertices already `Fixed` keep
/// their pin. Edges whose endpoints agree on a feature get that feature.
/// Returns the number of tagged vertices.
pub fn assign_features(mesh: &mut Mesh, features: &[Box<dyn Feature>], tolerance: Real) -> usize {
    let mut tagged = 0;
    for v in mesh.vertices.iter_mut().filter(|v| !v.removed) {
        if !v.is_fixed() {
            v.feature = classify_point(v.position, features, tolerance);
        }
        if !v.feature.is_none() {
            tagged += 1;
        }
    }
    for h in (0..mesh.half_edges.len()).step_by(2) {
        if mesh.half_edges[h].removed {
            continue;
        }
        let a = mesh.vertices[mesh.source(h)].feature;
        let b = mesh.vertices[mesh.target(h)].feature;
        let tag = edge_feature(a, b);
        mesh.half_edges[h].feature = tag;
        mesh.half_edges[h + 1].feature = tag;
    }
    debug!(tagged, features = features.len(), "assigned vertex features");
    tagged
}

/// Feature running along an edge between vertices tagged `a` and `b`.
pub fn edge_feature(a: FeatureTag, b: FeatureTag) -> FeatureTag {
    match (a, b) {
        (FeatureTag::Index(i), FeatureTag::Index(j)) if i == j => FeatureTag::Index(i),
        (FeatureTag::Index(i), FeatureTag::Fixed) | (FeatureTag::Fixed, FeatureTag::Index(i)) => {
            FeatureTag::Index(i)
        }
        _ => FeatureTag::None,
    }
}

/// What a vertex inserted on an edge inherits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitFeature {
    Inherit(FeatureTag),
    /// Endpoints sit on two different features; the edge must not be split.
    Skip,
}

/// Feature of the midpoint of an edge between vertices tagged `a` and `b`.
///
/// Shared or one-sided features are inherited. A pin never propagates:
/// between two pinned vertices, or a pinned and a free one, the midpoint is
/// free, and next to a feature vertex it joins that feature.
pub fn split_feature(a: FeatureTag, b: FeatureTag) -> SplitFeature {
    use FeatureTag::*;
    match (a, b) {
        (Index(i), Index(j)) if i != j => SplitFeature::Skip,
        (Index(i), _) | (_, Index(i)) => SplitFeature::Inherit(Index(i)),
        _ => SplitFeature::Inherit(None),
    }
}
