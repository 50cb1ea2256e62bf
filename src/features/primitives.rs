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


use crate::{
    features::Feature,
    geometry::{Plane, Real, Segment, Vec3},
};

/// A fixed target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointFeature {
    pub point: Vec3,
}

impl PointFeature {
    pub const fn new(point: Vec3) -> Self {
        Self { point }
    }
}

impl Feature for PointFeature {
    fn closest_point(&self, _p: Vec3) -> Vec3 {
        self.point
    }
}

/// Orthogonal projection onto a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFeature {
    pub plane: Plane,
}

impl PlaneFeature {
    /// `None` when `normal` has zero length.
    pub fn new(origin: Vec3, normal: Vec3) -> Option<Self> {
        Some(Self {
            plane: Plane::new(origin, normal)?,
        })
    }
}

impl From<Plane> for PlaneFeature {
    fn from(plane: Plane) -> Self {
        Self { plane }
    }
}

impl Feature for PlaneFeature {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        self.plane.project(&p)
    }
}

/// Open or closed polyline. Parameters run from `0` at the first point to
/// the segment count at the end, one unit per segment.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineFeature {
    points: Vec<Vec3>,
    closed: bool,
}

impl PolylineFeature {
    /// `None` for fewer than two points.
    pub fn new(points: Vec<Vec3>, closed: bool) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self { points, closed })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn segment_count(&self) -> usize {
        if self.closed { self.points.len() } else { self.points.len() - 1 }
    }

    pub fn segment(&self, i: usize) -> Segment {
        Segment::new(self.points[i], self.points[(i + 1) % self.points.len()])
    }

    /// Curve parameter of the closest point to `p`. Ties go to the earlier
    /// segment.
    pub fn closest_parameter(&self, p: Vec3) -> Real {
        let mut best_d2 = Real::INFINITY;
        let mut best_t = 0.0;
        for i in 0..self.segment_count() {
            let seg = self.segment(i);
            let t = seg.closest_parameter(&p);
            let d2 = seg.point_at(t).distance2(&p);
            if d2 < best_d2 {
                best_d2 = d2;
                best_t = i as Real + t;
            }
        }
        best_t
    }

    /// Point at curve parameter `t`, clamped to the curve's domain.
    pub fn point_at(&self, t: Real) -> Vec3 {
        let n = self.segment_count();
        let t = t.clamp(0.0, n as Real);
        let i = (t.floor() as usize).min(n - 1);
        self.segment(i).point_at(t - i as Real)
    }
}

impl Feature for PolylineFeature {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        self.point_at(self.closest_parameter(p))
    }
}
