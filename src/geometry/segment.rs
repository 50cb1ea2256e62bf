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


use crate::geometry::{Real, Vec3, vector::VectorOps};

pub trait SegmentOps: Sized {
    fn a(&self) -> &Vec3;
    fn b(&self) -> &Vec3;

    fn length(&self) -> Real {
        self.a().distance(self.b())
    }

    fn midpoint(&self) -> Vec3 {
        self.a().midpoint(self.b())
    }

    fn inverse(&self) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vec3,
    pub b: Vec3,
}

impl Segment {
    pub const fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    /// Parameter in `[0, 1]` of the point on the segment closest to `p`.
    /// Degenerate segments report `0`.
    pub fn closest_parameter(&self, p: &Vec3) -> Real {
        let d = self.b - self.a;
        let len2 = d.norm2();
        if len2 <= Real::EPSILON {
            return 0.0;
        }
        ((*p - self.a).dot(&d) / len2).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn point_at(&self, t: Real) -> Vec3 {
        self.a.lerp(&self.b, t)
    }

    pub fn closest_point(&self, p: &Vec3) -> Vec3 {
        self.point_at(self.closest_parameter(p))
    }
}

impl SegmentOps for Segment {
    fn a(&self) -> &Vec3 {
        &self.a
    }

    fn b(&self) -> &Vec3 {
        &self.b
    }

    fn inverse(&self) -> Self {
        Self::new(self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let s = Segment::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(s.closest_point(&Vec3::new(-1.0, 1.0, 0.0)), s.a);
        assert_eq!(s.closest_point(&Vec3::new(5.0, -1.0, 0.0)), s.b);
        assert_eq!(s.closest_point(&Vec3::new(0.5, 3.0, 0.0)), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn degenerate_segment_returns_start() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let s = Segment::new(p, p);
        assert_eq!(s.closest_parameter(&Vec3::zero()), 0.0);
        assert_eq!(s.closest_point(&Vec3::zero()), p);
    }
}
