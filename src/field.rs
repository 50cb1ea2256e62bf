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


use crate::geometry::{Real, Vec3};

/// Supplies a value per sample point. The solver maps it through its length
/// range to a target edge length.
pub trait ScalarField: Send + Sync {
    fn value_at(&self, p: Vec3) -> Real;
}

impl<F> ScalarField for F
where
    F: Fn(Vec3) -> Real + Send + Sync,
{
    fn value_at(&self, p: Vec3) -> Real {
        self(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantField(pub Real);

impl ScalarField for ConstantField {
    fn value_at(&self, _p: Vec3) -> Real {
        self.0
    }
}

/// Maps a field value to a length in `[min, max]`; the value is clamped to
/// `[0, 1]` first and non-finite values map to `max`.
#[inline]
pub fn map_to_length(value: Real, min: Real, max: Real) -> Real {
    if !value.is_finite() {
        return max;
    }
    let t = value.clamp(0.0, 1.0);
    min + (max - min) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_clamps() {
        assert_eq!(map_to_length(0.5, 1.0, 3.0), 2.0);
        assert_eq!(map_to_length(-1.0, 1.0, 3.0), 1.0);
        assert_eq!(map_to_length(7.0, 1.0, 3.0), 3.0);
        assert_eq!(map_to_length(f64::NAN, 1.0, 3.0), 3.0);
    }

    #[test]
    fn closures_are_fields() {
        let f = |p: Vec3| p.x;
        assert_eq!(f.value_at(Vec3::new(0.25, 0.0, 0.0)), 0.25);
        assert_eq!(ConstantField(0.5).value_at(Vec3::zero()), 0.5);
    }
}
