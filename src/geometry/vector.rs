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


use std::ops::{Add, AddAssign, Div, Index, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::Float;

pub trait VectorOps<T, C>: Sized {
    fn dot(&self, other: &Self) -> T;
    fn cross(&self, other: &Self) -> C;
    fn norm(&self) -> T;
    fn norm2(&self) -> T;
    fn normalized(&self) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3<T: Float> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Float> Vector3<T> {
    #[inline]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    #[inline]
    pub fn scale(&self, s: T) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[inline]
    pub fn distance2(&self, other: &Self) -> T {
        (*other - *self).norm2()
    }

    #[inline]
    pub fn distance(&self, other: &Self) -> T {
        self.distance2(other).sqrt()
    }

    /// Point halfway between `self` and `other`.
    #[inline]
    pub fn midpoint(&self, other: &Self) -> Self {
        let half = T::from(0.5).unwrap_or_else(T::zero);
        (*self + *other).scale(half)
    }

    #[inline]
    pub fn lerp(&self, other: &Self, t: T) -> Self {
        *self + (*other - *self).scale(t)
    }

    /// Component of `self` orthogonal to the unit vector `n`.
    #[inline]
    pub fn reject_from(&self, n: &Self) -> Self {
        *self - n.scale(self.dot(n))
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn to_array(&self) -> [T; 3] {
        [self.x, self.y, self.z]
    }
}

impl<T: Float> VectorOps<T, Vector3<T>> for Vector3<T> {
    #[inline]
    fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    fn norm(&self) -> T {
        self.norm2().sqrt()
    }

    #[inline]
    fn norm2(&self) -> T {
        self.dot(self)
    }

    /// `None` for zero-length (or non-finite) vectors.
    fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n > T::zero() && n.is_finite() {
            Some(self.scale(T::one() / n))
        } else {
            None
        }
    }
}

impl<T: Float> From<[T; 3]> for Vector3<T> {
    fn from(v: [T; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl<T: Float> From<(T, T, T)> for Vector3<T> {
    fn from(v: (T, T, T)) -> Self {
        Self::new(v.0, v.1, v.2)
    }
}

impl<T: Float> Index<usize> for Vector3<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3 index out of range: {}", i),
        }
    }
}

impl<T: Float> Add for Vector3<T> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Float> Sub for Vector3<T> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Float> Mul<T> for Vector3<T> {
    type Output = Self;
    #[inline]
    fn mul(self, s: T) -> Self {
        self.scale(s)
    }
}

impl<T: Float> Div<T> for Vector3<T> {
    type Output = Self;
    #[inline]
    fn div(self, s: T) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl<T: Float> Neg for Vector3<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T: Float> AddAssign for Vector3<T> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Float> SubAssign for Vector3<T> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Float> MulAssign<T> for Vector3<T> {
    #[inline]
    fn mul_assign(&mut self, s: T) {
        *self = self.scale(s);
    }
}
