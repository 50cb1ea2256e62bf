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


use crate::{geometry::Vec3, mesh::basic_types::FeatureTag};

#[derive(Debug, Clone)]
pub struct Vertex {
    pub position: Vec3,
    pub velocity: Vec3,
    /// An outgoing half-edge; a boundary one whenever the vertex is on a
    /// boundary.
    pub half_edge: Option<usize>,
    pub feature: FeatureTag,
    /// Valence cached by the refine passes.
    pub degree: usize,
    pub stamp: u64,
    pub removed: bool,
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zero(),
            half_edge: None,
            feature: FeatureTag::None,
            degree: 0,
            stamp: 0,
            removed: false,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.feature.is_fixed()
    }
}
