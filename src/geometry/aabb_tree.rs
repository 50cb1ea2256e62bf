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


use crate::geometry::{Real, Vec3, aabb::Aabb};

/// A static AABB-tree over data `D`, built by median split along the
/// longest axis.
#[derive(Debug, Clone)]
pub enum AabbTree<D> {
    Leaf {
        aabb: Aabb,
        data: D,
    },
    Node {
        aabb: Aabb,
        left: Box<AabbTree<D>>,
        right: Box<AabbTree<D>>,
    },
}

impl<D> AabbTree<D> {
    /// Build a tree over `(aabb, data)` pairs. `None` when `items` is empty.
    pub fn build(mut items: Vec<(Aabb, D)>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self::build_binary_tree(&mut items))
    }

    fn build_binary_tree(items: &mut Vec<(Aabb, D)>) -> Self {
        if items.len() == 1 {
            if let Some((aabb, data)) = items.pop() {
                return AabbTree::Leaf { aabb, data };
            }
        }

        let bounds = items[1..]
            .iter()
            .fold(items[0].0, |acc, (b, _)| acc.union(b));
        let axis = bounds.longest_axis();
        items.sort_by(|(a, _), (b, _)| a.center(axis).total_cmp(&b.center(axis)));

        let mid = items.len() / 2;
        let mut right_items = items.split_off(mid);

        let left = Box::new(Self::build_binary_tree(items));
        let right = Box::new(Self::build_binary_tree(&mut right_items));
        AabbTree::Node {
            aabb: bounds,
            left,
            right,
        }
    }

    /// Get AABB of this node/leaf
    pub fn aabb(&self) -> &Aabb {
        match self {
            AabbTree::Leaf { aabb, .. } => aabb,
            AabbTree::Node { aabb, .. } => aabb,
        }
    }

    /// Branch-and-bound nearest search. `dist2(p, data)` returns the squared
    /// distance from `p` to an element together with any per-element result;
    /// the best one found is returned.
    pub fn nearest<R, F>(&self, p: &Vec3, dist2: &F) -> Option<(Real, R, &D)>
    where
        F: Fn(&Vec3, &D) -> (Real, R),
    {
        let mut best: Option<(Real, R, &D)> = None;
        self.nearest_into(p, dist2, &mut best);
        best
    }

    fn nearest_into<'a, R, F>(&'a self, p: &Vec3, dist2: &F, best: &mut Option<(Real, R, &'a D)>)
    where
        F: Fn(&Vec3, &D) -> (Real, R),
    {
        let bound = best.as_ref().map_or(Real::INFINITY, |b| b.0);
        if self.aabb().distance2_to(p) > bound {
            return;
        }
        match self {
            AabbTree::Leaf { data, .. } => {
                let (d2, r) = dist2(p, data);
                if d2 < bound {
                    *best = Some((d2, r, data));
                }
            }
            AabbTree::Node { left, right, .. } => {
                // Closer child first tightens the bound sooner
                let (first, second) = if left.aabb().distance2_to(p) <= right.aabb().distance2_to(p) {
                    (left, right)
                } else {
                    (right, left)
                };
                first.nearest_into(p, dist2, best);
                second.nearest_into(p, dist2, best);
            }
        }
    }
}
