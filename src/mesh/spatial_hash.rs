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


use std::hash::BuildHasher;

use ahash::RandomState;
use smallvec::SmallVec;

use crate::geometry::{Real, Vec3};

const DEFAULT_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

#[inline(always)]
fn floor_sat_i64(x: f64) -> i64 {
    if !x.is_finite() {
        return if x.is_sign_positive() { i64::MAX } else { i64::MIN };
    }
    let i = x as i64;
    i - ((i as f64 > x) as i64)
}

#[inline(always)]
fn pack_key3(kx: i64, ky: i64, kz: i64) -> u128 {
    // 3 x 42-bit signed lanes into 126 bits
    let mask = (1u128 << 42) - 1;
    let ux = (kx as i128 as u128) & mask;
    let uy = (ky as i128 as u128) & mask;
    let uz = (kz as i128 as u128) & mask;
    ux | (uy << 42) | (uz << 84)
}

#[inline]
fn sanitize_scale(scale: Real) -> Real {
    if scale.is_finite() && scale > 0.0 { scale.max(1e-12) } else { 1.0 }
}

/// Uniform grid over 3D points, hashed into a fixed number of bins.
///
/// Distinct cells may share a bin, so [`SpatialHash::search`] can return
/// entries outside the query box; callers re-check distances. Bin count and
/// cell scale changes are deferred to the next [`SpatialHash::clear`].
#[derive(Debug, Clone)]
pub struct SpatialHash<V> {
    bins: Vec<Vec<(Vec3, V)>>,
    inv_scale: Real,
    cell_scale: Real,
    hasher: RandomState,
    len: usize,
    pending_bins: Option<usize>,
    pending_scale: Option<Real>,
}

impl<V> SpatialHash<V> {
    pub fn new(bin_count: usize, cell_scale: Real) -> Self {
        let cell_scale = sanitize_scale(cell_scale);
        let [k0, k1, k2, k3] = DEFAULT_SEEDS;
        Self {
            bins: (0..bin_count.max(1)).map(|_| Vec::new()).collect(),
            inv_scale: 1.0 / cell_scale,
            cell_scale,
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
            len: 0,
            pending_bins: None,
            pending_scale: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Cell scale currently used for hashing (pending changes excluded).
    #[inline]
    pub fn cell_scale(&self) -> Real {
        self.cell_scale
    }

    #[inline(always)]
    fn cell_of(&self, p: &Vec3) -> [i64; 3] {
        [
            floor_sat_i64(p.x * self.inv_scale),
            floor_sat_i64(p.y * self.inv_scale),
            floor_sat_i64(p.z * self.inv_scale),
        ]
    }

    #[inline(always)]
    fn bin_of_cell(&self, [x, y, z]: [i64; 3]) -> usize {
        (self.hasher.hash_one(pack_key3(x, y, z)) % self.bins.len() as u64) as usize
    }

    #[inline]
    fn bin_of(&self, p: &Vec3) -> usize {
        self.bin_of_cell(self.cell_of(p))
    }

    pub fn insert(&mut self, point: Vec3, value: V) {
        let bin = self.bin_of(&point);
        self.bins[bin].push((point, value));
        self.len += 1;
    }

    pub fn extend<I: IntoIterator<Item = (Vec3, V)>>(&mut self, items: I) {
        for (p, v) in items {
            self.insert(p, v);
        }
    }

    /// Bulk insert with bin keys hashed in parallel; order within a bin
    /// matches the order of `items`.
    #[cfg(feature = "parallel")]
    pub fn extend_parallel(&mut self, items: Vec<(Vec3, V)>)
    where
        V: Send + Sync,
    {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

        let keys: Vec<usize> = items.par_iter().map(|(p, _)| self.bin_of(p)).collect();
        self.len += items.len();
        for ((p, v), bin) in items.into_iter().zip(keys) {
            self.bins[bin].push((p, v));
        }
    }

    /// Requests `bin_count` bins; applied by the next [`SpatialHash::clear`].
    pub fn resize(&mut self, bin_count: usize) {
        self.pending_bins = Some(bin_count.max(1));
    }

    /// Requests a new cell edge length; applied by the next
    /// [`SpatialHash::clear`].
    pub fn set_cell_scale(&mut self, scale: Real) {
        self.pending_scale = Some(sanitize_scale(scale));
    }

    /// Empties every bin. Bin allocations are kept unless a pending resize
    /// changes the bin count.
    pub fn clear(&mut self) {
        if let Some(scale) = self.pending_scale.take() {
            self.cell_scale = scale;
            self.inv_scale = 1.0 / scale;
        }
        match self.pending_bins.take() {
            Some(n) if n != self.bins.len() => {
                self.bins = (0..n).map(|_| Vec::new()).collect();
            }
            _ => self.bins.iter_mut().for_each(Vec::clear),
        }
        self.len = 0;
    }

    /// Entries in every bin overlapping the box `center ± radius`. Each bin
    /// is visited once per call.
    pub fn search(&self, center: Vec3, radius: Real) -> SearchIter<'_, V> {
        let r = Vec3::new(radius, radius, radius);
        let lo = self.cell_of(&(center - r));
        let hi = self.cell_of(&(center + r));

        let cells = (0..3).fold(1u128, |acc, i| {
            acc.saturating_mul((hi[i] as i128 - lo[i] as i128 + 1).max(0) as u128)
        });
        let window = if cells >= self.bins.len() as u128 {
            Window::AllBins { next: 0 }
        } else {
            Window::Cells {
                lo,
                hi,
                cursor: lo,
                done: cells == 0,
            }
        };

        SearchIter {
            grid: self,
            window,
            visited: SmallVec::new(),
            current: Default::default(),
        }
    }
}

#[derive(Debug, Clone)]
enum Window {
    Cells {
        lo: [i64; 3],
        hi: [i64; 3],
        cursor: [i64; 3],
        done: bool,
    },
    AllBins {
        next: usize,
    },
}

impl Window {
    /// Next cell in x-fastest order, or `None` when exhausted.
    fn next_cell(&mut self) -> Option<[i64; 3]> {
        let Window::Cells { lo, hi, cursor, done } = self else { return None };
        if *done {
            return None;
        }
        let cell = *cursor;
        let mut axis = 0;
        loop {
            if cursor[axis] < hi[axis] {
                cursor[axis] += 1;
                break;
            }
            cursor[axis] = lo[axis];
            axis += 1;
            if axis == 3 {
                *done = true;
                break;
            }
        }
        Some(cell)
    }
}

/// Lazy, single-use iterator returned by [`SpatialHash::search`].
pub struct SearchIter<'a, V> {
    grid: &'a SpatialHash<V>,
    window: Window,
    visited: SmallVec<[usize; 32]>,
    current: std::slice::Iter<'a, (Vec3, V)>,
}

impl<'a, V> Iterator for SearchIter<'a, V> {
    type Item = (&'a Vec3, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((p, v)) = self.current.next() {
                return Some((p, v));
            }
            let bin = if let Window::AllBins { next } = &mut self.window {
                if *next >= self.grid.bins.len() {
                    return None;
                }
                *next += 1;
                *next - 1
            } else {
                let cell = self.window.next_cell()?;
                let bin = self.grid.bin_of_cell(cell);
                if self.visited.contains(&bin) {
                    continue;
                }
                self.visited.push(bin);
                bin
            };
            self.current = self.grid.bins[bin].iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_saturates() {
        assert_eq!(floor_sat_i64(-0.5), -1);
        assert_eq!(floor_sat_i64(2.0), 2);
        assert_eq!(floor_sat_i64(f64::INFINITY), i64::MAX);
        assert_eq!(floor_sat_i64(f64::NEG_INFINITY), i64::MIN);
    }

    #[test]
    fn search_finds_neighbours_once() {
        let mut grid = SpatialHash::new(64, 1.0);
        grid.insert(Vec3::new(0.1, 0.1, 0.1), 0usize);
        grid.insert(Vec3::new(0.9, 0.1, 0.1), 1usize);
        grid.insert(Vec3::new(10.0, 10.0, 10.0), 2usize);

        let mut found: Vec<usize> = grid.search(Vec3::new(0.5, 0.1, 0.1), 0.6).map(|(_, &v)| v).collect();
        found.sort_unstable();
        found.dedup();
        assert!(found.contains(&0) && found.contains(&1));

        let total = grid.search(Vec3::new(0.5, 0.1, 0.1), 0.6).count();
        assert!(total <= 3);
    }

    #[test]
    fn resize_is_deferred_to_clear() {
        let mut grid: SpatialHash<u32> = SpatialHash::new(8, 1.0);
        grid.insert(Vec3::zero(), 7);
        grid.resize(32);
        grid.set_cell_scale(0.5);
        assert_eq!(grid.bin_count(), 8);
        assert_eq!(grid.cell_scale(), 1.0);
        assert_eq!(grid.len(), 1);

        grid.clear();
        assert_eq!(grid.bin_count(), 32);
        assert_eq!(grid.cell_scale(), 0.5);
        assert!(grid.is_empty());
        assert_eq!(grid.search(Vec3::zero(), 1.0).count(), 0);
    }

    #[test]
    fn huge_radius_visits_every_bin() {
        let mut grid = SpatialHash::new(4, 1.0);
        for i in 0..20 {
            grid.insert(Vec3::new(i as f64 * 3.0, 0.0, 0.0), i);
        }
        assert_eq!(grid.search(Vec3::zero(), f64::INFINITY).count(), 20);
    }
}
