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
    error::{MeshError, MeshResult},
    features::Feature,
    geometry::{
        Aabb, AabbTree, Real, Vec3, VectorOps,
        triangle::{closest_point_on_triangle, triangle_area_normal},
    },
    mesh::Mesh,
};

/// A surface that vertices can be pulled onto.
pub trait TargetSurface: Send + Sync {
    /// Closest point on the surface and the unit normal there. The normal is
    /// zero where it is undefined.
    fn closest_point_normal(&self, p: Vec3) -> (Vec3, Vec3);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSurface {
    pub center: Vec3,
    pub radius: Real,
}

impl SphereSurface {
    pub const fn new(center: Vec3, radius: Real) -> Self {
        Self { center, radius }
    }
}

impl TargetSurface for SphereSurface {
    fn closest_point_normal(&self, p: Vec3) -> (Vec3, Vec3) {
        // The center itself projects to the north pole
        let n = (p - self.center)
            .normalized()
            .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
        (self.center + n * self.radius, n)
    }
}

/// Triangle soup with an AABB-tree for closest-point queries.
#[derive(Debug, Clone)]
pub struct TriangleSurface {
    positions: Vec<Vec3>,
    triangles: Vec<[usize; 3]>,
    tree: AabbTree<usize>,
}

impl TriangleSurface {
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> MeshResult<Self> {
        for (i, p) in positions.iter().enumerate() {
            if !p.is_finite() {
                return Err(MeshError::NonFinitePosition(i));
            }
        }
        for (fi, tri) in triangles.iter().enumerate() {
            if let Some(&bad) = tri.iter().find(|&&v| v >= positions.len()) {
                return Err(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: bad,
                    count: positions.len(),
                });
            }
        }

        let items = triangles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| Aabb::from_points(t.iter().map(|&v| &positions[v])).map(|b| (b, i)))
            .collect();
        let tree = AabbTree::build(items).ok_or(MeshError::NoFaces)?;
        Ok(Self {
            positions,
            triangles,
            tree,
        })
    }

    /// Snapshot of the live faces of `mesh`; polygons are fanned.
    pub fn from_mesh(mesh: &Mesh) -> MeshResult<Self> {
        let snapshot = mesh.to_polygon_mesh();
        let mut triangles = Vec::with_capacity(snapshot.faces.len());
        for face in &snapshot.faces {
            for i in 1..face.len().saturating_sub(1) {
                triangles.push([face[0], face[i], face[i + 1]]);
            }
        }
        Self::new(snapshot.positions, triangles)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn corners(&self, t: usize) -> [&Vec3; 3] {
        let [a, b, c] = self.triangles[t];
        [&self.positions[a], &self.positions[b], &self.positions[c]]
    }
}

impl TargetSurface for TriangleSurface {
    fn closest_point_normal(&self, p: Vec3) -> (Vec3, Vec3) {
        let query = |q: &Vec3, &t: &usize| {
            let [a, b, c] = self.corners(t);
            let cp = closest_point_on_triangle(q, a, b, c);
            (cp.distance2(q), cp)
        };
        match self.tree.nearest(&p, &query) {
            Some((_, cp, &t)) => {
                let [a, b, c] = self.corners(t);
                let n = triangle_area_normal(a, b, c).normalized().unwrap_or_default();
                (cp, n)
            }
            None => (p, Vec3::zero()),
        }
    }
}

/// Pulls onto the surface itself.
#[derive(Debug, Clone)]
pub struct TargetFeature<S> {
    pub surface: S,
}

impl<S: TargetSurface> TargetFeature<S> {
    pub const fn new(surface: S) -> Self {
        Self { surface }
    }
}

impl<S: TargetSurface> Feature for TargetFeature<S> {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        self.surface.closest_point_normal(p).0
    }
}

/// Pulls onto the surface shifted by `offset` along its normal.
#[derive(Debug, Clone)]
pub struct OffsetSurfaceFeature<S> {
    pub surface: S,
    pub offset: Real,
}

impl<S: TargetSurface> OffsetSurfaceFeature<S> {
    pub const fn new(surface: S, offset: Real) -> Self {
        Self { surface, offset }
    }
}

impl<S: TargetSurface> Feature for OffsetSurfaceFeature<S> {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        let (q, n) = self.surface.closest_point_normal(p);
        q + n * self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_offset_feature() {
        let f = OffsetSurfaceFeature::new(SphereSurface::new(Vec3::zero(), 1.0), 0.5);
        let q = f.closest_point(Vec3::new(3.0, 0.0, 0.0));
        assert!(q.distance(&Vec3::new(1.5, 0.0, 0.0)) < 1e-12);
    }

    #[test]
    fn triangle_surface_closest_point() {
        let surface = TriangleSurface::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(5.0, 5.0, 0.0),
                Vec3::new(6.0, 5.0, 0.0),
                Vec3::new(5.0, 6.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap();
        let (q, n) = surface.closest_point_normal(Vec3::new(0.2, 0.2, 2.0));
        assert!(q.distance(&Vec3::new(0.2, 0.2, 0.0)) < 1e-12);
        assert!(n.distance(&Vec3::new(0.0, 0.0, 1.0)) < 1e-12);

        let lifted = OffsetSurfaceFeature::new(surface, 0.25);
        let p = lifted.closest_point(Vec3::new(5.2, 5.2, -1.0));
        assert!(p.distance(&Vec3::new(5.2, 5.2, 0.25)) < 1e-12);
    }

    #[test]
    fn triangle_surface_rejects_bad_index() {
        let err = TriangleSurface::new(vec![Vec3::zero()], vec![[0, 1, 2]]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { .. }));
    }
}
