//! Skeleton-to-tube meshing.
//!
//! Every branch contributes one ring of `radial_subdivisions` vertices,
//! oriented perpendicular to the branch and scaled by its size. The root
//! contributes one extra ring at its foot, stored after all branch rings.
//! Each ring is stitched to its parent's ring (the root to the foot ring)
//! with a quad strip:
//!
//!   branch ring i -> vertices [s*i, s*i + s)
//!   foot ring     -> vertices [s*n, s*n + s)
//!   triangles     -> (b[k], t[k], t[k+1]) and (b[k], t[k+1], b[k+1])

use std::f32::consts::TAU;

use crate::{math, tree::BranchGraph};
use glam::Vec3;

/// Vertex and index buffers of the tree surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeMesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl TreeMesh {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates the triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Rebuilds the vertex normals from the triangle winding.
    ///
    /// Face normals are accumulated unnormalized (so larger faces weigh more)
    /// and normalized per vertex. Vertices touched by no face, or only by
    /// degenerate faces, get `Vec3::ZERO`.
    pub fn recalculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.vertices.len(), Vec3::ZERO);

        for [a, b, c] in self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]) {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let (va, vb, vc) = (self.vertices[a], self.vertices[b], self.vertices[c]);
            let n = (vb - va).cross(vc - va);
            self.normals[a] += n;
            self.normals[b] += n;
            self.normals[c] += n;
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }
}

/// Converts a [`BranchGraph`] into a [`TreeMesh`], reusing its buffers
/// between frames.
#[derive(Clone, Debug)]
pub struct SkeletonMesher {
    radial_subdivisions: usize,
    /// Unit ring in the XZ plane, one point per subdivision.
    unit_ring: Vec<Vec3>,
    mesh: TreeMesh,
}

impl SkeletonMesher {
    /// `radial_subdivisions` must be at least 3; configs are validated
    /// before a mesher is built from them.
    pub fn new(radial_subdivisions: usize) -> Self {
        let unit_ring = (0..radial_subdivisions)
            .map(|k| {
                let alpha = k as f32 / radial_subdivisions as f32 * TAU;
                Vec3::new(alpha.cos(), 0.0, alpha.sin())
            })
            .collect();

        Self {
            radial_subdivisions,
            unit_ring,
            mesh: TreeMesh::default(),
        }
    }

    #[inline]
    pub fn mesh(&self) -> &TreeMesh {
        &self.mesh
    }

    /// Rebuilds the mesh from the current skeleton.
    ///
    /// `progress` in `[0, 1]` places the rings of growing tips between their
    /// start and end; `origin` is subtracted from every vertex. Sizes must
    /// already be propagated. Each branch's `ring_base` is updated.
    pub fn rebuild(&mut self, graph: &mut BranchGraph, progress: f32, origin: Vec3) -> &TreeMesh {
        let s = self.radial_subdivisions;
        let n = graph.len();
        let foot_ring = n * s;

        let vertices = &mut self.mesh.vertices;
        vertices.clear();
        vertices.resize((n + 1) * s, Vec3::ZERO);

        for (i, b) in graph.branches_mut().iter_mut().enumerate() {
            let vid = s * i;
            b.ring_base = vid;

            let rotation = math::shortest_arc(Vec3::Y, b.direction);
            let center = if b.is_growing_tip() {
                b.start + (b.end - b.start) * progress
            } else {
                b.end
            };

            for (k, &unit) in self.unit_ring.iter().enumerate() {
                let offset = rotation * (unit * b.size);
                vertices[vid + k] = center + offset - origin;
                if b.parent.is_none() {
                    vertices[foot_ring + k] = b.start + offset - origin;
                }
            }
        }

        // Faces need every ring placed first, parents included.
        let indices = &mut self.mesh.indices;
        indices.clear();
        indices.reserve(n * s * 6);

        let branches = graph.branches();
        for b in branches {
            let bottom = b.parent.map_or(foot_ring, |p| branches[p].ring_base);
            let top = b.ring_base;
            for k in 0..s {
                let next = (k + 1) % s;
                indices.extend_from_slice(&[
                    (bottom + k) as u32,
                    (top + k) as u32,
                    (top + next) as u32,
                    (bottom + k) as u32,
                    (top + next) as u32,
                    (bottom + next) as u32,
                ]);
            }
        }

        self.mesh.recalculate_normals();
        &self.mesh
    }
}
