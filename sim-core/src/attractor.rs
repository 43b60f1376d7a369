use crate::{math, tree::BranchGraph};
use glam::Vec3;
use rand::Rng;

/// The attractor cloud the tree grows into.
///
/// The field owns the positions, their count and the indices that were
/// active during the latest assignment, so all three always agree.
#[derive(Clone, Debug, Default)]
pub struct AttractorField {
    points: Vec<Vec3>,
    active: Vec<usize>,
}

/// Result of assigning attractors to their nearest branch end.
///
/// `per_branch[id]` lists the attractor positions pulling on branch `id`;
/// `active` holds the indices of assigned attractors in ascending order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    pub per_branch: Vec<Vec<Vec3>>,
    pub active: Vec<usize>,
}

/// Immutable view of the field for visualizers.
#[derive(Clone, Copy, Debug)]
pub struct AttractorSnapshot<'a> {
    pub positions: &'a [Vec3],
    /// Indices into `positions`, ascending.
    pub active: &'a [usize],
}

impl AttractorField {
    pub fn from_positions(points: Vec<Vec3>) -> Self {
        Self {
            points,
            active: Vec::new(),
        }
    }

    /// Samples `count` attractors in a ball of `radius` around `origin`.
    ///
    /// See [`math::sample_crown_point`] for the (shell-biased) distribution.
    pub fn generate(count: usize, radius: f32, origin: Vec3, rng: &mut impl Rng) -> Self {
        let points = (0..count)
            .map(|_| origin + math::sample_crown_point(radius, rng))
            .collect();
        Self::from_positions(points)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.points
    }

    #[inline]
    pub fn active(&self) -> &[usize] {
        &self.active
    }

    pub fn snapshot(&self) -> AttractorSnapshot<'_> {
        AttractorSnapshot {
            positions: &self.points,
            active: &self.active,
        }
    }

    /// Removes every attractor closer than `kill_range` to any branch end and
    /// returns how many were removed.
    ///
    /// Indices shift on removal, so the active set is dropped whenever
    /// something was removed.
    pub fn prune_near(&mut self, graph: &BranchGraph, kill_range: f32) -> usize {
        let before = self.points.len();
        self.points
            .retain(|&p| !graph.branches().iter().any(|b| b.end.distance(p) < kill_range));

        let removed = before - self.points.len();
        if removed > 0 {
            self.active.clear();
        }
        removed
    }

    /// Assigns every attractor to the branch whose end is nearest, provided
    /// that distance is below `attraction_range`.
    ///
    /// Ties go to the branch created first. Nothing carries over from the
    /// previous call; the field's active set is replaced by the new one.
    pub fn assign_nearest(&mut self, graph: &BranchGraph, attraction_range: f32) -> Assignment {
        let mut per_branch: Vec<Vec<Vec3>> = vec![Vec::new(); graph.len()];
        let mut active = Vec::new();

        for (i, &p) in self.points.iter().enumerate() {
            if let Some((id, d)) = graph.nearest_end(p)
                && d < attraction_range
            {
                per_branch[id].push(p);
                active.push(i);
            }
        }

        self.active.clone_from(&active);
        Assignment { per_branch, active }
    }
}

impl AttractorSnapshot<'_> {
    #[inline]
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.binary_search(&index).is_ok()
    }
}
