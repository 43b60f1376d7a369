//! The individual phases of one growth iteration.
//!
//! [`crate::engine::GrowthEngine::step`] chains them as:
//! 1. [`prune_phase`] — attractors within kill range of any branch end are
//!    removed from the field.
//! 2. [`attraction_phase`] — every surviving attractor is assigned to its
//!    nearest branch end (within attraction range) and the unit directions
//!    toward them are accumulated in an [`InfluenceBuffer`].
//! 3. Either [`growth_phase`] when at least one attractor is active, or
//!    [`continuation_phase`] when none is, spawns the new tips.

use crate::{
    attractor::AttractorField, config::GrowthConfig, influence_buffer::InfluenceBuffer, math,
    tree::BranchGraph, types::BranchId,
};
use glam::Vec3;
use rand::Rng;

/// Removes consumed attractors and returns how many were removed.
pub fn prune_phase(graph: &BranchGraph, field: &mut AttractorField, cfg: &GrowthConfig) -> usize {
    field.prune_near(graph, cfg.kill_range)
}

/// Assigns attractors to branches and accumulates their pull.
///
/// Each branch's `attractors` list is replaced, and `acc` is
/// resized to the current branch count. Returns the number of active
/// attractors.
pub fn attraction_phase(
    graph: &mut BranchGraph,
    field: &mut AttractorField,
    cfg: &GrowthConfig,
    acc: &mut InfluenceBuffer,
) -> usize {
    let assignment = field.assign_nearest(graph, cfg.attraction_range);
    acc.accumulate(graph.branches().iter().map(|b| b.end), &assignment);

    for (branch, attractors) in graph.branches_mut().iter_mut().zip(assignment.per_branch) {
        branch.attractors = attractors;
    }

    assignment.active.len()
}

/// Grows one child from every attracted branch and rebuilds the frontier.
///
/// For each influenced branch the new direction is the mean pull plus a
/// random perturbation, normalized. Childless branches without pull stay
/// on the frontier; influenced branches are replaced there by their new
/// child. New branches are appended in branch order once the scan is done.
///
/// Returns the ids of the spawned branches.
pub fn growth_phase(
    graph: &mut BranchGraph,
    acc: &InfluenceBuffer,
    cfg: &GrowthConfig,
    rng: &mut impl Rng,
) -> Vec<BranchId> {
    let first_new = graph.len();
    let mut to_add = Vec::with_capacity(16);
    let mut extremities = Vec::with_capacity(graph.extremities().len());

    for (id, branch) in graph.branches().iter().enumerate() {
        if acc.is_influenced(id) {
            let dir = growth_direction(acc.avg_dir(id), branch.direction, cfg, rng);
            extremities.push(first_new + to_add.len());
            to_add.push((id, dir));
        } else if branch.children.is_empty() {
            extremities.push(id);
        }
    }

    let new_ids = spawn(graph, to_add, cfg.branch_length);
    graph.set_extremities(extremities);
    new_ids
}

/// Extends every extremity along its own direction.
///
/// Used when attractors remain but none is in range of the tree. Each
/// extremity is replaced on the frontier by its new child, one-for-one.
pub fn continuation_phase(
    graph: &mut BranchGraph,
    cfg: &GrowthConfig,
    rng: &mut impl Rng,
) -> Vec<BranchId> {
    let to_add: Vec<(BranchId, Vec3)> = graph
        .extremities()
        .iter()
        .map(|&id| {
            let own = graph.branch(id).direction;
            (id, growth_direction(own, own, cfg, rng))
        })
        .collect();

    let new_ids = spawn(graph, to_add, cfg.branch_length);
    graph.set_extremities(new_ids.clone());
    new_ids
}

/// A random vector of length `cfg.random_growth`, uniformly oriented.
pub fn perturbation(cfg: &GrowthConfig, rng: &mut impl Rng) -> Vec3 {
    math::random_unit_vector(rng) * cfg.random_growth
}

/// Adds a perturbation to `pull` and normalizes.
///
/// A zero result falls back to the perturbation alone, then to `fallback`
/// if the perturbation itself is zero.
fn growth_direction(pull: Vec3, fallback: Vec3, cfg: &GrowthConfig, rng: &mut impl Rng) -> Vec3 {
    let noise = perturbation(cfg, rng);
    (pull + noise)
        .try_normalize()
        .or_else(|| noise.try_normalize())
        .unwrap_or_else(|| {
            log::warn!("degenerate growth direction, keeping parent direction");
            fallback
        })
}

fn spawn(graph: &mut BranchGraph, to_add: Vec<(BranchId, Vec3)>, length: f32) -> Vec<BranchId> {
    to_add
        .into_iter()
        .map(|(parent, dir)| {
            let id = graph.add_child(parent, dir, length);
            log::trace!("branch {id} spawned from {parent} towards {dir}");
            id
        })
        .collect()
}
