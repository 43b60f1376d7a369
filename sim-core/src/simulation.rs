//! Host-facing bundle of the growth engine and the mesher.
//!
//! A host owns one [`Simulation`] and calls [`Simulation::tick`] once per
//! frame with the elapsed time. Everything it reads back (mesh, skeleton,
//! attractors) is borrowed from the simulation and only valid until the
//! next tick.

use crate::{
    attractor::AttractorSnapshot,
    config::GrowthConfig,
    engine::{GrowthEngine, StepReport},
    error::ConfigError,
    mesh::{SkeletonMesher, TreeMesh},
    tree::BranchGraph,
};
use glam::Vec3;
use rand::{SeedableRng, rngs::StdRng};

pub struct Simulation {
    engine: GrowthEngine,
    mesher: SkeletonMesher,
    rng: StdRng,
    origin: Vec3,
}

impl Simulation {
    /// Validates `cfg`, samples attractors around `origin` and plants the
    /// root. The same `seed` always grows the same tree.
    pub fn new(cfg: GrowthConfig, origin: Vec3, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let engine = GrowthEngine::from_config(cfg, origin, &mut rng)?;
        let mesher = SkeletonMesher::new(cfg.radial_subdivisions);

        log::info!(
            "simulation seeded with {seed}: {} attractors, radius {}, {} radial subdivisions",
            engine.field().len(),
            cfg.radius,
            cfg.radial_subdivisions
        );

        let mut sim = Self {
            engine,
            mesher,
            rng,
            origin,
        };
        sim.rebuild_mesh();
        Ok(sim)
    }

    /// Restarts from a fresh attractor cloud with the same configuration.
    pub fn reset(&mut self, seed: u64) -> Result<(), ConfigError> {
        *self = Self::new(*self.engine.config(), self.origin, seed)?;
        Ok(())
    }

    /// Advances the growth clock by `dt` seconds, running a growth step if
    /// one is due, then rebuilds the mesh.
    pub fn tick(&mut self, dt: f32) -> Option<StepReport> {
        let report = self.engine.advance(dt, &mut self.rng);
        self.rebuild_mesh();
        report
    }

    /// Forces one growth step regardless of the clock and rebuilds the mesh.
    pub fn step(&mut self) -> StepReport {
        let report = self.engine.step(&mut self.rng);
        self.rebuild_mesh();
        report
    }

    /// Propagates branch sizes and regenerates the tube mesh.
    pub fn rebuild_mesh(&mut self) -> &TreeMesh {
        self.engine.propagate_sizes();
        let progress = self.engine.progress();
        self.mesher.rebuild(self.engine.graph_mut(), progress, self.origin)
    }

    #[inline]
    pub fn mesh(&self) -> &TreeMesh {
        self.mesher.mesh()
    }

    #[inline]
    pub fn branches(&self) -> &BranchGraph {
        self.engine.graph()
    }

    #[inline]
    pub fn attractors(&self) -> AttractorSnapshot<'_> {
        self.engine.field().snapshot()
    }

    #[inline]
    pub fn config(&self) -> &GrowthConfig {
        self.engine.config()
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.engine.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cfg() -> GrowthConfig {
        GrowthConfig {
            attractor_count: 200,
            radius: 2.0,
            start_position: Vec3::new(0.0, -2.5, 0.0),
            attraction_range: 1.0,
            kill_range: 0.25,
            radial_subdivisions: 6,
            ..GrowthConfig::default()
        }
    }

    fn assert_mesh_matches_graph(sim: &Simulation) {
        let n = sim.branches().len();
        let s = sim.config().radial_subdivisions;
        assert_eq!(sim.mesh().vertices.len(), (n + 1) * s);
        assert_eq!(sim.mesh().indices.len(), n * s * 6);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = GrowthConfig {
            growth_exponent: -1.0,
            ..small_cfg()
        };
        assert!(matches!(
            Simulation::new(cfg, Vec3::ZERO, 0),
            Err(ConfigError::InvalidGrowthExponent(_))
        ));
    }

    #[test]
    fn mesh_is_available_before_the_first_tick() {
        let sim = Simulation::new(small_cfg(), Vec3::ZERO, 1).unwrap();
        assert_mesh_matches_graph(&sim);
        assert_eq!(sim.attractors().count(), 200);
    }

    #[test]
    fn mesh_tracks_graph_over_many_ticks() {
        let mut sim = Simulation::new(small_cfg(), Vec3::ZERO, 5).unwrap();
        let mut steps = 0;
        for _ in 0..200 {
            if sim.tick(0.1).is_some() {
                steps += 1;
            }
            assert_mesh_matches_graph(&sim);
        }
        assert!(steps > 0);
        assert!(sim.branches().len() > 1);
    }

    #[test]
    fn tick_interpolates_growing_tips_between_steps() {
        let mut sim = Simulation::new(small_cfg(), Vec3::ZERO, 2).unwrap();
        sim.tick(0.1);
        let early = sim.mesh().vertices[0];
        sim.tick(0.2);
        let late = sim.mesh().vertices[0];
        // The root is still growing: its ring rises with the clock.
        assert!(late.y > early.y);
    }

    #[test]
    fn same_seed_grows_the_same_tree() {
        let mut a = Simulation::new(small_cfg(), Vec3::ZERO, 77).unwrap();
        let mut b = Simulation::new(small_cfg(), Vec3::ZERO, 77).unwrap();
        for _ in 0..20 {
            a.step();
            b.step();
        }
        assert_eq!(a.mesh(), b.mesh());
        assert_eq!(a.attractors().positions, b.attractors().positions);
    }

    #[test]
    fn forced_step_draws_new_tips_at_their_base() {
        let mut sim = Simulation::new(small_cfg(), Vec3::ZERO, 6).unwrap();
        sim.tick(0.3);
        assert!(sim.progress() > 0.0);

        let report = sim.step();
        assert_eq!(sim.progress(), 0.0);
        assert!(!report.spawned.is_empty());

        let s = sim.config().radial_subdivisions;
        for id in report.spawned {
            let branch = sim.branches().branch(id);
            let ring = &sim.mesh().vertices[branch.ring_base..branch.ring_base + s];
            let center = ring.iter().copied().sum::<Vec3>() / s as f32;
            assert!(center.distance(branch.start) < 1e-4);
        }
    }

    #[test]
    fn reset_starts_over_with_the_same_config() {
        let mut sim = Simulation::new(small_cfg(), Vec3::ZERO, 3).unwrap();
        for _ in 0..5 {
            sim.step();
        }
        assert!(sim.branches().len() > 1);

        sim.reset(4).unwrap();
        assert_eq!(sim.branches().len(), 1);
        assert_eq!(sim.attractors().count(), 200);
        assert_eq!(sim.config(), &small_cfg());
    }
}
