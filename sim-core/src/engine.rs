//! Time-driven growth state machine.
//!
//! The engine sits [`EngineState::Idle`] while host time accumulates in its
//! [`GrowthClock`]. When the accumulated time exceeds the configured
//! interval it runs exactly one [`GrowthEngine::step`] synchronously and
//! returns to idle.

use crate::{
    attractor::AttractorField, clock::GrowthClock, config::GrowthConfig, error::ConfigError,
    influence_buffer::InfluenceBuffer, phases, tree::BranchGraph, types::BranchId,
};
use glam::Vec3;
use rand::Rng;

/// Whether a growth iteration is running.
///
/// `Stepping` is only held for the duration of [`GrowthEngine::step`], which
/// runs synchronously, so callers always read back `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Stepping,
}

/// Which growth path an iteration took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// At least one attractor was in range; attracted branches grew toward it.
    Attracted,
    /// Attractors remain but none was in range; every extremity kept going.
    Continued,
    /// The attractor field is exhausted; nothing grew.
    Stalled,
}

/// Summary of one growth iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub kind: StepKind,
    /// Attractors removed by the kill-range pass.
    pub pruned: usize,
    /// Attractors assigned to a branch this iteration.
    pub active: usize,
    /// Branches created, in creation order.
    pub spawned: Vec<BranchId>,
}

#[derive(Clone, Debug)]
pub struct GrowthEngine {
    cfg: GrowthConfig,
    field: AttractorField,
    graph: BranchGraph,
    clock: GrowthClock,
    acc: InfluenceBuffer,
    state: EngineState,
}

impl GrowthEngine {
    /// Builds an engine over an existing field and skeleton.
    pub fn new(
        cfg: GrowthConfig,
        field: AttractorField,
        graph: BranchGraph,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            clock: GrowthClock::new(cfg.time_between_iterations),
            acc: InfluenceBuffer::with_len(graph.len()),
            cfg,
            field,
            graph,
            state: EngineState::Idle,
        })
    }

    /// Samples a fresh attractor cloud around `origin` and plants a root at
    /// the configured start position.
    pub fn from_config(
        cfg: GrowthConfig,
        origin: Vec3,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let field = AttractorField::generate(cfg.attractor_count, cfg.radius, origin, rng);
        let graph = BranchGraph::new(cfg.start_position, cfg.branch_length);
        Self::new(cfg, field, graph)
    }

    /// Feeds `dt` seconds of host time. Runs one growth step if the
    /// iteration interval has been exceeded and returns its report.
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> Option<StepReport> {
        if self.clock.tick(dt) {
            Some(self.step(rng))
        } else {
            None
        }
    }

    /// Runs one growth iteration immediately and restarts the clock, so the
    /// next iteration is a full interval away.
    ///
    /// Once the field is empty the skeleton stops growing for good, even
    /// though extremities are still marked as grown.
    pub fn step(&mut self, rng: &mut impl Rng) -> StepReport {
        self.state = EngineState::Stepping;
        self.clock.reset();

        self.graph.mark_extremities_grown();
        let pruned = phases::prune_phase(&self.graph, &mut self.field, &self.cfg);

        let report = if self.field.is_empty() {
            StepReport {
                kind: StepKind::Stalled,
                pruned,
                active: 0,
                spawned: Vec::new(),
            }
        } else {
            let active = phases::attraction_phase(
                &mut self.graph,
                &mut self.field,
                &self.cfg,
                &mut self.acc,
            );
            let (kind, spawned) = if active > 0 {
                let spawned = phases::growth_phase(&mut self.graph, &self.acc, &self.cfg, rng);
                (StepKind::Attracted, spawned)
            } else {
                let spawned = phases::continuation_phase(&mut self.graph, &self.cfg, rng);
                (StepKind::Continued, spawned)
            };
            StepReport {
                kind,
                pruned,
                active,
                spawned,
            }
        };

        log::debug!(
            "growth step {:?}: pruned {}, active {}, spawned {}, branches {}, attractors left {}",
            report.kind,
            report.pruned,
            report.active,
            report.spawned.len(),
            self.graph.len(),
            self.field.len()
        );

        self.state = EngineState::Idle;
        report
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &GrowthConfig {
        &self.cfg
    }

    #[inline]
    pub fn graph(&self) -> &BranchGraph {
        &self.graph
    }

    #[inline]
    pub fn field(&self) -> &AttractorField {
        &self.field
    }

    /// Fraction of the way to the next iteration, used for tip interpolation.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.clock.progress()
    }

    /// Recomputes branch radii with the configured pipe model.
    pub fn propagate_sizes(&mut self) {
        let cfg = &self.cfg;
        self.graph.propagate_sizes(cfg.extremity_size, cfg.growth_exponent);
    }

    /// Mutable access to the skeleton for passes that annotate it (meshing).
    pub(crate) fn graph_mut(&mut self) -> &mut BranchGraph {
        &mut self.graph
    }
}
