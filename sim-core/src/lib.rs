//! Core 3-D space-colonization tree growth and tube meshing library.
//!
//! Main components:
//! - [`attractor`] — the attractor cloud: sampling, pruning, assignment.
//! - [`tree`] — the append-only branch arena and radius propagation.
//! - [`phases`] — the individual phases of one growth iteration.
//! - [`engine`] — the time-driven growth state machine.
//! - [`mesh`] — skeleton-to-tube mesh conversion.
//! - [`simulation`] — engine, mesher and seeded RNG bundled for a host loop.
//! - [`config`] — growth and meshing parameters, validation and loading.
//! - [`influence_buffer`] — per-branch accumulation of attraction directions.
//! - [`clock`] — elapsed time between growth iterations.
//! - [`math`] — shortest-arc rotation and spherical sampling.
//! - [`error`] — configuration errors.
//! - [`types`] — shared type aliases and IDs.

pub mod attractor;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod influence_buffer;
pub mod math;
pub mod mesh;
pub mod phases;
pub mod simulation;
pub mod tree;
pub mod types;

pub use config::GrowthConfig;
pub use error::ConfigError;
pub use simulation::Simulation;
