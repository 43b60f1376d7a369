//! Growth and meshing parameters.
//!
//! Configuration is applied once when a simulation is built and is immutable
//! afterwards. It can be loaded from several layers, lowest priority first:
//! 1. [`GrowthConfig::default`]
//! 2. `config/default.toml`
//! 3. `config/user.toml`
//! 4. Environment variables (`SCA_BRANCH_LENGTH=0.3` -> `branch_length`)

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Number of attractors sampled inside the crown sphere.
    pub attractor_count: usize,
    /// Radius of the crown sphere.
    pub radius: f32,
    /// Where the root branch starts.
    pub start_position: Vec3,
    /// Length of every spawned branch.
    pub branch_length: f32,
    /// Seconds between two growth iterations.
    pub time_between_iterations: f32,
    /// Attractors farther than this from every branch end do not pull.
    pub attraction_range: f32,
    /// Attractors closer than this to any branch end are consumed.
    pub kill_range: f32,
    /// Magnitude of the random perturbation added to growth directions.
    pub random_growth: f32,
    /// Vertices per cross-section ring of the tube mesh.
    pub radial_subdivisions: usize,
    /// Radius given to every childless branch.
    pub extremity_size: f32,
    /// Pipe model exponent used to derive a parent's radius from its children.
    pub growth_exponent: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            attractor_count: 400,
            radius: 5.0,
            start_position: Vec3::ZERO,
            branch_length: 0.2,
            time_between_iterations: 0.5,
            attraction_range: 0.1,
            kill_range: 0.5,
            random_growth: 0.1,
            radial_subdivisions: 10,
            extremity_size: 0.05,
            growth_exponent: 2.0,
        }
    }
}

impl GrowthConfig {
    /// Loads configuration from `config/` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Loads configuration from a specific directory.
    ///
    /// Missing files are skipped. The merged result is validated before it
    /// is returned.
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(GrowthConfig::default()));
        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }
        figment = figment.merge(Env::prefixed("SCA_"));

        Self::extract(figment)
    }

    /// Parses a TOML document layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let figment =
            Figment::from(Serialized::defaults(GrowthConfig::default())).merge(Toml::string(toml));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let cfg: GrowthConfig = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects parameter sets that cannot produce a tree or a tube mesh.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radial_subdivisions < 3 {
            return Err(ConfigError::TooFewSubdivisions(self.radial_subdivisions));
        }
        if !(self.branch_length > 0.0) {
            return Err(ConfigError::NonPositiveBranchLength(self.branch_length));
        }
        if !(self.growth_exponent > 0.0) || !self.growth_exponent.is_finite() {
            return Err(ConfigError::InvalidGrowthExponent(self.growth_exponent));
        }
        if !(self.time_between_iterations > 0.0) {
            return Err(ConfigError::NonPositiveInterval(self.time_between_iterations));
        }

        let non_negative = [
            ("radius", self.radius),
            ("attraction_range", self.attraction_range),
            ("kill_range", self.kill_range),
            ("random_growth", self.random_growth),
            ("extremity_size", self.extremity_size),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        Ok(())
    }
}
