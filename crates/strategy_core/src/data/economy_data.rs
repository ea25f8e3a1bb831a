//! Tunable constants for the batched economy formulas.

use serde::{Deserialize, Serialize};

use crate::resources::WorldResource;

/// Economy tuning shared by every interval processor of a stage.
///
/// None of these values are structural: they only scale the per-entity
/// production, consumption and growth formulas.
///
/// # Example RON
///
/// ```ron
/// EconomyConfig(
///     batch_interval: 1.0,
///     food_resource: 1,
///     production_scale: 2.5,
///     consumption_per_capita: 0.1,
///     growth_resource: 1,
///     growth_cost: 5.0,
///     research_per_capita: 0.01,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Seconds of simulated time between two economy batches.
    #[serde(default = "default_batch_interval")]
    pub batch_interval: f32,

    /// Resource produced by population and eaten by it.
    pub food_resource: WorldResource,

    /// Multiplier on `ln(1 + population)` for food production per second.
    pub production_scale: f32,

    /// Food eaten per person per second.
    pub consumption_per_capita: f32,

    /// Resource spent to add one person.
    pub growth_resource: WorldResource,

    /// Amount of `growth_resource` one new person costs.
    pub growth_cost: f32,

    /// Research points per person per second (cities and planets).
    #[serde(default)]
    pub research_per_capita: f32,
}

const fn default_batch_interval() -> f32 {
    1.0
}

impl EconomyConfig {
    /// Population-driven food production per second.
    ///
    /// Grows logarithmically so large populations do not produce without
    /// bound.
    #[must_use]
    pub fn population_production_rate(&self, population: u32) -> f32 {
        self.production_scale * (population as f32).ln_1p()
    }

    /// Validate the constants. Returns a list of problems.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.batch_interval > 0.0) {
            errors.push(format!(
                "batch_interval must be positive, got {}",
                self.batch_interval
            ));
        }
        if !(self.production_scale >= 0.0) {
            errors.push(format!(
                "production_scale must be non-negative, got {}",
                self.production_scale
            ));
        }
        if !(self.consumption_per_capita >= 0.0) {
            errors.push(format!(
                "consumption_per_capita must be non-negative, got {}",
                self.consumption_per_capita
            ));
        }
        if !(self.growth_cost > 0.0) {
            errors.push(format!("growth_cost must be positive, got {}", self.growth_cost));
        }
        if !(self.research_per_capita >= 0.0) {
            errors.push(format!(
                "research_per_capita must be non-negative, got {}",
                self.research_per_capita
            ));
        }

        errors
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            batch_interval: default_batch_interval(),
            food_resource: WorldResource(1),
            production_scale: 2.5,
            consumption_per_capita: 0.1,
            growth_resource: WorldResource(1),
            growth_cost: 5.0,
            research_per_capita: 0.0,
        }
    }
}
