//! Founding values for cities and planets.

use serde::{Deserialize, Serialize};

/// What a newly founded settlement starts with.
///
/// Cities and planets are founded complete; these values become their
/// housing, storage and starting population.
///
/// # Example RON
///
/// ```ron
/// SettlementData(housing: 20, storage: 500.0, population: 2)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementData {
    /// Population ceiling.
    pub housing: u32,
    /// Storage contribution to the stage container.
    pub storage: f32,
    /// Population at founding.
    pub population: u32,
}

impl SettlementData {
    /// Defaults for an industrial-stage city.
    #[must_use]
    pub const fn city() -> Self {
        Self {
            housing: 20,
            storage: 500.0,
            population: 2,
        }
    }

    /// Defaults for a colonized planet.
    #[must_use]
    pub const fn planet() -> Self {
        Self {
            housing: 200,
            storage: 5000.0,
            population: 10,
        }
    }

    /// Validate the values. Returns a list of problems.
    #[must_use]
    pub fn validate(&self, label: &str) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.storage >= 0.0) {
            errors.push(format!("{label} storage must be non-negative"));
        }
        if self.population > self.housing {
            errors.push(format!(
                "{label} starting population {} exceeds housing {}",
                self.population, self.housing
            ));
        }
        errors
    }
}

impl Default for SettlementData {
    fn default() -> Self {
        Self::city()
    }
}
