//! Colonized planets of the space stage.

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, GroupMember, Housing, Producer, Storage};
use crate::data::{EconomyConfig, SettlementData};
use crate::math::Vec2;
use crate::processor::EconomyEntity;

/// A colonized planet. Founded complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Entity id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Position on the galaxy map.
    pub position: Vec2,
    /// Population and its ceiling.
    pub housing: Housing,
    /// Storage contribution.
    pub storage: Storage,
    /// Extraction on top of population-driven food, if any.
    pub extraction: Option<Producer>,
}

impl Planet {
    /// Colonize a planet.
    #[must_use]
    pub fn colonize(
        id: EntityId,
        name: impl Into<String>,
        position: Vec2,
        settlement: &SettlementData,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            housing: Housing {
                capacity: settlement.housing,
                residents: settlement.population,
            },
            storage: Storage {
                capacity: settlement.storage,
            },
            extraction: None,
        }
    }

    /// Set the planet's resource extraction.
    #[must_use]
    pub fn with_extraction(mut self, extraction: Producer) -> Self {
        self.extraction = Some(extraction);
        self
    }
}

impl GroupMember for Planet {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl EconomyEntity for Planet {
    fn population(&self) -> u32 {
        self.housing.residents
    }

    fn housing_capacity(&self) -> Option<u32> {
        Some(self.housing.capacity)
    }

    fn add_resident(&mut self) {
        self.housing.residents += 1;
    }

    fn storage_capacity(&self) -> Option<f32> {
        Some(self.storage.capacity)
    }

    fn research_output(&self, config: &EconomyConfig) -> f32 {
        self.housing.residents as f32 * config.research_per_capita
    }

    fn fixed_production(&self) -> Option<Producer> {
        self.extraction
    }
}
