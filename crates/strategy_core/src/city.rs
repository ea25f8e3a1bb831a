//! Industrial-stage cities.

use serde::{Deserialize, Serialize};

use crate::build_queue::{BuildItemKind, BuildQueue, BuildQueueItem};
use crate::components::{EntityId, GroupMember, Housing, Storage};
use crate::data::{EconomyConfig, SettlementData, StructureData};
use crate::error::{Result, SimError};
use crate::math::Vec2;
use crate::processor::EconomyEntity;
use crate::resources::{ResourceBundle, ResourceContainer};

/// A city: population, storage and a build queue.
///
/// Cities are founded complete, so they take part in every economy batch
/// from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Entity id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Map position. Finished units spawn here.
    pub position: Vec2,
    /// Population and its ceiling.
    pub housing: Housing,
    /// Storage contribution.
    pub storage: Storage,
    /// Units and structures being built.
    pub build_queue: BuildQueue,
    /// Structure type ids built inside the city, in completion order.
    pub buildings: Vec<String>,
    /// Research points per second from buildings.
    pub building_research: f32,
}

impl City {
    /// Found a city.
    #[must_use]
    pub fn found(
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
            build_queue: BuildQueue::new(),
            buildings: Vec::new(),
            building_research: 0.0,
        }
    }

    /// Add a finished building to the city.
    ///
    /// Its housing, storage and research add to the city's own. Fixed-rate
    /// production of city buildings is not modeled.
    pub fn add_building(&mut self, data: &StructureData) {
        if let Some(housing) = data.housing {
            self.housing.capacity += housing;
        }
        if let Some(storage) = data.storage {
            self.storage.capacity += storage.capacity;
        }
        if let Some(research) = data.research {
            self.building_research += research;
        }
        self.buildings.push(data.id.clone());
        tracing::info!(city = self.id, building = %data.id, "City building completed");
    }

    /// Pay `cost` from `resources` and queue `kind`.
    ///
    /// Nothing is paid if the queue is full or the cost cannot be covered
    /// in full.
    ///
    /// # Errors
    ///
    /// - [`SimError::QueueFull`] when the build queue is at its limit.
    /// - [`SimError::InsufficientResources`] when the cost cannot be paid.
    pub fn enqueue(
        &mut self,
        kind: BuildItemKind,
        build_time: f32,
        cost: &ResourceBundle,
        resources: &mut ResourceContainer,
    ) -> Result<()> {
        if self.build_queue.is_full() {
            return Err(SimError::QueueFull(self.id));
        }
        let item = BuildQueueItem::new(kind, build_time)?;

        if !resources.take_bundle(cost) {
            return Err(SimError::InsufficientResources(item.kind.type_id().to_string()));
        }

        tracing::debug!(city = self.id, item = ?item.kind, "Build item queued");
        self.build_queue
            .push(item)
            .map_err(|_| SimError::QueueFull(self.id))
    }
}

impl GroupMember for City {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl EconomyEntity for City {
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
        self.housing.residents as f32 * config.research_per_capita + self.building_research
    }
}
