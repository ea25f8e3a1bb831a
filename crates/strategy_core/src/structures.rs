//! Placed structures and their construction life cycle.
//!
//! A structure is placed as a construction site that still needs its full
//! resource bundle. Delivery is all-or-nothing: either the whole missing
//! bundle is taken from a source container in one call, or nothing is.
//! After delivery the structure either finishes instantly (a build order
//! finalizes it) or runs a [`StructureCompletionTimer`].

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, GroupMember, Housing, Producer, Research, Storage};
use crate::data::{EconomyConfig, StructureData};
use crate::error::{Result, SimError};
use crate::math::Vec2;
use crate::processor::EconomyEntity;
use crate::progress::StructureCompletionTimer;
use crate::resources::{ResourceBundle, ResourceContainer};

/// Construction state of a structure.
///
/// Only the waiting state carries a missing-resources bundle, so a
/// completed structure can never still be missing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstructionState {
    /// Waiting for the listed resources to be delivered.
    AwaitingResources {
        /// Resources still needed.
        missing: ResourceBundle,
    },
    /// Everything delivered, waiting to be finalized or timed.
    Supplied,
    /// Delivered and building on a timer.
    Timed(StructureCompletionTimer),
    /// Fully constructed.
    Completed,
}

/// A structure on the strategic map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Entity id.
    pub id: EntityId,
    /// Structure type id from game data.
    pub kind: String,
    /// Map position.
    pub position: Vec2,
    /// Construction state.
    construction: ConstructionState,
    /// Seconds of timed construction after delivery.
    construction_time: f32,
    /// Housing capability.
    pub housing: Option<Housing>,
    /// Storage capability.
    pub storage: Option<Storage>,
    /// Production capability.
    pub producer: Option<Producer>,
    /// Research capability.
    pub research: Option<Research>,
}

impl Structure {
    /// Create a construction site for a structure type.
    #[must_use]
    pub fn placed(id: EntityId, data: &StructureData, position: Vec2) -> Self {
        Self {
            id,
            kind: data.id.clone(),
            position,
            construction: ConstructionState::AwaitingResources {
                missing: data.cost.clone(),
            },
            construction_time: data.construction_time,
            housing: data.housing.map(Housing::new),
            storage: data.storage,
            producer: data.production,
            research: data
                .research
                .map(|points_per_second| Research { points_per_second }),
        }
    }

    /// Create an already finished structure (starting structures).
    #[must_use]
    pub fn prebuilt(id: EntityId, data: &StructureData, position: Vec2) -> Self {
        let mut structure = Self::placed(id, data, position);
        structure.construction = ConstructionState::Completed;
        structure
    }

    /// Current construction state.
    #[must_use]
    pub fn construction(&self) -> &ConstructionState {
        &self.construction
    }

    /// Whether the structure is fully constructed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.construction, ConstructionState::Completed)
    }

    /// Resources still needed before construction can finish.
    ///
    /// `None` once everything has been delivered.
    #[must_use]
    pub fn missing_resources(&self) -> Option<&ResourceBundle> {
        match &self.construction {
            ConstructionState::AwaitingResources { missing } => Some(missing),
            _ => None,
        }
    }

    /// Construction progress in `[0, 1]` for display.
    #[must_use]
    pub fn construction_progress(&self) -> f32 {
        match &self.construction {
            ConstructionState::AwaitingResources { .. } | ConstructionState::Supplied => 0.0,
            ConstructionState::Timed(timer) => timer.progress(),
            ConstructionState::Completed => 1.0,
        }
    }

    /// Deliver the whole missing bundle from `source` in one go.
    ///
    /// Returns `true` if nothing is missing afterwards. When the source
    /// cannot cover every entry, nothing is taken and `false` is returned.
    pub fn deposit_bulk_resources(&mut self, source: &mut ResourceContainer) -> bool {
        let ConstructionState::AwaitingResources { missing } = &self.construction else {
            return true;
        };

        // TODO: allow partial deliveries so sites can show per-resource progress
        if !source.take_bundle(missing) {
            return false;
        }

        tracing::debug!(structure = self.id, kind = %self.kind, "Construction resources delivered");
        self.construction = ConstructionState::Supplied;
        true
    }

    /// Finish construction immediately.
    ///
    /// Skips any remaining delivery or timer. Returns `true` if the
    /// structure was not completed before.
    pub fn force_completion(&mut self) -> bool {
        if self.is_completed() {
            return false;
        }
        if self.missing_resources().is_some() {
            tracing::debug!(structure = self.id, "Completion forced before delivery");
        }
        self.on_finish_construction();
        true
    }

    /// Start the construction timer after delivery.
    ///
    /// Structures without a construction time finish right away. Returns
    /// `true` if the structure completed during this call.
    pub fn start_timed_completion(&mut self) -> Result<bool> {
        match self.construction {
            ConstructionState::Supplied => {}
            ConstructionState::AwaitingResources { .. } => {
                return Err(SimError::InvalidState(format!(
                    "structure {} still awaits resources",
                    self.id
                )))
            }
            ConstructionState::Timed(_) | ConstructionState::Completed => return Ok(false),
        }

        if self.construction_time > 0.0 {
            self.construction =
                ConstructionState::Timed(StructureCompletionTimer::new(self.construction_time)?);
            Ok(false)
        } else {
            self.on_finish_construction();
            Ok(true)
        }
    }

    /// Advance timed construction.
    ///
    /// Returns `true` on the frame the structure completes. The timer is
    /// dropped at that point so completion happens exactly once.
    pub fn process_construction(&mut self, delta: f32) -> bool {
        let ConstructionState::Timed(timer) = &mut self.construction else {
            return false;
        };

        let progress = timer.elapse(delta);
        tracing::trace!(structure = self.id, progress, "Construction progress");

        if timer.is_finished() {
            self.on_finish_construction();
            true
        } else {
            false
        }
    }

    fn on_finish_construction(&mut self) {
        self.construction = ConstructionState::Completed;
        tracing::info!(structure = self.id, kind = %self.kind, "Structure completed");
    }
}

impl GroupMember for Structure {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl EconomyEntity for Structure {
    fn is_operational(&self) -> bool {
        self.is_completed()
    }

    fn population(&self) -> u32 {
        self.housing.map_or(0, |h| h.residents)
    }

    fn housing_capacity(&self) -> Option<u32> {
        self.housing.map(|h| h.capacity)
    }

    fn add_resident(&mut self) {
        if let Some(housing) = self.housing.as_mut() {
            housing.residents += 1;
        }
    }

    fn storage_capacity(&self) -> Option<f32> {
        self.storage.map(|s| s.capacity)
    }

    fn research_output(&self, _config: &EconomyConfig) -> f32 {
        self.research.map_or(0.0, |r| r.points_per_second)
    }

    fn fixed_production(&self) -> Option<Producer> {
        self.producer
    }
}
