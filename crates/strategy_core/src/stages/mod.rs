//! Stage orchestrators.
//!
//! A stage owns one shared [`ResourceContainer`], one
//! [`IntervalProcessor`], an id allocator, a technology web and its entity
//! groups. Callers drive it with one `process(delta)` per frame and read
//! back the [`StageEvent`]s it produced.
//!
//! Every stage runs the same per-frame order:
//!
//! 1. Economy batch (container capacity follows the new aggregates)
//! 2. Unit order queues
//! 3. Build queues
//! 4. Structure construction
//! 5. Research

mod industrial;
mod society;
mod space;

pub use industrial::{IndustrialStage, IndustrialUnit};
pub use society::SocietyStage;
pub use space::{Fleet, SpaceStage};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::components::{EntityGroup, EntityId, IdAllocator};
use crate::data::GameData;
use crate::error::{Result, SimError};
use crate::facade::{OrderWorld, ResourceFacade};
use crate::processor::{AggregateStats, EconomyEntity, IntervalProcessor};
use crate::resources::ResourceContainer;
use crate::structures::Structure;
use crate::technology::{TechWeb, TechnologyId};

/// Something that happened during one `process` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageEvent {
    /// An economy batch ran.
    EconomyProcessed(AggregateStats),
    /// A unit finished its front order.
    OrderCompleted {
        /// The unit.
        unit: EntityId,
    },
    /// A city finished building a unit.
    UnitSpawned {
        /// The new unit.
        unit: EntityId,
        /// Unit type id.
        kind: String,
        /// The city that built it.
        city: EntityId,
    },
    /// A city finished building a structure inside its walls.
    CityStructureBuilt {
        /// The city.
        city: EntityId,
        /// Structure type id.
        kind: String,
    },
    /// A placed structure finished construction.
    StructureCompleted {
        /// The structure.
        structure: EntityId,
        /// Structure type id.
        kind: String,
    },
    /// Research finished and a technology is now available.
    TechnologyUnlocked(TechnologyId),
}

/// State every stage has, regardless of its entity groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCore {
    data: GameData,
    resources: ResourceContainer,
    processor: IntervalProcessor,
    ids: IdAllocator,
    tech: TechWeb,
    /// Events raised between frames, reported by the next `process`.
    pending: Vec<StageEvent>,
}

impl StageCore {
    /// Validate `data` and build an empty core.
    ///
    /// Capacity starts at zero; stages seed it from their entities right
    /// after construction.
    fn new(data: GameData) -> Result<Self> {
        let data = data.validated()?;
        let processor = IntervalProcessor::new(data.economy.batch_interval)?;

        Ok(Self {
            data,
            resources: ResourceContainer::new(0.0),
            processor,
            ids: IdAllocator::new(),
            tech: TechWeb::new(),
            pending: Vec::new(),
        })
    }

    /// Game data the stage was created with.
    #[must_use]
    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// The stage's shared resource container.
    #[must_use]
    pub fn resources(&self) -> &ResourceContainer {
        &self.resources
    }

    /// Cached aggregates from the last batch or recomputation.
    #[must_use]
    pub fn stats(&self) -> &AggregateStats {
        self.processor.stats()
    }

    /// The stage's interval processor.
    #[must_use]
    pub fn processor(&self) -> &IntervalProcessor {
        &self.processor
    }

    /// Unlocked technologies and active research.
    #[must_use]
    pub fn tech(&self) -> &TechWeb {
        &self.tech
    }

    /// Start a frame's event list with whatever happened since the last
    /// frame.
    fn begin_frame(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Report a structure finished outside `process` on the next frame.
    fn record_completion(&mut self, structure: &Structure) {
        self.pending.push(completion_event(structure));
    }

    fn allocate_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    fn sync_capacity(&mut self) {
        self.resources
            .set_capacity(self.processor.stats().total_storage.max(0.0));
    }

    /// Recompute aggregates now and make capacity follow them.
    fn refresh<'a, E, I>(&mut self, entities: I)
    where
        E: EconomyEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        self.processor.recompute_now(entities, &self.data.economy);
        self.sync_capacity();
    }

    /// Feed the processor and push an event if a batch ran.
    fn run_batch<'a, E, I>(&mut self, delta: f32, entities: I, events: &mut Vec<StageEvent>)
    where
        E: EconomyEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut E>,
    {
        let ran = self
            .processor
            .process(delta, entities, &mut self.resources, &self.data.economy);
        if ran {
            self.sync_capacity();
            events.push(StageEvent::EconomyProcessed(self.processor.stats().clone()));
        }
    }

    fn start_research(&mut self, tech: &TechnologyId) -> Result<()> {
        self.tech.start_research(&self.data, tech)?;
        tracing::info!(technology = %tech, "Research started");
        Ok(())
    }

    fn advance_research(&mut self, delta: f32, events: &mut Vec<StageEvent>) {
        let points = self.processor.stats().research_speed * delta;
        if points <= 0.0 {
            return;
        }
        if let Some(tech) = self.tech.add_research_points(points) {
            events.push(StageEvent::TechnologyUnlocked(tech));
        }
    }

    /// Move everything `other` holds into this stage's container.
    ///
    /// Whatever does not fit stays in `other`. Returns the amount moved.
    fn transfer_resources_from(&mut self, other: &mut ResourceContainer) -> f32 {
        let moved = self.resources.transfer_from(other);
        tracing::info!(moved, "Resources carried over into stage");
        moved
    }
}

/// Borrowed view of a stage handed to orders while the stage iterates its
/// units.
struct WorldView<'a> {
    resources: &'a mut ResourceContainer,
    structures: Option<&'a mut EntityGroup<Structure>>,
    /// Structures finished by orders during this view's lifetime.
    completed: Vec<EntityId>,
}

impl<'a> WorldView<'a> {
    fn new(
        resources: &'a mut ResourceContainer,
        structures: Option<&'a mut EntityGroup<Structure>>,
    ) -> Self {
        Self {
            resources,
            structures,
            completed: Vec::new(),
        }
    }
}

impl ResourceFacade for WorldView<'_> {
    fn resources(&self) -> &ResourceContainer {
        &*self.resources
    }

    fn resources_mut(&mut self) -> &mut ResourceContainer {
        &mut *self.resources
    }
}

impl OrderWorld for WorldView<'_> {
    fn build_target(&mut self, id: EntityId) -> Option<(&mut Structure, &mut ResourceContainer)> {
        let structure = self.structures.as_mut()?.get_mut(id)?;
        Some((structure, &mut *self.resources))
    }

    fn structure_completed(&mut self, id: EntityId) {
        self.completed.push(id);
    }
}

fn completion_event(structure: &Structure) -> StageEvent {
    StageEvent::StructureCompleted {
        structure: structure.id,
        kind: structure.kind.clone(),
    }
}

/// Advance every placed structure: supply waiting sites from `resources`
/// when `auto_supply` is set, then run construction timers.
///
/// Returns `true` if any structure completed.
fn advance_structures(
    structures: &mut EntityGroup<Structure>,
    resources: &mut ResourceContainer,
    delta: f32,
    auto_supply: bool,
    events: &mut Vec<StageEvent>,
) -> bool {
    let mut any_completed = false;

    for structure in structures.iter_mut() {
        let mut completed = false;

        if auto_supply
            && structure.missing_resources().is_some()
            && structure.deposit_bulk_resources(resources)
        {
            match structure.start_timed_completion() {
                Ok(instant) => completed = instant,
                Err(err) => {
                    tracing::warn!(structure = structure.id, %err, "Could not start construction");
                }
            }
        }

        if structure.process_construction(delta) {
            completed = true;
        }

        if completed {
            any_completed = true;
            events.push(completion_event(structure));
        }
    }

    any_completed
}

fn encode<T: Serialize>(state: &T, stage: &str) -> Result<Vec<u8>> {
    bincode::serialize(state)
        .map_err(|e| SimError::Serialization(format!("Failed to save {stage} stage: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8], stage: &str) -> Result<T> {
    bincode::deserialize(bytes)
        .map_err(|e| SimError::Serialization(format!("Failed to load {stage} stage: {e}")))
}
