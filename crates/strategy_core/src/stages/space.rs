//! Space stage: planets, space structures and fleets.

use serde::{Deserialize, Serialize};

use super::{
    advance_structures, completion_event, decode, encode, StageCore, StageEvent, WorldView,
};
use crate::components::{EntityGroup, EntityId, Producer};
use crate::data::GameData;
use crate::error::{Result, SimError};
use crate::facade::{OrderWorld, ResourceFacade};
use crate::math::Vec2;
use crate::orders::{SpaceOrder, StrategicUnit, UnitBody};
use crate::planet::Planet;
use crate::processor::EconomyEntity;
use crate::resources::ResourceContainer;
use crate::structures::Structure;
use crate::technology::TechnologyId;

/// A fleet of the space stage.
pub type Fleet = StrategicUnit<SpaceOrder>;

/// Space stage orchestrator.
///
/// Planets and completed space structures share one economy batch, so a
/// finished depot raises storage and a finished station adds research.
///
/// Space structures are finished either by a fleet carrying out a
/// [`SpaceOrder::Build`] (instant once paid) or by paying for them from the
/// stage container with [`SpaceStage::supply_structure`], which starts a
/// completion timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceStage {
    core: StageCore,
    planets: EntityGroup<Planet>,
    structures: EntityGroup<Structure>,
    fleets: EntityGroup<Fleet>,
}

impl SpaceStage {
    /// Create a stage with no planets.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `data` does not validate.
    pub fn new(data: GameData) -> Result<Self> {
        let mut stage = Self {
            core: StageCore::new(data)?,
            planets: EntityGroup::new(),
            structures: EntityGroup::new(),
            fleets: EntityGroup::new(),
        };
        stage.refresh();
        Ok(stage)
    }

    /// Shared stage state.
    #[must_use]
    pub fn core(&self) -> &StageCore {
        &self.core
    }

    /// All colonized planets.
    #[must_use]
    pub fn planets(&self) -> &EntityGroup<Planet> {
        &self.planets
    }

    /// Look up one planet.
    #[must_use]
    pub fn planet(&self, id: EntityId) -> Option<&Planet> {
        self.planets.get(id)
    }

    /// All space structures.
    #[must_use]
    pub fn structures(&self) -> &EntityGroup<Structure> {
        &self.structures
    }

    /// Look up one space structure.
    #[must_use]
    pub fn structure(&self, id: EntityId) -> Option<&Structure> {
        self.structures.get(id)
    }

    /// Look up one fleet.
    #[must_use]
    pub fn fleet(&self, id: EntityId) -> Option<&Fleet> {
        self.fleets.get(id)
    }

    /// Colonize a planet, optionally with resource extraction.
    pub fn colonize(
        &mut self,
        name: &str,
        position: Vec2,
        extraction: Option<Producer>,
    ) -> EntityId {
        let mut planet =
            Planet::colonize(self.core.allocate_id(), name, position, &self.core.data.planet);
        if let Some(extraction) = extraction {
            planet = planet.with_extraction(extraction);
        }
        tracing::info!(planet = planet.id, name, "Planet colonized");

        let id = self.planets.register(planet);
        self.refresh();
        id
    }

    /// Place a space structure site for a fleet to build.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownDefinition`] for an unknown structure type.
    pub fn place_structure(&mut self, kind: &str, position: Vec2) -> Result<EntityId> {
        let data = self
            .core
            .data
            .structure(kind)
            .ok_or_else(|| SimError::UnknownDefinition(format!("structure '{kind}'")))?;
        let structure = Structure::placed(self.core.ids.allocate(), data, position);

        Ok(self.structures.register(structure))
    }

    /// Pay for a space structure from the stage container and start its
    /// completion timer.
    ///
    /// Returns `false` (and takes nothing) if the container cannot cover the
    /// whole missing bundle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] for an unknown structure.
    pub fn supply_structure(&mut self, id: EntityId) -> Result<bool> {
        let structure = self
            .structures
            .get_mut(id)
            .ok_or(SimError::EntityNotFound(id))?;

        if !structure.deposit_bulk_resources(&mut self.core.resources) {
            return Ok(false);
        }
        if structure.start_timed_completion()? {
            self.on_structure_completed(id);
        }
        Ok(true)
    }

    /// Spawn a fleet.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownDefinition`] for an unknown unit type.
    pub fn spawn_fleet(&mut self, kind: &str, position: Vec2) -> Result<EntityId> {
        let data = self
            .core
            .data
            .unit(kind)
            .ok_or_else(|| SimError::UnknownDefinition(format!("unit '{kind}'")))?;
        let body = UnitBody::from_data(data, position);
        let fleet = StrategicUnit::new(self.core.ids.allocate(), kind, body);

        Ok(self.fleets.register(fleet))
    }

    /// Replace a fleet's orders.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] for an unknown fleet.
    pub fn perform_order(&mut self, fleet: EntityId, order: SpaceOrder) -> Result<()> {
        self.fleet_mut(fleet)?.perform_order(order);
        Ok(())
    }

    /// Append to a fleet's orders.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] for an unknown fleet.
    pub fn queue_order(&mut self, fleet: EntityId, order: SpaceOrder) -> Result<()> {
        self.fleet_mut(fleet)?.queue_order(order);
        Ok(())
    }

    /// Begin researching a technology.
    ///
    /// # Errors
    ///
    /// See [`crate::technology::TechWeb::start_research`].
    pub fn start_research(&mut self, tech: &TechnologyId) -> Result<()> {
        self.core.start_research(tech)
    }

    /// Carry resources over from another container.
    pub fn transfer_resources_from(&mut self, other: &mut ResourceContainer) -> f32 {
        self.core.transfer_resources_from(other)
    }

    /// Advance the stage by one frame.
    pub fn process(&mut self, delta: f32) -> Vec<StageEvent> {
        let mut events = self.core.begin_frame();

        self.core.run_batch(
            delta,
            economy_members_mut(&mut self.planets, &mut self.structures),
            &mut events,
        );

        let mut world = WorldView::new(&mut self.core.resources, Some(&mut self.structures));
        for fleet in self.fleets.iter_mut() {
            if fleet.process_order_queue(delta, &mut world) {
                events.push(StageEvent::OrderCompleted { unit: fleet.id });
            }
        }
        let built_by_fleets = world.completed;

        let mut completed = !built_by_fleets.is_empty();
        for id in built_by_fleets {
            if let Some(structure) = self.structures.get(id) {
                events.push(completion_event(structure));
            }
        }

        completed |= advance_structures(
            &mut self.structures,
            &mut self.core.resources,
            delta,
            false,
            &mut events,
        );
        if completed {
            self.refresh();
        }

        self.core.advance_research(delta, &mut events);
        events
    }

    /// Save the whole stage.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Serialization`] if encoding fails.
    pub fn save(&self) -> Result<Vec<u8>> {
        encode(self, "space")
    }

    /// Restore a stage saved with [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Serialization`] if the bytes are not a space
    /// stage.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        decode(bytes, "space")
    }

    fn fleet_mut(&mut self, id: EntityId) -> Result<&mut Fleet> {
        self.fleets.get_mut(id).ok_or(SimError::EntityNotFound(id))
    }

    /// A structure finished outside `process`: report it next frame and
    /// update capacity now.
    fn on_structure_completed(&mut self, id: EntityId) {
        if let Some(structure) = self.structures.get(id) {
            self.core.record_completion(structure);
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        let members = self
            .planets
            .iter()
            .map(|planet| planet as &dyn EconomyEntity)
            .chain(
                self.structures
                    .iter()
                    .map(|structure| structure as &dyn EconomyEntity),
            );
        self.core.refresh(members);
    }
}

/// Planets and finished space structures both feed the stage economy.
fn economy_members_mut<'a>(
    planets: &'a mut EntityGroup<Planet>,
    structures: &'a mut EntityGroup<Structure>,
) -> impl Iterator<Item = &'a mut dyn EconomyEntity> {
    planets
        .iter_mut()
        .map(|planet| planet as &mut dyn EconomyEntity)
        .chain(
            structures
                .iter_mut()
                .map(|structure| structure as &mut dyn EconomyEntity),
        )
}

impl ResourceFacade for SpaceStage {
    fn resources(&self) -> &ResourceContainer {
        &self.core.resources
    }

    fn resources_mut(&mut self) -> &mut ResourceContainer {
        &mut self.core.resources
    }
}

impl OrderWorld for SpaceStage {
    fn build_target(&mut self, id: EntityId) -> Option<(&mut Structure, &mut ResourceContainer)> {
        let structure = self.structures.get_mut(id)?;
        Some((structure, &mut self.core.resources))
    }

    fn structure_completed(&mut self, id: EntityId) {
        self.on_structure_completed(id);
    }
}
