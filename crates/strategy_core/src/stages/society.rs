//! Society stage: a settlement of placed structures.

use serde::{Deserialize, Serialize};

use super::{advance_structures, decode, encode, StageCore, StageEvent};
use crate::components::{EntityGroup, EntityId};
use crate::data::GameData;
use crate::error::{Result, SimError};
use crate::facade::{OrderWorld, ResourceFacade};
use crate::math::Vec2;
use crate::resources::ResourceContainer;
use crate::structures::Structure;
use crate::technology::TechnologyId;

/// Society stage orchestrator.
///
/// Structures are placed as construction sites. Each frame every waiting
/// site tries to take its whole cost from the stage container; once paid
/// it builds on a timer (or finishes at once if it has no construction
/// time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocietyStage {
    core: StageCore,
    structures: EntityGroup<Structure>,
}

impl SocietyStage {
    /// Create a stage with no structures.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `data` does not validate.
    pub fn new(data: GameData) -> Result<Self> {
        let mut stage = Self {
            core: StageCore::new(data)?,
            structures: EntityGroup::new(),
        };
        stage.refresh();
        Ok(stage)
    }

    /// Shared stage state.
    #[must_use]
    pub fn core(&self) -> &StageCore {
        &self.core
    }

    /// All structures in placement order.
    #[must_use]
    pub fn structures(&self) -> &EntityGroup<Structure> {
        &self.structures
    }

    /// Look up one structure.
    #[must_use]
    pub fn structure(&self, id: EntityId) -> Option<&Structure> {
        self.structures.get(id)
    }

    /// Add a finished structure without paying for it (starting layout).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownDefinition`] for an unknown structure type.
    pub fn place_prebuilt(&mut self, kind: &str, position: Vec2) -> Result<EntityId> {
        let data = self.core.data.structure(kind).ok_or_else(|| unknown_structure(kind))?;
        let structure = Structure::prebuilt(self.core.ids.allocate(), data, position);

        let id = self.structures.register(structure);
        self.refresh();
        Ok(id)
    }

    /// Place a construction site that still needs its full cost.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownDefinition`] for an unknown structure type.
    pub fn place_structure(&mut self, kind: &str, position: Vec2) -> Result<EntityId> {
        let data = self.core.data.structure(kind).ok_or_else(|| unknown_structure(kind))?;
        let structure = Structure::placed(self.core.ids.allocate(), data, position);

        tracing::debug!(structure = structure.id, kind, "Construction site placed");
        Ok(self.structures.register(structure))
    }

    /// Remove a structure. Resources already paid are lost.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] if no such structure exists.
    pub fn demolish(&mut self, id: EntityId) -> Result<Structure> {
        let structure = self
            .structures
            .remove(id)
            .ok_or(SimError::EntityNotFound(id))?;

        if structure.is_completed() {
            self.refresh();
        }
        Ok(structure)
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

        self.core
            .run_batch(delta, self.structures.iter_mut(), &mut events);

        let completed = advance_structures(
            &mut self.structures,
            &mut self.core.resources,
            delta,
            true,
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
        encode(self, "society")
    }

    /// Restore a stage saved with [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Serialization`] if the bytes are not a society
    /// stage.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        decode(bytes, "society")
    }

    fn refresh(&mut self) {
        self.core.refresh(self.structures.iter());
    }

    /// A structure finished outside `process`: report it next frame and
    /// update capacity now.
    fn on_structure_completed(&mut self, id: EntityId) {
        if let Some(structure) = self.structures.get(id) {
            self.core.record_completion(structure);
        }
        self.refresh();
    }
}

fn unknown_structure(kind: &str) -> SimError {
    SimError::UnknownDefinition(format!("structure '{kind}'"))
}

impl ResourceFacade for SocietyStage {
    fn resources(&self) -> &ResourceContainer {
        &self.core.resources
    }

    fn resources_mut(&mut self) -> &mut ResourceContainer {
        &mut self.core.resources
    }
}

impl OrderWorld for SocietyStage {
    fn build_target(&mut self, id: EntityId) -> Option<(&mut Structure, &mut ResourceContainer)> {
        let structure = self.structures.get_mut(id)?;
        Some((structure, &mut self.core.resources))
    }

    fn structure_completed(&mut self, id: EntityId) {
        self.on_structure_completed(id);
    }
}
