//! Industrial stage: cities with build queues and ground units.

use serde::{Deserialize, Serialize};

use super::{decode, encode, StageCore, StageEvent, WorldView};
use crate::build_queue::BuildItemKind;
use crate::city::City;
use crate::components::{EntityGroup, EntityId};
use crate::data::GameData;
use crate::error::{Result, SimError};
use crate::facade::{OrderWorld, ResourceFacade};
use crate::math::Vec2;
use crate::orders::{IndustrialOrder, StrategicUnit, UnitBody};
use crate::resources::ResourceContainer;
use crate::structures::Structure;
use crate::technology::TechnologyId;

/// A ground unit of the industrial stage.
pub type IndustrialUnit = StrategicUnit<IndustrialOrder>;

/// Industrial stage orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustrialStage {
    core: StageCore,
    cities: EntityGroup<City>,
    units: EntityGroup<IndustrialUnit>,
}

impl IndustrialStage {
    /// Create a stage with no cities.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `data` does not validate.
    pub fn new(data: GameData) -> Result<Self> {
        let mut stage = Self {
            core: StageCore::new(data)?,
            cities: EntityGroup::new(),
            units: EntityGroup::new(),
        };
        stage.refresh();
        Ok(stage)
    }

    /// Shared stage state.
    #[must_use]
    pub fn core(&self) -> &StageCore {
        &self.core
    }

    /// All cities in founding order.
    #[must_use]
    pub fn cities(&self) -> &EntityGroup<City> {
        &self.cities
    }

    /// Look up one city.
    #[must_use]
    pub fn city(&self, id: EntityId) -> Option<&City> {
        self.cities.get(id)
    }

    /// All units.
    #[must_use]
    pub fn units(&self) -> &EntityGroup<IndustrialUnit> {
        &self.units
    }

    /// Look up one unit.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&IndustrialUnit> {
        self.units.get(id)
    }

    /// Found a new city. It takes part in the economy right away.
    pub fn found_city(&mut self, name: &str, position: Vec2) -> EntityId {
        let city = City::found(self.core.allocate_id(), name, position, &self.core.data.city);
        tracing::info!(city = city.id, name, "City founded");

        let id = self.cities.register(city);
        self.refresh();
        id
    }

    /// Spawn a unit directly, without building it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownDefinition`] for an unknown unit type.
    pub fn spawn_unit(&mut self, kind: &str, position: Vec2) -> Result<EntityId> {
        let data = self
            .core
            .data
            .unit(kind)
            .ok_or_else(|| SimError::UnknownDefinition(format!("unit '{kind}'")))?;
        let body = UnitBody::from_data(data, position);
        let unit = StrategicUnit::new(self.core.ids.allocate(), kind, body);

        Ok(self.units.register(unit))
    }

    /// Pay for and queue a unit or a city building.
    ///
    /// # Errors
    ///
    /// - [`SimError::EntityNotFound`] for an unknown city.
    /// - [`SimError::UnknownDefinition`] for an unknown type.
    /// - [`SimError::InvalidState`] for a structure without construction time.
    /// - [`SimError::QueueFull`] / [`SimError::InsufficientResources`] from
    ///   [`City::enqueue`].
    pub fn queue_build(&mut self, city: EntityId, kind: BuildItemKind) -> Result<()> {
        let data = &self.core.data;
        let (cost, build_time) = match &kind {
            BuildItemKind::Unit(id) => {
                let unit = data
                    .unit(id)
                    .ok_or_else(|| SimError::UnknownDefinition(format!("unit '{id}'")))?;
                (&unit.cost, unit.build_time)
            }
            BuildItemKind::Structure(id) => {
                let structure = data
                    .structure(id)
                    .ok_or_else(|| SimError::UnknownDefinition(format!("structure '{id}'")))?;
                if !structure.is_timed() {
                    return Err(SimError::InvalidState(format!(
                        "structure '{id}' has no construction time and cannot be queued"
                    )));
                }
                (&structure.cost, structure.construction_time)
            }
        };

        let city = self
            .cities
            .get_mut(city)
            .ok_or(SimError::EntityNotFound(city))?;
        city.enqueue(kind, build_time, cost, &mut self.core.resources)
    }

    /// Replace a unit's orders.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] for an unknown unit.
    pub fn perform_order(&mut self, unit: EntityId, order: IndustrialOrder) -> Result<()> {
        self.unit_mut(unit)?.perform_order(order);
        Ok(())
    }

    /// Append to a unit's orders.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] for an unknown unit.
    pub fn queue_order(&mut self, unit: EntityId, order: IndustrialOrder) -> Result<()> {
        self.unit_mut(unit)?.queue_order(order);
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

        self.core.run_batch(delta, self.cities.iter_mut(), &mut events);

        let mut world = WorldView::new(&mut self.core.resources, None);
        for unit in self.units.iter_mut() {
            if unit.process_order_queue(delta, &mut world) {
                events.push(StageEvent::OrderCompleted { unit: unit.id });
            }
        }

        if self.advance_build_queues(delta, &mut events) {
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
        encode(self, "industrial")
    }

    /// Restore a stage saved with [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Serialization`] if the bytes are not an
    /// industrial stage.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        decode(bytes, "industrial")
    }

    /// Returns `true` if a city gained a building.
    fn advance_build_queues(&mut self, delta: f32, events: &mut Vec<StageEvent>) -> bool {
        let mut cities_changed = false;

        for city in self.cities.iter_mut() {
            let Some(finished) = city.build_queue.advance(delta) else {
                continue;
            };

            match finished {
                BuildItemKind::Unit(kind) => {
                    let Some(data) = self.core.data.unit(&kind) else {
                        tracing::warn!(city = city.id, %kind, "Built unit type no longer defined");
                        continue;
                    };
                    let body = UnitBody::from_data(data, city.position);
                    let unit = self
                        .units
                        .register(StrategicUnit::new(self.core.ids.allocate(), kind.clone(), body));

                    tracing::info!(city = city.id, unit, %kind, "Unit built");
                    events.push(StageEvent::UnitSpawned {
                        unit,
                        kind,
                        city: city.id,
                    });
                }
                BuildItemKind::Structure(kind) => {
                    let Some(data) = self.core.data.structure(&kind) else {
                        tracing::warn!(
                            city = city.id,
                            %kind,
                            "Built structure type no longer defined"
                        );
                        continue;
                    };
                    city.add_building(data);
                    cities_changed = true;
                    events.push(StageEvent::CityStructureBuilt {
                        city: city.id,
                        kind,
                    });
                }
            }
        }

        cities_changed
    }

    fn unit_mut(&mut self, id: EntityId) -> Result<&mut IndustrialUnit> {
        self.units.get_mut(id).ok_or(SimError::EntityNotFound(id))
    }

    fn refresh(&mut self) {
        self.core.refresh(self.cities.iter());
    }
}

impl ResourceFacade for IndustrialStage {
    fn resources(&self) -> &ResourceContainer {
        &self.core.resources
    }

    fn resources_mut(&mut self) -> &mut ResourceContainer {
        &mut self.core.resources
    }
}

impl OrderWorld for IndustrialStage {
    /// The industrial stage has no placed structures to build.
    fn build_target(&mut self, _id: EntityId) -> Option<(&mut Structure, &mut ResourceContainer)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Storage;
    use crate::data::{ResourceDefinition, StructureData, UnitData};
    use crate::orders::MovementOrder;
    use crate::resources::{ResourceBundle, WorldResource};

    const FOOD: WorldResource = WorldResource(1);

    fn data() -> GameData {
        GameData {
            resources: vec![ResourceDefinition {
                id: FOOD,
                name: "resource.food".to_string(),
            }],
            units: vec![UnitData {
                id: "truck".to_string(),
                name: "unit.truck".to_string(),
                cost: ResourceBundle::from([(FOOD, 10.0)]),
                build_time: 2.0,
                speed: 5.0,
                turn_rate: 4.0,
            }],
            structures: vec![StructureData {
                id: "warehouse".to_string(),
                name: "structure.warehouse".to_string(),
                cost: ResourceBundle::from([(FOOD, 5.0)]),
                construction_time: 1.0,
                housing: None,
                storage: Some(Storage { capacity: 250.0 }),
                production: None,
                research: None,
            }],
            ..GameData::default()
        }
    }

    #[test]
    fn test_founding_seeds_capacity() {
        let mut stage = IndustrialStage::new(data()).unwrap();
        stage.found_city("Ashford", Vec2::ZERO);

        assert_eq!(stage.resources().capacity(), 500.0);
        assert_eq!(stage.core().stats().total_population, 2);
    }

    #[test]
    fn test_queued_unit_spawns_at_city() {
        let mut stage = IndustrialStage::new(data()).unwrap();
        let city = stage.found_city("Ashford", Vec2::new(4.0, 4.0));
        stage.resources_mut().add(FOOD, 30.0);

        stage
            .queue_build(city, BuildItemKind::Unit("truck".to_string()))
            .unwrap();
        assert_eq!(stage.resources().available(FOOD), 20.0);

        stage.process(1.0);
        let events = stage.process(1.0);

        let spawned = events.iter().find_map(|e| match e {
            StageEvent::UnitSpawned { unit, .. } => Some(*unit),
            _ => None,
        });
        let unit = stage.unit(spawned.unwrap()).unwrap();
        assert_eq!(unit.body.position, Vec2::new(4.0, 4.0));
        assert!(stage.city(city).unwrap().build_queue.is_empty());
    }

    #[test]
    fn test_city_building_raises_capacity() {
        let mut stage = IndustrialStage::new(data()).unwrap();
        let city = stage.found_city("Ashford", Vec2::ZERO);
        stage.resources_mut().add(FOOD, 5.0);

        stage
            .queue_build(city, BuildItemKind::Structure("warehouse".to_string()))
            .unwrap();
        let events = stage.process(1.0);

        assert!(events.contains(&StageEvent::CityStructureBuilt {
            city,
            kind: "warehouse".to_string(),
        }));
        assert_eq!(stage.resources().capacity(), 750.0);
    }

    #[test]
    fn test_queue_build_errors() {
        let mut stage = IndustrialStage::new(data()).unwrap();
        let city = stage.found_city("Ashford", Vec2::ZERO);

        assert!(matches!(
            stage.queue_build(city, BuildItemKind::Unit("truck".to_string())),
            Err(SimError::InsufficientResources(_))
        ));
        assert!(matches!(
            stage.queue_build(99, BuildItemKind::Unit("truck".to_string())),
            Err(SimError::EntityNotFound(99))
        ));
        assert!(matches!(
            stage.queue_build(city, BuildItemKind::Unit("tank".to_string())),
            Err(SimError::UnknownDefinition(_))
        ));
    }

    #[test]
    fn test_units_follow_orders() {
        let mut stage = IndustrialStage::new(data()).unwrap();
        let truck = stage.spawn_unit("truck", Vec2::ZERO).unwrap();
        stage
            .perform_order(truck, IndustrialOrder::Move(MovementOrder::new(Vec2::new(8.0, 0.0))))
            .unwrap();

        stage.process(1.0);
        let events = stage.process(1.0);

        assert!(events.contains(&StageEvent::OrderCompleted { unit: truck }));
        assert_eq!(stage.unit(truck).unwrap().body.position, Vec2::new(8.0, 0.0));
        let stray = IndustrialOrder::Move(MovementOrder::new(Vec2::ZERO));
        assert!(matches!(
            stage.perform_order(42, stray),
            Err(SimError::EntityNotFound(42))
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut stage = IndustrialStage::new(data()).unwrap();
        let city = stage.found_city("Ashford", Vec2::ZERO);
        stage.resources_mut().add(FOOD, 50.0);
        stage
            .queue_build(city, BuildItemKind::Unit("truck".to_string()))
            .unwrap();
        let truck = stage.spawn_unit("truck", Vec2::ZERO).unwrap();
        stage
            .queue_order(truck, IndustrialOrder::Move(MovementOrder::new(Vec2::new(0.0, 9.0))))
            .unwrap();
        stage.process(0.7);

        let restored = IndustrialStage::load(&stage.save().unwrap()).unwrap();
        assert_eq!(restored, stage);
    }
}
