//! Stage orchestration with the sample game data.

use strategy_core::build_queue::BuildItemKind;
use strategy_core::components::{EntityId, Storage};
use strategy_core::data::StructureData;
use strategy_core::error::SimError;
use strategy_core::facade::ResourceFacade;
use strategy_core::math::Vec2;
use strategy_core::orders::{
    BuildOrder, IndustrialOrder, MovementOrder, QueuedOrder, SpaceOrder, UnitBody,
};
use strategy_core::resources::{ResourceBundle, ResourceContainer};
use strategy_core::stages::{SocietyStage, SpaceStage, StageEvent};
use strategy_core::technology::TechnologyId;
use strategy_test_utils::fixtures::{
    game_data, industrial_stage, society_stage, space_stage, FOOD, METAL, ROCK, WOOD,
};
use strategy_test_utils::round_trip::{save_and_restore, verify_resume};

fn economy_batches(events: &[StageEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, StageEvent::EconomyProcessed(_)))
        .count()
}

#[test]
fn test_sample_data_is_valid() {
    let data = game_data();
    assert!(data.validate().is_empty());
    assert!(data.structure("granary").is_some());
    assert!(data.unit("constructor").is_some());
}

#[test]
fn test_setup_seeds_capacity_from_structures() {
    let stage = society_stage();
    assert_eq!(stage.resources().capacity(), 300.0);
    assert_eq!(stage.core().stats().housing_capacity, 10);
    assert_eq!(stage.core().processor().batches(), 0);
}

#[test]
fn test_batch_runs_only_after_interval() {
    let mut stage = society_stage();

    assert_eq!(economy_batches(&stage.process(0.5)), 0);
    assert_eq!(economy_batches(&stage.process(0.5)), 1);
    assert_eq!(economy_batches(&stage.process(0.5)), 0);
    assert_eq!(stage.core().processor().batches(), 1);
}

#[test]
fn test_batch_grows_one_resident_per_house() {
    let mut stage = society_stage();
    stage.resources_mut().add(FOOD, 50.0);

    stage.process(1.0);

    assert_eq!(stage.core().stats().total_population, 2);
    assert!((stage.resources().available(FOOD) - 40.0).abs() < 1e-4);
}

#[test]
fn test_growth_stops_without_full_cost() {
    let mut stage = society_stage();
    stage.resources_mut().add(FOOD, 4.0);

    stage.process(1.0);

    assert_eq!(stage.core().stats().total_population, 0);
    assert_eq!(stage.resources().available(FOOD), 4.0);
}

#[test]
fn test_construction_site_completes_and_raises_housing() {
    let mut stage = society_stage();
    let hut = stage.place_structure("hut", Vec2::new(0.0, 4.0)).unwrap();
    stage.resources_mut().add(WOOD, 15.0);

    let mut completed_at = None;
    for frame in 1..=10 {
        let events = stage.process(1.0);
        if events.contains(&StageEvent::StructureCompleted {
            structure: hut,
            kind: "hut".to_string(),
        }) {
            completed_at = Some(frame);
        }
    }

    assert!(completed_at.is_some());
    assert_eq!(stage.resources().available(WOOD), 0.0);
    assert_eq!(stage.core().stats().housing_capacity, 15);
}

#[test]
fn test_city_structure_extends_capacity() {
    let mut stage = industrial_stage();
    let city = stage.cities().iter().next().unwrap().id;
    stage.resources_mut().add(ROCK, 40.0);
    stage.resources_mut().add(METAL, 10.0);
    stage
        .queue_build(city, BuildItemKind::Structure("warehouse".to_string()))
        .unwrap();

    let mut built = false;
    for _ in 0..13 {
        built |= stage.process(1.0).contains(&StageEvent::CityStructureBuilt {
            city,
            kind: "warehouse".to_string(),
        });
    }

    assert!(built);
    assert_eq!(stage.resources().capacity(), 900.0);
    assert_eq!(stage.city(city).unwrap().buildings, vec!["warehouse".to_string()]);
}

#[test]
fn test_queue_build_rejections() {
    let mut stage = industrial_stage();
    let city = stage.cities().iter().next().unwrap().id;

    assert!(matches!(
        stage.queue_build(city, BuildItemKind::Unit("settler".to_string())),
        Err(SimError::InsufficientResources(_))
    ));
    assert!(matches!(
        stage.queue_build(city, BuildItemKind::Unit("mech".to_string())),
        Err(SimError::UnknownDefinition(_))
    ));
    assert!(matches!(
        stage.queue_build(city, BuildItemKind::Structure("granary".to_string())),
        Err(SimError::InvalidState(_))
    ));
    assert!(matches!(
        stage.queue_build(999, BuildItemKind::Unit("settler".to_string())),
        Err(SimError::EntityNotFound(999))
    ));
}

#[test]
fn test_research_requires_prerequisites() {
    let mut stage = society_stage();
    assert!(matches!(
        stage.start_research(&TechnologyId::new("masonry")),
        Err(SimError::ResearchUnavailable { .. })
    ));
    assert!(stage.start_research(&TechnologyId::new("pottery")).is_ok());
}

#[test]
fn test_carry_over_between_stages() {
    let mut society = society_stage();
    society.resources_mut().add(FOOD, 250.0);
    society.resources_mut().add(ROCK, 100.0);

    let mut industrial = industrial_stage();
    let mut leftovers: ResourceContainer = society.resources().clone();
    let moved = industrial.transfer_resources_from(&mut leftovers);

    assert_eq!(moved, 350.0);
    assert_eq!(industrial.resources().available(FOOD), 250.0);
    assert!(leftovers.is_empty());
}

fn completions(events: &[StageEvent], id: EntityId) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(e, StageEvent::StructureCompleted { structure, .. } if *structure == id)
        })
        .count()
}

#[test]
fn test_instant_space_structure_reports_completion() {
    let mut data = game_data();
    data.structures.push(StructureData {
        id: "beacon".into(),
        name: "structure.beacon".into(),
        cost: ResourceBundle::from([(METAL, 50.0)]),
        construction_time: 0.0,
        housing: None,
        storage: Some(Storage { capacity: 1000.0 }),
        production: None,
        research: None,
    });
    let mut stage = SpaceStage::new(data).unwrap();
    stage.colonize("Terra", Vec2::ZERO, None);
    let beacon = stage.place_structure("beacon", Vec2::new(5.0, 0.0)).unwrap();
    stage.resources_mut().add(METAL, 50.0);

    assert!(stage.supply_structure(beacon).unwrap());
    assert!(stage.structure(beacon).unwrap().is_completed());
    assert_eq!(stage.resources().capacity(), 6000.0);

    let mut events = Vec::new();
    for _ in 0..5 {
        events.extend(stage.process(0.1));
    }
    assert_eq!(completions(&events, beacon), 1);
    assert!(events.contains(&StageEvent::StructureCompleted {
        structure: beacon,
        kind: "beacon".into(),
    }));
    assert_eq!(stage.resources().capacity(), 6000.0);
}

#[test]
fn test_build_order_against_society_stage_reports_completion() {
    let mut stage = society_stage();
    let granary = stage.place_structure("granary", Vec2::ZERO).unwrap();
    stage.resources_mut().add(ROCK, 20.0);

    let mut body = UnitBody::new(Vec2::ZERO, 1.0, 1.0);
    let mut order = QueuedOrder::new(BuildOrder::new(granary));
    assert!(order.process_order(&mut body, &mut stage, 0.1));
    assert!(stage.structure(granary).unwrap().is_completed());
    assert_eq!(stage.resources().capacity(), 600.0);

    let mut events = stage.process(0.1);
    events.extend(stage.process(0.1));
    assert_eq!(completions(&events, granary), 1);
}

#[test]
fn test_garbage_save_is_rejected() {
    assert!(matches!(
        SocietyStage::load(b"not a save"),
        Err(SimError::Serialization(_))
    ));
}

#[test]
fn test_society_resumes_identically() {
    let mut stage = society_stage();
    stage.place_structure("hut", Vec2::new(0.0, 4.0)).unwrap();
    stage.place_structure("library", Vec2::new(4.0, 0.0)).unwrap();
    stage.resources_mut().add(FOOD, 60.0);
    stage.resources_mut().add(WOOD, 20.0);
    stage.resources_mut().add(ROCK, 30.0);
    stage.start_research(&TechnologyId::new("pottery")).unwrap();
    stage.process(0.7);

    assert_eq!(save_and_restore(&stage), stage);
    verify_resume(&stage, 0.25, 80).assert_lossless();
}

#[test]
fn test_industrial_resumes_identically() {
    let mut stage = industrial_stage();
    let city = stage.cities().iter().next().unwrap().id;
    stage.resources_mut().add(FOOD, 100.0);
    stage
        .queue_build(city, BuildItemKind::Unit("settler".to_string()))
        .unwrap();
    let truck = stage.spawn_unit("truck", Vec2::ZERO).unwrap();
    stage
        .queue_order(truck, IndustrialOrder::Move(MovementOrder::new(Vec2::new(10.0, 10.0))))
        .unwrap();
    stage
        .queue_order(truck, IndustrialOrder::Move(MovementOrder::new(Vec2::new(-5.0, 3.0))))
        .unwrap();
    stage.process(0.3);

    verify_resume(&stage, 0.1, 150).assert_lossless();
}

#[test]
fn test_space_resumes_identically() {
    let mut stage = space_stage();
    let depot = stage.place_structure("orbital_depot", Vec2::new(120.0, 40.0)).unwrap();
    let fleet = stage.spawn_fleet("constructor", Vec2::ZERO).unwrap();
    stage.resources_mut().add(METAL, 200.0);
    stage
        .queue_order(fleet, SpaceOrder::Move(MovementOrder::new(Vec2::new(120.0, 40.0))))
        .unwrap();
    stage
        .queue_order(fleet, SpaceOrder::Build(BuildOrder::new(depot)))
        .unwrap();
    stage.process(0.2);

    verify_resume(&stage, 0.2, 60).assert_lossless();
}
