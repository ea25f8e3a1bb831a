//! Test fixtures and helpers.
//!
//! Pre-built game data and stages for consistent testing. The game data is
//! the sample file shipped in `assets/data`, so tests also keep that file
//! valid.

use strategy_core::data::GameData;
use strategy_core::math::Vec2;
use strategy_core::resources::WorldResource;
use strategy_core::stages::{IndustrialStage, SocietyStage, SpaceStage};

/// Food: produced by population, eaten by it, spent on growth.
pub const FOOD: WorldResource = WorldResource(1);
/// Rock.
pub const ROCK: WorldResource = WorldResource(2);
/// Wood.
pub const WOOD: WorldResource = WorldResource(3);
/// Metal.
pub const METAL: WorldResource = WorldResource(4);

/// The sample game data as RON text.
pub const SAMPLE_GAME_DATA: &str = include_str!("../../../assets/data/game_data.ron");

/// Parse the sample game data.
///
/// # Panics
///
/// Panics if the sample file does not parse or validate.
#[must_use]
pub fn game_data() -> GameData {
    match GameData::from_ron_str(SAMPLE_GAME_DATA) {
        Ok(data) => data,
        Err(err) => panic!("sample game data is invalid: {err}"),
    }
}

/// A society stage with a granary and two huts already standing.
///
/// # Panics
///
/// Panics if the sample game data changed incompatibly.
#[must_use]
pub fn society_stage() -> SocietyStage {
    let mut stage = SocietyStage::new(game_data()).expect("society stage");
    stage
        .place_prebuilt("granary", Vec2::ZERO)
        .expect("granary");
    stage
        .place_prebuilt("hut", Vec2::new(2.0, 0.0))
        .expect("hut");
    stage
        .place_prebuilt("hut", Vec2::new(-2.0, 0.0))
        .expect("hut");
    stage
}

/// An industrial stage with one city.
///
/// # Panics
///
/// Panics if the sample game data changed incompatibly.
#[must_use]
pub fn industrial_stage() -> IndustrialStage {
    let mut stage = IndustrialStage::new(game_data()).expect("industrial stage");
    stage.found_city("Ashford", Vec2::ZERO);
    stage
}

/// A space stage with one colonized planet and no extraction.
///
/// # Panics
///
/// Panics if the sample game data changed incompatibly.
#[must_use]
pub fn space_stage() -> SpaceStage {
    let mut stage = SpaceStage::new(game_data()).expect("space stage");
    stage.colonize("Terra", Vec2::ZERO, None);
    stage
}
