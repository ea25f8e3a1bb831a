//! Data structures for game configuration.
//!
//! This module contains pure data structures that define resources,
//! structures, units, technologies, settlements and economy constants. All
//! structs are designed to be deserialized from RON.
//!
//! **Note:** This module contains no file IO - callers hand in the RON text.

mod economy_data;
mod game_data;
mod settlement_data;
mod structure_data;
mod tech_data;
mod unit_data;

pub use economy_data::EconomyConfig;
pub use game_data::{GameData, ResourceDefinition};
pub use settlement_data::SettlementData;
pub use structure_data::StructureData;
pub use tech_data::TechData;
pub use unit_data::UnitData;
