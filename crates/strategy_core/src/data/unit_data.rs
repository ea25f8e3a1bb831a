//! Unit data structures for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceBundle;

/// Data-driven definition of a strategic unit (ground unit or fleet).
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     id: "settler",
///     name: "unit.settler.name",
///     cost: {1: 20.0},
///     build_time: 5.0,
///     speed: 4.0,
///     turn_rate: 3.14,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitData {
    /// Unique string identifier for this unit type.
    pub id: String,

    /// Localization key for the display name.
    pub name: String,

    /// Cost paid when the unit is queued for building.
    #[serde(default)]
    pub cost: ResourceBundle,

    /// Seconds a city needs to build the unit.
    pub build_time: f32,

    /// Travel speed in map units per second.
    pub speed: f32,

    /// Turning speed in radians per second.
    pub turn_rate: f32,
}
