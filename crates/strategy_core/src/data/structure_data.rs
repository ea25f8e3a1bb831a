//! Structure data for data-driven structure definitions.

use serde::{Deserialize, Serialize};

use crate::components::{Producer, Storage};
use crate::resources::ResourceBundle;

/// Data-driven structure definition.
///
/// # Example RON
///
/// ```ron
/// StructureData(
///     id: "granary",
///     name: "structure.granary.name",
///     cost: {2: 40.0},
///     construction_time: 8.0,
///     storage: Some(Storage(capacity: 250.0)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureData {
    /// Unique string identifier for this structure type.
    pub id: String,

    /// Localization key for the display name.
    pub name: String,

    /// Resources that must be delivered before construction can finish.
    #[serde(default)]
    pub cost: ResourceBundle,

    /// Seconds of construction after delivery. Zero finishes instantly.
    #[serde(default)]
    pub construction_time: f32,

    /// Housing capacity, if the structure shelters people.
    #[serde(default)]
    pub housing: Option<u32>,

    /// Storage contribution, if any.
    #[serde(default)]
    pub storage: Option<Storage>,

    /// Fixed-rate production, if any.
    #[serde(default)]
    pub production: Option<Producer>,

    /// Research points per second, if the structure researches.
    #[serde(default)]
    pub research: Option<f32>,
}

impl StructureData {
    /// Whether construction runs on a timer after delivery.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.construction_time > 0.0
    }
}
