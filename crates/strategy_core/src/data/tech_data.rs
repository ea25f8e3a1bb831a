//! Tech web data structures for data-driven technology definitions.

use serde::{Deserialize, Serialize};

use crate::technology::TechnologyId;

/// Data-driven technology definition.
///
/// # Example RON
///
/// ```ron
/// TechData(
///     id: "steam_power",
///     name: "tech.steam_power.name",
///     research_points: 120.0,
///     prerequisites: ["metallurgy"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechData {
    /// Unique technology identifier.
    pub id: TechnologyId,

    /// Localization key for the technology's display name.
    pub name: String,

    /// Research points needed to unlock.
    pub research_points: f32,

    /// Technology IDs that must be unlocked first.
    #[serde(default)]
    pub prerequisites: Vec<TechnologyId>,
}
