//! Top-level game data: everything a stage needs from configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{EconomyConfig, SettlementData, StructureData, TechData, UnitData};
use crate::error::{Result, SimError};
use crate::resources::{ResourceBundle, WorldResource};
use crate::technology::TechnologyId;

/// Definition of one resource category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource identifier used everywhere else in the data.
    pub id: WorldResource,
    /// Localization key for the display name.
    pub name: String,
}

/// Complete game data for the strategic stages.
///
/// Loaded once from RON; stages clone what they need at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    /// Economy formula constants.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// All resource categories.
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,

    /// All structure types.
    #[serde(default)]
    pub structures: Vec<StructureData>,

    /// All unit types.
    #[serde(default)]
    pub units: Vec<UnitData>,

    /// The technology web.
    #[serde(default)]
    pub technologies: Vec<TechData>,

    /// Founding values for industrial-stage cities.
    #[serde(default = "SettlementData::city")]
    pub city: SettlementData,

    /// Founding values for colonized planets.
    #[serde(default = "SettlementData::planet")]
    pub planet: SettlementData,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            economy: EconomyConfig::default(),
            resources: Vec::new(),
            structures: Vec::new(),
            units: Vec::new(),
            technologies: Vec::new(),
            city: SettlementData::city(),
            planet: SettlementData::planet(),
        }
    }
}

impl GameData {
    /// Parse game data from a RON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataParse`] on malformed RON and
    /// [`SimError::InvalidConfig`] if validation fails.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let data: Self = ron::from_str(source).map_err(|e| SimError::DataParse {
            message: e.to_string(),
        })?;
        data.validated()
    }

    /// Consume the data, returning it only if it validates.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SimError::InvalidConfig(errors.join("; ")))
        }
    }

    /// Find a resource definition.
    #[must_use]
    pub fn resource(&self, id: WorldResource) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Find a structure type by its ID.
    #[must_use]
    pub fn structure(&self, id: &str) -> Option<&StructureData> {
        self.structures.iter().find(|s| s.id == id)
    }

    /// Find a unit type by its ID.
    #[must_use]
    pub fn unit(&self, id: &str) -> Option<&UnitData> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Find a technology by its ID.
    #[must_use]
    pub fn technology(&self, id: &TechnologyId) -> Option<&TechData> {
        self.technologies.iter().find(|t| &t.id == id)
    }

    /// Validate internal consistency.
    ///
    /// Checks for:
    /// - Economy constants and settlement values in range
    /// - Duplicate ids
    /// - Costs and rates that are negative or reference unknown resources
    /// - Unit build times and tech research points that are not positive
    /// - Unknown tech prerequisites
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.economy.validate();
        errors.extend(self.city.validate("City"));
        errors.extend(self.planet.validate("Planet"));

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.id) {
                errors.push(format!("Duplicate resource id {}", resource.id));
            }
        }

        for (label, resource) in [
            ("food_resource", self.economy.food_resource),
            ("growth_resource", self.economy.growth_resource),
        ] {
            if self.resource(resource).is_none() {
                errors.push(format!("Economy {label} references unknown {resource}"));
            }
        }

        let mut seen = HashSet::new();
        for structure in &self.structures {
            if !seen.insert(structure.id.as_str()) {
                errors.push(format!("Duplicate structure id '{}'", structure.id));
            }
            self.check_cost(&format!("Structure '{}'", structure.id), &structure.cost, &mut errors);

            if !(structure.construction_time >= 0.0) {
                errors.push(format!(
                    "Structure '{}' has negative construction time",
                    structure.id
                ));
            }
            if let Some(storage) = structure.storage {
                if !(storage.capacity >= 0.0) {
                    errors.push(format!("Structure '{}' has negative storage", structure.id));
                }
            }
            if let Some(production) = structure.production {
                if !(production.rate >= 0.0) {
                    errors.push(format!(
                        "Structure '{}' has negative production rate",
                        structure.id
                    ));
                }
                if self.resource(production.resource).is_none() {
                    errors.push(format!(
                        "Structure '{}' produces unknown {}",
                        structure.id, production.resource
                    ));
                }
            }
            if let Some(research) = structure.research {
                if !(research >= 0.0) {
                    errors.push(format!(
                        "Structure '{}' has negative research output",
                        structure.id
                    ));
                }
            }
        }

        let mut seen = HashSet::new();
        for unit in &self.units {
            if !seen.insert(unit.id.as_str()) {
                errors.push(format!("Duplicate unit id '{}'", unit.id));
            }
            self.check_cost(&format!("Unit '{}'", unit.id), &unit.cost, &mut errors);

            if !(unit.build_time > 0.0) {
                errors.push(format!("Unit '{}' build_time must be positive", unit.id));
            }
            if !(unit.speed > 0.0) || !(unit.turn_rate > 0.0) {
                errors.push(format!(
                    "Unit '{}' speed and turn_rate must be positive",
                    unit.id
                ));
            }
        }

        let mut seen = HashSet::new();
        for tech in &self.technologies {
            if !seen.insert(&tech.id) {
                errors.push(format!("Duplicate technology id '{}'", tech.id));
            }
            if !(tech.research_points > 0.0) {
                errors.push(format!(
                    "Tech '{}' research_points must be positive",
                    tech.id
                ));
            }
            for prereq in &tech.prerequisites {
                if self.technology(prereq).is_none() {
                    errors.push(format!(
                        "Tech '{}' has unknown prerequisite '{}'",
                        tech.id, prereq
                    ));
                }
            }
        }

        errors
    }

    fn check_cost(&self, owner: &str, cost: &ResourceBundle, errors: &mut Vec<String>) {
        for (resource, amount) in cost {
            if self.resource(*resource).is_none() {
                errors.push(format!("{owner} costs unknown {resource}"));
            }
            if !(*amount >= 0.0) {
                errors.push(format!("{owner} has negative cost for {resource}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Storage;
    use crate::data::ResourceDefinition;

    const SAMPLE: &str = r#"
GameData(
    economy: EconomyConfig(
        batch_interval: 2.0,
        food_resource: 1,
        production_scale: 3.0,
        consumption_per_capita: 0.2,
        growth_resource: 1,
        growth_cost: 4.0,
    ),
    resources: [
        ResourceDefinition(id: 1, name: "resource.food"),
        ResourceDefinition(id: 2, name: "resource.rock"),
    ],
    structures: [
        StructureData(
            id: "granary",
            name: "structure.granary",
            cost: {2: 40.0},
            construction_time: 8.0,
            storage: Some(Storage(capacity: 250.0)),
        ),
    ],
    units: [
        UnitData(
            id: "settler",
            name: "unit.settler",
            cost: {1: 20.0},
            build_time: 5.0,
            speed: 4.0,
            turn_rate: 3.0,
        ),
    ],
    technologies: [
        TechData(id: "pottery", name: "tech.pottery", research_points: 50.0),
        TechData(
            id: "masonry",
            name: "tech.masonry",
            research_points: 80.0,
            prerequisites: ["pottery"],
        ),
    ],
)
"#;

    fn sample() -> GameData {
        GameData::from_ron_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let data = sample();
        assert_eq!(data.economy.batch_interval, 2.0);
        assert_eq!(data.resources.len(), 2);

        let granary = data.structure("granary").unwrap();
        assert_eq!(granary.storage, Some(Storage { capacity: 250.0 }));
        assert!(granary.is_timed());
        assert_eq!(granary.cost.get(&WorldResource(2)), Some(&40.0));

        assert!(data.unit("settler").is_some());
        assert!(data.technology(&TechnologyId::new("masonry")).is_some());
        assert!(data.unit("unknown").is_none());
    }

    #[test]
    fn test_validate_unknown_prerequisite() {
        let mut data = sample();
        data.technologies[0]
            .prerequisites
            .push(TechnologyId::new("alchemy"));

        let errors = data.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown prerequisite"));
    }

    #[test]
    fn test_validate_rejects_zero_build_time() {
        let mut data = sample();
        data.units[0].build_time = 0.0;

        assert!(matches!(data.validated(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_unknown_cost_resource() {
        let mut data = sample();
        data.resources.retain(|r| r.id != WorldResource(2));
        data.resources.push(ResourceDefinition {
            id: WorldResource(3),
            name: "resource.wood".to_string(),
        });

        let errors = data.validate();
        assert!(errors.iter().any(|e| e.contains("costs unknown")));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let result = GameData::from_ron_str("GameData(economy: ");
        assert!(matches!(result, Err(SimError::DataParse { .. })));
    }
}
