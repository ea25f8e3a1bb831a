//! Headless stage runs.
//!
//! Builds a stage from game data with a minimal starting layout, runs it for
//! a fixed number of frames and reports what happened.

use std::collections::BTreeMap;

use serde::Serialize;
use strategy_core::data::GameData;
use strategy_core::error::{Result, SimError};
use strategy_core::facade::ResourceFacade;
use strategy_core::math::Vec2;
use strategy_core::processor::AggregateStats;
use strategy_core::stages::{IndustrialStage, SocietyStage, SpaceStage, StageCore, StageEvent};
use strategy_core::technology::TechnologyId;

/// Which stage to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Placed structures around a settlement.
    Society,
    /// One city with a build queue.
    Industrial,
    /// One colonized planet.
    Space,
}

/// Parameters of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Stage to build.
    pub stage: StageKind,
    /// Frames to run.
    pub frames: u32,
    /// Seconds per frame.
    pub delta: f32,
    /// Structures standing at the start (society stage only).
    pub prebuilt: Vec<String>,
    /// Amount of every defined resource put into the container at the start.
    pub stock: f32,
    /// Technology to research from the first frame.
    pub research: Option<String>,
}

impl SimulationConfig {
    /// A run of `frames` frames of `delta` seconds with an empty start.
    #[must_use]
    pub fn new(stage: StageKind, frames: u32, delta: f32) -> Self {
        Self {
            stage,
            frames,
            delta,
            prebuilt: Vec::new(),
            stock: 0.0,
            research: None,
        }
    }
}

/// Number of events of each kind seen during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    /// Economy batches.
    pub economy_batches: usize,
    /// Unit orders completed.
    pub orders_completed: usize,
    /// Units built by cities.
    pub units_spawned: usize,
    /// Structures finished, placed or inside cities.
    pub structures_built: usize,
    /// Technologies unlocked.
    pub technologies_unlocked: usize,
}

impl EventCounts {
    fn record(&mut self, event: &StageEvent) {
        match event {
            StageEvent::EconomyProcessed(_) => self.economy_batches += 1,
            StageEvent::OrderCompleted { .. } => self.orders_completed += 1,
            StageEvent::UnitSpawned { .. } => self.units_spawned += 1,
            StageEvent::CityStructureBuilt { .. } | StageEvent::StructureCompleted { .. } => {
                self.structures_built += 1;
            }
            StageEvent::TechnologyUnlocked(_) => self.technologies_unlocked += 1,
        }
    }
}

/// End state of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Stage that ran.
    pub stage: StageKind,
    /// Frames run.
    pub frames: u32,
    /// Total simulated time.
    pub simulated_seconds: f32,
    /// Aggregates cached by the last batch.
    pub stats: AggregateStats,
    /// Container capacity at the end.
    pub capacity: f32,
    /// Stored amounts by resource name.
    pub resources: BTreeMap<String, f32>,
    /// Technologies unlocked by the end.
    pub unlocked: Vec<String>,
    /// Events seen along the way.
    pub events: EventCounts,
}

/// Common surface of the three stages for a headless run.
trait HeadlessStage: ResourceFacade {
    fn core(&self) -> &StageCore;
    fn start_research(&mut self, tech: &TechnologyId) -> Result<()>;
    fn process(&mut self, delta: f32) -> Vec<StageEvent>;
}

macro_rules! impl_headless_stage {
    ($($stage:ty),* $(,)?) => {
        $(
            impl HeadlessStage for $stage {
                fn core(&self) -> &StageCore {
                    <$stage>::core(self)
                }

                fn start_research(&mut self, tech: &TechnologyId) -> Result<()> {
                    <$stage>::start_research(self, tech)
                }

                fn process(&mut self, delta: f32) -> Vec<StageEvent> {
                    <$stage>::process(self, delta)
                }
            }
        )*
    };
}

impl_headless_stage!(SocietyStage, IndustrialStage, SpaceStage);

/// Build the configured stage from `data` and run it.
///
/// # Errors
///
/// Returns [`SimError::InvalidConfig`] for a non-positive frame time or
/// invalid data, and any error from setting up the starting layout.
pub fn run(data: GameData, config: &SimulationConfig) -> Result<SimulationSummary> {
    if !(config.delta > 0.0 && config.delta.is_finite()) {
        return Err(SimError::InvalidConfig(format!(
            "frame delta must be positive, got {}",
            config.delta
        )));
    }

    match config.stage {
        StageKind::Society => {
            let mut stage = SocietyStage::new(data)?;
            for (i, kind) in config.prebuilt.iter().enumerate() {
                stage.place_prebuilt(kind, Vec2::new(i as f32 * 4.0, 0.0))?;
            }
            drive(stage, config)
        }
        StageKind::Industrial => {
            let mut stage = IndustrialStage::new(data)?;
            stage.found_city("Capital", Vec2::ZERO);
            drive(stage, config)
        }
        StageKind::Space => {
            let mut stage = SpaceStage::new(data)?;
            stage.colonize("Homeworld", Vec2::ZERO, None);
            drive(stage, config)
        }
    }
}

fn drive<S: HeadlessStage>(mut stage: S, config: &SimulationConfig) -> Result<SimulationSummary> {
    if config.stock > 0.0 {
        let resources: Vec<_> = stage.core().data().resources.iter().map(|r| r.id).collect();
        for resource in resources {
            stage.resources_mut().add(resource, config.stock);
        }
    }
    if let Some(tech) = &config.research {
        stage.start_research(&TechnologyId::new(tech.as_str()))?;
    }

    let mut events = EventCounts::default();
    for _ in 0..config.frames {
        for event in stage.process(config.delta) {
            events.record(&event);
        }
    }

    let core = stage.core();
    let data = core.data();
    let resources = core
        .resources()
        .iter()
        .map(|(resource, amount)| {
            let name = data
                .resource(resource)
                .map_or_else(|| resource.to_string(), |def| def.name.clone());
            (name, amount)
        })
        .collect();

    let summary = SimulationSummary {
        stage: config.stage,
        frames: config.frames,
        simulated_seconds: config.frames as f32 * config.delta,
        stats: core.stats().clone(),
        capacity: core.resources().capacity(),
        resources,
        unlocked: core.tech().unlocked().map(ToString::to_string).collect(),
        events,
    };

    tracing::info!(
        stage = ?summary.stage,
        frames = summary.frames,
        batches = summary.events.economy_batches,
        population = summary.stats.total_population,
        "Headless run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategy_test_utils::fixtures::game_data;

    #[test]
    fn test_society_run_grows_population() {
        let mut config = SimulationConfig::new(StageKind::Society, 10, 1.0);
        config.prebuilt = vec!["granary".to_string(), "hut".to_string()];
        config.stock = 50.0;

        let summary = run(game_data(), &config).unwrap();

        assert_eq!(summary.events.economy_batches, 10);
        assert!(summary.stats.total_population > 0);
        assert_eq!(summary.capacity, 300.0);
        assert!(summary.resources.contains_key("resource.food"));
    }

    #[test]
    fn test_society_run_unlocks_research() {
        let mut config = SimulationConfig::new(StageKind::Society, 60, 1.0);
        config.prebuilt = vec!["granary".to_string(), "library".to_string()];
        config.research = Some("pottery".to_string());

        let summary = run(game_data(), &config).unwrap();

        assert_eq!(summary.unlocked, vec!["pottery".to_string()]);
        assert_eq!(summary.events.technologies_unlocked, 1);
    }

    #[test]
    fn test_space_run_reports_planet() {
        let config = SimulationConfig::new(StageKind::Space, 5, 1.0);
        let summary = run(game_data(), &config).unwrap();

        assert_eq!(summary.capacity, 5000.0);
        assert!(summary.stats.total_population >= 10);
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let config = SimulationConfig::new(StageKind::Industrial, 3, 0.5);
        let summary = run(game_data(), &config).unwrap();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["stage"], "industrial");
        assert_eq!(json["frames"], 3);
    }

    #[test]
    fn test_invalid_delta_rejected() {
        let config = SimulationConfig::new(StageKind::Society, 1, 0.0);
        assert!(matches!(
            run(game_data(), &config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_prebuilt_rejected() {
        let mut config = SimulationConfig::new(StageKind::Society, 1, 1.0);
        config.prebuilt = vec!["castle".to_string()];
        assert!(matches!(
            run(game_data(), &config),
            Err(SimError::UnknownDefinition(_))
        ));
    }
}
