//! Interval-batched economy processing and cached aggregate stats.
//!
//! Running the per-entity economy formulas every frame would mean scanning
//! every structure, city or planet of a stage sixty times a second. Instead
//! an [`IntervalProcessor`] accumulates frame time and only runs a batch once
//! the configured interval has elapsed. Each batch:
//!
//! 1. runs production → consumption → growth for every operational entity,
//!    scaled by the time elapsed since the previous batch,
//! 2. overwrites the cached [`AggregateStats`].
//!
//! Between batches callers read only the cached stats, never partial sums.

use serde::{Deserialize, Serialize};

use crate::components::Producer;
use crate::data::EconomyConfig;
use crate::error::{Result, SimError};
use crate::resources::ResourceContainer;

/// An entity that takes part in the batched economy.
///
/// Optional capabilities return `None` (or zero) when the entity does not
/// have them; that is the normal "feature not present" case.
pub trait EconomyEntity {
    /// Whether the entity is finished and takes part in the economy.
    fn is_operational(&self) -> bool {
        true
    }

    /// Current population.
    fn population(&self) -> u32;

    /// Population ceiling, if the entity houses people.
    fn housing_capacity(&self) -> Option<u32>;

    /// Add exactly one person.
    fn add_resident(&mut self);

    /// Storage contribution, if the entity stores resources.
    fn storage_capacity(&self) -> Option<f32>;

    /// Research points generated per second.
    fn research_output(&self, config: &EconomyConfig) -> f32;

    /// Fixed-rate production on top of population-driven food.
    fn fixed_production(&self) -> Option<Producer> {
        None
    }
}

/// Cached results of the last batch (or immediate recomputation).
///
/// Presentation code reads these every frame; only the processor writes
/// them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Sum of storage capacities.
    pub total_storage: f32,
    /// Sum of populations.
    pub total_population: u64,
    /// Sum of housing capacities.
    pub housing_capacity: u64,
    /// Research points per second across the group.
    pub research_speed: f32,
    /// Food that could not be eaten during the last batch. Cosmetic only.
    pub food_deficit: f32,
    /// Entities that took part in the last batch.
    pub operational_entities: usize,
}

impl AggregateStats {
    fn accumulate<E: EconomyEntity + ?Sized>(&mut self, entity: &E, config: &EconomyConfig) {
        self.total_storage += entity.storage_capacity().unwrap_or(0.0);
        self.total_population += u64::from(entity.population());
        self.housing_capacity += u64::from(entity.housing_capacity().unwrap_or(0));
        self.research_speed += entity.research_output(config);
        self.operational_entities += 1;
    }
}

/// Batches economy work for one entity group of a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalProcessor {
    /// Seconds accumulated since the last batch.
    elapsed: f32,
    /// Seconds between batches.
    interval: f32,
    /// Aggregates from the last batch.
    stats: AggregateStats,
    /// Number of batches run so far.
    batches: u64,
}

impl IntervalProcessor {
    /// Create a processor that batches every `interval` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `interval` is not positive.
    pub fn new(interval: f32) -> Result<Self> {
        if !(interval > 0.0 && interval.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "batch interval must be positive, got {interval}"
            )));
        }

        Ok(Self {
            elapsed: 0.0,
            interval,
            stats: AggregateStats::default(),
            batches: 0,
        })
    }

    /// The cached aggregates.
    #[must_use]
    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Seconds accumulated toward the next batch.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds between batches.
    #[must_use]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Number of batches run so far.
    #[must_use]
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Accumulate `delta` and run a batch if the interval has elapsed.
    ///
    /// Returns `true` if a batch ran this call. An empty group still runs
    /// (and resets the aggregates to zero).
    pub fn process<'a, E, I>(
        &mut self,
        delta: f32,
        entities: I,
        resources: &mut ResourceContainer,
        config: &EconomyConfig,
    ) -> bool
    where
        E: EconomyEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut E>,
    {
        self.elapsed += delta.max(0.0);
        if self.elapsed < self.interval {
            return false;
        }

        let elapsed = self.elapsed;
        let mut stats = AggregateStats::default();
        let mut overflow = 0.0;

        for entity in entities {
            if !entity.is_operational() {
                continue;
            }

            overflow += produce(&*entity, resources, config, elapsed);
            stats.food_deficit += consume(&*entity, resources, config, elapsed);
            grow(&mut *entity, resources, config);

            stats.accumulate(&*entity, config);
        }

        if stats.food_deficit > 0.0 {
            tracing::debug!(deficit = stats.food_deficit, "Population could not be fully fed");
        }
        tracing::debug!(
            elapsed,
            population = stats.total_population,
            storage = stats.total_storage,
            overflow,
            entities = stats.operational_entities,
            "Economy batch processed"
        );

        self.elapsed = 0.0;
        self.stats = stats;
        self.batches += 1;
        true
    }

    /// Recompute the cached aggregates right now, without running any
    /// formulas and without touching the accumulated time.
    ///
    /// Stages call this at setup so capacity is correct before the first
    /// batch; otherwise early production would be clipped to zero storage.
    pub fn recompute_now<'a, E, I>(&mut self, entities: I, config: &EconomyConfig)
    where
        E: EconomyEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut stats = AggregateStats {
            food_deficit: self.stats.food_deficit,
            ..AggregateStats::default()
        };

        for entity in entities {
            if entity.is_operational() {
                stats.accumulate(entity, config);
            }
        }

        self.stats = stats;
    }
}

/// Production step. Returns the amount that did not fit into storage.
fn produce<E: EconomyEntity + ?Sized>(
    entity: &E,
    resources: &mut ResourceContainer,
    config: &EconomyConfig,
    elapsed: f32,
) -> f32 {
    let mut overflow = 0.0;

    let food = config.population_production_rate(entity.population()) * elapsed;
    if food > 0.0 {
        overflow += resources.add(config.food_resource, food);
    }

    if let Some(producer) = entity.fixed_production() {
        let amount = producer.rate * elapsed;
        if amount > 0.0 {
            overflow += resources.add(producer.resource, amount);
        }
    }

    overflow
}

/// Consumption step. Returns the shortfall.
fn consume<E: EconomyEntity + ?Sized>(
    entity: &E,
    resources: &mut ResourceContainer,
    config: &EconomyConfig,
    elapsed: f32,
) -> f32 {
    let wanted = entity.population() as f32 * config.consumption_per_capita * elapsed;
    if wanted <= 0.0 {
        return 0.0;
    }

    let taken = resources.take(config.food_resource, wanted, true);
    wanted - taken
}

/// Growth step: at most one new person per batch, never past housing and
/// never on partial resources.
fn grow<E: EconomyEntity + ?Sized>(
    entity: &mut E,
    resources: &mut ResourceContainer,
    config: &EconomyConfig,
) {
    let Some(housing) = entity.housing_capacity() else {
        return;
    };
    if entity.population() >= housing {
        return;
    }

    if resources.take(config.growth_resource, config.growth_cost, false) > 0.0 {
        entity.add_resident();
    }
}
