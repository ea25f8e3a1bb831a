//! Bounded resource storage shared by every producer and consumer of a stage.
//!
//! A [`ResourceContainer`] is a per-resource ledger with a single capacity
//! ceiling that applies to each resource type independently. All amounts are
//! kept within `[0, capacity]` at all times.
//!
//! Shortfalls are reported through return values only: [`ResourceContainer::take`]
//! hands back what it could take and the caller decides what that means.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a resource category (a food type, a raw material, ...).
///
/// Resource categories are defined by game data at load time and never
/// change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldResource(pub u32);

impl WorldResource {
    /// Create a new resource identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for WorldResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

/// A set of resource amounts, used for costs and for missing construction
/// materials. Ordered so iteration (and saves) are stable.
pub type ResourceBundle = BTreeMap<WorldResource, f32>;

/// Bounded per-resource ledger.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceContainer {
    /// Stored amount per resource type.
    amounts: BTreeMap<WorldResource, f32>,
    /// Maximum amount storable for each resource type.
    capacity: f32,
}

impl ResourceContainer {
    /// Create an empty container with the given per-resource capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is negative or NaN.
    #[must_use]
    pub fn new(capacity: f32) -> Self {
        assert!(capacity >= 0.0, "container capacity must be non-negative, got {capacity}");
        Self {
            amounts: BTreeMap::new(),
            capacity,
        }
    }

    /// Current per-resource capacity.
    #[must_use]
    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    /// Set the per-resource capacity.
    ///
    /// Stored amounts above the new capacity are discarded so the
    /// `amount <= capacity` invariant keeps holding.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is negative or NaN.
    pub fn set_capacity(&mut self, capacity: f32) {
        assert!(capacity >= 0.0, "container capacity must be non-negative, got {capacity}");
        self.capacity = capacity;

        for (resource, amount) in &mut self.amounts {
            if *amount > capacity {
                tracing::debug!(
                    %resource,
                    discarded = *amount - capacity,
                    "Capacity lowered below stored amount"
                );
                *amount = capacity;
            }
        }
    }

    /// Add `amount` of `resource`, returning the part that did not fit.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative or NaN. Callers must never use `add`
    /// to remove resources.
    pub fn add(&mut self, resource: WorldResource, amount: f32) -> f32 {
        assert!(amount >= 0.0, "cannot add a negative amount ({amount}) of {resource}");

        let existing = self.amounts.entry(resource).or_insert(0.0);
        let old = *existing;
        let new = (old + amount).clamp(0.0, self.capacity);
        *existing = new;

        amount - (new - old)
    }

    /// Amount of `resource` currently stored (0 if untracked).
    #[must_use]
    pub fn available(&self, resource: WorldResource) -> f32 {
        self.amounts.get(&resource).copied().unwrap_or(0.0)
    }

    /// Take up to `wanted` of `resource`.
    ///
    /// Takes exactly `wanted` when enough is stored. Otherwise takes
    /// everything when `allow_partial` is set, or nothing at all when it is
    /// not. Returns the amount actually taken.
    ///
    /// # Panics
    ///
    /// Panics if `wanted` is negative or NaN.
    pub fn take(&mut self, resource: WorldResource, wanted: f32, allow_partial: bool) -> f32 {
        assert!(wanted >= 0.0, "cannot take a negative amount ({wanted}) of {resource}");

        let Some(stored) = self.amounts.get_mut(&resource) else {
            return 0.0;
        };

        if wanted <= *stored {
            *stored -= wanted;
            wanted
        } else if allow_partial {
            let taken = *stored;
            *stored = 0.0;
            taken
        } else {
            0.0
        }
    }

    /// Check whether every entry of `bundle` is fully available.
    #[must_use]
    pub fn has_bundle(&self, bundle: &ResourceBundle) -> bool {
        bundle
            .iter()
            .all(|(resource, amount)| self.available(*resource) >= *amount)
    }

    /// Remove a whole bundle, or nothing.
    ///
    /// Returns `true` if every entry was taken. On `false` the container is
    /// unchanged.
    pub fn take_bundle(&mut self, bundle: &ResourceBundle) -> bool {
        if !self.has_bundle(bundle) {
            return false;
        }

        for (resource, amount) in bundle {
            let taken = self.take(*resource, *amount, false);
            debug_assert!((taken - *amount).abs() <= f32::EPSILON);
        }
        true
    }

    /// Move everything `other` holds into this container.
    ///
    /// Whatever does not fit under this container's capacity stays in
    /// `other`. Returns the total amount moved across all resource types.
    pub fn transfer_from(&mut self, other: &mut Self) -> f32 {
        let holdings: Vec<(WorldResource, f32)> = other.iter().collect();
        let mut moved_total = 0.0;

        for (resource, amount) in holdings {
            let overflow = self.add(resource, amount);
            let moved = amount - overflow;
            other.take(resource, moved, true);
            moved_total += moved;
        }

        moved_total
    }

    /// Iterate over stored amounts in stable resource order.
    pub fn iter(&self) -> impl Iterator<Item = (WorldResource, f32)> + '_ {
        self.amounts.iter().map(|(r, a)| (*r, *a))
    }

    /// Check whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amounts.values().all(|amount| *amount <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOD: WorldResource = WorldResource(1);
    const ROCK: WorldResource = WorldResource(2);

    #[test]
    fn test_add_overflow_at_capacity() {
        let mut container = ResourceContainer::new(100.0);
        assert_eq!(container.add(FOOD, 90.0), 0.0);

        let overflow = container.add(FOOD, 20.0);
        assert_eq!(overflow, 10.0);
        assert_eq!(container.available(FOOD), 100.0);
    }

    #[test]
    #[should_panic(expected = "negative amount")]
    fn test_add_negative_panics() {
        let mut container = ResourceContainer::new(10.0);
        container.add(FOOD, -1.0);
    }

    #[test]
    fn test_untracked_resource_is_zero() {
        let container = ResourceContainer::new(10.0);
        assert_eq!(container.available(ROCK), 0.0);
        assert!(container.is_empty());
    }

    #[test]
    fn test_take_partial_drains() {
        let mut container = ResourceContainer::new(100.0);
        container.add(FOOD, 30.0);

        assert_eq!(container.take(FOOD, 50.0, true), 30.0);
        assert_eq!(container.available(FOOD), 0.0);
    }

    #[test]
    fn test_take_without_partial_is_all_or_nothing() {
        let mut container = ResourceContainer::new(100.0);
        container.add(FOOD, 30.0);

        assert_eq!(container.take(FOOD, 50.0, false), 0.0);
        assert_eq!(container.available(FOOD), 30.0);

        assert_eq!(container.take(FOOD, 30.0, false), 30.0);
        assert_eq!(container.available(FOOD), 0.0);
    }

    #[test]
    fn test_take_bundle_leaves_container_untouched_on_failure() {
        let mut container = ResourceContainer::new(100.0);
        container.add(FOOD, 50.0);
        container.add(ROCK, 5.0);

        let bundle = ResourceBundle::from([(FOOD, 20.0), (ROCK, 10.0)]);
        assert!(!container.take_bundle(&bundle));
        assert_eq!(container.available(FOOD), 50.0);
        assert_eq!(container.available(ROCK), 5.0);

        container.add(ROCK, 5.0);
        assert!(container.take_bundle(&bundle));
        assert_eq!(container.available(FOOD), 30.0);
        assert_eq!(container.available(ROCK), 0.0);
    }

    #[test]
    fn test_transfer_from_keeps_what_does_not_fit() {
        let mut source = ResourceContainer::new(500.0);
        source.add(FOOD, 300.0);
        source.add(ROCK, 40.0);

        let mut target = ResourceContainer::new(100.0);
        target.add(FOOD, 50.0);

        let moved = target.transfer_from(&mut source);

        assert_eq!(moved, 90.0);
        assert_eq!(target.available(FOOD), 100.0);
        assert_eq!(target.available(ROCK), 40.0);
        assert_eq!(source.available(FOOD), 250.0);
        assert_eq!(source.available(ROCK), 0.0);
    }

    #[test]
    fn test_lowering_capacity_clamps_amounts() {
        let mut container = ResourceContainer::new(100.0);
        container.add(FOOD, 80.0);
        container.add(ROCK, 10.0);

        container.set_capacity(50.0);

        assert_eq!(container.available(FOOD), 50.0);
        assert_eq!(container.available(ROCK), 10.0);
        assert_eq!(container.capacity(), 50.0);
    }
}
