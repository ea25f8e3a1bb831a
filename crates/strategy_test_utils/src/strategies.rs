//! Proptest strategies for core types.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use strategy_core::resources::{ResourceBundle, ResourceContainer, WorldResource};

/// Largest amount generated for adds, takes and capacities.
pub const MAX_AMOUNT: f32 = 10_000.0;

/// Any of the five sample resources.
pub fn resource() -> impl Strategy<Value = WorldResource> {
    (1u32..=5).prop_map(WorldResource)
}

/// A non-negative amount.
pub fn amount() -> impl Strategy<Value = f32> {
    0.0f32..MAX_AMOUNT
}

/// A container with arbitrary capacity and contents.
///
/// Contents are added through [`ResourceContainer::add`], so the generated
/// container always satisfies its own invariants.
pub fn container() -> impl Strategy<Value = ResourceContainer> {
    (amount(), vec((resource(), amount()), 0..8)).prop_map(|(capacity, holdings)| {
        let mut container = ResourceContainer::new(capacity);
        for (resource, amount) in holdings {
            container.add(resource, amount);
        }
        container
    })
}

/// A cost bundle over the sample resources.
pub fn bundle() -> impl Strategy<Value = ResourceBundle> {
    btree_map(resource(), amount(), 0..5)
}

/// A sequence of frame times between zero and a tenth of a second.
pub fn frame_deltas() -> impl Strategy<Value = Vec<f32>> {
    vec(0.0f32..0.1, 1..200)
}
