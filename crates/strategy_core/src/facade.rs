//! The surface through which units and callers reach a stage's economy.
//!
//! Orders never see a concrete stage type. They run against [`OrderWorld`],
//! so the same order logic works for every stage, and tests can drive
//! orders against a tiny hand-made world.

use crate::components::EntityId;
use crate::resources::ResourceContainer;
use crate::structures::Structure;

/// Access to the single resource container of a stage.
pub trait ResourceFacade {
    /// The stage's shared resource container.
    fn resources(&self) -> &ResourceContainer;

    /// The stage's shared resource container, mutably.
    fn resources_mut(&mut self) -> &mut ResourceContainer;
}

/// Everything an order may touch while it works.
pub trait OrderWorld: ResourceFacade {
    /// Look up a structure to build together with the container that pays
    /// for it.
    ///
    /// Both borrows are handed out at once so a build order can move
    /// resources from the container into the structure. Returns `None` if
    /// the structure no longer exists.
    fn build_target(&mut self, id: EntityId) -> Option<(&mut Structure, &mut ResourceContainer)>;

    /// Called once after an order finished structure `id`.
    ///
    /// Stages use it to report the completion and refresh their cached
    /// aggregates.
    fn structure_completed(&mut self, _id: EntityId) {}
}
