//! # Strategy Core
//!
//! Economy and order simulation shared by the strategic stages (society,
//! industrial and space).
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No file or network IO (callers hand in RON text and save bytes)
//! - No threads; one `process(delta)` call per stage per frame
//!
//! Everything is frame-rate independent: formulas scale with elapsed
//! seconds, and expensive per-entity work runs in interval batches instead
//! of every frame.
//!
//! ## Crate Structure
//!
//! - [`resources`] - Bounded per-resource containers
//! - [`processor`] - Interval-batched economy and cached aggregates
//! - [`orders`] - Per-unit FIFO order queues
//! - [`progress`] - Timed and points-based progress trackers
//! - [`stages`] - Society, industrial and space stage orchestrators
//! - [`data`] - RON game data

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod build_queue;
pub mod city;
pub mod components;
pub mod data;
pub mod error;
pub mod facade;
pub mod math;
pub mod orders;
pub mod planet;
pub mod processor;
pub mod progress;
pub mod resources;
pub mod stages;
pub mod structures;
pub mod technology;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::build_queue::{BuildItemKind, BuildQueue, BuildQueueItem};
    pub use crate::city::City;
    pub use crate::components::*;
    pub use crate::data::{EconomyConfig, GameData};
    pub use crate::error::{Result, SimError};
    pub use crate::facade::{OrderWorld, ResourceFacade};
    pub use crate::math::Vec2;
    pub use crate::orders::{
        BuildOrder, IndustrialOrder, MovementOrder, Order, OrderState, QueuedOrder, SpaceOrder,
        StrategicUnit, UnitBody,
    };
    pub use crate::planet::Planet;
    pub use crate::processor::{AggregateStats, EconomyEntity, IntervalProcessor};
    pub use crate::progress::{StructureCompletionTimer, TechnologyResearch, TimedProgress};
    pub use crate::resources::{ResourceBundle, ResourceContainer, WorldResource};
    pub use crate::stages::{
        Fleet, IndustrialStage, IndustrialUnit, SocietyStage, SpaceStage, StageEvent,
    };
    pub use crate::structures::{ConstructionState, Structure};
    pub use crate::technology::{TechWeb, TechnologyId};
}
