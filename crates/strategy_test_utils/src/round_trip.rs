//! Save/restore testing utilities.
//!
//! Provides a harness for verifying that a stage restored from a save
//! carries on exactly like the stage it was saved from.
//!
//! # Testing Strategy
//!
//! A save must capture every piece of state that influences later frames:
//! container contents and capacity, interval accumulators, cached
//! aggregates, order queues, progress trackers and id allocators. Missing
//! any of these shows up as the restored stage drifting away from the
//! original after a few frames, even if the state right after loading
//! looks equal.
//!
//! The harness therefore checks two things:
//!
//! 1. **Immediate equality**: `load(save(stage)) == stage`
//! 2. **Continued equality**: original and restored stage produce the same
//!    events and end in the same state after running the same frames

use std::fmt::Debug;

use strategy_core::error::Result;
use strategy_core::stages::{IndustrialStage, SocietyStage, SpaceStage, StageEvent};

/// A stage that can be saved, restored and stepped.
pub trait PersistentStage: Clone + Debug + PartialEq + Sized {
    /// Save the stage.
    fn save_state(&self) -> Result<Vec<u8>>;

    /// Restore a saved stage.
    fn load_state(bytes: &[u8]) -> Result<Self>;

    /// Advance one frame.
    fn step(&mut self, delta: f32) -> Vec<StageEvent>;
}

macro_rules! impl_persistent_stage {
    ($($stage:ty),* $(,)?) => {
        $(
            impl PersistentStage for $stage {
                fn save_state(&self) -> Result<Vec<u8>> {
                    self.save()
                }

                fn load_state(bytes: &[u8]) -> Result<Self> {
                    Self::load(bytes)
                }

                fn step(&mut self, delta: f32) -> Vec<StageEvent> {
                    self.process(delta)
                }
            }
        )*
    };
}

impl_persistent_stage!(SocietyStage, IndustrialStage, SpaceStage);

/// Result of a save/restore check.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripResult {
    /// Size of the save in bytes.
    pub save_size: usize,
    /// Frames run after restoring.
    pub frames: u32,
    /// First frame on which events or state differed, if any.
    pub diverged_at: Option<u32>,
}

impl RoundTripResult {
    /// Assert that the restored stage never diverged.
    ///
    /// # Panics
    ///
    /// Panics with the diverging frame if the round trip was lossy.
    pub fn assert_lossless(&self) {
        if let Some(frame) = self.diverged_at {
            panic!(
                "Restored stage diverged!\n\
                 Save size: {} bytes\n\
                 Frames run: {}\n\
                 First divergent frame: {}",
                self.save_size, self.frames, frame
            );
        }
    }
}

/// Save and immediately restore a stage.
///
/// # Panics
///
/// Panics if saving or loading fails.
pub fn save_and_restore<S: PersistentStage>(stage: &S) -> S {
    let bytes = stage.save_state().expect("stage should save");
    S::load_state(&bytes).expect("stage should load")
}

/// Save `stage`, restore it, then run original and copy for `frames`
/// frames of `delta` seconds each, comparing after every frame.
///
/// # Panics
///
/// Panics if saving or loading fails.
pub fn verify_resume<S: PersistentStage>(stage: &S, delta: f32, frames: u32) -> RoundTripResult {
    let bytes = stage.save_state().expect("stage should save");
    let mut restored = S::load_state(&bytes).expect("stage should load");
    let mut original = stage.clone();

    let mut diverged_at = (restored != original).then_some(0);

    for frame in 1..=frames {
        if diverged_at.is_some() {
            break;
        }
        let expected = original.step(delta);
        let actual = restored.step(delta);

        if expected != actual || original != restored {
            tracing::debug!(frame, ?expected, ?actual, "Restored stage diverged");
            diverged_at = Some(frame);
        }
    }

    RoundTripResult {
        save_size: bytes.len(),
        frames,
        diverged_at,
    }
}
