//! Progress trackers for timed and points-based activities.
//!
//! Every tracker reports `progress = min(1, accumulated / total)` and guards
//! a one-shot finish. The guard lives in tracker state, so asking again after
//! completion never repeats the finish action.
//!
//! Totals are validated when a tracker is created: a zero or negative total
//! is a data authoring bug and is rejected with [`SimError::InvalidTotal`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::technology::TechnologyId;

fn validate_total(total: f32) -> Result<f32> {
    if total > 0.0 && total.is_finite() {
        Ok(total)
    } else {
        Err(SimError::InvalidTotal(total))
    }
}

fn ratio(accumulated: f32, total: f32) -> f32 {
    (accumulated / total).min(1.0)
}

/// Elapsed-time tracker behind a timed build item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedProgress {
    /// Seconds elapsed so far, never above `total`.
    accumulated: f32,
    /// Seconds needed.
    total: f32,
    /// Set once the finish action has run.
    finished: bool,
}

impl TimedProgress {
    /// Create a tracker needing `total` seconds.
    pub fn new(total: f32) -> Result<Self> {
        Ok(Self {
            accumulated: 0.0,
            total: validate_total(total)?,
            finished: false,
        })
    }

    /// Add elapsed time, clamping at the total.
    pub fn elapse_time(&mut self, delta: f32) {
        debug_assert!(delta >= 0.0, "negative frame delta {delta}");
        self.accumulated = (self.accumulated + delta.max(0.0)).min(self.total);
    }

    /// Fraction done in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        ratio(self.accumulated, self.total)
    }

    /// Seconds elapsed so far.
    #[must_use]
    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    /// Seconds needed in total.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Whether the finish action has already run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run `on_finish` the first time the accumulated time reaches the total.
    ///
    /// Returns `true` only on the call that ran `on_finish`.
    pub fn check_and_process_finished_status<F: FnOnce()>(&mut self, on_finish: F) -> bool {
        if self.finished || self.accumulated < self.total {
            return false;
        }

        self.finished = true;
        on_finish();
        true
    }
}

/// Points-based research of one technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyResearch {
    technology: TechnologyId,
    accumulated: f32,
    required: f32,
    completed: bool,
}

impl TechnologyResearch {
    /// Start researching `technology`, needing `required` points.
    pub fn new(technology: TechnologyId, required: f32) -> Result<Self> {
        Ok(Self {
            technology,
            accumulated: 0.0,
            required: validate_total(required)?,
            completed: false,
        })
    }

    /// The technology being researched.
    #[must_use]
    pub fn technology(&self) -> &TechnologyId {
        &self.technology
    }

    /// Add research points. No-op once completed.
    pub fn add_progress(&mut self, points: f32) {
        if self.completed {
            return;
        }

        debug_assert!(points >= 0.0, "negative research points {points}");
        self.accumulated += points.max(0.0);

        if self.accumulated >= self.required {
            self.completed = true;
        }
    }

    /// Whether enough points have been gathered.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Fraction done in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        ratio(self.accumulated, self.required)
    }
}

/// Construction timer started after a structure has received all of its
/// resources. The owning structure drops the timer when it finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureCompletionTimer {
    elapsed: f32,
    total: f32,
}

impl StructureCompletionTimer {
    /// Create a timer running for `total` seconds.
    pub fn new(total: f32) -> Result<Self> {
        Ok(Self {
            elapsed: 0.0,
            total: validate_total(total)?,
        })
    }

    /// Advance the timer and return the new progress.
    pub fn elapse(&mut self, delta: f32) -> f32 {
        self.elapsed = (self.elapsed + delta.max(0.0)).min(self.total);
        self.progress()
    }

    /// Fraction done in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        ratio(self.elapsed, self.total)
    }

    /// Whether the full construction time has passed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.total
    }
}
