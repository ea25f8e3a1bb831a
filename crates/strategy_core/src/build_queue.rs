//! Timed FIFO build queues owned by cities.
//!
//! Only the front item advances. When it finishes it is popped and the
//! owning stage turns it into a unit or a structure.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::progress::TimedProgress;

/// What a build item produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildItemKind {
    /// A unit type id.
    Unit(String),
    /// A structure type id.
    Structure(String),
}

impl BuildItemKind {
    /// The unit or structure type id.
    #[must_use]
    pub fn type_id(&self) -> &str {
        match self {
            Self::Unit(id) | Self::Structure(id) => id,
        }
    }
}

/// One entry in a build queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildQueueItem {
    /// What is being built.
    pub kind: BuildItemKind,
    /// Build time tracking.
    progress: TimedProgress,
}

impl BuildQueueItem {
    /// Create an item that needs `build_time` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SimError::InvalidTotal`] for a non-positive
    /// build time.
    pub fn new(kind: BuildItemKind, build_time: f32) -> Result<Self> {
        Ok(Self {
            kind,
            progress: TimedProgress::new(build_time)?,
        })
    }

    /// Fraction done in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress.progress()
    }
}

/// Bounded FIFO of build items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildQueue {
    items: VecDeque<BuildQueueItem>,
    max_len: usize,
}

impl BuildQueue {
    /// Default maximum queue length.
    pub const DEFAULT_MAX_LEN: usize = 5;

    /// Create an empty queue with the default length limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_len(Self::DEFAULT_MAX_LEN)
    }

    /// Create an empty queue with a specific length limit.
    #[must_use]
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_len,
        }
    }

    /// Check if the queue is full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_len
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The item being built.
    #[must_use]
    pub fn current(&self) -> Option<&BuildQueueItem> {
        self.items.front()
    }

    /// All items, front first.
    pub fn iter(&self) -> impl Iterator<Item = &BuildQueueItem> {
        self.items.iter()
    }

    /// Append an item. Hands it back if the queue is full.
    pub fn push(&mut self, item: BuildQueueItem) -> std::result::Result<(), BuildQueueItem> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push_back(item);
        Ok(())
    }

    /// Advance the front item and pop it if it finished.
    ///
    /// Returns the kind of the finished item. At most one item finishes per
    /// call; leftover time is not carried into the next item.
    pub fn advance(&mut self, delta: f32) -> Option<BuildItemKind> {
        let front = self.items.front_mut()?;
        front.progress.elapse_time(delta);

        let kind = &front.kind;
        let finished = front.progress.check_and_process_finished_status(|| {
            tracing::debug!(item = ?kind, "Build item finished");
        });

        if finished {
            self.items.pop_front().map(|item| item.kind)
        } else {
            None
        }
    }
}

impl Default for BuildQueue {
    fn default() -> Self {
        Self::new()
    }
}
