//! Technology unlocking driven by points-based research.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::GameData;
use crate::error::{Result, SimError};
use crate::progress::TechnologyResearch;

/// Unique technology identifier from game data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechnologyId(pub String);

impl TechnologyId {
    /// Create a new technology id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TechnologyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unlocked technologies of one stage plus the research in progress.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TechWeb {
    unlocked: BTreeSet<TechnologyId>,
    active: Option<TechnologyResearch>,
}

impl TechWeb {
    /// Create a tech web with nothing unlocked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a technology is unlocked.
    #[must_use]
    pub fn is_unlocked(&self, tech: &TechnologyId) -> bool {
        self.unlocked.contains(tech)
    }

    /// All unlocked technologies in id order.
    pub fn unlocked(&self) -> impl Iterator<Item = &TechnologyId> {
        self.unlocked.iter()
    }

    /// The research currently in progress.
    #[must_use]
    pub fn active_research(&self) -> Option<&TechnologyResearch> {
        self.active.as_ref()
    }

    /// Unlock a technology directly (starting technologies, cheats, saves).
    ///
    /// Returns `false` if it was already unlocked.
    pub fn unlock(&mut self, tech: TechnologyId) -> bool {
        self.unlocked.insert(tech)
    }

    /// Begin researching `tech`.
    ///
    /// Any research already in progress is replaced and its points are
    /// lost.
    pub fn start_research(&mut self, data: &GameData, tech: &TechnologyId) -> Result<()> {
        let definition = data
            .technology(tech)
            .ok_or_else(|| SimError::UnknownDefinition(format!("technology '{tech}'")))?;

        if self.is_unlocked(tech) {
            return Err(SimError::ResearchUnavailable {
                technology: tech.to_string(),
                reason: "already unlocked".to_string(),
            });
        }

        if let Some(missing) = definition
            .prerequisites
            .iter()
            .find(|prereq| !self.is_unlocked(prereq))
        {
            return Err(SimError::ResearchUnavailable {
                technology: tech.to_string(),
                reason: format!("requires '{missing}'"),
            });
        }

        if let Some(previous) = &self.active {
            tracing::debug!(
                replaced = %previous.technology(),
                progress = previous.progress(),
                "Research switched, progress discarded"
            );
        }

        self.active = Some(TechnologyResearch::new(
            tech.clone(),
            definition.research_points,
        )?);
        Ok(())
    }

    /// Feed research points into the active research.
    ///
    /// Returns the technology that became unlocked by this call, if any.
    /// A finished research is removed right away, so each technology is
    /// unlocked exactly once.
    pub fn add_research_points(&mut self, points: f32) -> Option<TechnologyId> {
        let research = self.active.as_mut()?;
        research.add_progress(points);

        if !research.is_completed() {
            return None;
        }

        let tech = self.active.take()?.technology().clone();
        if self.unlocked.insert(tech.clone()) {
            tracing::info!(technology = %tech, "Technology unlocked");
            Some(tech)
        } else {
            None
        }
    }
}
