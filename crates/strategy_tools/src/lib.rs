//! # Strategy Development Tools
//!
//! Command-line tools for development:
//! - Game data validation
//! - Headless stage runs with a JSON summary

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod simulate;
pub mod validate;

use std::path::PathBuf;

use strategy_core::error::SimError;
use thiserror::Error;

/// Errors from the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file or directory could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A data file was read but is not valid game data.
    #[error("{path}: {source}")]
    Data {
        /// The offending file.
        path: PathBuf,
        /// What was wrong with it.
        source: SimError,
    },

    /// The directory held no data files.
    #[error("No .ron files found in {0}")]
    NoDataFiles(PathBuf),

    /// The simulation itself failed.
    #[error(transparent)]
    Simulation(#[from] SimError),

    /// The run summary could not be encoded.
    #[error("Failed to encode summary: {0}")]
    Summary(#[from] serde_json::Error),
}
