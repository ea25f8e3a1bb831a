//! Data validation utilities.

use std::path::{Path, PathBuf};

use strategy_core::data::GameData;

use crate::ToolError;

/// Read and validate one RON game data file.
///
/// # Errors
///
/// Returns [`ToolError::Io`] if the file cannot be read and
/// [`ToolError::Data`] if it does not parse or validate.
pub fn load_data_file(path: &Path) -> Result<GameData, ToolError> {
    let source = std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    GameData::from_ron_str(&source).map_err(|source| ToolError::Data {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate a single data file, or every `.ron` file in a directory.
///
/// Returns the files that were checked. Stops at the first invalid file.
///
/// # Errors
///
/// Returns an error if any data file fails validation, or if a directory
/// contains no data files at all.
pub fn validate_data_path(path: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let files = if path.is_dir() {
        data_files_in(path)?
    } else {
        vec![path.to_path_buf()]
    };

    for file in &files {
        let data = load_data_file(file)?;
        tracing::info!(
            file = %file.display(),
            resources = data.resources.len(),
            structures = data.structures.len(),
            units = data.units.len(),
            technologies = data.technologies.len(),
            "Data file valid"
        );
    }

    Ok(files)
}

fn data_files_in(dir: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let io_error = |source| ToolError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(ToolError::NoDataFiles(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}
