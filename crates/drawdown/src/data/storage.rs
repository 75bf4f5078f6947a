//! Plan file loading and saving
//!
//! A plan is a single YAML file; there is no directory layout or cache.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::plan_data::PlanData;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize plan: {0}")]
    Serialize(String),
}

/// Read and parse a plan file
pub fn load_plan(path: &Path) -> Result<PlanData, StorageError> {
    let content = fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let plan = PlanData::from_yaml(&content).map_err(|e| StorageError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(
        path = %path.display(),
        accounts = plan.accounts.len(),
        budget_lines = plan.budget.len(),
        scenarios = plan.scenarios.len(),
        "Loaded plan"
    );
    Ok(plan)
}

/// Write a plan file, creating parent directories as needed
pub fn save_plan(path: &Path, plan: &PlanData) -> Result<(), StorageError> {
    let yaml = plan
        .to_yaml()
        .map_err(|e| StorageError::Serialize(e.to_string()))?;

    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, yaml).map_err(write_err)
}
