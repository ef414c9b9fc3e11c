//! Resolving pretrained model artifacts inside the log folder.
//!
//! Training runs file their outputs as
//! `<log_folder>/<algo>/<env_id>_<run_id>/`, containing the final model
//! (`<env_id>.json`), optionally `best_model.json`, and numbered
//! checkpoints (`rl_model_<steps>_steps.json`). Resolution picks the run
//! directory (run id 0 means "latest") and then the artifact the caller
//! asked for.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::algo::Algo;

/// Errors raised while resolving a model artifact path.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No runs recorded for this algo/env pair.
    #[error("no experiment runs for {algo}/{env_id} under {path}")]
    NoRuns {
        algo: Algo,
        env_id: String,
        path: PathBuf,
    },
    /// The resolved run directory has no artifact of the requested kind.
    #[error("model artifact not found: {0}")]
    MissingArtifact(PathBuf),
    /// The run directory holds no numbered checkpoints.
    #[error("no checkpoints found in {0}")]
    NoCheckpoints(PathBuf),
    /// A checkpoint was requested at a step count that was never saved.
    #[error("no checkpoint at {steps} steps in {dir} (available: {available:?})")]
    UnknownCheckpoint {
        dir: PathBuf,
        steps: u64,
        available: Vec<u64>,
    },
    /// Filesystem access failed.
    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which artifact inside the run directory to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelSelection {
    /// Prefer `best_model.json` over the final model.
    pub load_best: bool,
    /// Load the checkpoint saved at exactly this step count.
    pub load_checkpoint: Option<u64>,
    /// Load the most recent numbered checkpoint.
    pub load_last_checkpoint: bool,
}

/// A fully resolved model location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// The run id the resolution landed on.
    pub run_id: u32,
    /// The experiment run directory.
    pub experiment_dir: PathBuf,
    /// The artifact file to load.
    pub model_path: PathBuf,
}

/// The highest run id recorded for `algo`/`env_id`, if any.
pub fn latest_run_id(
    log_folder: &Path,
    algo: Algo,
    env_id: &str,
) -> Result<Option<u32>, ModelError> {
    let algo_dir = log_folder.join(algo.as_str());
    if !algo_dir.is_dir() {
        return Ok(None);
    }
    let read_dir = fs::read_dir(&algo_dir).map_err(|source| ModelError::Io {
        path: algo_dir.clone(),
        source,
    })?;

    let prefix = format!("{env_id}_");
    let mut latest: Option<u32> = None;
    for entry in read_dir {
        let entry = entry.map_err(|source| ModelError::Io {
            path: algo_dir.clone(),
            source,
        })?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(suffix) = name.strip_prefix(&prefix) else {
            continue;
        };
        if let Ok(run_id) = suffix.parse::<u32>() {
            latest = Some(latest.map_or(run_id, |l| l.max(run_id)));
        }
    }
    Ok(latest)
}

/// Parse the step count out of a `rl_model_<steps>_steps.json` file name.
fn checkpoint_steps(name: &str) -> Option<u64> {
    name.strip_prefix("rl_model_")?
        .strip_suffix("_steps.json")?
        .parse()
        .ok()
}

/// Step counts of all checkpoints in a run directory, sorted ascending.
fn list_checkpoints(dir: &Path) -> Result<Vec<u64>, ModelError> {
    let read_dir = fs::read_dir(dir).map_err(|source| ModelError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut steps = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| ModelError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Some(name) = entry.file_name().to_str() {
            if let Some(s) = checkpoint_steps(name) {
                steps.push(s);
            }
        }
    }
    steps.sort_unstable();
    Ok(steps)
}

/// Resolve the model artifact for `algo`/`env_id`.
///
/// `exp_id` of `None` or `Some(0)` selects the latest run; anything else
/// the exact run id. The artifact within the run follows `selection`:
/// best model, exact checkpoint, last checkpoint, or the final model.
pub fn resolve_model_path(
    log_folder: &Path,
    algo: Algo,
    env_id: &str,
    exp_id: Option<u32>,
    selection: &ModelSelection,
) -> Result<ResolvedModel, ModelError> {
    let run_id = match exp_id {
        Some(id) if id > 0 => id,
        _ => latest_run_id(log_folder, algo, env_id)?.ok_or_else(|| ModelError::NoRuns {
            algo,
            env_id: env_id.to_string(),
            path: log_folder.to_path_buf(),
        })?,
    };

    let experiment_dir = log_folder
        .join(algo.as_str())
        .join(format!("{env_id}_{run_id}"));
    if !experiment_dir.is_dir() {
        return Err(ModelError::MissingArtifact(experiment_dir));
    }

    let model_path = if let Some(steps) = selection.load_checkpoint {
        let available = list_checkpoints(&experiment_dir)?;
        if !available.contains(&steps) {
            return Err(ModelError::UnknownCheckpoint {
                dir: experiment_dir,
                steps,
                available,
            });
        }
        experiment_dir.join(format!("rl_model_{steps}_steps.json"))
    } else if selection.load_last_checkpoint {
        let available = list_checkpoints(&experiment_dir)?;
        let last = available
            .last()
            .copied()
            .ok_or_else(|| ModelError::NoCheckpoints(experiment_dir.clone()))?;
        experiment_dir.join(format!("rl_model_{last}_steps.json"))
    } else if selection.load_best {
        experiment_dir.join("best_model.json")
    } else {
        experiment_dir.join(format!("{env_id}.json"))
    };

    if !model_path.is_file() {
        return Err(ModelError::MissingArtifact(model_path));
    }

    Ok(ResolvedModel {
        run_id,
        experiment_dir,
        model_path,
    })
}
