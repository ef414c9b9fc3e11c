//! Loading saved model artifacts, with hub fallback.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::algo::Algo;

use super::paths::{resolve_model_path, ModelSelection, ResolvedModel};

/// A saved model artifact.
///
/// The policy parameters themselves are an opaque payload produced by the
/// training stack; the surrounding metadata is what the tooling checks
/// before handing the artifact to a simulator session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    /// The algorithm that trained this model.
    pub algo: Algo,
    /// The environment id the model was trained on.
    pub env_id: String,
    /// Total environment steps at save time.
    pub timesteps: u64,
    /// UTC timestamp of the save.
    pub saved_at: DateTime<Utc>,
    /// Training hyperparameters, kept for reproducibility.
    pub hyperparameters: serde_json::Value,
    /// Opaque policy parameter payload.
    pub policy: serde_json::Value,
}

impl SavedModel {
    /// Serialize the model to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize model")?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write model to {}", path.as_ref().display()))?;
        info!(
            path = %path.as_ref().display(),
            algo = %self.algo,
            env = %self.env_id,
            "Saved model"
        );
        Ok(())
    }

    /// Deserialize a model from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read model from {}", path.as_ref().display()))?;
        let model: Self =
            serde_json::from_str(&data).context("Failed to deserialize model JSON")?;
        Ok(model)
    }

    /// Check the artifact matches what the caller asked to load.
    pub fn ensure_matches(&self, algo: Algo, env_id: &str) -> Result<()> {
        if self.algo != algo {
            bail!(
                "model was trained with {} but {} was requested",
                self.algo,
                algo
            );
        }
        if self.env_id != env_id {
            bail!(
                "model was trained on {} but {} was requested",
                self.env_id,
                env_id
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Model hub fallback
// ---------------------------------------------------------------------------

/// A source of pretrained models outside the local log folder.
///
/// The transport is the implementer's concern; this crate ships
/// [`LocalHub`], which copies from a local mirror directory.
pub trait ModelHub {
    /// Fetch the pretrained model for `algo`/`env_id` into `dest_dir` and
    /// return the path of the fetched artifact.
    fn fetch(&self, algo: Algo, env_id: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// A hub backed by a local mirror directory laid out as
/// `<root>/<algo>/<env_id>.json`.
#[derive(Debug, Clone)]
pub struct LocalHub {
    root: PathBuf,
}

impl LocalHub {
    /// Create a hub over the given mirror directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModelHub for LocalHub {
    fn fetch(&self, algo: Algo, env_id: &str, dest_dir: &Path) -> Result<PathBuf> {
        let src = self.root.join(algo.as_str()).join(format!("{env_id}.json"));
        if !src.is_file() {
            bail!(
                "hub mirror has no model for {}/{} at {}",
                algo,
                env_id,
                src.display()
            );
        }
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create {}", dest_dir.display()))?;
        let dest = dest_dir.join(format!("{env_id}.json"));
        fs::copy(&src, &dest)
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
        info!(src = %src.display(), dest = %dest.display(), "Fetched model from hub mirror");
        Ok(dest)
    }
}

/// Resolve a model artifact, falling back to the hub when nothing is
/// found locally.
///
/// On a local miss with a hub configured, the model is fetched into run
/// directory 1 of the log folder and resolution is retried once.
pub fn resolve_or_fetch(
    log_folder: &Path,
    algo: Algo,
    env_id: &str,
    exp_id: Option<u32>,
    selection: &ModelSelection,
    hub: Option<&dyn ModelHub>,
) -> Result<ResolvedModel> {
    match (
        resolve_model_path(log_folder, algo, env_id, exp_id, selection),
        hub,
    ) {
        (Ok(resolved), _) => Ok(resolved),
        (Err(err), Some(hub)) => {
            warn!(error = %err, "Pretrained model not found locally, trying the model hub");
            let dest_dir = log_folder.join(algo.as_str()).join(format!("{env_id}_1"));
            hub.fetch(algo, env_id, &dest_dir)
                .context("Hub fetch failed")?;
            resolve_model_path(log_folder, algo, env_id, exp_id, selection)
                .context("Model still unresolvable after hub fetch")
        }
        (Err(err), None) => Err(err.into()),
    }
}

/// Resolve (with optional hub fallback), load, and consistency-check a
/// saved model.
pub fn load_model(
    log_folder: &Path,
    algo: Algo,
    env_id: &str,
    exp_id: Option<u32>,
    selection: &ModelSelection,
    hub: Option<&dyn ModelHub>,
) -> Result<(SavedModel, ResolvedModel)> {
    let resolved = resolve_or_fetch(log_folder, algo, env_id, exp_id, selection, hub)?;
    info!(path = %resolved.model_path.display(), "Loading model");
    let model = SavedModel::load_from_file(&resolved.model_path)?;
    model.ensure_matches(algo, env_id)?;
    Ok((model, resolved))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV: &str = "GraspStageTwo-v1";

    fn saved_model() -> SavedModel {
        SavedModel {
            algo: Algo::Sac,
            env_id: ENV.to_string(),
            timesteps: 1_000_000,
            saved_at: Utc::now(),
            hyperparameters: serde_json::json!({"learning_rate": 3e-4}),
            policy: serde_json::json!({"weights": "opaque"}),
        }
    }

    fn scaffold(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("grasplab_loader_{name}"));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn save_load_round_trip() {
        let root = scaffold("roundtrip");
        let path = root.join("model.json");

        let model = saved_model();
        model.save_to_file(&path).unwrap();
        let loaded = SavedModel::load_from_file(&path).unwrap();
        assert_eq!(loaded, model);

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn consistency_check_rejects_mismatches() {
        let model = saved_model();
        model.ensure_matches(Algo::Sac, ENV).unwrap();
        assert!(model.ensure_matches(Algo::Ppo, ENV).is_err());
        assert!(model.ensure_matches(Algo::Sac, "Other-v0").is_err());
    }

    #[test]
    fn hub_fallback_fetches_and_resolves() {
        let logs = scaffold("fallback_logs");
        let mirror = scaffold("fallback_mirror");

        // Populate the mirror, leave the log folder empty.
        let mirror_algo = mirror.join("sac");
        fs::create_dir_all(&mirror_algo).unwrap();
        saved_model()
            .save_to_file(mirror_algo.join(format!("{ENV}.json")))
            .unwrap();

        let hub = LocalHub::new(&mirror);
        let (model, resolved) = load_model(
            &logs,
            Algo::Sac,
            ENV,
            None,
            &ModelSelection::default(),
            Some(&hub),
        )
        .unwrap();

        assert_eq!(model.env_id, ENV);
        assert_eq!(resolved.run_id, 1);
        assert!(resolved.model_path.starts_with(&logs));

        fs::remove_dir_all(logs).ok();
        fs::remove_dir_all(mirror).ok();
    }

    #[test]
    fn local_miss_without_hub_propagates() {
        let logs = scaffold("nohub");
        let err = load_model(
            &logs,
            Algo::Sac,
            ENV,
            None,
            &ModelSelection::default(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no experiment runs"));
        fs::remove_dir_all(logs).ok();
    }
}
