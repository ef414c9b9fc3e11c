use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete configuration for the GraspLab tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraspLabConfig {
    /// Folder holding experiment runs (default: "rl-trained-agents").
    pub log_folder: PathBuf,
    /// Local mirror of the pretrained-model hub; when set, model loading
    /// falls back to it on a local miss (default: unset).
    pub hub_mirror: Option<PathBuf>,
    /// Seed for every in-process RNG, e.g. buffer sampling (default: 0).
    pub seed: u64,
    pub rebuild: RebuildConfig,
    pub harness: HarnessConfig,
}

/// Replay-buffer reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildConfig {
    /// Capacity of both rebuilt buffers (default: 50000). Size this to the
    /// recorded transition total, or the oldest entries are overwritten.
    pub capacity: usize,
    /// Directory of recorded trajectory files (default: "data/recordings").
    pub input_dir: PathBuf,
    /// Output path of the goal-conditioned buffer artifact
    /// (default: "data/replay_buffer.json").
    pub goal_output: PathBuf,
    /// Output path of the plain buffer artifact
    /// (default: "data/plain_replay_buffer.json").
    pub plain_output: PathBuf,
    /// Environment whose spaces size the buffer slots
    /// (default: "GraspStageThree-v1").
    pub env_id: String,
}

/// Debug-harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Symmetric bound of the pose/orientation sliders (default: 1.0).
    pub slider_limit: f32,
    /// Number of grasp-angle slider channels (default: 2).
    pub grasp_sliders: usize,
}

impl Default for GraspLabConfig {
    fn default() -> Self {
        Self {
            log_folder: PathBuf::from("rl-trained-agents"),
            hub_mirror: None,
            seed: 0,
            rebuild: RebuildConfig {
                capacity: 50_000,
                input_dir: PathBuf::from("data/recordings"),
                goal_output: PathBuf::from("data/replay_buffer.json"),
                plain_output: PathBuf::from("data/plain_replay_buffer.json"),
                env_id: "GraspStageThree-v1".to_string(),
            },
            harness: HarnessConfig {
                slider_limit: 1.0,
                grasp_sliders: 2,
            },
        }
    }
}
