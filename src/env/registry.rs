//! Environment spec registry.
//!
//! The simulator loads environment classes by entry point; everything on
//! this side only needs the registration metadata (episode limits and the
//! space shapes). The registry is an explicit value passed to whoever
//! needs it -- there is no process-wide registration table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::spaces::{BoxSpace, GoalSpace};

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An environment id was registered twice.
    #[error("environment {0:?} is already registered")]
    Duplicate(String),
    /// A lookup referenced an id that was never registered.
    #[error("unknown environment {0:?} (run `grasplab envs` for the registered ids)")]
    Unknown(String),
}

/// Registration metadata for one simulation environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSpec {
    /// The environment id, e.g. `"GraspStageTwo-v1"`.
    pub id: String,
    /// Entry point the simulator resolves to an environment class,
    /// e.g. `"simulations.stage_two_grasp_env:StageTwoGraspEnv"`.
    pub entry_point: String,
    /// Hard episode-step limit enforced by the simulator.
    pub max_episode_steps: usize,
    /// Mean episode reward above which the task counts as solved.
    pub reward_threshold: f32,
    /// Goal-structured observation space.
    pub observation_space: GoalSpace,
    /// Continuous action space.
    pub action_space: BoxSpace,
}

/// An explicit, ordered registry of environment specs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvRegistry {
    specs: BTreeMap<String, EnvSpec>,
}

impl EnvRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec. Ids must be unique.
    pub fn register(&mut self, spec: EnvSpec) -> Result<(), RegistryError> {
        if self.specs.contains_key(&spec.id) {
            return Err(RegistryError::Duplicate(spec.id));
        }
        self.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    /// Look up a spec by id.
    pub fn get(&self, id: &str) -> Result<&EnvSpec, RegistryError> {
        self.specs
            .get(id)
            .ok_or_else(|| RegistryError::Unknown(id.to_string()))
    }

    /// All registered ids, in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// All registered specs, in id order.
    pub fn specs(&self) -> impl Iterator<Item = &EnvSpec> {
        self.specs.values()
    }

    /// Number of registered environments.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Default environment set
// ---------------------------------------------------------------------------

/// Observation/action spaces shared by the staged grasping environments.
///
/// Observation: proprioception + scene state; goals: object position.
/// Action: hand pose (x, y, z), wrist roll, and two grasp-angle channels.
fn grasp_spaces(observation_dim: usize) -> (GoalSpace, BoxSpace) {
    let observation_space = GoalSpace {
        observation: BoxSpace::flat(observation_dim, -f32::INFINITY, f32::INFINITY),
        achieved_goal: BoxSpace::flat(3, -2.0, 2.0),
        desired_goal: BoxSpace::flat(3, -2.0, 2.0),
    };
    let action_space = BoxSpace::flat(6, -1.0, 1.0);
    (observation_space, action_space)
}

fn grasp_spec(id: &str, entry_point: &str, observation_dim: usize) -> EnvSpec {
    let (observation_space, action_space) = grasp_spaces(observation_dim);
    EnvSpec {
        id: id.to_string(),
        entry_point: entry_point.to_string(),
        max_episode_steps: 5000,
        reward_threshold: 2000.0,
        observation_space,
        action_space,
    }
}

/// Build the registry of all grasping environments this project ships.
///
/// Stage-two tasks approach and close on a fixed object; stage-three tasks
/// add object variation and the richer contact observation.
pub fn default_registry() -> EnvRegistry {
    let mut registry = EnvRegistry::new();

    let stage_two = [
        ("GraspStageTwo-v1", "simulations.stage_two_grasp_env:StageTwoGraspEnv"),
        ("GraspStageTwo-v2", "simulations.stage_two_grasp_env_v2:StageTwoGraspEnv"),
        ("GraspStageTwo-v3", "simulations.stage_two_grasp_env_v3:StageTwoGraspEnv"),
        ("GraspStageTwo-v4", "simulations.stage_two_grasp_env_v4:StageTwoGraspEnv"),
        ("GraspStageTwo-v5", "simulations.stage_two_grasp_env_v5:StageTwoGraspEnv"),
    ];
    let stage_three = [
        ("GraspStageThree-v1", "simulations.stage_three_grasp_env:StageThreeGraspEnv"),
        ("GraspStageThree-v2", "simulations.stage_three_grasp_env_v2:StageThreeGraspEnv"),
        ("GraspStageThree-v3", "simulations.stage_three_grasp_env_v3:StageThreeGraspEnv"),
        ("GraspStageThree-v4", "simulations.stage_three_grasp_env_v4:StageThreeGraspEnv"),
        ("GraspStageThree-v5", "simulations.stage_three_grasp_env_v5:StageThreeGraspEnv"),
    ];

    for (id, entry) in stage_two {
        registry
            .register(grasp_spec(id, entry, 25))
            .expect("default registry ids are unique");
    }
    for (id, entry) in stage_three {
        registry
            .register(grasp_spec(id, entry, 31))
            .expect("default registry ids are unique");
    }
    // Parallel-jaw variant of the stage-two task.
    registry
        .register(grasp_spec(
            "ParallelJawStageTwo-v1",
            "simulations.stage_two_paralleljaw_env:StageTwoParallelJawEnv",
            25,
        ))
        .expect("default registry ids are unique");

    registry
}
