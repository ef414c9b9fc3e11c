//! Recorded trajectory files: parallel per-step arrays plus a valid count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ReplayError;
use super::transition::{GoalObservation, Transition};

/// One recorded episode (or recording session), stored as parallel arrays
/// indexed by timestep.
///
/// Only the first `valid_count` entries of each array are populated;
/// anything beyond that is recording scratch space and must not be read.
/// [`TrajectoryRecord::validate`] checks the declared count against every
/// array before the rebuilder touches the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// The environment id this episode was recorded in.
    pub env_id: String,
    /// UTC timestamp of the recording.
    pub recorded_at: DateTime<Utc>,
    /// Number of leading entries of each array that are populated.
    pub valid_count: usize,
    /// Goal-structured observations, one per step.
    pub observations: Vec<GoalObservation>,
    /// Observations after each step's action.
    pub next_observations: Vec<GoalObservation>,
    /// Actions, one per step.
    pub actions: Vec<Vec<f32>>,
    /// Rewards, one per step.
    pub rewards: Vec<f32>,
    /// Done flags, one per step.
    pub dones: Vec<bool>,
    /// Auxiliary info maps, one per step.
    pub infos: Vec<serde_json::Value>,
}

impl TrajectoryRecord {
    /// Create an empty record for the given environment, stamped now.
    pub fn new(env_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            env_id: env_id.into(),
            recorded_at: Utc::now(),
            valid_count: 0,
            observations: Vec::new(),
            next_observations: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            dones: Vec::new(),
            infos: Vec::new(),
        }
    }

    /// Append one step to every parallel array and bump `valid_count`.
    pub fn push_step(
        &mut self,
        observation: GoalObservation,
        next_observation: GoalObservation,
        action: Vec<f32>,
        reward: f32,
        done: bool,
        info: serde_json::Value,
    ) {
        self.observations.push(observation);
        self.next_observations.push(next_observation);
        self.actions.push(action);
        self.rewards.push(reward);
        self.dones.push(done);
        self.infos.push(info);
        self.valid_count += 1;
    }

    /// Check that `valid_count` does not exceed any parallel array.
    ///
    /// The rebuilder runs this before inserting anything from the record,
    /// so a malformed file fails up front instead of mid-insertion.
    pub fn validate(&self) -> Result<(), ReplayError> {
        let arrays: [(&'static str, usize); 6] = [
            ("observations", self.observations.len()),
            ("next_observations", self.next_observations.len()),
            ("actions", self.actions.len()),
            ("rewards", self.rewards.len()),
            ("dones", self.dones.len()),
            ("infos", self.infos.len()),
        ];
        for (array, available) in arrays {
            if self.valid_count > available {
                return Err(ReplayError::ValidCountOutOfRange {
                    id: self.id.clone(),
                    array,
                    declared: self.valid_count,
                    available,
                });
            }
        }
        Ok(())
    }

    /// The goal-conditioned transition at step `index`.
    ///
    /// Callers must have validated the record; `index` must be below
    /// `valid_count`.
    pub fn goal_transition(&self, index: usize) -> Transition<GoalObservation> {
        Transition {
            observation: self.observations[index].clone(),
            next_observation: self.next_observations[index].clone(),
            action: self.actions[index].clone(),
            reward: self.rewards[index],
            done: self.dones[index],
            info: self.infos[index].clone(),
        }
    }

    /// The flat-observation transition at step `index`, sharing the same
    /// action/reward/done/info values as [`goal_transition`].
    ///
    /// [`goal_transition`]: TrajectoryRecord::goal_transition
    pub fn plain_transition(&self, index: usize) -> Transition<Vec<f32>> {
        Transition {
            observation: self.observations[index].flat().to_vec(),
            next_observation: self.next_observations[index].flat().to_vec(),
            action: self.actions[index].clone(),
            reward: self.rewards[index],
            done: self.dones[index],
            info: self.infos[index].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(v: f32) -> GoalObservation {
        GoalObservation {
            observation: vec![v, v + 0.5],
            achieved_goal: vec![v],
            desired_goal: vec![1.0],
        }
    }

    fn record_with_steps(n: usize) -> TrajectoryRecord {
        let mut record = TrajectoryRecord::new("GraspStageTwo-v1");
        for i in 0..n {
            let v = i as f32;
            record.push_step(
                obs(v),
                obs(v + 1.0),
                vec![0.0; 6],
                -1.0,
                i == n - 1,
                serde_json::json!({}),
            );
        }
        record
    }

    #[test]
    fn push_step_keeps_arrays_parallel() {
        let record = record_with_steps(4);
        assert_eq!(record.valid_count, 4);
        assert_eq!(record.observations.len(), 4);
        assert_eq!(record.infos.len(), 4);
        record.validate().unwrap();
    }

    #[test]
    fn validate_rejects_overdeclared_count() {
        let mut record = record_with_steps(3);
        record.valid_count = 10;
        let err = record.validate().unwrap_err();
        match err {
            ReplayError::ValidCountOutOfRange {
                declared,
                available,
                array,
                ..
            } => {
                assert_eq!(declared, 10);
                assert_eq!(available, 3);
                assert_eq!(array, "observations");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_checks_every_array() {
        let mut record = record_with_steps(3);
        // A recording bug that truncated only the rewards array.
        record.rewards.pop();
        let err = record.validate().unwrap_err();
        assert!(matches!(
            err,
            ReplayError::ValidCountOutOfRange { array: "rewards", .. }
        ));
    }

    #[test]
    fn paired_transitions_share_step_values() {
        let record = record_with_steps(2);
        let goal = record.goal_transition(1);
        let plain = record.plain_transition(1);
        assert_eq!(goal.action, plain.action);
        assert_eq!(goal.reward, plain.reward);
        assert_eq!(goal.done, plain.done);
        assert_eq!(goal.info, plain.info);
        assert_eq!(goal.observation.flat(), plain.observation.as_slice());
    }
}
