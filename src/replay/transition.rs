//! Transition types: one timestep of recorded experience.

use serde::{Deserialize, Serialize};

/// The goal-structured observation produced by the grasping environments.
///
/// `achieved_goal` and `desired_goal` carry the object position actually
/// reached and the one requested for the episode; goal-relabeling trainers
/// recompute rewards from the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalObservation {
    /// Proprioceptive/scene observation.
    pub observation: Vec<f32>,
    /// Goal achieved at this step.
    pub achieved_goal: Vec<f32>,
    /// Goal the episode is asked to reach.
    pub desired_goal: Vec<f32>,
}

impl GoalObservation {
    /// The flat observation component, discarding both goals.
    ///
    /// This is the projection stored by the plain replay buffer.
    pub fn flat(&self) -> &[f32] {
        &self.observation
    }
}

/// One step of experience, generic over the observation representation.
///
/// The goal-conditioned buffer stores `Transition<GoalObservation>`, the
/// plain buffer `Transition<Vec<f32>>`; a paired insert uses identical
/// action/reward/done/info values in both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition<O> {
    /// Observation before the action.
    pub observation: O,
    /// Observation after the action.
    pub next_observation: O,
    /// The continuous action taken.
    pub action: Vec<f32>,
    /// Scalar reward for the transition.
    pub reward: f32,
    /// Whether the episode terminated at this step.
    pub done: bool,
    /// Auxiliary environment info (opaque to the pipeline).
    pub info: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_projects_observation_component() {
        let obs = GoalObservation {
            observation: vec![1.0, 2.0],
            achieved_goal: vec![0.5],
            desired_goal: vec![0.9],
        };
        assert_eq!(obs.flat(), &[1.0, 2.0]);
    }

    #[test]
    fn transition_round_trips_through_json() {
        let t = Transition {
            observation: vec![0.0_f32, 1.0],
            next_observation: vec![1.0_f32, 2.0],
            action: vec![0.1; 6],
            reward: -0.25,
            done: false,
            info: serde_json::json!({"is_success": false}),
        };
        let json = serde_json::to_string(&t).unwrap();
        let back: Transition<Vec<f32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
