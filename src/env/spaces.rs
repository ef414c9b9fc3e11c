//! Observation and action space descriptors.
//!
//! The simulator owns the real spaces; what the rest of the tooling needs
//! is shape metadata -- the replay-buffer allocator sizes its slots from
//! these descriptors, and the debug harness checks its action layout
//! against them.

use serde::{Deserialize, Serialize};

/// A box-shaped continuous space with uniform scalar bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    /// Shape of the space (one entry per axis).
    pub shape: Vec<usize>,
    /// Lower bound applied to every element.
    pub low: f32,
    /// Upper bound applied to every element.
    pub high: f32,
}

impl BoxSpace {
    /// A flat 1-D box of `dim` elements bounded by `[low, high]`.
    pub fn flat(dim: usize, low: f32, high: f32) -> Self {
        Self {
            shape: vec![dim],
            low,
            high,
        }
    }

    /// Total number of scalar elements in the space.
    pub fn flat_dim(&self) -> usize {
        self.shape.iter().product()
    }
}

/// A goal-structured observation space: the dict layout used by
/// goal-relabeling replay buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpace {
    /// The proprioceptive/scene observation component.
    pub observation: BoxSpace,
    /// The goal actually achieved at the current step.
    pub achieved_goal: BoxSpace,
    /// The goal the episode is asked to reach.
    pub desired_goal: BoxSpace,
}

impl GoalSpace {
    /// Flat element count of the observation component only.
    ///
    /// This is the slot size of the plain (non-goal) replay buffer.
    pub fn observation_dim(&self) -> usize {
        self.observation.flat_dim()
    }

    /// Flat element count across all three components.
    pub fn total_dim(&self) -> usize {
        self.observation.flat_dim()
            + self.achieved_goal.flat_dim()
            + self.desired_goal.flat_dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_dim_multiplies_axes() {
        let space = BoxSpace {
            shape: vec![3, 4],
            low: -1.0,
            high: 1.0,
        };
        assert_eq!(space.flat_dim(), 12);
        assert_eq!(BoxSpace::flat(6, -1.0, 1.0).flat_dim(), 6);
    }

    #[test]
    fn goal_space_dims() {
        let space = GoalSpace {
            observation: BoxSpace::flat(25, -f32::INFINITY, f32::INFINITY),
            achieved_goal: BoxSpace::flat(3, -2.0, 2.0),
            desired_goal: BoxSpace::flat(3, -2.0, 2.0),
        };
        assert_eq!(space.observation_dim(), 25);
        assert_eq!(space.total_dim(), 31);
    }
}
