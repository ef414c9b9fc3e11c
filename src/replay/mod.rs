//! Replay-buffer reconstruction from recorded trajectories.
//!
//! Recorded grasp episodes are replayed, transition by transition, into a
//! pair of fixed-capacity ring buffers -- one goal-conditioned (the dict
//! observation layout goal-relabeling trainers expect) and one plain (the
//! flat observation component only) -- and both are serialized for later
//! training runs to resume from.
//!
//! The pipeline is a single synchronous pass:
//!
//! ```text
//! TrajectorySource -> ReplayRebuilder -> {GoalReplayBuffer, PlainReplayBuffer} -> JSON artifacts
//! ```
//!
//! Every step of a record is inserted into *both* buffers with identical
//! action/reward/done/info values; after a rebuild the two buffers describe
//! the same transition sequence and differ only in observation shape.

pub mod buffer;
pub mod error;
pub mod rebuild;
pub mod record;
pub mod source;
pub mod transition;

pub use buffer::{GoalReplayBuffer, PlainReplayBuffer, ReplayBuffer};
pub use error::ReplayError;
pub use rebuild::{RebuildSummary, ReplayRebuilder};
pub use record::TrajectoryRecord;
pub use source::TrajectorySource;
pub use transition::{GoalObservation, Transition};
