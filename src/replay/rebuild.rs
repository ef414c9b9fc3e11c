//! Rebuilding the replay-buffer pair from a directory of recordings.

use std::path::Path;

use tracing::info;

use crate::env::{BoxSpace, GoalSpace};

use super::buffer::{GoalReplayBuffer, PlainReplayBuffer, ReplayBuffer};
use super::error::ReplayError;
use super::source::TrajectorySource;

/// What a rebuild run processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Number of record files replayed.
    pub records: usize,
    /// Total transitions inserted (into each buffer).
    pub transitions: u64,
}

/// Replays recorded trajectories into a goal-conditioned and a plain
/// replay buffer.
///
/// Both buffers are allocated with the same capacity, so a given logical
/// transition occupies the same relative slot in each. Every step is
/// inserted into both buffers with identical action/reward/done/info
/// values; the two differ only in observation representation. Callers size
/// `capacity` to the known transition total, or accept that the oldest
/// entries are overwritten.
#[derive(Debug, Clone)]
pub struct ReplayRebuilder {
    capacity: usize,
    observation_space: GoalSpace,
    action_space: BoxSpace,
}

impl ReplayRebuilder {
    /// Create a rebuilder for the given capacity and environment spaces.
    pub fn new(
        capacity: usize,
        observation_space: GoalSpace,
        action_space: BoxSpace,
    ) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            observation_space,
            action_space,
        })
    }

    /// Allocate the empty buffer pair this rebuilder fills.
    fn allocate(&self) -> (GoalReplayBuffer, PlainReplayBuffer) {
        let goal = ReplayBuffer::new(
            self.capacity,
            self.observation_space.total_dim(),
            self.action_space.flat_dim(),
        );
        let plain = ReplayBuffer::new(
            self.capacity,
            self.observation_space.observation_dim(),
            self.action_space.flat_dim(),
        );
        (goal, plain)
    }

    /// Replay every record in the source, in sorted order, into a fresh
    /// buffer pair.
    ///
    /// Each record is validated before any of its transitions are
    /// inserted. Any failure aborts the run and discards the partial
    /// buffers.
    pub fn rebuild(
        &self,
        source: &TrajectorySource,
    ) -> Result<(GoalReplayBuffer, PlainReplayBuffer), ReplayError> {
        let entries = source.entries()?;
        let (mut goal, mut plain) = self.allocate();

        let mut counter = 0usize;
        for path in &entries {
            counter += 1;
            let record = TrajectorySource::load(path)?;
            record.validate()?;

            info!(
                record = counter,
                total = entries.len(),
                path = %path.display(),
                steps = record.valid_count,
                "Replaying record"
            );

            for i in 0..record.valid_count {
                // Paired insert: same step values into both buffers.
                goal.add(record.goal_transition(i));
                plain.add(record.plain_transition(i));
            }
        }

        info!(
            records = counter,
            transitions = goal.total_inserted(),
            retained = goal.len(),
            capacity = self.capacity,
            "Rebuild complete"
        );
        Ok((goal, plain))
    }

    /// Rebuild and persist both buffers.
    ///
    /// Nothing is written unless the whole rebuild succeeds; existing
    /// files at the output paths are overwritten.
    pub fn rebuild_to_files(
        &self,
        source: &TrajectorySource,
        goal_path: impl AsRef<Path>,
        plain_path: impl AsRef<Path>,
    ) -> Result<RebuildSummary, ReplayError> {
        let entries = source.entries()?;
        let (goal, plain) = self.rebuild(source)?;

        goal.save_to_file(goal_path)?;
        plain.save_to_file(plain_path)?;

        Ok(RebuildSummary {
            records: entries.len(),
            transitions: goal.total_inserted(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::replay::record::TrajectoryRecord;
    use crate::replay::transition::GoalObservation;

    fn spaces() -> (GoalSpace, BoxSpace) {
        (
            GoalSpace {
                observation: BoxSpace::flat(2, -f32::INFINITY, f32::INFINITY),
                achieved_goal: BoxSpace::flat(1, -2.0, 2.0),
                desired_goal: BoxSpace::flat(1, -2.0, 2.0),
            },
            BoxSpace::flat(6, -1.0, 1.0),
        )
    }

    fn rebuilder(capacity: usize) -> ReplayRebuilder {
        let (observation_space, action_space) = spaces();
        ReplayRebuilder::new(capacity, observation_space, action_space).unwrap()
    }

    fn obs(v: f32) -> GoalObservation {
        GoalObservation {
            observation: vec![v, v + 0.5],
            achieved_goal: vec![v],
            desired_goal: vec![1.0],
        }
    }

    fn record_with_steps(base: f32, n: usize) -> TrajectoryRecord {
        let mut record = TrajectoryRecord::new("GraspStageTwo-v1");
        for i in 0..n {
            let v = base + i as f32;
            record.push_step(
                obs(v),
                obs(v + 1.0),
                vec![v; 6],
                v,
                i == n - 1,
                serde_json::json!({ "step": i }),
            );
        }
        record
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("grasplab_rebuild_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_record(dir: &std::path::Path, name: &str, record: &TrajectoryRecord) {
        fs::write(dir.join(name), serde_json::to_string(record).unwrap()).unwrap();
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let (observation_space, action_space) = spaces();
        let err = ReplayRebuilder::new(0, observation_space, action_space).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidCapacity));
    }

    #[test]
    fn rebuild_counts_match_recordings() {
        let dir = temp_dir("counts");
        write_record(&dir, "000.json", &record_with_steps(0.0, 3));
        write_record(&dir, "001.json", &record_with_steps(10.0, 4));

        let source = TrajectorySource::new(&dir);
        let (goal, plain) = rebuilder(100).rebuild(&source).unwrap();

        assert_eq!(goal.len(), 7);
        assert_eq!(plain.len(), 7);
        assert_eq!(goal.total_inserted(), 7);
        assert_eq!(plain.total_inserted(), 7);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn pairing_and_projection_invariants() {
        let dir = temp_dir("pairing");
        write_record(&dir, "000.json", &record_with_steps(0.0, 3));
        write_record(&dir, "001.json", &record_with_steps(5.0, 2));

        let source = TrajectorySource::new(&dir);
        let (goal, plain) = rebuilder(100).rebuild(&source).unwrap();

        for i in 0..goal.len() {
            let g = goal.get(i).unwrap();
            let p = plain.get(i).unwrap();
            // Same action/reward/done/info at every index.
            assert_eq!(g.action, p.action);
            assert_eq!(g.reward, p.reward);
            assert_eq!(g.done, p.done);
            assert_eq!(g.info, p.info);
            // Plain observation equals the goal buffer's observation component.
            assert_eq!(g.observation.flat(), p.observation.as_slice());
            assert_eq!(g.next_observation.flat(), p.next_observation.as_slice());
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn single_record_replayed_in_order() {
        let dir = temp_dir("order");
        write_record(&dir, "000.json", &record_with_steps(0.0, 3));

        let source = TrajectorySource::new(&dir);
        let (goal, plain) = rebuilder(100).rebuild(&source).unwrap();

        assert_eq!(goal.total_inserted(), 3);
        let rewards: Vec<f32> = plain.iter().map(|t| t.reward).collect();
        assert_eq!(rewards, vec![0.0, 1.0, 2.0]);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn records_replayed_in_file_name_order() {
        let dir = temp_dir("file_order");
        // Written out of order; file names decide replay order.
        write_record(&dir, "001.json", &record_with_steps(10.0, 1));
        write_record(&dir, "000.json", &record_with_steps(0.0, 1));

        let source = TrajectorySource::new(&dir);
        let (_, plain) = rebuilder(100).rebuild(&source).unwrap();

        let rewards: Vec<f32> = plain.iter().map(|t| t.reward).collect();
        assert_eq!(rewards, vec![0.0, 10.0]);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn overflow_keeps_most_recent_capacity_transitions() {
        let dir = temp_dir("overflow");
        write_record(&dir, "000.json", &record_with_steps(0.0, 3));

        let source = TrajectorySource::new(&dir);
        let (goal, plain) = rebuilder(2).rebuild(&source).unwrap();

        // Capacity 2, valid_count 3: step 0 evicted, steps 1 and 2 remain.
        assert_eq!(goal.len(), 2);
        assert_eq!(goal.total_inserted(), 3);
        let rewards: Vec<f32> = plain.iter().map(|t| t.reward).collect();
        assert_eq!(rewards, vec![1.0, 2.0]);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn overdeclared_record_aborts_without_output() {
        let dir = temp_dir("abort");
        let mut bad = record_with_steps(0.0, 3);
        bad.valid_count = 10;
        write_record(&dir, "000.json", &bad);

        let out = temp_dir("abort_out");
        let goal_path = out.join("replay_buffer.json");
        let plain_path = out.join("plain_replay_buffer.json");

        let source = TrajectorySource::new(&dir);
        let err = rebuilder(100)
            .rebuild_to_files(&source, &goal_path, &plain_path)
            .unwrap_err();

        assert!(matches!(err, ReplayError::ValidCountOutOfRange { .. }));
        assert!(!goal_path.exists());
        assert!(!plain_path.exists());

        fs::remove_dir_all(dir).ok();
        fs::remove_dir_all(out).ok();
    }

    #[test]
    fn rebuild_to_files_persists_loadable_buffers() {
        let dir = temp_dir("persist");
        write_record(&dir, "000.json", &record_with_steps(0.0, 2));

        let out = temp_dir("persist_out");
        let goal_path = out.join("replay_buffer.json");
        let plain_path = out.join("plain_replay_buffer.json");

        let source = TrajectorySource::new(&dir);
        let summary = rebuilder(100)
            .rebuild_to_files(&source, &goal_path, &plain_path)
            .unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.transitions, 2);

        let goal = GoalReplayBuffer::load_from_file(&goal_path).unwrap();
        let plain = PlainReplayBuffer::load_from_file(&plain_path).unwrap();
        assert_eq!(goal.len(), 2);
        assert_eq!(plain.len(), 2);

        fs::remove_dir_all(dir).ok();
        fs::remove_dir_all(out).ok();
    }
}
