//! Fixed-capacity ring replay buffers.

use std::path::Path;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ReplayError;
use super::transition::{GoalObservation, Transition};

/// A fixed-capacity circular replay buffer, generic over the observation
/// representation.
///
/// Storage is pre-allocated at construction and never grows past
/// `capacity`; once full, each insert overwrites the oldest entry. The
/// write cursor and the lifetime insert count are part of the buffer state
/// and survive serialization, so a persisted buffer can be resumed or
/// inspected later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "O: Serialize + DeserializeOwned")]
pub struct ReplayBuffer<O> {
    capacity: usize,
    /// Flat element count of one observation slot.
    observation_dim: usize,
    /// Flat element count of one action slot.
    action_dim: usize,
    transitions: Vec<Transition<O>>,
    /// Next slot to write.
    pos: usize,
    /// Lifetime number of inserts, including overwritten ones.
    total_inserted: u64,
}

/// Buffer storing goal-structured observations.
pub type GoalReplayBuffer = ReplayBuffer<GoalObservation>;

/// Buffer storing only the flat observation component.
pub type PlainReplayBuffer = ReplayBuffer<Vec<f32>>;

impl<O> ReplayBuffer<O>
where
    O: Clone + Serialize + DeserializeOwned,
{
    /// Create an empty buffer sized for `capacity` transitions.
    ///
    /// `observation_dim` and `action_dim` come from the environment's
    /// space descriptors and size one slot; they are kept in the buffer
    /// state for inspection. Capacity must be positive.
    pub fn new(capacity: usize, observation_dim: usize, action_dim: usize) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be positive");
        Self {
            capacity,
            observation_dim,
            action_dim,
            transitions: Vec::with_capacity(capacity),
            pos: 0,
            total_inserted: 0,
        }
    }

    /// Insert one transition, overwriting the oldest entry when full.
    pub fn add(&mut self, transition: Transition<O>) {
        if self.transitions.len() < self.capacity {
            self.transitions.push(transition);
        } else {
            self.transitions[self.pos] = transition;
        }
        self.pos = (self.pos + 1) % self.capacity;
        self.total_inserted += 1;
    }

    /// Number of transitions currently stored.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether the buffer holds no transitions.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Whether the buffer has reached capacity (inserts now evict).
    pub fn is_full(&self) -> bool {
        self.transitions.len() == self.capacity
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The slot the next insert will write.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Lifetime insert count, including entries already evicted.
    pub fn total_inserted(&self) -> u64 {
        self.total_inserted
    }

    /// Flat element count of one observation slot.
    pub fn observation_dim(&self) -> usize {
        self.observation_dim
    }

    /// Flat element count of one action slot.
    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Storage slot holding logical index `i`. Caller ensures `i < len()`.
    fn slot_of(&self, i: usize) -> usize {
        if self.is_full() {
            (self.pos + i) % self.capacity
        } else {
            i
        }
    }

    /// The stored transition at logical index `i`, oldest first.
    ///
    /// Index 0 is the oldest transition still retained; `len() - 1` the
    /// most recent.
    pub fn get(&self, i: usize) -> Option<&Transition<O>> {
        if i >= self.transitions.len() {
            return None;
        }
        Some(&self.transitions[self.slot_of(i)])
    }

    /// Iterate the retained transitions oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition<O>> {
        // Before the first wrap `pos == len`, so `newer` is the whole
        // storage and `older` is empty; after it, `older` starts at `pos`.
        let (newer, older) = self.transitions.split_at(self.pos.min(self.transitions.len()));
        older.iter().chain(newer.iter())
    }

    /// Sample `batch_size` transitions uniformly with replacement.
    ///
    /// Returns `None` while the buffer is empty.
    pub fn sample<'a, R: Rng>(
        &'a self,
        rng: &mut R,
        batch_size: usize,
    ) -> Option<Vec<&'a Transition<O>>> {
        if self.is_empty() {
            return None;
        }
        let batch = (0..batch_size)
            .map(|_| {
                let i = rng.gen_range(0..self.len());
                &self.transitions[self.slot_of(i)]
            })
            .collect();
        Some(batch)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the full buffer state to a JSON file.
    ///
    /// Existing files are overwritten. The write is not atomic; a failure
    /// mid-write can leave a truncated artifact behind.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self).map_err(|source| ReplayError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            transitions = self.len(),
            total_inserted = self.total_inserted,
            "Saved replay buffer"
        );
        Ok(())
    }

    /// Deserialize a buffer previously written by [`save_to_file`].
    ///
    /// [`save_to_file`]: ReplayBuffer::save_to_file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ReplayError::Deserialize {
            path: path.to_path_buf(),
            source,
        })
    }
}
