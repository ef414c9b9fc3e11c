//! The closed set of RL algorithms this tooling knows how to work with.
//!
//! Model artifacts are filed on disk under the algorithm's short key
//! (`rl-trained-agents/sac/...`), so every entry point that accepts an
//! algorithm name parses it through [`Algo`] and rejects unknown keys up
//! front instead of failing deep inside path resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an algorithm key is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported algorithm {key:?} (expected one of: {keys})", keys = Algo::keys().join(", "))]
pub struct UnsupportedAlgorithm {
    /// The key that failed to parse.
    pub key: String,
}

/// The supported RL algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algo {
    A2c,
    Ddpg,
    Dqn,
    Her,
    Ppo,
    Qrdqn,
    Sac,
    Td3,
    Tqc,
}

impl Algo {
    /// The short key used in paths, configs, and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A2c => "a2c",
            Self::Ddpg => "ddpg",
            Self::Dqn => "dqn",
            Self::Her => "her",
            Self::Ppo => "ppo",
            Self::Qrdqn => "qrdqn",
            Self::Sac => "sac",
            Self::Td3 => "td3",
            Self::Tqc => "tqc",
        }
    }

    /// All supported algorithms, in key order.
    pub fn all() -> &'static [Algo] {
        &[
            Self::A2c,
            Self::Ddpg,
            Self::Dqn,
            Self::Her,
            Self::Ppo,
            Self::Qrdqn,
            Self::Sac,
            Self::Td3,
            Self::Tqc,
        ]
    }

    /// All supported keys, in key order.
    pub fn keys() -> Vec<&'static str> {
        Self::all().iter().map(Algo::as_str).collect()
    }

    /// Whether the algorithm trains off-policy (and therefore owns a replay
    /// buffer and supports a single environment at a time).
    pub fn is_off_policy(&self) -> bool {
        matches!(
            self,
            Self::Ddpg | Self::Dqn | Self::Her | Self::Qrdqn | Self::Sac | Self::Td3 | Self::Tqc
        )
    }
}

impl fmt::Display for Algo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algo {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a2c" => Ok(Self::A2c),
            "ddpg" => Ok(Self::Ddpg),
            "dqn" => Ok(Self::Dqn),
            "her" => Ok(Self::Her),
            "ppo" => Ok(Self::Ppo),
            "qrdqn" => Ok(Self::Qrdqn),
            "sac" => Ok(Self::Sac),
            "td3" => Ok(Self::Td3),
            "tqc" => Ok(Self::Tqc),
            _ => Err(UnsupportedAlgorithm { key: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_keys() {
        for algo in Algo::all() {
            assert_eq!(algo.as_str().parse::<Algo>().unwrap(), *algo);
        }
        // Parsing is case-insensitive.
        assert_eq!("SAC".parse::<Algo>().unwrap(), Algo::Sac);
    }

    #[test]
    fn reject_unknown_key() {
        let err = "alphazero".parse::<Algo>().unwrap_err();
        assert_eq!(err.key, "alphazero");
        assert!(err.to_string().contains("sac"));
    }

    #[test]
    fn off_policy_partition() {
        assert!(Algo::Sac.is_off_policy());
        assert!(Algo::Tqc.is_off_policy());
        assert!(!Algo::Ppo.is_off_policy());
        assert!(!Algo::A2c.is_off_policy());
    }

    #[test]
    fn serde_uses_short_keys() {
        let json = serde_json::to_string(&Algo::Qrdqn).unwrap();
        assert_eq!(json, "\"qrdqn\"");
        let back: Algo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Algo::Qrdqn);
    }
}
