//! GraspLab: experiment-management tooling for grasp-RL agents.
//!
//! The crate covers the plumbing around a set of robotic-grasping RL
//! experiments: registering the simulation environments, resolving and
//! loading pretrained model artifacts, rebuilding replay buffers from
//! recorded trajectories, and a slider-driven debug harness for manually
//! posing the gripper inside the physics simulator.

pub mod algo;
pub mod config;
pub mod env;
pub mod harness;
pub mod model;
pub mod replay;
