//! Pretrained model artifacts: path resolution and loading.
//!
//! Training runs file their models under the log folder; this module
//! resolves the artifact a caller wants (latest run, best model, a
//! specific checkpoint), loads it, and -- when nothing is found locally --
//! falls back to a [`ModelHub`] collaborator.

pub mod loader;
pub mod paths;

pub use loader::{load_model, resolve_or_fetch, LocalHub, ModelHub, SavedModel};
pub use paths::{latest_run_id, resolve_model_path, ModelError, ModelSelection, ResolvedModel};
