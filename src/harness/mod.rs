//! Slider-driven debug harness for manually posing the gripper.
//!
//! The physics simulator exposes a registry of user-debug parameters
//! (sliders and buttons drawn next to the render window). The harness
//! talks to that registry through the [`ControlPanel`] trait and keeps all
//! the returned handles inside an explicit [`DebugSession`] -- there is no
//! ambient simulator state on this side of the seam.
//!
//! Rendering and physics stepping stay in the simulator; a
//! [`ScriptedPanel`] stands in for it in tests and headless runs.

pub mod panel;
pub mod session;

pub use panel::{ControlPanel, ParamHandle, ScriptedPanel};
pub use session::{DebugSession, RunSummary, SessionStep};
