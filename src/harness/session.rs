//! The debug session: slider handles and manual action assembly.

use tracing::{debug, info};

use crate::config::HarnessConfig;

use super::panel::{ControlPanel, ParamHandle};

/// What one poll of the panel produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStep {
    /// The manual action assembled from the sliders:
    /// `[x, y, z, roll, grasp_0, .., grasp_n]`.
    pub action: Vec<f32>,
    /// Whether the reset button was clicked since the last poll.
    pub reset: bool,
}

/// Summary of a bounded harness run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Ticks driven.
    pub ticks: usize,
    /// Reset clicks observed.
    pub resets: usize,
    /// The action assembled on the final tick.
    pub final_action: Vec<f32>,
}

/// A manual-control session over the simulator's debug sliders.
///
/// The session owns every handle it registers: the reset button, the hand
/// pose sliders (x/y/z), the wrist orientation sliders (roll/pitch/yaw),
/// and one slider per grasp-angle channel. Pitch and yaw are registered so
/// the operator can see them, but only roll feeds the action vector.
#[derive(Debug)]
pub struct DebugSession {
    reset_button: ParamHandle,
    latest_reset: f32,
    pose: [ParamHandle; 3],
    orientation: [ParamHandle; 3],
    grasp: Vec<ParamHandle>,
}

impl DebugSession {
    /// Register all sliders on the panel and take ownership of the handles.
    pub fn new(panel: &mut impl ControlPanel, config: &HarnessConfig) -> Self {
        let limit = config.slider_limit;

        // min > max registers a click button in the simulator's registry.
        let reset_button = panel.add_parameter("reset", 1.0, 0.0, 1.0);
        let latest_reset = panel.read_parameter(reset_button);

        let pose = [
            panel.add_parameter("posX", -limit, limit, 0.0),
            panel.add_parameter("posY", -limit, limit, 0.0),
            panel.add_parameter("posZ", -limit, limit, 0.0),
        ];
        let orientation = [
            panel.add_parameter("roll", -limit, limit, 0.0),
            panel.add_parameter("pitch", -limit, limit, 0.0),
            panel.add_parameter("yaw", -limit, limit, 0.0),
        ];
        let grasp = (0..config.grasp_sliders)
            .map(|i| panel.add_parameter(&format!("grasp_angle_{i}"), -1.0, 1.0, 0.0))
            .collect();

        Self {
            reset_button,
            latest_reset,
            pose,
            orientation,
            grasp,
        }
    }

    /// Length of the action vector this session assembles.
    pub fn action_dim(&self) -> usize {
        // x, y, z, roll, then one channel per grasp slider.
        4 + self.grasp.len()
    }

    /// Current grasp-angle slider values.
    pub fn grasp_angles(&self, panel: &impl ControlPanel) -> Vec<f32> {
        self.grasp
            .iter()
            .map(|&h| panel.read_parameter(h))
            .collect()
    }

    /// Read the sliders once and assemble the manual action.
    ///
    /// Reset detection is edge-triggered: `reset` is true only for the
    /// first poll after a click.
    pub fn poll(&mut self, panel: &impl ControlPanel) -> SessionStep {
        let reset_value = panel.read_parameter(self.reset_button);
        let reset = reset_value > self.latest_reset;
        if reset {
            self.latest_reset = reset_value;
        }

        let mut action = Vec::with_capacity(self.action_dim());
        for &h in &self.pose {
            action.push(panel.read_parameter(h));
        }
        action.push(panel.read_parameter(self.orientation[0]));
        action.extend(self.grasp_angles(panel));

        SessionStep { action, reset }
    }

    /// Drive the panel for `ticks` simulation steps.
    pub fn run(&mut self, panel: &mut impl ControlPanel, ticks: usize) -> RunSummary {
        let mut resets = 0;
        let mut final_action = vec![0.0; self.action_dim()];

        for tick in 0..ticks {
            let step = self.poll(panel);
            if step.reset {
                resets += 1;
                info!(tick, "Reset requested");
            }
            debug!(tick, action = ?step.action, "Manual action");
            final_action = step.action;
            panel.step_simulation();
        }

        RunSummary {
            ticks,
            resets,
            final_action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::panel::ScriptedPanel;

    fn config() -> HarnessConfig {
        HarnessConfig {
            slider_limit: 1.0,
            grasp_sliders: 2,
        }
    }

    #[test]
    fn action_layout_is_pose_roll_grasp() {
        let mut panel = ScriptedPanel::new();
        let mut session = DebugSession::new(&mut panel, &config());
        assert_eq!(session.action_dim(), 6);

        panel.set_by_name("posX", 0.1);
        panel.set_by_name("posY", 0.2);
        panel.set_by_name("posZ", 0.3);
        panel.set_by_name("roll", 0.4);
        // Pitch and yaw are visible but do not enter the action.
        panel.set_by_name("pitch", 0.9);
        panel.set_by_name("yaw", 0.9);
        panel.set_by_name("grasp_angle_0", -0.5);
        panel.set_by_name("grasp_angle_1", 0.5);

        let step = session.poll(&panel);
        assert_eq!(step.action, vec![0.1, 0.2, 0.3, 0.4, -0.5, 0.5]);
        assert!(!step.reset);
    }

    #[test]
    fn reset_is_edge_triggered() {
        let mut panel = ScriptedPanel::new();
        let mut session = DebugSession::new(&mut panel, &config());

        // No click yet.
        assert!(!session.poll(&panel).reset);

        // One click increments the button value.
        panel.set_by_name("reset", 2.0);
        assert!(session.poll(&panel).reset);
        // Value unchanged since the click: no new edge.
        assert!(!session.poll(&panel).reset);

        // Another click.
        panel.set_by_name("reset", 3.0);
        assert!(session.poll(&panel).reset);
    }

    #[test]
    fn run_steps_the_simulation_each_tick() {
        let mut panel = ScriptedPanel::new();
        let mut session = DebugSession::new(&mut panel, &config());

        let summary = session.run(&mut panel, 5);
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.resets, 0);
        assert_eq!(panel.steps(), 5);
        assert_eq!(summary.final_action.len(), 6);
    }
}
