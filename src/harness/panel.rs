//! The seam to the simulator's user-debug-parameter registry.

use std::collections::HashMap;

/// Handle to one registered debug parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamHandle(pub u32);

/// The subset of the simulator's debug-parameter API the harness needs.
///
/// Buttons are parameters too: the simulator increments their value on
/// every click, so edge detection is a value comparison on the caller's
/// side.
pub trait ControlPanel {
    /// Register a slider (or button) and return its handle.
    fn add_parameter(&mut self, name: &str, min: f32, max: f32, start: f32) -> ParamHandle;

    /// Read the current value of a parameter.
    fn read_parameter(&self, handle: ParamHandle) -> f32;

    /// Advance the simulation one tick.
    fn step_simulation(&mut self);
}

/// An in-process panel for tests and headless runs.
///
/// Parameter values start at their registered defaults and change only
/// when a test (or script) sets them.
#[derive(Debug, Default)]
pub struct ScriptedPanel {
    names: Vec<String>,
    values: HashMap<ParamHandle, f32>,
    steps: u64,
}

impl ScriptedPanel {
    /// Create an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter's value by handle.
    pub fn set(&mut self, handle: ParamHandle, value: f32) {
        self.values.insert(handle, value);
    }

    /// Set a parameter's value by registered name.
    ///
    /// Panics if the name was never registered; scripts address the same
    /// panel they populated.
    pub fn set_by_name(&mut self, name: &str, value: f32) {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("no parameter named {name:?}"));
        self.values.insert(ParamHandle(idx as u32), value);
    }

    /// Number of simulation ticks stepped so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl ControlPanel for ScriptedPanel {
    fn add_parameter(&mut self, name: &str, _min: f32, _max: f32, start: f32) -> ParamHandle {
        let handle = ParamHandle(self.names.len() as u32);
        self.names.push(name.to_string());
        self.values.insert(handle, start);
        handle
    }

    fn read_parameter(&self, handle: ParamHandle) -> f32 {
        self.values.get(&handle).copied().unwrap_or(0.0)
    }

    fn step_simulation(&mut self) {
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_start_at_defaults() {
        let mut panel = ScriptedPanel::new();
        let h = panel.add_parameter("posX", -1.0, 1.0, 0.25);
        assert_eq!(panel.read_parameter(h), 0.25);

        panel.set(h, -0.5);
        assert_eq!(panel.read_parameter(h), -0.5);

        panel.set_by_name("posX", 0.75);
        assert_eq!(panel.read_parameter(h), 0.75);
    }

    #[test]
    fn step_counter_advances() {
        let mut panel = ScriptedPanel::new();
        panel.step_simulation();
        panel.step_simulation();
        assert_eq!(panel.steps(), 2);
    }
}
