use crate::Weight;

/// Route planner configuration
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Applied to raw start/end coordinates to get a 0-1 fraction of the map
    /// span. The default takes percentages.
    pub input_scale: Weight,
    /// Update cost and parent of an already visited, not yet expanded node
    /// when a cheaper way to it shows up. Off by default: the first parent
    /// assigned to a node sticks.
    pub relax_visited: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            input_scale: 0.01,
            relax_visited: false,
        }
    }
}

impl PlannerConfig {
    pub fn with_input_scale(mut self, scale: Weight) -> Self {
        self.input_scale = scale;
        self
    }

    pub fn with_relaxation(mut self, relax: bool) -> Self {
        self.relax_visited = relax;
        self
    }
}
