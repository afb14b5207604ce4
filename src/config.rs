/// Default number of propagation passes [Simulator::settle](crate::Simulator::settle) runs
/// before giving up on reaching a fixpoint.
pub const DEFAULT_MAX_PASSES: usize = 1000;

/// Default number of clock cycles every clocked component can be reversed.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Simulation settings applied when a design is [built](crate::DesignBuilder::build).
///
/// # Example
/// ```
/// # use rtlsim::SimConfig;
/// let config = SimConfig::default().with_history_depth(3);
///
/// assert_eq!(config.history_depth, 3);
/// assert_eq!(config.max_passes, rtlsim::DEFAULT_MAX_PASSES);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Maximum number of propagation passes per settle.
    pub max_passes: usize,
    /// Number of reversible cycles kept by each clocked component.
    pub history_depth: usize,
}

impl SimConfig {
    /// Sets the pass budget of the propagation driver, at least one pass is always run.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Sets the history depth given to every clocked component.
    pub fn with_history_depth(mut self, history_depth: usize) -> Self {
        self.history_depth = history_depth;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}
