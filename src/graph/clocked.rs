use super::Signals;
use crate::error::SimError;

/// Lifecycle of components whose state persists across clock cycles.
///
/// The [Simulator](crate::Simulator) drives it: once per cycle, after propagation has settled,
/// every clocked component [saves](ClockedComponent::save); stepping backwards
/// [reverses](ClockedComponent::reverse) them in the opposite order.
///
/// Every `save` must push exactly one record into the component's bounded history,
/// so that the following `reverse` restores the exact state from before that `save`.
pub trait ClockedComponent {
    /// Returns an error if [save](ClockedComponent::save) would fail with these `signals`.
    ///
    /// Every component is checked before any of them saves, so a clock edge
    /// that can't be committed leaves all state and history untouched.
    fn check(&self, _signals: &Signals<'_>) -> Result<(), SimError> {
        Ok(())
    }

    /// Drops all history and restores the initial state.
    fn reset(&mut self);

    /// Commits the state for this clock edge from the settled `signals`,
    /// recording what is needed to undo it.
    ///
    /// Running out of history space never fails, the oldest record is dropped.
    fn save(&mut self, signals: &Signals<'_>) -> Result<(), SimError>;

    /// Undoes the most recent [save](ClockedComponent::save) still in the history.
    ///
    /// Does nothing if the history is empty.
    fn reverse(&mut self) -> Result<(), SimError>;

    /// Overwrites the state at `address` outside of the clocked protocol,
    /// no history is recorded.
    fn force_value(&mut self, address: u64, value: u64) -> Result<(), SimError>;

    /// Returns the maximum number of cycles that can be reversed.
    fn history_depth(&self) -> usize;

    /// Changes the history depth, dropping the oldest records that don't fit anymore.
    fn set_history_depth(&mut self, depth: usize);

    /// Returns the number of cycles that can currently be reversed.
    fn reversible_steps(&self) -> usize;
}
