use super::handles::*;
use crate::signal::SignalValue;
use std::cell::RefCell;

/// Computes the next value of an output from the current values of the design.
///
/// The result is truncated to the width of the output it is attached to.
/// Functions must only depend on what they read through [Signals]
/// (or on state owned by a clocked component) and must not have side effects.
pub type PropagationFn = Box<dyn Fn(&Signals<'_>) -> u64>;

/// Read only view of every port value, handed to [propagation functions](PropagationFn)
/// and to [ClockedComponent::save](super::ClockedComponent::save).
///
/// Inputs are read through their alias chain, the value of an input is always the value
/// of the output at the end of its chain.
pub struct Signals<'a> {
    pub(super) values: &'a [SignalValue],
    pub(super) resolved: &'a [OutputId],
    pub(super) levers: &'a [u64],
    // Outputs read while evaluating a propagation function, used to learn the evaluation order.
    pub(super) reads: Option<&'a RefCell<Vec<OutputId>>>,
}

impl<'a> Signals<'a> {
    /// Returns the current value seen by `input`.
    pub fn read<const W: u32>(&self, input: Input<W>) -> SignalValue {
        self.output_value(self.resolve(input.id))
    }

    /// Returns the current value of `output`.
    pub fn output<const W: u32>(&self, output: Output<W>) -> SignalValue {
        self.output_value(output.id)
    }

    /// Returns the output at the end of the alias chain of `input`.
    pub fn resolve(&self, input: InputId) -> OutputId {
        self.resolved[input.0]
    }

    /// Returns the current value of the width erased output `id`.
    pub fn output_value(&self, id: OutputId) -> SignalValue {
        if let Some(reads) = self.reads {
            reads.borrow_mut().push(id);
        }
        self.values[id.0]
    }

    pub(super) fn lever(&self, slot: usize) -> u64 {
        self.levers[slot]
    }
}
