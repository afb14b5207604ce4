//! Error types for design construction and simulation.
//!
//! Wiring mistakes are reported as [SimError] variants carrying the full path
//! (`component.port`) of every port involved, so a malformed design can be fixed
//! from the message alone.

/// Errors raised by an [AddressSpace](crate::address_space::AddressSpace).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The address does not belong to any mapped region.
    #[error("address {0:#x} is not mapped")]
    Unmapped(u64),

    /// The address belongs to a read-only region.
    #[error("address {0:#x} is read-only")]
    ReadOnly(u64),

    /// The access width is not supported by the memory.
    #[error("invalid access width of {bytes} bytes (maximum {max})")]
    InvalidWidth {
        /// Requested number of bytes.
        bytes: u32,
        /// Largest number of bytes the access allows.
        max: u32,
    },
}

/// Errors that can occur while building or simulating a design.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A component with the same path was already added.
    #[error("component '{path}' already exists")]
    DuplicateComponent {
        /// Path of the component.
        path: String,
    },

    /// A port with the same name and direction already exists on the component.
    #[error("port '{port}' already exists")]
    DuplicatePort {
        /// Full path of the port.
        port: String,
    },

    /// An input port was connected a second time.
    #[error("input '{port}' is already connected to '{bound_to}'")]
    AlreadyConnected {
        /// Full path of the input that was connected again.
        port: String,
        /// Full path of the port it is already bound to.
        bound_to: String,
    },

    /// Aliasing one input through another would close a loop of inputs.
    #[error("aliasing '{port}' through '{through}' would create an input alias cycle")]
    AliasCycle {
        /// Full path of the input being bound.
        port: String,
        /// Full path of the input it would read through.
        through: String,
    },

    /// An output already has a propagation function.
    #[error("output '{port}' already has a propagation function")]
    FunctionAlreadyAttached {
        /// Full path of the output.
        port: String,
    },

    /// An input does not resolve to any output.
    #[error("input '{port}' is not connected")]
    UnconnectedInput {
        /// Full path of the input.
        port: String,
    },

    /// An output has no propagation function and can never settle.
    #[error("output '{port}' has no propagation function")]
    MissingPropagationFunction {
        /// Full path of the output.
        port: String,
    },

    /// Propagation did not reach a fixpoint within the pass budget,
    /// most likely because of a combinational cycle.
    #[error("no fixpoint after {passes} passes, still changing: {}", .unstable.join(", "))]
    NoFixpoint {
        /// Number of passes that were run.
        passes: usize,
        /// Outputs that changed during the last pass.
        unstable: Vec<String>,
    },

    /// The component does not take part in the clocked protocol.
    #[error("component '{component}' is not clocked")]
    NotClocked {
        /// Path of the component.
        component: String,
    },

    /// A memory access failed at the address space boundary.
    #[error("memory access by '{component}' failed: {source}")]
    Memory {
        /// Path of the component performing the access.
        component: String,
        /// Error reported by the address space.
        #[source]
        source: AddressError,
    },
}
