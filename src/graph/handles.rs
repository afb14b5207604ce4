use crate::signal::WidthCheck;
use std::fmt::{self, Display, Formatter};

macro_rules! erased_ids {
    ($($(#[$doc:meta])* $name:ident),*) => {
        $(
            $(#[$doc])*
            #[repr(transparent)]
            #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
            pub struct $name(pub(crate) usize);
            impl $name {
                /// Returns the declaration index.
                pub fn index(&self) -> usize {
                    self.0
                }
            }
            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

erased_ids!(
    /// Index of a component in declaration order.
    ComponentId,
    /// Index of an output port in declaration order, width erased.
    OutputId,
    /// Index of an input port in declaration order, width erased.
    InputId
);

/// Handle to an output port of width `W`.
///
/// Connections only accept handles of the same width, see [DesignBuilder::connect](super::DesignBuilder::connect).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Output<const W: u32> {
    pub(crate) id: OutputId,
}
impl<const W: u32> Output<W> {
    /// Width of the port.
    pub const WIDTH: u32 = W;

    pub(crate) fn new(id: OutputId) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = WidthCheck::<W>::VALID;
        Self { id }
    }

    /// Returns the width erased id of the port.
    pub fn id(&self) -> OutputId {
        self.id
    }
}

/// Handle to an input port of width `W`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Input<const W: u32> {
    pub(crate) id: InputId,
}
impl<const W: u32> Input<W> {
    /// Width of the port.
    pub const WIDTH: u32 = W;

    pub(crate) fn new(id: InputId) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = WidthCheck::<W>::VALID;
        Self { id }
    }

    /// Returns the width erased id of the port.
    pub fn id(&self) -> InputId {
        self.id
    }
}

/// Handle to an output driven from outside the design, by the harness.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Lever<const W: u32> {
    pub(crate) slot: usize,
    pub(crate) output: Output<W>,
}
impl<const W: u32> Lever<W> {
    /// Returns the output carrying the lever value, to connect to other components.
    pub fn output(&self) -> Output<W> {
        self.output
    }
}

/// What an input port reads from.
///
/// Inputs are bound at most once, [Unbound](Binding::Unbound) is only ever replaced.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Binding {
    Unbound,
    /// Reads the value of an output.
    Output(OutputId),
    /// Reads whatever another input reads, for pass through connections.
    Input(InputId),
}

impl Default for Binding {
    fn default() -> Self {
        Binding::Unbound
    }
}

/// Width erased reference to any port.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PortRef {
    Output(OutputId),
    Input(InputId),
}

impl<const W: u32> From<Output<W>> for PortRef {
    fn from(o: Output<W>) -> Self {
        PortRef::Output(o.id)
    }
}
impl<const W: u32> From<Input<W>> for PortRef {
    fn from(i: Input<W>) -> Self {
        PortRef::Input(i.id)
    }
}
impl From<OutputId> for PortRef {
    fn from(o: OutputId) -> Self {
        PortRef::Output(o)
    }
}
impl From<InputId> for PortRef {
    fn from(i: InputId) -> Self {
        PortRef::Input(i)
    }
}
