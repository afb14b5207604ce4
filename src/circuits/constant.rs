use crate::graph::*;
use crate::SimError;

pub const CONSTANT: &str = "constant";

/// Returns the output of a new component named `name` that always holds `value`,
/// truncated to `W` bits.
///
/// # Example
/// ```
/// # use rtlsim::{DesignBuilder, SimConfig, constant};
/// # let mut d = DesignBuilder::new();
/// let c = constant::<8>(&mut d, None, "c", 54).unwrap();
///
/// let sim = d.build(SimConfig::default()).unwrap();
///
/// assert_eq!(sim.value(c).unsigned(), 54);
/// ```
pub fn constant<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    value: u64,
) -> Result<Output<W>, SimError> {
    let component = d.add_component(name, parent)?;
    let out = d.add_output::<W>(component, "out")?;
    d.set_function(out, move |_| value)?;
    Ok(out)
}

/// Returns the output of a new constant component holding 0.
pub fn zeros<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
) -> Result<Output<W>, SimError> {
    constant::<W>(d, parent, name, 0)
}

/// Returns the output of a new constant component with every bit set.
pub fn ones<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
) -> Result<Output<W>, SimError> {
    constant::<W>(d, parent, name, u64::MAX)
}
