use crate::graph::*;
use crate::SimError;

/// Returns the output of a new 2 way [multiplexer](https://en.wikipedia.org/wiki/Multiplexer)
/// named `name` that selects `inputs[0]` when `select` is 0 and `inputs[1]` otherwise.
///
/// # Example
/// ```
/// # use rtlsim::{DesignBuilder, SimConfig, constant, multiplexer};
/// # let mut d = DesignBuilder::new();
/// # let top = d.add_component("top", None).unwrap();
/// let select = d.lever::<1>(top, "select", 0).unwrap();
/// let a = constant::<8>(&mut d, Some(top), "a", 10).unwrap();
/// let b = constant::<8>(&mut d, Some(top), "b", 20).unwrap();
///
/// let out = multiplexer(&mut d, Some(top), "mux", select.output(), [a, b]).unwrap();
/// let mut sim = d.build(SimConfig::default()).unwrap();
/// assert_eq!(sim.value(out).unsigned(), 10);
///
/// sim.set_lever_stable(select, 1).unwrap();
/// assert_eq!(sim.value(out).unsigned(), 20);
/// ```
pub fn multiplexer<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    select: Output<1>,
    inputs: [Output<W>; 2],
) -> Result<Output<W>, SimError> {
    let component = d.add_component(name, parent)?;
    let sel = d.add_input::<1>(component, "select")?;
    let in0 = d.add_input::<W>(component, "in0")?;
    let in1 = d.add_input::<W>(component, "in1")?;
    let out = d.add_output::<W>(component, "out")?;

    d.set_function(out, move |s| {
        if s.read(sel).as_bool() {
            s.read(in1).unsigned()
        } else {
            s.read(in0).unsigned()
        }
    })?;
    d.connect(select, sel)?;
    d.connect(inputs[0], in0)?;
    d.connect(inputs[1], in1)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimConfig;

    #[test]
    fn test_multiplexer_only_follows_selected() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let select = d.lever::<1>(top, "select", 1).unwrap();
        let a = d.lever::<16>(top, "a", 1).unwrap();
        let b = d.lever::<16>(top, "b", 2).unwrap();
        let out = multiplexer(&mut d, Some(top), "mux", select.output(), [a.output(), b.output()]).unwrap();

        let mut sim = d.build(SimConfig::default()).unwrap();
        assert_eq!(sim.value(out).unsigned(), 2);

        sim.set_lever_stable(a, 0xffff).unwrap();
        assert_eq!(sim.value(out).unsigned(), 2);

        sim.set_lever_stable(select, 0).unwrap();
        assert_eq!(sim.value(out).unsigned(), 0xffff);
    }
}
