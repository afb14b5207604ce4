use crate::graph::*;
use crate::SimError;

/// Returns the output of a new component named `name` computing the wrapping sum
/// of `input1` and `input2`.
///
/// # Example
/// ```
/// # use rtlsim::{DesignBuilder, SimConfig, adder};
/// # let mut d = DesignBuilder::new();
/// # let top = d.add_component("top", None).unwrap();
/// let a = d.lever::<4>(top, "a", 9).unwrap();
/// let b = d.lever::<4>(top, "b", 8).unwrap();
///
/// let sum = adder(&mut d, Some(top), "add", a.output(), b.output()).unwrap();
/// let sim = d.build(SimConfig::default()).unwrap();
///
/// // 17 doesn't fit in 4 bits.
/// assert_eq!(sim.value(sum).unsigned(), 1);
/// ```
pub fn adder<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    input1: Output<W>,
    input2: Output<W>,
) -> Result<Output<W>, SimError> {
    let component = d.add_component(name, parent)?;
    let a = d.add_input::<W>(component, "a")?;
    let b = d.add_input::<W>(component, "b")?;
    let sum = d.add_output::<W>(component, "sum")?;

    d.set_function(sum, move |s| {
        s.read(a).unsigned().wrapping_add(s.read(b).unsigned())
    })?;
    d.connect(input1, a)?;
    d.connect(input2, b)?;
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimConfig;

    #[test]
    fn test_adder() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let a = d.lever::<64>(top, "a", 0).unwrap();
        let b = d.lever::<64>(top, "b", 0).unwrap();
        let sum = adder(&mut d, Some(top), "add", a.output(), b.output()).unwrap();

        let mut sim = d.build(SimConfig::default()).unwrap();
        let cases = [(0, 0, 0), (3, 4, 7), (u64::MAX, 2, 1), (1 << 63, 1 << 63, 0)];
        for (x, y, expected) in cases.iter() {
            sim.set_lever(a, *x);
            sim.set_lever(b, *y);
            sim.settle().unwrap();
            assert_eq!(sim.value(sum).unsigned(), *expected);
        }
    }

    #[test]
    fn test_adder_chain_settles() {
        // a + (a + (a + a))
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let a = d.lever::<8>(top, "a", 5).unwrap();
        let mut acc = a.output();
        for i in 0..3 {
            acc = adder(&mut d, Some(top), &format!("add{}", i), a.output(), acc).unwrap();
        }

        let mut sim = d.build(SimConfig::default()).unwrap();
        assert_eq!(sim.value(acc).unsigned(), 20);

        sim.set_lever_stable(a, 100).unwrap();
        assert_eq!(sim.value(acc).unsigned(), 400 % 256);
    }
}
