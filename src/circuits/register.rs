use crate::data_structures::History;
use crate::graph::*;
use crate::signal::SignalValue;
use crate::SimError;
use std::cell::Cell;
use std::rc::Rc;

pub const REGISTER: &str = "register";

/// Ports of a register created by [register] or [enabled_register].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Register<const W: u32> {
    pub component: ComponentId,
    pub input: Input<W>,
    /// Only present on [enabled registers](enabled_register).
    pub enable: Option<Input<1>>,
    pub output: Output<W>,
}

struct RegisterState<const W: u32> {
    path: String,
    input: Input<W>,
    enable: Option<Input<1>>,
    initial: u64,
    value: Rc<Cell<u64>>,
    // Committed value before each save.
    history: History<u64>,
}

impl<const W: u32> ClockedComponent for RegisterState<W> {
    fn reset(&mut self) {
        self.history.clear();
        self.value.set(self.initial);
    }

    fn save(&mut self, signals: &Signals<'_>) -> Result<(), SimError> {
        if self.history.push(self.value.get()).is_some() {
            log::trace!("{}: history full, dropped the oldest record", self.path);
        }
        let enabled = self.enable.map_or(true, |e| signals.read(e).as_bool());
        if enabled {
            self.value.set(signals.read(self.input).unsigned());
        }
        Ok(())
    }

    fn reverse(&mut self) -> Result<(), SimError> {
        if let Some(previous) = self.history.pop() {
            self.value.set(previous);
        }
        Ok(())
    }

    fn force_value(&mut self, _address: u64, value: u64) -> Result<(), SimError> {
        self.value.set(SignalValue::new(W, value).unsigned());
        Ok(())
    }

    fn history_depth(&self) -> usize {
        self.history.capacity()
    }

    fn set_history_depth(&mut self, depth: usize) {
        self.history.set_capacity(depth);
    }

    fn reversible_steps(&self) -> usize {
        self.history.len()
    }
}

fn build_register<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    initial: u64,
    with_enable: bool,
) -> Result<Register<W>, SimError> {
    let component = d.add_component(name, parent)?;
    let input = d.add_input::<W>(component, "in")?;
    let enable = if with_enable {
        Some(d.add_input::<1>(component, "enable")?)
    } else {
        None
    };
    let output = d.add_output::<W>(component, "out")?;

    let initial = SignalValue::new(W, initial).unsigned();
    let value = Rc::new(Cell::new(initial));
    let committed = value.clone();
    d.set_function(output, move |_| committed.get())?;

    let path = d.component_path(component).to_string();
    d.add_clocked(
        component,
        Box::new(RegisterState::<W> {
            path,
            input,
            enable,
            initial,
            value,
            history: Default::default(),
        }),
    );
    Ok(Register {
        component,
        input,
        enable,
        output,
    })
}

/// Returns the ports of a new register named `name` that holds `initial` after a reset.
///
/// On every clock edge the value of `input` is committed to `output`.
///
/// # Example
/// A counter.
/// ```
/// # use rtlsim::{DesignBuilder, SimConfig, adder, constant, register};
/// # let mut d = DesignBuilder::new();
/// # let top = d.add_component("top", None).unwrap();
/// let r = register::<4>(&mut d, Some(top), "count", 0).unwrap();
/// let one = constant::<4>(&mut d, Some(top), "one", 1).unwrap();
/// let next = adder(&mut d, Some(top), "inc", r.output, one).unwrap();
/// d.connect(next, r.input).unwrap();
///
/// let mut sim = d.build(SimConfig::default()).unwrap();
/// sim.run(18).unwrap();
/// assert_eq!(sim.value(r.output).unsigned(), 2);
///
/// sim.reverse().unwrap();
/// assert_eq!(sim.value(r.output).unsigned(), 1);
/// ```
pub fn register<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    initial: u64,
) -> Result<Register<W>, SimError> {
    build_register(d, parent, name, initial, false)
}

/// Returns the ports of a new register named `name` that only commits `input`
/// on clock edges where `enable` is 1.
pub fn enabled_register<const W: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    initial: u64,
) -> Result<Register<W>, SimError> {
    build_register(d, parent, name, initial, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimConfig;

    #[test]
    fn test_register() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let input = d.lever::<8>(top, "input", 3).unwrap();
        let write = d.lever::<1>(top, "write", 0).unwrap();
        let r = enabled_register::<8>(&mut d, Some(top), REGISTER, 0).unwrap();
        d.connect(input.output(), r.input).unwrap();
        d.connect(write.output(), r.enable.unwrap()).unwrap();

        let mut sim = d.build(SimConfig::default()).unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 0);

        sim.clock().unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 0);

        sim.set_lever_stable(write, 1).unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 0);
        sim.clock().unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 3);

        sim.set_lever_stable(input, 0).unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 3);
        sim.clock().unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 0);

        assert_eq!(sim.cycle(), 3);
        assert_eq!(sim.reversible_steps(), 3);
        sim.reverse().unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 3);
        sim.reverse().unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 0);
    }

    #[test]
    fn test_register_force_and_reset() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let input = d.lever::<4>(top, "input", 9).unwrap();
        let r = register::<4>(&mut d, Some(top), REGISTER, 5).unwrap();
        d.connect(input.output(), r.input).unwrap();

        let mut sim = d.build(SimConfig::default()).unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 5);

        // Forcing ignores the address and records no history.
        sim.force_value(r.component, 1234, 0x3f).unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 0xf);
        assert!(!sim.can_reverse());

        sim.clock().unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 9);
        sim.reset().unwrap();
        assert_eq!(sim.value(r.output).unsigned(), 5);
        assert!(!sim.reverse().unwrap());
    }

    #[test]
    fn test_history_depth() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let input = d.lever::<8>(top, "input", 0).unwrap();
        let r = register::<8>(&mut d, Some(top), REGISTER, 0).unwrap();
        d.connect(input.output(), r.input).unwrap();

        let mut sim = d.build(SimConfig::default().with_history_depth(2)).unwrap();
        assert_eq!(sim.history_depth(r.component), Ok(2));
        for i in 1..=5 {
            sim.set_lever(input, i);
            sim.clock().unwrap();
        }
        assert_eq!(sim.reversible_steps(), 2);

        sim.set_component_history_depth(r.component, 1).unwrap();
        assert!(sim.reverse().unwrap());
        assert_eq!(sim.value(r.output).unsigned(), 4);
        assert!(!sim.reverse().unwrap());
        assert_eq!(sim.value(r.output).unsigned(), 4);
    }
}
