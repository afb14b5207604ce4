use super::design_builder::*;
use super::handles::*;
use super::signals::{PropagationFn, Signals};
use crate::config::SimConfig;
use crate::data_structures::Immutable;
use crate::error::SimError;
use crate::signal::{SignalValue, ValueDisplayFormat};
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cell::RefCell;
use std::collections::HashMap;

/// Built design, created by [DesignBuilder::build].
///
/// Owns the value of every output and drives propagation and the clocked lifecycle.
/// The wiring is frozen, only values, lever states and clocked state change.
pub struct Simulator {
    pub(crate) components: Immutable<Vec<ComponentNode>>,
    pub(crate) paths: Immutable<IndexMap<String, ComponentId>>,
    pub(crate) outputs: Immutable<Vec<OutputNode>>,
    pub(crate) inputs: Immutable<Vec<InputNode>>,
    pub(crate) resolved: Immutable<Vec<OutputId>>,
    functions: Immutable<Vec<PropagationFn>>,
    lever_initial: Immutable<Vec<u64>>,
    levers: Vec<u64>,
    values: Vec<SignalValue>,
    clocked: Vec<ClockedSlot>,
    // Evaluation order of the outputs, declaration order until dependencies are learned.
    order: Vec<OutputId>,
    // Outputs read by the propagation function of each output.
    pub(crate) dependencies: Vec<IndexSet<OutputId>>,
    reads: RefCell<Vec<OutputId>>,
    pub(crate) display_formats: HashMap<PortRef, ValueDisplayFormat>,
    config: SimConfig,
    cycle: u64,
}

impl Simulator {
    pub(super) fn new(
        design: DesignBuilder,
        resolved: Vec<OutputId>,
        functions: Vec<PropagationFn>,
        config: SimConfig,
    ) -> Result<Self, SimError> {
        let DesignBuilder {
            components,
            paths,
            outputs,
            inputs,
            levers,
            mut clocked,
        } = design;

        for slot in &mut clocked {
            slot.inner.set_history_depth(config.history_depth);
        }

        let values = outputs.iter().map(|o| SignalValue::zero(o.width)).collect();
        let mut sim = Self {
            order: (0..outputs.len()).map(OutputId).collect(),
            dependencies: vec![IndexSet::new(); outputs.len()],
            components: components.into(),
            paths: paths.into(),
            outputs: outputs.into(),
            inputs: inputs.into(),
            resolved: resolved.into(),
            functions: functions.into(),
            levers: levers.clone(),
            lever_initial: levers.into(),
            values,
            clocked,
            reads: Default::default(),
            display_formats: Default::default(),
            config,
            cycle: 0,
        };
        sim.settle()?;
        Ok(sim)
    }

    /// Runs one evaluation of every output in the current order,
    /// pushes the outputs whose value changed into `changed`.
    /// Returns true if new dependencies were discovered.
    fn propagation_pass(&mut self, changed: &mut Vec<OutputId>) -> bool {
        changed.clear();
        let mut learned = false;
        for position in 0..self.order.len() {
            let id = self.order[position];
            self.reads.borrow_mut().clear();
            let next = {
                let signals = Signals {
                    values: &self.values,
                    resolved: &self.resolved,
                    levers: &self.levers,
                    reads: Some(&self.reads),
                };
                (self.functions[id.0])(&signals)
            };
            let next = SignalValue::new(self.outputs[id.0].width, next);

            for dependency in self.reads.borrow_mut().drain(..) {
                learned |= self.dependencies[id.0].insert(dependency);
            }

            if next != self.values[id.0] {
                log::trace!("{} = {}", self.port_path(id.into()), next);
                self.values[id.0] = next;
                changed.push(id);
            }
        }
        learned
    }

    /// Sorts the outputs so that every output is evaluated after the outputs it reads,
    /// keeps the current order if the dependencies contain a cycle.
    fn update_order(&mut self) {
        let mut graph = DiGraph::<OutputId, ()>::with_capacity(self.outputs.len(), 0);
        let nodes: Vec<NodeIndex> = (0..self.outputs.len())
            .map(|i| graph.add_node(OutputId(i)))
            .collect();
        for (dependent, dependencies) in self.dependencies.iter().enumerate() {
            for d in dependencies.iter().filter(|d| d.0 != dependent) {
                graph.add_edge(nodes[d.0], nodes[dependent], ());
            }
        }

        match toposort(&graph, None) {
            Ok(sorted) => self.order = sorted.into_iter().map(|n| graph[n]).collect(),
            Err(cycle) => log::warn!(
                "Combinational cycle through '{}', keeping the current evaluation order",
                self.port_path(graph[cycle.node_id()].into())
            ),
        }
    }

    /// Propagates values until no output changes, a maximum of [SimConfig::max_passes] passes.
    /// Returns Ok(number_of_passes) if the design settled, the last pass being the one
    /// where nothing changed.
    ///
    /// Returns [SimError::NoFixpoint] otherwise, designs might not settle
    /// if they have combinational loops like a chain of 3 inverters.
    pub fn settle(&mut self) -> Result<usize, SimError> {
        let mut changed = Vec::new();
        let mut learned = false;
        let budget = self.config.max_passes.max(1);
        for pass in 1..=budget {
            learned |= self.propagation_pass(&mut changed);
            if changed.is_empty() {
                if learned {
                    self.update_order();
                }
                log::trace!("Settled after {} passes", pass);
                return Ok(pass);
            }
        }

        let unstable: Vec<String> = changed.iter().map(|o| self.port_path((*o).into())).collect();
        log::warn!(
            "No fixpoint after {} passes, {} outputs still changing",
            budget,
            unstable.len()
        );
        Err(SimError::NoFixpoint {
            passes: budget,
            unstable,
        })
    }

    /// Settles the design, commits one clock edge to every clocked component
    /// in the order they were added and settles again.
    ///
    /// Every component is [checked](crate::ClockedComponent::check) first, if one of them rejects
    /// the edge nothing is committed and the cycle is not counted. A component failing
    /// to save after passing its check makes the components that already saved reverse.
    pub fn clock(&mut self) -> Result<(), SimError> {
        self.settle()?;
        let failed = {
            let signals = Signals {
                values: &self.values,
                resolved: &self.resolved,
                levers: &self.levers,
                reads: None,
            };
            let checked = self.clocked.iter().try_for_each(|slot| {
                slot.inner
                    .check(&signals)
                    .map_err(|e| (slot.component, e))
            });
            match checked {
                Err(failed) => Some(failed),
                Ok(()) => {
                    let mut failed = None;
                    for i in 0..self.clocked.len() {
                        if let Err(e) = self.clocked[i].inner.save(&signals) {
                            for saved in self.clocked[..i].iter_mut().rev() {
                                saved.inner.reverse()?;
                            }
                            failed = Some((self.clocked[i].component, e));
                            break;
                        }
                    }
                    failed
                }
            }
        };
        if let Some((component, e)) = failed {
            log::warn!(
                "Clock edge rejected by '{}': {}",
                self.component_path(component),
                e
            );
            self.settle()?;
            return Err(e);
        }
        self.cycle += 1;
        log::debug!("Clock cycle {}", self.cycle);
        self.settle()?;
        Ok(())
    }

    /// Calls [Simulator::clock] `cycles` times.
    pub fn run(&mut self, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            self.clock()?;
        }
        Ok(())
    }

    /// Steps one clock cycle backwards, reversing every clocked component in the
    /// opposite order they save in, then settles.
    ///
    /// Returns Ok(false) and does nothing if no component has history left.
    pub fn reverse(&mut self) -> Result<bool, SimError> {
        if !self.can_reverse() {
            return Ok(false);
        }
        for slot in self.clocked.iter_mut().rev() {
            slot.inner.reverse()?;
        }
        self.cycle = self.cycle.saturating_sub(1);
        log::debug!("Reversed to cycle {}", self.cycle);
        self.settle()?;
        Ok(true)
    }

    /// Returns true if at least one clocked component can be reversed.
    pub fn can_reverse(&self) -> bool {
        self.reversible_steps() > 0
    }

    /// Returns the number of cycles [Simulator::reverse] can still undo.
    pub fn reversible_steps(&self) -> usize {
        self.clocked
            .iter()
            .map(|slot| slot.inner.reversible_steps())
            .max()
            .unwrap_or(0)
    }

    /// Restores every clocked component and lever to its initial state, clears
    /// every output and settles.
    ///
    /// Resetting twice in a row yields the same values as resetting once.
    pub fn reset(&mut self) -> Result<(), SimError> {
        for slot in &mut self.clocked {
            slot.inner.reset();
        }
        for (value, output) in self.values.iter_mut().zip(self.outputs.iter()) {
            *value = SignalValue::zero(output.width);
        }
        self.levers.copy_from_slice(&self.lever_initial);
        self.cycle = 0;
        log::debug!("Reset");
        self.settle()?;
        Ok(())
    }

    /// Returns the number of clock cycles since the last reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    fn clocked_slot(&self, component: ComponentId) -> Result<usize, SimError> {
        self.components[component.0]
            .clocked
            .ok_or_else(|| SimError::NotClocked {
                component: self.component_path(component).into(),
            })
    }

    /// Overwrites the state of `component` at `address` outside of the clocked protocol
    /// and settles.
    ///
    /// Returns [SimError::NotClocked] if `component` has no state.
    pub fn force_value(&mut self, component: ComponentId, address: u64, value: u64) -> Result<(), SimError> {
        let slot = self.clocked_slot(component)?;
        self.clocked[slot].inner.force_value(address, value)?;
        self.settle()?;
        Ok(())
    }

    /// Sets the history depth of every clocked component.
    pub fn set_history_depth(&mut self, depth: usize) {
        self.config.history_depth = depth;
        for slot in &mut self.clocked {
            slot.inner.set_history_depth(depth);
        }
    }

    /// Sets the history depth of `component` only.
    pub fn set_component_history_depth(&mut self, component: ComponentId, depth: usize) -> Result<(), SimError> {
        let slot = self.clocked_slot(component)?;
        self.clocked[slot].inner.set_history_depth(depth);
        Ok(())
    }

    /// Returns the history depth of `component`.
    pub fn history_depth(&self, component: ComponentId) -> Result<usize, SimError> {
        let slot = self.clocked_slot(component)?;
        Ok(self.clocked[slot].inner.history_depth())
    }

    /// Sets `lever` to `value` truncated to its width, takes effect on the next settle.
    pub fn set_lever<const W: u32>(&mut self, lever: Lever<W>, value: u64) {
        self.levers[lever.slot] = SignalValue::new(W, value).unsigned();
    }

    /// Sets `lever` to `value` and calls [Simulator::settle].
    pub fn set_lever_stable<const W: u32>(&mut self, lever: Lever<W>, value: u64) -> Result<usize, SimError> {
        self.set_lever(lever, value);
        self.settle()
    }

    /// Returns the current value of `output`.
    pub fn value<const W: u32>(&self, output: Output<W>) -> SignalValue {
        self.values[output.id.0]
    }

    /// Returns the value seen by `input`, the value of the output at the end of its alias chain.
    pub fn input_value<const W: u32>(&self, input: Input<W>) -> SignalValue {
        self.values[self.resolved[input.id.0].0]
    }

    /// Returns the current value of any port.
    pub fn port_value(&self, port: PortRef) -> SignalValue {
        match port {
            PortRef::Output(o) => self.values[o.0],
            PortRef::Input(i) => self.values[self.resolved[i.0].0],
        }
    }

    /// Returns the component owning the output `input` reads from.
    pub fn connected_component<const W: u32>(&self, input: Input<W>) -> ComponentId {
        self.outputs[self.resolved[input.id.0].0].component
    }

    /// Returns the [ComponentId] of the component at `path`.
    pub fn component(&self, path: &str) -> Option<ComponentId> {
        (*self.paths).get(path).copied()
    }

    /// Returns the path of `component`.
    pub fn component_path(&self, component: ComponentId) -> &str {
        &self.components[component.0].path
    }

    /// Returns the full path of `port`, "component_path.port_name".
    pub fn port_path(&self, port: PortRef) -> String {
        match port {
            PortRef::Output(o) => {
                let node = &self.outputs[o.0];
                port_path(&self.components, node.component, &node.name)
            }
            PortRef::Input(i) => {
                let node = &self.inputs[i.0];
                port_path(&self.components, node.component, &node.name)
            }
        }
    }

    /// Sets how the value of `port` is displayed by [Simulator::display_value] and in the netlist.
    pub fn set_display_format<P: Into<PortRef>>(&mut self, port: P, format: ValueDisplayFormat) {
        self.display_formats.insert(port.into(), format);
    }

    /// Returns the display format of `port`.
    pub fn display_format<P: Into<PortRef>>(&self, port: P) -> ValueDisplayFormat {
        self.display_formats
            .get(&port.into())
            .copied()
            .unwrap_or_default()
    }

    /// Returns the value of `port` formatted with its display format.
    pub fn display_value<P: Into<PortRef>>(&self, port: P) -> String {
        let port = port.into();
        self.display_format(port).format(self.port_value(port))
    }

    /// Returns the number of ports in the design.
    pub fn len(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    /// Returns true if the design has no ports.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Asserts that the simulator settles after exactly `expected` passes.
#[macro_export]
macro_rules! assert_settles {
    ($sim:expr, $expected:expr) => {
        let actual = $sim.settle().expect("Design didn't settle");

        assert!(
            actual == $expected,
            "Design settled after {} passes, expected: {}",
            actual,
            $expected
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reverse_declaration_order_converges() {
        // Declared consumer first, so the first settle needs several passes.
        let mut d = DesignBuilder::new();
        let c = d.add_component("chain", None).unwrap();
        let x = d.lever::<8>(c, "x", 1).unwrap();
        let outs: Vec<Output<8>> = (0..4)
            .map(|i| d.add_output::<8>(c, &format!("o{}", i)).unwrap())
            .collect();
        let ins: Vec<Input<8>> = (0..4)
            .map(|i| d.add_input::<8>(c, &format!("i{}", i)).unwrap())
            .collect();
        for i in 0..4 {
            let input = ins[i];
            d.set_function(outs[i], move |s| s.read(input).unsigned() + 1).unwrap();
        }
        d.connect(x.output(), ins[3]).unwrap();
        for i in 0..3 {
            d.connect(outs[i + 1], ins[i]).unwrap();
        }

        let mut sim = d.build(SimConfig::default()).unwrap();
        assert_eq!(sim.value(outs[0]).unsigned(), 5);

        // Order was learned, one pass to change everything and one to confirm.
        sim.set_lever(x, 10);
        assert_settles!(sim, 2);
        assert_eq!(sim.value(outs[0]).unsigned(), 14);

        assert_settles!(sim, 1);
    }

    #[test]
    fn test_oscillation() {
        let mut d = DesignBuilder::new();
        let ring = d.add_component("ring", None).unwrap();
        let a = d.add_input::<1>(ring, "a").unwrap();
        let not = d.add_output::<1>(ring, "not").unwrap();
        d.set_function(not, move |s| !s.read(a).unsigned()).unwrap();
        d.connect(not, a).unwrap();

        let err = d.build(SimConfig::default().with_max_passes(10)).err();
        assert_eq!(
            err,
            Some(SimError::NoFixpoint {
                passes: 10,
                unstable: vec!["ring.not".into()]
            })
        );
    }

    #[test]
    fn test_empty_pass_budget() {
        let mut d = DesignBuilder::new();
        let c = d.add_component("c", None).unwrap();
        let x = d.lever::<8>(c, "x", 7).unwrap();

        let mut config = SimConfig::default().with_max_passes(0);
        assert_eq!(config.max_passes, 1);
        config.max_passes = 0;
        // The first pass changes x, the design can't settle within a single pass.
        assert_eq!(
            d.build(config).err(),
            Some(SimError::NoFixpoint {
                passes: 1,
                unstable: vec!["c.x".into()]
            })
        );
    }

    #[test]
    fn test_component_lookup() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let inner = d.add_component("inner", Some(top)).unwrap();
        let sim = d.build(SimConfig::default()).unwrap();

        assert_eq!(sim.component("top"), Some(top));
        assert_eq!(sim.component("top.inner"), Some(inner));
        assert_eq!(sim.component("inner"), None);
        assert_eq!(sim.component_path(inner), "top.inner");
    }

    #[test]
    fn test_masking() {
        let mut d = DesignBuilder::new();
        let c = d.add_component("c", None).unwrap();
        let x = d.lever::<4>(c, "x", 0x1f).unwrap();
        let o = d.add_output::<4>(c, "o").unwrap();
        d.set_function(o, |_| u64::MAX).unwrap();

        let mut sim = d.build(SimConfig::default()).unwrap();
        assert_eq!(sim.value(o).unsigned(), 0xf);
        assert_eq!(sim.value(o).signed(), -1);
        assert_eq!(sim.value(x.output()).unsigned(), 0xf);

        sim.set_lever_stable(x, 0x12).unwrap();
        assert_eq!(sim.value(x.output()).unsigned(), 0x2);
    }

    #[test]
    fn test_reset_restores_levers() {
        let mut d = DesignBuilder::new();
        let c = d.add_component("c", None).unwrap();
        let x = d.lever::<8>(c, "x", 7).unwrap();

        let mut sim = d.build(SimConfig::default()).unwrap();
        sim.set_lever_stable(x, 3).unwrap();
        assert_eq!(sim.value(x.output()).unsigned(), 3);

        sim.reset().unwrap();
        assert_eq!(sim.value(x.output()).unsigned(), 7);
        assert_eq!(sim.cycle(), 0);
        assert!(!sim.reverse().unwrap());
    }

    #[test]
    fn test_not_clocked() {
        let mut d = DesignBuilder::new();
        let c = d.add_component("c", None).unwrap();
        let mut sim = d.build(SimConfig::default()).unwrap();

        assert_eq!(
            sim.force_value(c, 0, 1),
            Err(SimError::NotClocked { component: "c".into() })
        );
        assert!(sim.set_component_history_depth(c, 4).is_err());
        assert!(sim.is_empty());
    }

    #[test]
    fn test_display_format() {
        let mut d = DesignBuilder::new();
        let c = d.add_component("c", None).unwrap();
        let x = d.lever::<8>(c, "x", 0xa5).unwrap();
        let mut sim = d.build(SimConfig::default()).unwrap();

        assert_eq!(sim.display_value(x.output()), "165");
        sim.set_display_format(x.output(), ValueDisplayFormat::Hex);
        assert_eq!(sim.display_value(x.output()), "0xa5");
        sim.set_display_format(x.output(), ValueDisplayFormat::Signed);
        assert_eq!(sim.display_value(x.output()), "-91");
    }

    proptest! {
        #[test]
        fn alias_chains_are_transparent(depth in 0usize..8, value in any::<u16>()) {
            let mut d = DesignBuilder::new();
            let top = d.add_component("top", None).unwrap();
            let x = d.lever::<16>(top, "x", 0).unwrap();

            let mut parent = top;
            let mut inputs = vec![d.add_input::<16>(top, "in").unwrap()];
            for level in 0..depth {
                parent = d.add_component(format!("level{}", level), Some(parent)).unwrap();
                let inner = d.add_input::<16>(parent, "in").unwrap();
                d.connect_inputs(inputs[inputs.len() - 1], inner).unwrap();
                inputs.push(inner);
            }
            d.connect(x.output(), inputs[0]).unwrap();

            let mut sim = d.build(SimConfig::default()).unwrap();
            sim.set_lever_stable(x, u64::from(value)).unwrap();
            for input in inputs {
                prop_assert_eq!(sim.input_value(input).unsigned(), u64::from(value));
                prop_assert_eq!(sim.connected_component(input), top);
            }
        }
    }
}
