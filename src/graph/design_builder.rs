use super::clocked::ClockedComponent;
use super::handles::*;
use super::signals::{PropagationFn, Signals};
use super::Simulator;
use crate::config::SimConfig;
use crate::error::SimError;
use indexmap::IndexMap;
use smallvec::SmallVec;

#[derive(Debug, Clone)]
pub(crate) struct ComponentNode {
    pub name: String,
    pub path: String,
    pub parent: Option<ComponentId>,
    pub inputs: SmallVec<[InputId; 4]>,
    pub outputs: SmallVec<[OutputId; 2]>,
    // Index into the clocked components, if the component is clocked.
    pub clocked: Option<usize>,
}

pub(crate) struct OutputNode {
    pub name: String,
    pub component: ComponentId,
    pub width: u32,
    pub function: Option<PropagationFn>,
}

#[derive(Debug, Clone)]
pub(crate) struct InputNode {
    pub name: String,
    pub component: ComponentId,
    pub width: u32,
    pub binding: Binding,
}

pub(crate) struct ClockedSlot {
    pub component: ComponentId,
    pub inner: Box<dyn ClockedComponent>,
}

/// Returns "component_path.port_name".
pub(crate) fn port_path(components: &[ComponentNode], component: ComponentId, name: &str) -> String {
    format!("{}.{}", components[component.0].path, name)
}

/// Data structure that describes a circuit as components owning fixed width ports,
/// it can be [built](DesignBuilder::build) into a [Simulator].
///
/// Outputs own a value and a [propagation function](PropagationFn) computing it.
/// Inputs own no value, they are bound once either to an output ([DesignBuilder::connect])
/// or to another input they read through ([DesignBuilder::connect_inputs]).
/// A container forwards an internal output to its own boundary output with [DesignBuilder::forward].
///
/// Inputs from outside the design are [levers](DesignBuilder::lever).
///
/// # Examples
/// An incrementer.
/// ```
/// # use rtlsim::{DesignBuilder, SimConfig};
/// let mut d = DesignBuilder::new();
/// let top = d.add_component("top", None).unwrap();
/// let inc = d.add_component("inc", Some(top)).unwrap();
///
/// let x = d.lever::<8>(top, "x", 41).unwrap();
/// let a = d.add_input::<8>(inc, "a").unwrap();
/// let out = d.add_output::<8>(inc, "out").unwrap();
/// d.set_function(out, move |s| s.read(a).unsigned() + 1).unwrap();
///
/// d.connect(x.output(), a).unwrap();
///
/// let mut sim = d.build(SimConfig::default()).unwrap();
/// assert_eq!(sim.value(out).unsigned(), 42);
///
/// sim.set_lever_stable(x, 255).unwrap();
/// assert_eq!(sim.value(out).unsigned(), 0);
/// ```
///
/// Ports of different widths can't be connected.
/// ```compile_fail
/// # use rtlsim::DesignBuilder;
/// let mut d = DesignBuilder::new();
/// let c = d.add_component("c", None).unwrap();
/// let out = d.add_output::<4>(c, "out").unwrap();
/// let inp = d.add_input::<8>(c, "in").unwrap();
///
/// d.connect(out, inp).unwrap();
/// ```
///
/// The same holds for input aliases,
/// ```compile_fail
/// # use rtlsim::DesignBuilder;
/// let mut d = DesignBuilder::new();
/// let c = d.add_component("c", None).unwrap();
/// let outer = d.add_input::<4>(c, "outer").unwrap();
/// let inner = d.add_input::<8>(c, "inner").unwrap();
///
/// d.connect_inputs(outer, inner).unwrap();
/// ```
/// and for forwarded outputs.
/// ```compile_fail
/// # use rtlsim::DesignBuilder;
/// let mut d = DesignBuilder::new();
/// let c = d.add_component("c", None).unwrap();
/// let inner = d.add_output::<8>(c, "inner").unwrap();
/// let outer = d.add_output::<4>(c, "outer").unwrap();
///
/// d.forward(inner, outer).unwrap();
/// ```
///
/// Widths are limited to `1..=64` bits.
/// ```compile_fail
/// # use rtlsim::DesignBuilder;
/// let mut d = DesignBuilder::new();
/// let c = d.add_component("c", None).unwrap();
/// let wide = d.add_output::<65>(c, "wide").unwrap();
/// ```
/// ```compile_fail
/// # use rtlsim::DesignBuilder;
/// let mut d = DesignBuilder::new();
/// let c = d.add_component("c", None).unwrap();
/// let empty = d.add_input::<0>(c, "empty").unwrap();
/// ```
pub struct DesignBuilder {
    pub(crate) components: Vec<ComponentNode>,
    pub(crate) paths: IndexMap<String, ComponentId>,
    pub(crate) outputs: Vec<OutputNode>,
    pub(crate) inputs: Vec<InputNode>,
    pub(crate) levers: Vec<u64>,
    pub(crate) clocked: Vec<ClockedSlot>,
}

impl DesignBuilder {
    /// Returns an empty [DesignBuilder].
    pub fn new() -> Self {
        Self {
            components: Default::default(),
            paths: Default::default(),
            outputs: Default::default(),
            inputs: Default::default(),
            levers: Default::default(),
            clocked: Default::default(),
        }
    }

    /// Adds a component named `name` inside `parent` and returns its [ComponentId].
    ///
    /// Returns [SimError::DuplicateComponent] if `parent` already has a component named `name`.
    pub fn add_component<S: Into<String>>(
        &mut self,
        name: S,
        parent: Option<ComponentId>,
    ) -> Result<ComponentId, SimError> {
        let name = name.into();
        let path = match parent {
            Some(parent) => format!("{}.{}", self.components[parent.0].path, name),
            None => name.clone(),
        };
        if self.paths.contains_key(&path) {
            return Err(SimError::DuplicateComponent { path });
        }

        let id = ComponentId(self.components.len());
        self.paths.insert(path.clone(), id);
        self.components.push(ComponentNode {
            name,
            path,
            parent,
            inputs: Default::default(),
            outputs: Default::default(),
            clocked: None,
        });
        Ok(id)
    }

    /// Returns the [ComponentId] of the component at `path`.
    pub fn component(&self, path: &str) -> Option<ComponentId> {
        self.paths.get(path).copied()
    }

    /// Returns the path of `component`, its name prefixed by the paths of its parents.
    pub fn component_path(&self, component: ComponentId) -> &str {
        &self.components[component.0].path
    }

    /// Adds an input of width `W` named `name` to `component`.
    pub fn add_input<const W: u32>(
        &mut self,
        component: ComponentId,
        name: &str,
    ) -> Result<Input<W>, SimError> {
        let taken = self.components[component.0]
            .inputs
            .iter()
            .any(|i| self.inputs[i.0].name == name);
        if taken {
            return Err(SimError::DuplicatePort {
                port: port_path(&self.components, component, name),
            });
        }

        let id = InputId(self.inputs.len());
        self.inputs.push(InputNode {
            name: name.into(),
            component,
            width: W,
            binding: Binding::Unbound,
        });
        self.components[component.0].inputs.push(id);
        Ok(Input::new(id))
    }

    /// Adds an output of width `W` named `name` to `component`.
    ///
    /// The output needs a propagation function, from [DesignBuilder::set_function]
    /// or [DesignBuilder::forward], before the design can be built.
    pub fn add_output<const W: u32>(
        &mut self,
        component: ComponentId,
        name: &str,
    ) -> Result<Output<W>, SimError> {
        let taken = self.components[component.0]
            .outputs
            .iter()
            .any(|o| self.outputs[o.0].name == name);
        if taken {
            return Err(SimError::DuplicatePort {
                port: port_path(&self.components, component, name),
            });
        }

        let id = OutputId(self.outputs.len());
        self.outputs.push(OutputNode {
            name: name.into(),
            component,
            width: W,
            function: None,
        });
        self.components[component.0].outputs.push(id);
        Ok(Output::new(id))
    }

    /// Adds an output named `name` to `component` whose value is set by the harness,
    /// see [Simulator::set_lever].
    pub fn lever<const W: u32>(
        &mut self,
        component: ComponentId,
        name: &str,
        initial: u64,
    ) -> Result<Lever<W>, SimError> {
        let output = self.add_output::<W>(component, name)?;
        let slot = self.levers.len();
        self.levers.push(initial);
        self.set_function(output, move |s| s.lever(slot))?;
        Ok(Lever { slot, output })
    }

    /// Attaches the propagation function `f` to `output`.
    ///
    /// Returns [SimError::FunctionAlreadyAttached] if `output` already has one.
    pub fn set_function<const W: u32, F>(&mut self, output: Output<W>, f: F) -> Result<(), SimError>
    where
        F: Fn(&Signals<'_>) -> u64 + 'static,
    {
        self.attach(output.id, Box::new(f))
    }

    fn attach(&mut self, output: OutputId, f: PropagationFn) -> Result<(), SimError> {
        let node = &mut self.outputs[output.0];
        if node.function.is_some() {
            return Err(SimError::FunctionAlreadyAttached {
                port: port_path(&self.components, node.component, &node.name),
            });
        }
        node.function = Some(f);
        Ok(())
    }

    /// Returns true if `output` has a propagation function.
    pub fn has_propagation_function<const W: u32>(&self, output: Output<W>) -> bool {
        self.outputs[output.id.0].function.is_some()
    }

    /// Connects `from` to `to`, `to` will read the value of `from`.
    ///
    /// Returns [SimError::AlreadyConnected] if `to` is already connected, its binding is kept.
    pub fn connect<const W: u32>(&mut self, from: Output<W>, to: Input<W>) -> Result<(), SimError> {
        self.bind(to.id, Binding::Output(from.id))
    }

    /// Connects `to` to read through `from`, `to` will read whatever `from` reads.
    ///
    /// This is how a container passes its boundary inputs down to its sub components.
    ///
    /// Returns [SimError::AlreadyConnected] if `to` is already connected
    /// and [SimError::AliasCycle] if the alias chain of `from` leads back to `to`.
    pub fn connect_inputs<const W: u32>(&mut self, from: Input<W>, to: Input<W>) -> Result<(), SimError> {
        self.bind(to.id, Binding::Input(from.id))
    }

    /// Makes `to` take the value of `from`, by attaching a propagation function reading `from`.
    ///
    /// This is how a container exposes a sub component output on its boundary.
    ///
    /// Returns [SimError::FunctionAlreadyAttached] if `to` already has a propagation function.
    pub fn forward<const W: u32>(&mut self, from: Output<W>, to: Output<W>) -> Result<(), SimError> {
        let source = from.id;
        self.attach(
            to.id,
            Box::new(move |s: &Signals<'_>| s.output_value(source).unsigned()),
        )
    }

    fn bind(&mut self, input: InputId, binding: Binding) -> Result<(), SimError> {
        let current = self.inputs[input.0].binding;
        if current != Binding::Unbound {
            let bound_to = match current {
                Binding::Output(o) => self.port_path(o.into()),
                Binding::Input(i) => self.port_path(i.into()),
                Binding::Unbound => unreachable!(),
            };
            return Err(SimError::AlreadyConnected {
                port: self.port_path(input.into()),
                bound_to,
            });
        }

        if let Binding::Input(through) = binding {
            let mut cursor = Some(through);
            while let Some(i) = cursor {
                if i == input {
                    return Err(SimError::AliasCycle {
                        port: self.port_path(input.into()),
                        through: self.port_path(through.into()),
                    });
                }
                cursor = match self.inputs[i.0].binding {
                    Binding::Input(next) => Some(next),
                    Binding::Output(_) | Binding::Unbound => None,
                };
            }
        }

        self.inputs[input.0].binding = binding;
        Ok(())
    }

    /// Returns what `input` is directly bound to.
    pub fn binding(&self, input: InputId) -> Binding {
        self.inputs[input.0].binding
    }

    /// Returns the output at the end of the alias chain of `input`,
    /// None if the chain ends at an unbound input.
    pub fn resolve(&self, input: InputId) -> Option<OutputId> {
        let mut cursor = input;
        loop {
            match self.inputs[cursor.0].binding {
                Binding::Unbound => return None,
                Binding::Output(o) => return Some(o),
                Binding::Input(next) => cursor = next,
            }
        }
    }

    /// Returns true if the alias chain of `input` ends at an output.
    pub fn is_connected<const W: u32>(&self, input: Input<W>) -> bool {
        self.resolve(input.id).is_some()
    }

    /// Returns the component owning the output `input` reads from.
    pub fn connected_component<const W: u32>(&self, input: Input<W>) -> Option<ComponentId> {
        self.resolve(input.id).map(|o| self.outputs[o.0].component)
    }

    /// Makes `component` take part in the clocked protocol through `clocked`.
    ///
    /// Clocked components save in the order they are added and reverse in the opposite order.
    pub fn add_clocked(&mut self, component: ComponentId, clocked: Box<dyn ClockedComponent>) {
        let slot = self.clocked.len();
        self.clocked.push(ClockedSlot {
            component,
            inner: clocked,
        });
        self.components[component.0].clocked = Some(slot);
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

    /// Returns the number of ports in the design.
    pub fn len(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    /// Returns true if the design has no ports.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates the design and returns a settled [Simulator] for it.
    ///
    /// Fails with [SimError::UnconnectedInput] or [SimError::MissingPropagationFunction]
    /// for the first port that can't be simulated, and with [SimError::NoFixpoint]
    /// if the initial propagation doesn't settle.
    pub fn build(mut self, config: SimConfig) -> Result<Simulator, SimError> {
        let mut resolved = Vec::with_capacity(self.inputs.len());
        for (i, node) in self.inputs.iter().enumerate() {
            match self.resolve(InputId(i)) {
                Some(output) => resolved.push(output),
                None => {
                    return Err(SimError::UnconnectedInput {
                        port: port_path(&self.components, node.component, &node.name),
                    })
                }
            }
        }

        let mut functions = Vec::with_capacity(self.outputs.len());
        for node in &mut self.outputs {
            match node.function.take() {
                Some(f) => functions.push(f),
                None => {
                    return Err(SimError::MissingPropagationFunction {
                        port: port_path(&self.components, node.component, &node.name),
                    })
                }
            }
        }

        log::debug!(
            "Building design: {} components, {} inputs, {} outputs, {} clocked",
            self.components.len(),
            self.inputs.len(),
            self.outputs.len(),
            self.clocked.len()
        );
        Simulator::new(self, resolved, functions, config)
    }
}

impl Default for DesignBuilder {
    fn default() -> Self {
        Self::new()
    }
}
