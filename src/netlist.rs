//! Read only snapshot of a [Simulator] for editors and other observers.
use crate::graph::*;
use crate::signal::{SignalValue, ValueDisplayFormat};
use petgraph::dot::Dot;
use petgraph::graph::NodeIndex;
use std::io;
use std::path::Path;
use strum_macros::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentView {
    pub id: ComponentId,
    pub name: String,
    pub path: String,
    pub parent: Option<ComponentId>,
    /// True if the component takes part in the clocked protocol.
    pub clocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortView {
    pub port: PortRef,
    pub name: String,
    pub path: String,
    pub component: ComponentId,
    pub direction: PortDirection,
    pub width: u32,
    /// Inputs are connected once built, outputs are connected if an input
    /// or another output reads them.
    pub connected: bool,
    pub value: SignalValue,
    pub format: ValueDisplayFormat,
}

impl PortView {
    /// Returns the value rendered with the port's display format.
    pub fn display_value(&self) -> String {
        self.format.format(self.value)
    }
}

/// An input and the output whose value it sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionView {
    pub from: OutputId,
    pub to: InputId,
    pub from_component: ComponentId,
    pub to_component: ComponentId,
    /// Input `to` is directly aliased to, if it reads through one.
    pub through: Option<InputId>,
}

/// Components, ports and connections of a design with the current port values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Netlist {
    pub components: Vec<ComponentView>,
    pub ports: Vec<PortView>,
    pub connections: Vec<ConnectionView>,
}

impl Netlist {
    /// Returns the view of `port`.
    pub fn port<P: Into<PortRef>>(&self, port: P) -> Option<&PortView> {
        let port = port.into();
        self.ports.iter().find(|p| p.port == port)
    }

    /// Returns the view of the component at `path`.
    pub fn component(&self, path: &str) -> Option<&ComponentView> {
        self.components.iter().find(|c| c.path == path)
    }

    /// Returns the netlist in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format,
    /// components are nodes and every connection is an edge labelled "output -> input".
    pub fn to_dot(&self) -> String {
        let mut graph = petgraph::Graph::<String, String>::new();
        let nodes: Vec<NodeIndex> = self
            .components
            .iter()
            .map(|c| graph.add_node(c.path.clone()))
            .collect();

        let name = |port: PortRef| {
            self.port(port)
                .map(|p| p.name.as_str())
                .unwrap_or_default()
        };
        for connection in &self.connections {
            graph.add_edge(
                nodes[connection.from_component.index()],
                nodes[connection.to_component.index()],
                format!("{} -> {}", name(connection.from.into()), name(connection.to.into())),
            );
        }
        format!("{}", Dot::new(&graph))
    }

    /// Dumps [Netlist::to_dot] to `path`, to be visualized by many supported tools.
    pub fn dump_dot<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        std::fs::write(path, self.to_dot())
    }
}

impl Simulator {
    /// Returns a snapshot of the design and its current values.
    ///
    /// # Example
    /// ```
    /// # use rtlsim::{DesignBuilder, SimConfig, ValueDisplayFormat, constant};
    /// # let mut d = DesignBuilder::new();
    /// let c = constant::<8>(&mut d, None, "c", 0x2a).unwrap();
    /// let mut sim = d.build(SimConfig::default()).unwrap();
    /// sim.set_display_format(c, ValueDisplayFormat::Hex);
    ///
    /// let netlist = sim.netlist();
    /// let port = netlist.port(c).unwrap();
    /// assert_eq!(port.path, "c.out");
    /// assert_eq!(port.display_value(), "0x2a");
    /// assert!(!port.connected);
    /// ```
    pub fn netlist(&self) -> Netlist {
        let components = self
            .components
            .iter()
            .enumerate()
            .map(|(i, c)| ComponentView {
                id: ComponentId(i),
                name: c.name.clone(),
                path: c.path.clone(),
                parent: c.parent,
                clocked: c.clocked.is_some(),
            })
            .collect();

        let mut read = vec![false; self.outputs.len()];
        for output in self.resolved.iter() {
            read[output.0] = true;
        }
        // Forwarded outputs are read by the propagation function of the container output.
        for (dependent, dependencies) in self.dependencies.iter().enumerate() {
            for output in dependencies.iter().filter(|o| o.0 != dependent) {
                read[output.0] = true;
            }
        }

        let mut ports = Vec::with_capacity(self.len());
        for (i, output) in self.outputs.iter().enumerate() {
            let port = PortRef::Output(OutputId(i));
            ports.push(PortView {
                port,
                name: output.name.clone(),
                path: self.port_path(port),
                component: output.component,
                direction: PortDirection::Output,
                width: output.width,
                connected: read[i],
                value: self.port_value(port),
                format: self.display_format(port),
            });
        }
        for (i, input) in self.inputs.iter().enumerate() {
            let port = PortRef::Input(InputId(i));
            ports.push(PortView {
                port,
                name: input.name.clone(),
                path: self.port_path(port),
                component: input.component,
                direction: PortDirection::Input,
                width: input.width,
                connected: true,
                value: self.port_value(port),
                format: self.display_format(port),
            });
        }

        let connections = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let from = self.resolved[i];
                ConnectionView {
                    from,
                    to: InputId(i),
                    from_component: self.outputs[from.0].component,
                    to_component: input.component,
                    through: match input.binding {
                        Binding::Input(through) => Some(through),
                        Binding::Output(_) | Binding::Unbound => None,
                    },
                }
            })
            .collect();

        Netlist {
            components,
            ports,
            connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::SparseMemory;
    use crate::{async_read_memory, Indexing, SimConfig};

    #[test]
    fn test_netlist() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let addr = d.lever::<8>(top, "addr", 3).unwrap();
        let data = d.lever::<8>(top, "data", 0).unwrap();
        let width = d.lever::<4>(top, "width", 1).unwrap();
        let en = d.lever::<1>(top, "en", 0).unwrap();
        let mem = async_read_memory::<8, 8>(&mut d, Some(top), "mem", SparseMemory::new().shared(), Indexing::Byte).unwrap();
        d.connect(addr.output(), mem.addr).unwrap();
        d.connect(data.output(), mem.data_in).unwrap();
        d.connect(width.output(), mem.wr_width).unwrap();
        d.connect(en.output(), mem.wr_en).unwrap();

        let sim = d.build(SimConfig::default()).unwrap();
        let netlist = sim.netlist();

        assert_eq!(netlist.components.len(), 4);
        assert!(netlist.component("top.mem.wr_mem").unwrap().clocked);
        assert!(!netlist.component("top.mem").unwrap().clocked);
        assert_eq!(netlist.component("top.mem.rd_mem").unwrap().name, "rd_mem");
        assert_eq!(netlist.component("top.mem.rd_mem").unwrap().parent, Some(mem.component));

        let addr_port = netlist.port(mem.read.addr).unwrap();
        assert_eq!(addr_port.path, "top.mem.rd_mem.addr");
        assert_eq!(addr_port.direction, PortDirection::Input);
        assert_eq!(addr_port.value.unsigned(), 3);
        assert_eq!(addr_port.width, 8);

        let connection = netlist
            .connections
            .iter()
            .find(|c| c.to == mem.read.addr.id())
            .unwrap();
        assert_eq!(connection.from, addr.output().id());
        assert_eq!(connection.through, Some(mem.addr.id()));
        assert_eq!(connection.from_component, top);

        // Nothing reads the container output.
        assert!(!netlist.port(mem.data_out).unwrap().connected);
        assert!(netlist.port(mem.read.data_out).unwrap().connected);

        let dot = netlist.to_dot();
        assert!(dot.contains("top.mem.wr_mem"));
        assert!(dot.contains("addr -> addr"));
    }
}
