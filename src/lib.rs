//! Register transfer level simulation core.
//!
//! A design is described with a [DesignBuilder]: components own typed, fixed width ports,
//! outputs compute their value with a propagation function and inputs are bound once,
//! to an output or through another input. [Building](DesignBuilder::build) it validates the
//! wiring and returns a [Simulator] that propagates values to a fixpoint, commits clock edges
//! to the [clocked components](ClockedComponent) and steps back through their bounded history.
//!
//! # Example
//! ```
//! # use rtlsim::{DesignBuilder, SimConfig, adder, constant, register};
//! let mut d = DesignBuilder::new();
//! let top = d.add_component("top", None).unwrap();
//!
//! let acc = register::<8>(&mut d, Some(top), "acc", 0).unwrap();
//! let step = constant::<8>(&mut d, Some(top), "step", 3).unwrap();
//! let next = adder(&mut d, Some(top), "add", acc.output, step).unwrap();
//! d.connect(next, acc.input).unwrap();
//!
//! let mut sim = d.build(SimConfig::default()).unwrap();
//! sim.run(4).unwrap();
//! assert_eq!(sim.value(acc.output).unsigned(), 12);
//! assert_eq!(sim.value(next).unsigned(), 15);
//!
//! sim.reverse().unwrap();
//! assert_eq!(sim.value(acc.output).unsigned(), 9);
//! ```
extern crate concat_idents;
pub mod address_space;
pub mod circuits;
mod config;
pub mod data_structures;
mod error;
pub mod graph;
pub mod netlist;
mod signal;
pub use circuits::*;
pub use config::*;
pub use error::*;
pub use graph::*;
pub use netlist::Netlist;
pub use signal::*;
