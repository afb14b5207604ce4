mod clocked;
mod design_builder;
mod handles;
mod signals;
mod simulator;
pub use clocked::*;
pub use design_builder::DesignBuilder;
pub use handles::*;
pub use signals::*;
pub use simulator::*;
