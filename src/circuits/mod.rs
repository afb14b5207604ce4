mod adder;
mod constant;
mod memory;
mod multiplexer;
mod register;
pub use adder::*;
pub use constant::*;
pub use memory::*;
pub use multiplexer::*;
pub use register::*;
