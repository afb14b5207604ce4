mod history;
mod immutable;
pub use history::*;
pub use immutable::*;
