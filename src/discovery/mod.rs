mod filter;
mod target;

pub use filter::*;
pub use target::*;
