pub mod constants;
pub mod eir;
mod device;
mod events;
mod stack;

pub mod mock;

pub use constants::*;
pub use device::*;
pub use events::*;
pub use stack::*;
