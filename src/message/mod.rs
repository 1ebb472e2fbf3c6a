mod dispatcher;
mod queue;
mod types;

pub use dispatcher::*;
pub use queue::*;
pub use types::*;
