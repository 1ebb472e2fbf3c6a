mod machine;
mod state;
mod status;

pub use machine::*;
pub use state::*;
pub use status::*;
