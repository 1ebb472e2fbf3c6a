mod buffer;
mod error;
mod time;

pub use buffer::*;
pub use error::*;
pub use time::*;
