mod utils;
mod protocol;
mod message;
mod discovery;
mod media;
mod connection;
mod heartbeat;
mod source;

// Re-export commonly used types at crate root
pub use utils::*;
pub use protocol::*;
pub use message::*;
pub use discovery::*;
pub use media::*;
pub use connection::*;
pub use heartbeat::*;
pub use source::*;
