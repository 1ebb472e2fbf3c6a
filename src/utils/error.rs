use std::io::Error as IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// The radio stack rejected a command outright
    #[error("Stack error: {0}")]
    Stack(String),

    /// The radio stack was not in a state that accepts the command
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed device property: {0}")]
    Property(String),

    #[error("Event queue full")]
    QueueFull,

    #[error("Dispatcher shut down")]
    Shutdown,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl Error {
    /// Create a stack error
    pub fn stack(msg: impl Into<String>) -> Self {
        Error::Stack(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a property decode error
    pub fn property(msg: impl Into<String>) -> Self {
        Error::Property(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a worker error
    pub fn worker(msg: impl Into<String>) -> Self {
        Error::Worker(msg.into())
    }

    /// True when the stack refused because it was already in the requested state
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_))
    }
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::stack("connect rejected");
        assert_eq!(format!("{}", err), "Stack error: connect rejected");

        let err = Error::config("sink name is empty");
        assert_eq!(format!("{}", err), "Configuration error: sink name is empty");

        assert_eq!(Error::QueueFull.to_string(), "Event queue full");
    }

    #[test]
    fn test_invalid_state_detection() {
        assert!(Error::invalid_state("discovery already stopped").is_invalid_state());
        assert!(!Error::stack("busy").is_invalid_state());
        assert!(!Error::Shutdown.is_invalid_state());
    }

    #[test]
    fn test_error_conversion() {
        use std::io::ErrorKind;

        let io_err = IoError::new(ErrorKind::UnexpectedEof, "EOF");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
