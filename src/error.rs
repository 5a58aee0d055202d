use std::fmt;
use std::io;

/// Unified error type for the index.
///
/// The error surface is deliberately small: duplicate keys and missing
/// keys are reported as operation outcomes, not errors, and malformed
/// snapshot lines are skipped and counted rather than surfaced. What
/// remains is I/O on the snapshot file.
#[derive(Debug)]
pub enum Error {
    /// IO error from the snapshot sink or source.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
