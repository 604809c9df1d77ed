//! Error types for the adapter.
//!
//! `ProtocolError` covers violations of SCGI framing by the front end;
//! `Error` is what one exchange surfaces to its caller. Application
//! failures cross the callback boundary as boxed errors and are never
//! retried or swallowed.

use std::fmt;
use std::io;

/// Boxed error carried out of application callbacks and body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias for exchange-level results.
pub type Result<T> = std::result::Result<T, Error>;

/// Violation of the SCGI framing rules by the front end.
#[derive(Debug)]
pub enum ProtocolError {
    /// A byte other than a decimal digit appeared in a netstring length
    /// prefix. Carries the digits buffered so far plus the offending byte.
    InvalidLength { digits: String, found: u8 },
    /// The stream ended before a complete netstring was read.
    UnexpectedEof,
    /// The header block decoded to an odd number of fields, leaving the
    /// last key without a value.
    UnpairedHeaderField { count: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidLength { digits, found } => {
                write!(
                    f,
                    "invalid netstring length: [{}{}]",
                    digits,
                    char::from(*found)
                )
            }
            ProtocolError::UnexpectedEof => write!(f, "EOF reading netstring"),
            ProtocolError::UnpairedHeaderField { count } => {
                write!(f, "header block has {} fields, expected an even count", count)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Errors surfaced while serving one exchange.
#[derive(Debug)]
pub enum Error {
    /// The front end sent a malformed request. Nothing has been written
    /// to the output stream when this is returned.
    Protocol(ProtocolError),
    /// Reading the request or writing the response failed.
    Io(io::Error),
    /// The application callback or its body stream failed. The response
    /// may already be partially on the wire.
    Application(BoxError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Protocol(e) => write!(f, "protocol error: {}", e),
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::Application(e) => write!(f, "application error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Protocol(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Application(e) => Some(e.as_ref()),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
