//! Single-shot adapter between the SCGI wire protocol and a
//! request/response application interface.
//!
//! Invoked once per connection by an inetd-style supervisor that has
//! already accepted the socket and wired it to a pair of byte streams:
//! - Netstring framing: decode the length-prefixed header block
//! - Request context: header fields, derived scheme, on-demand body and
//!   diagnostics handles
//! - Response state machine: header section emitted lazily before the
//!   first body byte, exactly once, flushed on every write
//!
//! The bundled binary wires the process stdin/stdout; the library works
//! over any `Read`/`Write` pair.

pub mod apps;
pub mod body;
pub mod config;
pub mod error;
pub mod exchange;
pub mod netstring;
pub mod request;
pub mod response;

pub use body::{Body, Chunks};
pub use error::{BoxError, Error, ProtocolError, Result};
pub use exchange::{serve_once, AppResult, Application, DiagnosticsSink, ScgiExchange};
pub use netstring::read_netstring;
pub use request::{decode_header_block, Capabilities, Request, Scheme};
pub use response::{Respond, ResponseWriter};
