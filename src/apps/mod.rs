//! Applications bundled with the adapter binary.
//!
//! - `hello`: fixed-body liveness responder
//! - `inspect`: reflects the decoded request back as plain text

pub mod hello;
pub mod inspect;
