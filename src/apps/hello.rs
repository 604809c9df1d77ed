//! Minimal liveness application.

use crate::body::Chunks;
use crate::exchange::{AppResult, Application};
use crate::request::Request;
use crate::response::Respond;

/// Fixed-body responder.
///
/// This is deliberately simple: no field lookups, no body reads, one short
/// chunk. Enough to confirm the front end and the adapter are wired up.
pub struct Hello;

impl Application for Hello {
    fn call(&mut self, _request: &mut Request<'_>, responder: &mut dyn Respond) -> AppResult {
        responder.begin_response(
            "200 OK",
            vec![("Content-Type".to_string(), "text/plain".to_string())],
        );
        Ok(Box::new(Chunks::one("hello from scgi-oneshot\n")))
    }
}
