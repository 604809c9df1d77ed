//! Request reflection application.

use std::io;
use std::io::Read;

use crate::body::Chunks;
use crate::exchange::{AppResult, Application};
use crate::request::Request;
use crate::response::Respond;

/// Reflects the decoded request back as `text/plain`: derived metadata
/// first, then the header fields in sorted order, then how many body bytes
/// were actually readable. Useful when checking what a front end forwards.
pub struct Inspect;

impl Application for Inspect {
    fn call(&mut self, request: &mut Request<'_>, responder: &mut dyn Respond) -> AppResult {
        let caps = request.capabilities();
        let mut report = String::new();
        report.push_str(&format!("scgi.version={}\n", Request::PROTOCOL_VERSION));
        report.push_str(&format!("scgi.scheme={}\n", request.scheme()));
        report.push_str(&format!("scgi.multithread={}\n", caps.multithread));
        report.push_str(&format!("scgi.multiprocess={}\n", caps.multiprocess));
        report.push_str(&format!("scgi.run_once={}\n", caps.run_once));

        let mut names: Vec<String> = request.fields().keys().cloned().collect();
        names.sort();
        for name in &names {
            report.push_str(&format!("{}={}\n", name, request.fields()[name]));
        }

        // Drain at most the declared body length; report what was there.
        let declared = request.content_length().unwrap_or(0);
        let received = io::copy(&mut request.body().take(declared), &mut io::sink())?;
        report.push_str(&format!("scgi.body_bytes={}\n", received));

        responder.begin_response(
            "200 OK",
            vec![("Content-Type".to_string(), "text/plain".to_string())],
        );
        Ok(Box::new(Chunks::one(report)))
    }
}
