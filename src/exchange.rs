//! One SCGI request/response exchange over a pair of byte streams.
//!
//! The exchange owns one input stream, one output stream, and a
//! diagnostics sink for the duration of `run`: read the header netstring,
//! decode it into a request context, hand the context to the application,
//! drain the returned body through the response writer. Strictly
//! sequential blocking I/O, one request per exchange; timeouts and
//! connection lifecycle belong to the supervisor that opened the streams.

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::body::Body;
use crate::error::{BoxError, Error, Result};
use crate::netstring::read_netstring;
use crate::request::{decode_header_block, Request};
use crate::response::{Respond, ResponseWriter};

/// What an application returns: a response body, or a failure to propagate.
pub type AppResult = std::result::Result<Box<dyn Body>, BoxError>;

/// The caller-supplied request handler.
///
/// Receives the decoded request and the response operations, and returns
/// the response body as a sequence of chunks. The application may also
/// push body bytes through `responder` directly; chunks it returns are
/// written after anything it wrote itself.
pub trait Application {
    fn call(&mut self, request: &mut Request<'_>, responder: &mut dyn Respond) -> AppResult;
}

impl<F> Application for F
where
    F: FnMut(&mut Request<'_>, &mut dyn Respond) -> AppResult,
{
    fn call(&mut self, request: &mut Request<'_>, responder: &mut dyn Respond) -> AppResult {
        self(request, responder)
    }
}

/// Adapter between one SCGI connection and an application.
pub struct ScgiExchange<R, W, D> {
    input: R,
    diagnostics: D,
    writer: ResponseWriter<W>,
}

impl<R: Read, W: Write, D: Write> ScgiExchange<R, W, D> {
    pub fn new(input: R, output: W, diagnostics: D) -> Self {
        ScgiExchange {
            input,
            diagnostics,
            writer: ResponseWriter::new(output),
        }
    }

    /// Serve the one request on this exchange's streams.
    ///
    /// A framing violation aborts before the application is invoked and
    /// leaves the output stream untouched. An application or body failure
    /// propagates after the body has been closed; by then part of the
    /// response may already be on the wire, and no fix-up is attempted.
    /// Whatever happens, a completed exchange has sent the header section
    /// exactly once, even when the body produced no bytes.
    pub fn run(&mut self, app: &mut dyn Application) -> Result<()> {
        let Self {
            input,
            diagnostics,
            writer,
        } = self;

        let block = read_netstring(input)?;
        let fields = decode_header_block(&block)?;

        let mut request = Request::new(fields, input, diagnostics);
        debug!(
            fields = request.fields().len(),
            scheme = %request.scheme(),
            method = request.method().unwrap_or("-"),
            "request decoded"
        );

        let mut body = app.call(&mut request, writer).map_err(Error::Application)?;

        // Close runs no matter how draining went, then the first failure
        // propagates.
        let drained = drain(writer, body.as_mut());
        body.close();
        drained?;

        if !writer.headers_sent() {
            // The application produced no body bytes at all; the wire must
            // still carry the status line and headers.
            writer.write_body(&[])?;
        }
        Ok(())
    }

    /// Recover the output stream after the exchange.
    pub fn into_output(self) -> W {
        self.writer.into_inner()
    }
}

fn drain<W: Write>(writer: &mut ResponseWriter<W>, body: &mut dyn Body) -> Result<()> {
    while let Some(chunk) = body.next_chunk().map_err(Error::Application)? {
        // Skipping empty chunks keeps them from forcing header emission.
        if !chunk.is_empty() {
            writer.write_body(&chunk)?;
        }
    }
    Ok(())
}

/// Destination for diagnostic output, chosen by the entry point.
#[derive(Debug, Clone)]
pub enum DiagnosticsSink {
    /// Inherit the process stderr.
    Stderr,
    /// Append to the file at this path.
    File(PathBuf),
    /// Drop all diagnostic output.
    Discard,
}

impl DiagnosticsSink {
    /// Open the destination as a writable stream.
    pub fn open(&self) -> io::Result<Box<dyn Write>> {
        match self {
            DiagnosticsSink::Stderr => Ok(Box::new(io::stderr())),
            DiagnosticsSink::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Box::new(file))
            }
            DiagnosticsSink::Discard => Ok(Box::new(io::sink())),
        }
    }
}

/// Serve exactly one SCGI request over the process stdin/stdout.
///
/// Both standard streams are locked for the whole exchange and treated as
/// plain byte streams. The supervisor that spawned the process owns the
/// connection lifecycle; once this returns the process is expected to
/// exit.
pub fn serve_once(app: &mut dyn Application, diagnostics: &DiagnosticsSink) -> Result<()> {
    let sink = diagnostics.open()?;
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    ScgiExchange::new(stdin, stdout, sink).run(app)
}
