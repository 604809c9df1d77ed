//! Response emission toward the front end.
//!
//! The header section (`Status:` line, header pairs in application order,
//! blank line) goes on the wire lazily, immediately before the first body
//! byte, and exactly once. Every write flushes: the front end is often a
//! short-lived process that tears the connection down as soon as it
//! considers the response complete, so bytes must never sit in a buffer.

use std::io::{self, Write};

use bytes::BytesMut;
use tracing::{trace, warn};

const DEFAULT_STATUS: &str = "200 OK";

/// Response operations reachable from the application.
pub trait Respond {
    /// Stage the status line and headers. May be called more than once
    /// before the first body byte; the last call wins. Once the header
    /// section is on the wire the staged values are frozen.
    fn begin_response(&mut self, status: &str, headers: Vec<(String, String)>);

    /// Write body bytes, emitting the staged header section first when it
    /// has not been sent yet.
    fn write_body(&mut self, chunk: &[u8]) -> io::Result<()>;
}

/// State machine that owns the output stream for one exchange.
pub struct ResponseWriter<W> {
    output: W,
    status: Option<String>,
    headers: Vec<(String, String)>,
    headers_sent: bool,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(output: W) -> Self {
        ResponseWriter {
            output,
            status: None,
            headers: Vec::new(),
            headers_sent: false,
        }
    }

    /// Whether the header section is already on the wire.
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Recover the output stream, for callers that own the writer directly.
    pub fn into_inner(self) -> W {
        self.output
    }

    fn render_header_section(&self) -> BytesMut {
        let status = self.status.as_deref().unwrap_or(DEFAULT_STATUS);
        let mut section = BytesMut::with_capacity(64);
        section.extend_from_slice(format!("Status: {}\r\n", status).as_bytes());
        for (name, value) in &self.headers {
            section.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        section.extend_from_slice(b"\r\n");
        section
    }
}

impl<W: Write> Respond for ResponseWriter<W> {
    fn begin_response(&mut self, status: &str, headers: Vec<(String, String)>) {
        if self.headers_sent {
            warn!(status, "begin_response after headers were sent, ignoring");
            return;
        }
        self.status = Some(status.to_string());
        self.headers = headers;
    }

    fn write_body(&mut self, chunk: &[u8]) -> io::Result<()> {
        if !self.headers_sent {
            let section = self.render_header_section();
            self.output.write_all(&section)?;
            self.headers_sent = true;
            trace!(headers = self.headers.len(), "header section sent");
        }
        self.output.write_all(chunk)?;
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_headers_emitted_before_first_chunk() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.begin_response("200 OK", pairs(&[("Content-Type", "text/plain")]));
        writer.write_body(b"hi").unwrap();
        assert_eq!(
            writer.into_inner(),
            b"Status: 200 OK\r\nContent-Type: text/plain\r\n\r\nhi"
        );
    }

    #[test]
    fn test_header_order_preserved() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.begin_response(
            "200 OK",
            pairs(&[("B-Second", "2"), ("A-First", "1"), ("B-Second", "3")]),
        );
        writer.write_body(b"").unwrap();
        assert_eq!(
            writer.into_inner(),
            b"Status: 200 OK\r\nB-Second: 2\r\nA-First: 1\r\nB-Second: 3\r\n\r\n"
        );
    }

    #[test]
    fn test_header_section_sent_once() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.begin_response("200 OK", Vec::new());
        writer.write_body(b"one").unwrap();
        writer.write_body(b"two").unwrap();
        assert_eq!(writer.into_inner(), b"Status: 200 OK\r\n\r\nonetwo");
    }

    #[test]
    fn test_last_begin_response_wins_before_write() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.begin_response("500 Internal Server Error", pairs(&[("X-Stale", "1")]));
        writer.begin_response("204 No Content", Vec::new());
        writer.write_body(b"").unwrap();
        assert_eq!(writer.into_inner(), b"Status: 204 No Content\r\n\r\n");
    }

    #[test]
    fn test_begin_response_after_send_ignored() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.begin_response("200 OK", Vec::new());
        writer.write_body(b"body").unwrap();
        writer.begin_response("404 Not Found", pairs(&[("X-Late", "1")]));
        writer.write_body(b"!").unwrap();
        assert_eq!(writer.into_inner(), b"Status: 200 OK\r\n\r\nbody!");
    }

    #[test]
    fn test_default_status_when_never_begun() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_body(b"").unwrap();
        assert_eq!(writer.into_inner(), b"Status: 200 OK\r\n\r\n");
    }

    /// Writer that counts flushes, to pin the flush-per-write behavior.
    struct CountingWriter {
        data: Vec<u8>,
        flushes: usize,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_every_write_flushes() {
        let mut writer = ResponseWriter::new(CountingWriter {
            data: Vec::new(),
            flushes: 0,
        });
        writer.begin_response("200 OK", Vec::new());
        writer.write_body(b"a").unwrap();
        writer.write_body(b"b").unwrap();
        writer.write_body(b"").unwrap();
        let inner = writer.into_inner();
        assert_eq!(inner.flushes, 3);
        assert_eq!(inner.data, b"Status: 200 OK\r\n\r\nab");
    }
}
