//! Request context handed to the application.
//!
//! The SCGI header block is a flat run of null-separated fields forming
//! key/value pairs, with one empty trailing field left by the encoding.
//! Decoding keeps the last occurrence of a duplicated key. Values are
//! arbitrary header bytes, so fields are decoded latin-1 (one byte, one
//! character) rather than UTF-8.

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::error::ProtocolError;

/// URL scheme derived from the `HTTPS` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// `https` when the front end sent `HTTPS` as `on` or `1`, else `http`.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        match fields.get("HTTPS").map(String::as_str) {
            Some("on") | Some("1") => Scheme::Https,
            _ => Scheme::Http,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution-model flags advertised to the application.
///
/// Fixed for this adapter: one request per process, no concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub multithread: bool,
    pub multiprocess: bool,
    pub run_once: bool,
}

/// One decoded request, alive for the duration of a single exchange.
///
/// Holds the header fields verbatim, the derived scheme, a handle to the
/// input stream positioned at the first body byte, and a diagnostics sink
/// the application may write free-form output to.
pub struct Request<'a> {
    fields: HashMap<String, String>,
    scheme: Scheme,
    body: &'a mut dyn Read,
    diagnostics: &'a mut dyn Write,
}

impl<'a> Request<'a> {
    /// Protocol version marker, the value of the mandatory `SCGI` header.
    pub const PROTOCOL_VERSION: u32 = 1;

    pub fn new(
        fields: HashMap<String, String>,
        body: &'a mut dyn Read,
        diagnostics: &'a mut dyn Write,
    ) -> Self {
        let scheme = Scheme::from_fields(&fields);
        Request {
            fields,
            scheme,
            body,
            diagnostics,
        }
    }

    /// All decoded header fields, keyed as the front end sent them
    /// (conventionally uppercase CGI-style names).
    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Look up a single header field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The `REQUEST_METHOD` field, when present.
    pub fn method(&self) -> Option<&str> {
        self.field("REQUEST_METHOD")
    }

    /// Declared body length, parsed from `CONTENT_LENGTH`.
    pub fn content_length(&self) -> Option<u64> {
        self.field("CONTENT_LENGTH")?.parse().ok()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Fixed flags: single request, no concurrency.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithread: false,
            multiprocess: false,
            run_once: true,
        }
    }

    /// Input stream positioned at the first body byte. The adapter does not
    /// pre-read the body; the application reads up to `content_length`
    /// bytes on demand.
    pub fn body(&mut self) -> &mut dyn Read {
        self.body
    }

    /// Writable diagnostics sink supplied by the exchange.
    pub fn diagnostics(&mut self) -> &mut dyn Write {
        self.diagnostics
    }
}

/// Decode a header block into its key/value mapping.
///
/// Splits on null bytes and discards the empty trailing field the encoding
/// leaves after the last value. The remaining fields pair up in order; an
/// odd count means the last key has no value and the block is rejected.
/// Duplicate keys keep the last occurrence.
pub fn decode_header_block(block: &[u8]) -> Result<HashMap<String, String>, ProtocolError> {
    let mut fields: Vec<&[u8]> = block.split(|&b| b == 0).collect();
    fields.pop();

    if fields.len() % 2 != 0 {
        return Err(ProtocolError::UnpairedHeaderField { count: fields.len() });
    }

    let mut decoded = HashMap::with_capacity(fields.len() / 2);
    for pair in fields.chunks_exact(2) {
        decoded.insert(latin1_to_string(pair[0]), latin1_to_string(pair[1]));
    }
    Ok(decoded)
}

/// Single-byte-per-character decode; every byte value maps to the
/// code point of the same value.
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_pairs_and_drop_terminator() {
        let block = b"A\x001\x00B\x002\x00";
        let fields = decode_header_block(block).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["A"], "1");
        assert_eq!(fields["B"], "2");
    }

    #[test]
    fn test_decode_empty_block() {
        let fields = decode_header_block(b"").unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let block = b"A\x001\x00A\x002\x00";
        let fields = decode_header_block(block).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["A"], "2");
    }

    #[test]
    fn test_odd_field_count_rejected() {
        let block = b"A\x001\x00ORPHAN\x00";
        match decode_header_block(block) {
            Err(ProtocolError::UnpairedHeaderField { count }) => assert_eq!(count, 3),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_latin1_bytes_survive() {
        let block = b"NAME\x00\xffv\x00";
        let fields = decode_header_block(block).unwrap();
        assert_eq!(fields["NAME"], "\u{ff}v");
    }

    #[test]
    fn test_scheme_from_https_field() {
        let on = decode_header_block(b"HTTPS\x00on\x00").unwrap();
        assert_eq!(Scheme::from_fields(&on), Scheme::Https);

        let one = decode_header_block(b"HTTPS\x001\x00").unwrap();
        assert_eq!(Scheme::from_fields(&one), Scheme::Https);

        let off = decode_header_block(b"HTTPS\x00off\x00").unwrap();
        assert_eq!(Scheme::from_fields(&off), Scheme::Http);

        let absent = decode_header_block(b"").unwrap();
        assert_eq!(Scheme::from_fields(&absent), Scheme::Http);
    }

    #[test]
    fn test_request_accessors() {
        let fields = decode_header_block(
            b"CONTENT_LENGTH\x004\x00REQUEST_METHOD\x00POST\x00HTTPS\x00on\x00",
        )
        .unwrap();
        let mut body = Cursor::new(b"data".to_vec());
        let mut diag = Vec::new();
        let mut request = Request::new(fields, &mut body, &mut diag);

        assert_eq!(request.method(), Some("POST"));
        assert_eq!(request.content_length(), Some(4));
        assert_eq!(request.scheme(), Scheme::Https);
        assert!(!request.capabilities().multithread);
        assert!(!request.capabilities().multiprocess);
        assert!(request.capabilities().run_once);

        let mut buf = Vec::new();
        request.body().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"data");

        request.diagnostics().write_all(b"note").unwrap();
        drop(request);
        assert_eq!(diag, b"note");
    }

    #[test]
    fn test_content_length_unparseable() {
        let fields = decode_header_block(b"CONTENT_LENGTH\x00nope\x00").unwrap();
        let mut body = Cursor::new(Vec::new());
        let mut diag = Vec::new();
        let request = Request::new(fields, &mut body, &mut diag);
        assert_eq!(request.content_length(), None);
    }
}
