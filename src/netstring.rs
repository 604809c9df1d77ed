//! Netstring decoding for SCGI request framing.
//!
//! A netstring frames a byte block as `<decimal length>:<payload>`. The
//! SCGI variant carries no trailing terminator byte: the frame ends as
//! soon as `length` payload bytes have been consumed.

use std::io::{self, Read};

use crate::error::{Error, ProtocolError, Result};

/// Read one netstring from `input` and return its payload.
///
/// Consumes exactly the length digits, the `:` separator, and the payload,
/// leaving the stream positioned on the first byte after the frame. The
/// caller continues reading request-body bytes from that position, so this
/// must never over-read.
///
/// A zero-length netstring (`0:` or a bare `:`) is legal and yields an
/// empty payload.
pub fn read_netstring<R: Read + ?Sized>(input: &mut R) -> Result<Vec<u8>> {
    let mut digits = String::new();
    let length = loop {
        let byte = match read_byte(input)? {
            Some(b) => b,
            None => return Err(ProtocolError::UnexpectedEof.into()),
        };
        match byte {
            b':' => match parse_length(&digits) {
                Some(n) => break n,
                None => {
                    return Err(ProtocolError::InvalidLength { digits, found: byte }.into());
                }
            },
            b'0'..=b'9' => digits.push(char::from(byte)),
            other => {
                return Err(ProtocolError::InvalidLength { digits, found: other }.into());
            }
        }
    };

    let mut payload = vec![0u8; length];
    let mut filled = 0;
    while filled < length {
        match input.read(&mut payload[filled..]) {
            Ok(0) => return Err(ProtocolError::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(payload)
}

/// An empty digit run parses as zero; anything else must fit in `usize`.
fn parse_length(digits: &str) -> Option<usize> {
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

fn read_byte<R: Read + ?Sized>(input: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
}
