// SPDX-License-Identifier: MIT

//! Length-prefixed framing for the pipes a process-mode worker's stdin and
//! stdout stand in as cross-process FIFOs (§4.D "process worker").
//!
//! Frame layout: `[kind: u8][priority: u8][len: u32 LE][bytes; len]`.
//! `kind` distinguishes [`Payload::Binary`] from [`Payload::Text`] so a
//! result frame round-trips the same payload variant it was enqueued as.

use std::io::{self, Read, Write};

use rtadp_core::{Payload, Priority};

const KIND_BINARY: u8 = 0;
const KIND_TEXT: u8 = 1;
const PRIORITY_HIGH: u8 = 0;
const PRIORITY_LOW: u8 = 1;

pub fn write_frame<W: Write>(writer: &mut W, payload: &Payload, priority: Priority) -> io::Result<()> {
    let (kind, bytes): (u8, &[u8]) = match payload {
        Payload::Binary(b) => (KIND_BINARY, b),
        Payload::Text(s) => (KIND_TEXT, s.as_bytes()),
    };
    let priority_byte = match priority {
        Priority::High => PRIORITY_HIGH,
        Priority::Low => PRIORITY_LOW,
    };
    writer.write_all(&[kind, priority_byte])?;
    writer.write_all(&(bytes.len() as u32).to_le_bytes())?;
    writer.write_all(bytes)?;
    writer.flush()
}

/// Reads one frame, blocking until a full frame is available or the
/// stream is closed (returns `Ok(None)` at clean EOF).
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<(Payload, Priority)>> {
    let mut head = [0u8; 2];
    match read_exact_or_eof(reader, &mut head)? {
        false => return Ok(None),
        true => {}
    }
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;

    let payload = match head[0] {
        KIND_TEXT => Payload::Text(String::from_utf8_lossy(&bytes).into_owned()),
        _ => Payload::Binary(bytes),
    };
    let priority = if head[1] == PRIORITY_LOW { Priority::Low } else { Priority::High };
    Ok(Some((payload, priority)))
}

/// Like `Read::read_exact`, but returns `Ok(false)` instead of erroring
/// when the stream is closed before any byte of this frame is read.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed mid-frame")),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
