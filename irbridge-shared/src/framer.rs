use std::io::{self, Read, Write};

use crate::error::LinkError;
use crate::protocol::{Message, MAX_PAYLOAD};

/// Frame header: little endian u16 length of type byte + payload.
pub const HEADER_SIZE: usize = 2;

/// One frame body: type byte followed by the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    body: Vec<u8>,
}

impl Packet {
    pub fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    /// Type byte, `None` for a zero length frame.
    pub fn tag(&self) -> Option<u8> {
        self.body.first().copied()
    }

    pub fn payload(&self) -> &[u8] {
        self.body.get(1..).unwrap_or(&[])
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Packet(Packet),
    /// The stream delivered fewer bytes than the header declared.
    Dropped { declared: usize, received: usize },
}

/// Length prefixed framing over a bidirectional byte stream.
///
/// Reads wait through transport timeouts for a frame header. Once a header
/// is in, a timeout or end of stream before the body is complete drops the
/// frame. The undelivered rest counts as consumed, so the next read starts
/// with a header.
pub struct Framer<S> {
    inner: S,
}

impl<S: Read + Write> Framer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Read the next frame (blocking).
    ///
    /// Returns `Err(LinkError::Closed)` when the stream ends between frames.
    pub fn read_packet(&mut self) -> Result<ReadOutcome, LinkError> {
        let mut header = [0u8; HEADER_SIZE];
        self.read_header(&mut header)?;
        let declared = u16::from_le_bytes(header) as usize;

        let mut body = vec![0u8; declared];
        let received = self.read_available(&mut body)?;

        if received == declared {
            return Ok(ReadOutcome::Packet(Packet::new(body)));
        }

        log::debug!("frame cut short, {} bytes never arrived", declared - received);

        Ok(ReadOutcome::Dropped { declared, received })
    }

    /// Write one frame: length, type, payload.
    pub fn write_packet(&mut self, tag: u8, payload: &[u8]) -> Result<(), LinkError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(LinkError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD,
            });
        }

        let len = (payload.len() + 1) as u16;

        let mut frame = Vec::with_capacity(HEADER_SIZE + 1 + payload.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.push(tag);
        frame.extend_from_slice(payload);

        self.inner.write_all(&frame)?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn write_message(&mut self, msg: &Message) -> Result<(), LinkError> {
        self.write_packet(msg.tag(), &msg.encode_payload())
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn read_header(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(LinkError::Closed),
                Ok(n) => filled += n,
                // Idle line
                Err(ref e) if is_retry(e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Fill `buf` until it is full, the read times out or the stream ends.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(ref e) if is_retry(e) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(filled)
    }
}

fn is_retry(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}
