use std::collections::VecDeque;
use std::io::{self, Read, Write};

use crate::protocol::Message;

/// What the fake serial port does on the next read.
pub enum Event {
    Data(Vec<u8>),
    Timeout,
    WouldBlock,
}

/// Serial port stand-in: reads follow a script, writes are collected.
/// Reads return `Ok(0)` once the script is exhausted.
pub struct ScriptedPort {
    script: VecDeque<Event>,
    pub written: Vec<u8>,
}

impl ScriptedPort {
    pub fn new(script: Vec<Event>) -> Self {
        Self {
            script: script.into(),
            written: Vec::new(),
        }
    }

    pub fn with_data(data: Vec<u8>) -> Self {
        Self::new(vec![Event::Data(data)])
    }
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.script.pop_front() {
            None => Ok(0),
            Some(Event::Timeout) => Err(io::ErrorKind::TimedOut.into()),
            Some(Event::WouldBlock) => Err(io::ErrorKind::WouldBlock.into()),
            Some(Event::Data(mut data)) => {
                let n = buf.len().min(data.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.script.push_front(Event::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

impl Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Wire bytes for one frame carrying `msg`.
pub fn frame(msg: &Message) -> Vec<u8> {
    raw_frame(msg.tag(), &msg.encode_payload())
}

pub fn raw_frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let len = (payload.len() + 1) as u16;
    let mut out = len.to_le_bytes().to_vec();
    out.push(tag);
    out.extend_from_slice(payload);
    out
}
