//! Messages exchanged with the receiver/transmitter firmware.
//!
//! A frame body is a type tag followed by a type specific payload:
//!
//! ```text
//! 0 Message       subtype:u8 | code:u8 | extra:byte[*]
//! 1 Received      repeat:u8  | sample:u16le[*]
//! 2 SendRequest   repeat:u8  | sample:u16le[*]
//! 3 SendResponse  (not interpreted)
//! ```
//!
//! Samples are pulse durations in microseconds.

use std::fmt::Write;

use crate::error::DecodeError;

pub const TYPE_MESSAGE: u8 = 0;
pub const TYPE_RECEIVED: u8 = 1;
pub const TYPE_SEND_REQUEST: u8 = 2;
pub const TYPE_SEND_RESPONSE: u8 = 3;

/// Largest payload that fits the u16 frame length next to the type byte.
pub const MAX_PAYLOAD: usize = u16::MAX as usize - 1;

/// Largest sample count a `SendRequest` can carry.
pub const MAX_SAMPLES: usize = (MAX_PAYLOAD - 1) / 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Informational message from the firmware
    Message { subtype: u8, code: u8, extra: Vec<u8> },
    /// A captured signal
    Received { repeat: u8, samples: Vec<u16> },
    /// Ask the firmware to transmit a signal
    SendRequest { repeat: u8, samples: Vec<u16> },
    /// Acknowledgement of a send request
    SendResponse { payload: Vec<u8> },
    /// Any tag this side does not know about
    Unknown { tag: u8, payload: Vec<u8> },
}

impl Message {
    pub fn tag(&self) -> u8 {
        match self {
            Message::Message { .. } => TYPE_MESSAGE,
            Message::Received { .. } => TYPE_RECEIVED,
            Message::SendRequest { .. } => TYPE_SEND_REQUEST,
            Message::SendResponse { .. } => TYPE_SEND_RESPONSE,
            Message::Unknown { tag, .. } => *tag,
        }
    }

    /// Decode a frame body (type byte included).
    pub fn decode(body: &[u8]) -> Result<Message, DecodeError> {
        let (&tag, payload) = body.split_first().ok_or(DecodeError::Empty)?;

        match tag {
            TYPE_MESSAGE => match payload {
                [subtype, code, extra @ ..] => Ok(Message::Message {
                    subtype: *subtype,
                    code: *code,
                    extra: extra.to_vec(),
                }),
                _ => Err(DecodeError::Truncated {
                    kind: "message",
                    len: payload.len(),
                }),
            },
            TYPE_RECEIVED => {
                let (repeat, samples) = decode_samples("received", payload)?;
                Ok(Message::Received { repeat, samples })
            }
            TYPE_SEND_REQUEST => {
                let (repeat, samples) = decode_samples("send request", payload)?;
                Ok(Message::SendRequest { repeat, samples })
            }
            TYPE_SEND_RESPONSE => Ok(Message::SendResponse {
                payload: payload.to_vec(),
            }),
            tag => Ok(Message::Unknown {
                tag,
                payload: payload.to_vec(),
            }),
        }
    }

    /// Encode the payload (without the type byte).
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Message::Message {
                subtype,
                code,
                extra,
            } => {
                let mut out = Vec::with_capacity(2 + extra.len());
                out.push(*subtype);
                out.push(*code);
                out.extend_from_slice(extra);
                out
            }
            Message::Received { repeat, samples } | Message::SendRequest { repeat, samples } => {
                encode_samples(*repeat, samples)
            }
            Message::SendResponse { payload } | Message::Unknown { payload, .. } => payload.clone(),
        }
    }
}

fn decode_samples(kind: &'static str, payload: &[u8]) -> Result<(u8, Vec<u16>), DecodeError> {
    let (&repeat, data) = payload.split_first().ok_or(DecodeError::Truncated {
        kind,
        len: payload.len(),
    })?;

    if data.len() % 2 != 0 {
        return Err(DecodeError::OddSampleBytes { len: data.len() });
    }

    let samples = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok((repeat, samples))
}

fn encode_samples(repeat: u8, samples: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + samples.len() * 2);
    out.push(repeat);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Lower case hex dump used in diagnostics.
pub fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{:02x}", b);
    }
    s
}
