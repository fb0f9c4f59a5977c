use std::io::{Read, Write};

use crate::codes::CodeBook;
use crate::error::{DecodeError, LinkError};
use crate::framer::{Framer, Packet};
use crate::protocol::{hex, Message};
use crate::responder::{Responder, ResponderConfig, Response};

/// What happened to a dispatched packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Informational message, logged
    Info { subtype: u8, code: u8, extra: Vec<u8> },
    /// Captured signal and what was done about it
    Signal {
        repeat: u8,
        samples: Vec<u16>,
        response: Response,
    },
    /// Send request/response, nothing to do on this side
    Ignored { tag: u8 },
    /// Unknown type tag, logged
    Unknown { tag: u8 },
    /// Payload could not be decoded, logged
    Invalid(DecodeError),
}

/// Routes incoming packets by type.
pub struct Dispatcher {
    book: CodeBook,
    responder: Responder,
}

impl Dispatcher {
    pub fn new(book: CodeBook, config: ResponderConfig) -> Self {
        Self {
            book,
            responder: Responder::new(config),
        }
    }

    pub fn book(&self) -> &CodeBook {
        &self.book
    }

    /// Handle one packet. Only a failed write of a translated code is an
    /// error; everything else ends up in the log.
    pub fn dispatch<S: Read + Write>(
        &self,
        framer: &mut Framer<S>,
        packet: &Packet,
    ) -> Result<Dispatched, LinkError> {
        let msg = match Message::decode(packet.body()) {
            Ok(msg) => msg,
            Err(err) => {
                log::warn!("invalid frame ({}): {}", err, hex(packet.body()));
                return Ok(Dispatched::Invalid(err));
            }
        };

        let tag = msg.tag();

        match msg {
            Message::Message {
                subtype,
                code,
                extra,
            } => {
                log::info!(
                    "message type {} code {} extra {}",
                    subtype,
                    code,
                    String::from_utf8_lossy(&extra)
                );
                Ok(Dispatched::Info {
                    subtype,
                    code,
                    extra,
                })
            }
            Message::Received { repeat, samples } => {
                let classified = self.book.classify(&samples);
                let response =
                    self.responder
                        .respond(&self.book, framer, repeat, &samples, classified)?;

                Ok(Dispatched::Signal {
                    repeat,
                    samples,
                    response,
                })
            }
            Message::SendRequest { .. } | Message::SendResponse { .. } => {
                log::debug!("ignoring packet type {}", tag);
                Ok(Dispatched::Ignored { tag })
            }
            Message::Unknown { .. } => {
                log::warn!("unknown type {} payload {}", tag, hex(packet.body()));
                Ok(Dispatched::Unknown { tag })
            }
        }
    }
}
