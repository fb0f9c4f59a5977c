use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use crate::codes::CodeBook;
use crate::error::LinkError;
use crate::framer::Framer;
use crate::protocol::Message;

/// Repeat count of a translated send request.
pub const TRANSLATE_REPEAT: u8 = 20;

/// Settle time for the downstream receiver before a translated code is sent.
pub const TRANSLATE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub delay: Duration,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            delay: TRANSLATE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// No code within tolerance
    Unknown,
    /// Known code without a translation rule
    Recognized { index: usize },
    /// Known code, `to` was sent
    Translated { from: usize, to: usize },
}

/// Acts on a classified signal.
pub struct Responder {
    config: ResponderConfig,
}

impl Responder {
    pub fn new(config: ResponderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    pub fn respond<S: Read + Write>(
        &self,
        book: &CodeBook,
        framer: &mut Framer<S>,
        repeat: u8,
        samples: &[u16],
        classified: Option<usize>,
    ) -> Result<Response, LinkError> {
        let index = match classified {
            Some(index) => index,
            None => {
                log::warn!(
                    "received repeat {} length {} times {:?}",
                    repeat,
                    samples.len(),
                    samples
                );
                return Ok(Response::Unknown);
            }
        };

        let name = book.name(index).unwrap_or("?");

        let target = book
            .translation(index)
            .and_then(|to| book.get(to).map(|code| (to, code)));

        let (to, code) = match target {
            Some(target) => target,
            None => {
                log::info!("{}", name);
                return Ok(Response::Recognized { index });
            }
        };

        log::info!("{}: translate to {} ({})", name, to, code.name);

        thread::sleep(self.config.delay);

        framer.write_message(&Message::SendRequest {
            repeat: TRANSLATE_REPEAT,
            samples: code.samples.clone(),
        })?;

        log::debug!("sent {} samples of {}", code.samples.len(), code.name);

        Ok(Response::Translated { from: index, to })
    }
}
