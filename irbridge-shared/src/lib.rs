//! Host side of the IR bridge: frames on the serial link, signal
//! classification and code translation.

pub mod bridge;
pub mod classifier;
pub mod codes;
pub mod dispatcher;
pub mod error;
pub mod framer;
#[cfg(feature = "utils")]
pub mod link;
pub mod protocol;
pub mod responder;

#[cfg(test)]
mod testing;

pub use bridge::{Bridge, Step};
pub use codes::{Code, CodeBook, DEFAULT_CODE_BOOK};
pub use dispatcher::{Dispatched, Dispatcher};
pub use error::{CodeBookError, DecodeError, LinkError};
pub use framer::{Framer, Packet, ReadOutcome};
#[cfg(feature = "utils")]
pub use link::SerialLink;
pub use protocol::Message;
pub use responder::{Response, ResponderConfig};
