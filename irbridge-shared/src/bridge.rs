use std::io::{Read, Write};

use crate::codes::CodeBook;
use crate::dispatcher::{Dispatched, Dispatcher};
use crate::error::LinkError;
use crate::framer::{Framer, ReadOutcome};
use crate::responder::ResponderConfig;

/// Result of one pass through the bridge loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Dropped { declared: usize, received: usize },
    Dispatched(Dispatched),
}

type Observer = Box<dyn FnMut(&Step)>;

/// Read a frame, dispatch it, maybe write a frame back. Repeat.
pub struct Bridge<S> {
    framer: Framer<S>,
    dispatcher: Dispatcher,
    observer: Option<Observer>,
}

impl<S: Read + Write> Bridge<S> {
    pub fn new(stream: S, book: CodeBook, config: ResponderConfig) -> Self {
        Self {
            framer: Framer::new(stream),
            dispatcher: Dispatcher::new(book, config),
            observer: None,
        }
    }

    /// Call `observer` after every step.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&Step) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn step(&mut self) -> Result<Step, LinkError> {
        let step = match self.framer.read_packet()? {
            ReadOutcome::Packet(packet) => {
                Step::Dispatched(self.dispatcher.dispatch(&mut self.framer, &packet)?)
            }
            ReadOutcome::Dropped { declared, received } => {
                log::warn!("dropped frame: declared {} received {}", declared, received);
                Step::Dropped { declared, received }
            }
        };

        if let Some(observer) = self.observer.as_mut() {
            observer(&step);
        }

        Ok(step)
    }

    /// Run until the link fails.
    pub fn run(&mut self) -> Result<(), LinkError> {
        log::info!("bridge running with {} codes", self.dispatcher.book().len());

        loop {
            self.step()?;
        }
    }

    pub fn framer(&self) -> &Framer<S> {
        &self.framer
    }

    pub fn into_inner(self) -> S {
        self.framer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::codes::Code;
    use crate::error::DecodeError;
    use crate::protocol::{Message, TYPE_MESSAGE, TYPE_RECEIVED};
    use crate::responder::{Response, TRANSLATE_REPEAT};
    use crate::testing::{frame, raw_frame, Event, ScriptedPort};

    fn book() -> CodeBook {
        CodeBook::new(
            vec![
                Code::new("vol up", vec![600, 600, 1200]),
                Code::new("vol down", vec![1200, 600, 600]),
                Code::new("amp vol up", vec![300, 900, 300, 900]),
            ],
            [(0, 2)],
        )
        .unwrap()
    }

    fn config() -> ResponderConfig {
        ResponderConfig {
            delay: Duration::ZERO,
        }
    }

    fn received(samples: &[u16]) -> Vec<u8> {
        frame(&Message::Received {
            repeat: 1,
            samples: samples.to_vec(),
        })
    }

    #[test]
    fn run_until_closed() {
        let mut wire = Vec::new();
        wire.extend(raw_frame(TYPE_MESSAGE, &[1, 1]));
        wire.extend(received(&[610, 590, 1190]));
        wire.extend(raw_frame(0x55, &[0]));
        wire.extend(received(&[1, 2, 3]));

        let mut bridge = Bridge::new(ScriptedPort::with_data(wire), book(), config());
        assert!(matches!(bridge.run(), Err(LinkError::Closed)));

        let written = bridge.into_inner().written;
        assert_eq!(
            written,
            frame(&Message::SendRequest {
                repeat: TRANSLATE_REPEAT,
                samples: vec![300, 900, 300, 900]
            })
        );
    }

    #[test]
    fn observer_sees_every_step() {
        let short = received(&[1, 2, 3, 4, 5]);
        let cut = short.len() - 5;

        let port = ScriptedPort::new(vec![
            Event::Data(short[..cut].to_vec()),
            Event::Timeout,
            Event::Timeout,
            Event::Data(received(&[1200, 600, 600])),
        ]);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut bridge = Bridge::new(port, book(), config())
            .with_observer(move |step| sink.borrow_mut().push(step.clone()));

        assert!(matches!(bridge.run(), Err(LinkError::Closed)));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            Step::Dropped {
                declared: 12,
                received: 7
            }
        );
        assert_eq!(
            seen[1],
            Step::Dispatched(Dispatched::Signal {
                repeat: 1,
                samples: vec![1200, 600, 600],
                response: Response::Recognized { index: 1 },
            })
        );
    }

    #[test]
    fn observer_keeps_invalid_frames() {
        let mut wire = raw_frame(TYPE_RECEIVED, &[1, 0x58, 0x02, 0x58]);
        wire.extend(vec![0, 0]);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut bridge = Bridge::new(ScriptedPort::with_data(wire), book(), config())
            .with_observer(move |step| sink.borrow_mut().push(step.clone()));

        assert!(matches!(bridge.run(), Err(LinkError::Closed)));
        assert_eq!(
            *seen.borrow(),
            vec![
                Step::Dispatched(Dispatched::Invalid(DecodeError::OddSampleBytes { len: 3 })),
                Step::Dispatched(Dispatched::Invalid(DecodeError::Empty)),
            ]
        );
    }

    #[test]
    fn write_failure_stops_the_loop() {
        struct ReadOnly(ScriptedPort);

        impl Read for ReadOnly {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.0.read(buf)
            }
        }

        impl Write for ReadOnly {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let port = ReadOnly(ScriptedPort::with_data(received(&[600, 600, 1200])));
        let mut bridge = Bridge::new(port, book(), config());
        assert!(matches!(bridge.step(), Err(LinkError::Io(_))));
    }
}
