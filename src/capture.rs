use std::fs::File;
use std::io::{Read, Write};

use irbridge_shared::{Bridge, CodeBook, Dispatched, ResponderConfig, Response, Step};

use crate::vcdutils::VcdWriter;

/// Run the bridge loop. Signals that match no code are appended to
/// `capture_file` when given.
pub fn command_run<S: Read + Write>(
    port: S,
    book: CodeBook,
    config: ResponderConfig,
    capture_file: Option<File>,
) -> anyhow::Result<()> {
    log::info!("Translating, delay {:?}", config.delay);

    let mut bridge = Bridge::new(port, book, config);

    if let Some(file) = capture_file {
        let mut vcd = VcdWriter::new(file);
        vcd.init()?;

        bridge = bridge.with_observer(move |step| {
            if let Some(samples) = unclassified(step) {
                if let Err(e) = vcd.write_signal(samples) {
                    log::error!("capture write failed: {}", e);
                }
            }
        });
    }

    bridge.run()?;

    Ok(())
}

fn unclassified(step: &Step) -> Option<&[u16]> {
    match step {
        Step::Dispatched(Dispatched::Signal {
            samples,
            response: Response::Unknown,
            ..
        }) => Some(samples.as_slice()),
        _ => None,
    }
}
