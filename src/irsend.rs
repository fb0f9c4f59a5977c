use std::io::{Read, Write};

use irbridge_shared::{CodeBook, Framer, Message};

pub fn transmit<S: Read + Write>(
    port: S,
    book: &CodeBook,
    name: &str,
    repeat: u8,
) -> anyhow::Result<()> {
    let code = book
        .find(name)
        .and_then(|index| book.get(index))
        .ok_or_else(|| anyhow::anyhow!("no code named {:?}", name))?;

    log::info!("Sending {} x{} ({} samples)", code.name, repeat, code.samples.len());

    let mut framer = Framer::new(port);
    framer.write_message(&Message::SendRequest {
        repeat,
        samples: code.samples.clone(),
    })?;

    Ok(())
}
