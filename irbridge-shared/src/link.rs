use std::path::Path;
use std::time::Duration;

use serialport::{SerialPort, SerialPortInfo};

/// Serial connection to the receiver/transmitter.
pub struct SerialLink;

impl SerialLink {
    pub fn list_ports() -> Result<Vec<SerialPortInfo>, serialport::Error> {
        serialport::available_ports()
    }

    /// Open `path`. Reads on the returned port time out after `timeout`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        baud: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialPort>, serialport::Error> {
        let path = path.as_ref().to_string_lossy();
        log::debug!("opening {} at {} baud", path, baud);

        serialport::new(path, baud).timeout(timeout).open()
    }
}
