use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use structopt::StructOpt;

use irbridge_shared::{CodeBook, ResponderConfig, SerialLink, DEFAULT_CODE_BOOK};

mod capture;
mod irsend;
mod playback;
mod vcdutils;

const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

#[derive(Debug, StructOpt)]
#[structopt(name = "irbridge", about = "Infrared code translator")]
struct Opt {
    /// Serial Device. Defaults to the first available port
    #[structopt(long = "device", parse(from_os_str))]
    serial: Option<PathBuf>,
    #[structopt(long, default_value = "115200")]
    baud: u32,
    /// Serial read timeout
    #[structopt(long = "timeout-ms", default_value = "1000")]
    timeout_ms: u64,
    /// Code book (json). Defaults to the built in one
    #[structopt(long, parse(from_os_str))]
    codes: Option<PathBuf>,
    #[structopt(short, long)]
    debug: bool,
    #[structopt(subcommand)]
    cmd: CliCommand,
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// Classify received signals and send translations
    Run {
        /// Append signals that match no code to this vcd file
        #[structopt(long, parse(from_os_str))]
        capture: Option<PathBuf>,
        /// Wait before sending a translated code
        #[structopt(long = "delay-ms", default_value = "1000")]
        delay_ms: u64,
    },
    /// Transmit a code from the code book
    Send {
        name: String,
        #[structopt(long, default_value = "20")]
        repeat: u8,
    },
    /// Classify the signals in a vcd capture
    Classify {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// List the code book
    Codes {},
    /// List serial ports
    Ports {},
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new().filter_level(loglevel).init();

    let book = match &opt.codes {
        Some(path) => CodeBook::load(path)
            .with_context(|| format!("loading code book {}", path.display()))?,
        None => CodeBook::from_json(DEFAULT_CODE_BOOK)?,
    };

    let timeout = Duration::from_millis(opt.timeout_ms);

    match opt.cmd {
        CliCommand::Run { capture, delay_ms } => {
            let capture_file = capture
                .map(|path| {
                    File::create(&path)
                        .with_context(|| format!("creating capture file {}", path.display()))
                })
                .transpose()?;

            let port = SerialLink::open(device_path(opt.serial), opt.baud, timeout)?;
            let config = ResponderConfig {
                delay: Duration::from_millis(delay_ms),
            };
            capture::command_run(port, book, config, capture_file)
        }
        CliCommand::Send { name, repeat } => {
            let port = SerialLink::open(device_path(opt.serial), opt.baud, timeout)?;
            irsend::transmit(port, &book, &name, repeat)
        }
        CliCommand::Classify { path } => playback::command_classify(&book, &path),
        CliCommand::Codes {} => {
            list_codes(&book);
            Ok(())
        }
        CliCommand::Ports {} => {
            for port in SerialLink::list_ports()? {
                println!("{}\t{:?}", port.port_name, port.port_type);
            }
            Ok(())
        }
    }
}

fn device_path(serial: Option<PathBuf>) -> PathBuf {
    if let Some(path) = serial {
        return path;
    }

    SerialLink::list_ports()
        .ok()
        .and_then(|ports| ports.into_iter().next())
        .map(|port| PathBuf::from(port.port_name))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE))
}

fn list_codes(book: &CodeBook) {
    for (index, code) in book.codes().iter().enumerate() {
        println!("{}\t{}\t{} samples", index, code.name, code.samples.len());
    }

    for (from, to) in book.translations() {
        println!(
            "{} -> {}",
            book.name(from).unwrap_or("?"),
            book.name(to).unwrap_or("?")
        );
    }

    println!("tolerance: {} us", book.tolerance());
}
