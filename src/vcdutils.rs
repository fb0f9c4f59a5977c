use std::fs::File;
use std::io::{self, ErrorKind::InvalidInput, Write};
use std::path::Path;

use vcd::{self, SimulationCommand, TimescaleUnit, Value};

/// Silence between two signals in a capture file, in microseconds. Longer
/// than any u16 sample so a signal never gets split.
pub const CAPTURE_GAP_US: u64 = 100_000;

/// Writes signals as edges on the `top.ir` wire, 1 us timescale.
pub struct VcdWriter<W: Write> {
    vcd: vcd::Writer<W>,
    timestamp: u64,
    wire_id: vcd::IdCode,
}

impl<W: Write> VcdWriter<W> {
    pub fn new(w: W) -> Self {
        let vcd = vcd::Writer::new(w);

        Self {
            vcd,
            timestamp: 0,
            wire_id: vcd::IdCode::FIRST,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        let writer = &mut self.vcd;

        writer.timescale(1, TimescaleUnit::US)?;
        writer.add_module("top")?;

        let id = writer.add_wire(1, "ir")?;
        self.wire_id = id;

        writer.upscope()?;
        writer.enddefinitions()?;

        // Idle line
        writer.begin(SimulationCommand::Dumpvars)?;
        writer.change_scalar(id, Value::V0)?;
        writer.end()?;

        Ok(())
    }

    /// Append one signal. Starts with a rising edge, every sample toggles.
    pub fn write_signal(&mut self, samples: &[u16]) -> io::Result<()> {
        let mut ts = 0u64;
        let mut level = true;

        self.write_value(ts, level)?;
        for sample in samples {
            ts += u64::from(*sample);
            level = !level;
            self.write_value(ts, level)?;
        }

        self.add_offset(ts + CAPTURE_GAP_US);

        Ok(())
    }

    pub fn write_value(&mut self, ts: u64, high: bool) -> io::Result<()> {
        let offseted_ts = self.timestamp + ts;

        self.vcd.timestamp(offseted_ts)?;
        let value = if high { Value::V1 } else { Value::V0 };
        self.vcd.change_scalar(self.wire_id, value)?;

        Ok(())
    }

    pub fn add_offset(&mut self, offset: u64) {
        self.timestamp += offset;
    }
}

/// Read edge timestamps from `top.ir`, in microseconds.
pub fn vcdfile_to_vec(path: &Path) -> io::Result<Vec<u64>> {
    let file = File::open(path)?;
    let mut parser = vcd::Parser::new(&file);

    let header = parser.parse_header()?;
    let data = header
        .find_var(&["top", "ir"])
        .ok_or_else(|| io::Error::new(InvalidInput, "no wire top.ir"))?
        .code;

    // Ticks per second
    let samplerate: u64 = match header.timescale {
        Some((timescale, unit)) => {
            let per_second = match unit {
                TimescaleUnit::S => 1,
                TimescaleUnit::MS => 1_000,
                TimescaleUnit::US => 1_000_000,
                TimescaleUnit::NS => 1_000_000_000,
                _ => return Err(io::Error::new(InvalidInput, "unsupported timescale")),
            };
            per_second / u64::from(timescale.max(1))
        }
        None => 1_000_000,
    };

    if samplerate == 0 {
        return Err(io::Error::new(InvalidInput, "unsupported timescale"));
    }

    log::debug!("samplerate: {}", samplerate);

    let mut current_ts = 0;
    let mut in_dump = false;
    let mut res = Vec::new();

    for command_result in parser {
        use vcd::Command::*;
        let command = command_result?;
        match command {
            Begin(SimulationCommand::Dumpvars) => in_dump = true,
            End(SimulationCommand::Dumpvars) => in_dump = false,
            ChangeScalar(i, _) if i == data && !in_dump => {
                res.push(current_ts * 1_000_000 / samplerate);
            }
            Timestamp(ts) => current_ts = ts,
            _ => (),
        }
    }

    Ok(res)
}

/// Split edge times into signals at gaps of `CAPTURE_GAP_US` or more.
pub fn edges_to_signals(edges: &[u64]) -> Vec<Vec<u16>> {
    let mut signals = Vec::new();
    let mut current = Vec::new();

    for pair in edges.windows(2) {
        let dt = pair[1].saturating_sub(pair[0]);

        if dt >= CAPTURE_GAP_US {
            if !current.is_empty() {
                signals.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(u16::try_from(dt).unwrap_or(u16::MAX));
    }

    if !current.is_empty() {
        signals.push(current);
    }

    signals
}

pub fn read_signals(path: &Path) -> io::Result<Vec<Vec<u16>>> {
    let edges = vcdfile_to_vec(path)?;
    Ok(edges_to_signals(&edges))
}
