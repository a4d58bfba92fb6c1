use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use ut32x::acquisition::{Acquisition, AcquisitionConfig, Sample, SampleSink, Status};
use ut32x::report::read_reports;

use crate::Format;

/// Writes samples as they are decoded.
struct Printer<W: Write> {
    out: W,
    format: Format,
}

impl<W: Write> SampleSink for Printer<W> {
    fn send(&mut self, sample: Sample) -> ut32x::Result<()> {
        match self.format {
            Format::Text => writeln!(
                self.out,
                "{} {}",
                sample.received.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                sample.measurement
            )?,
            Format::Json => {
                serde_json::to_writer(&mut self.out, &sample).map_err(std::io::Error::from)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Summary {
    /// Packets decoded, with or without a measurement
    pub packets: u64,
    /// Samples written
    pub samples: u64,
    /// True if decoding stopped at the sample limit
    pub stopped: bool,
}

pub fn decode<W: Write>(
    input: &Path,
    config: AcquisitionConfig,
    format: Format,
    out: W,
) -> Result<Summary> {
    let src = File::open(input).with_context(|| format!("opening input {input:?}"))?;
    let mut acq = Acquisition::new(config, Printer { out, format });

    let mut stopped = false;
    for (idx, report) in read_reports(BufReader::new(src)).enumerate() {
        let report = report.with_context(|| format!("reading report {idx}"))?;
        if acq.receive(report.as_bytes()).context("writing sample")? == Status::Stopping {
            debug!(report = idx, "stopping early");
            stopped = true;
            break;
        }
    }

    let summary = Summary {
        packets: acq.samples_read(),
        samples: acq.samples_emitted(),
        stopped,
    };
    acq.into_sink().out.flush()?;
    Ok(summary)
}
