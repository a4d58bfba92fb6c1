//! Drives reassembly and decoding for a single device session.
//!
//! The transport delivers each transfer to [Acquisition::receive] from its
//! completion callback. Decoded measurements go to a [SampleSink] and every
//! decoded packet counts toward the configured sample limit.
use chrono::{DateTime, Utc};
use crossbeam::channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, trace, Level};
use typed_builder::TypedBuilder;

use crate::command::{Command, DataSource};
use crate::measurement::{Decoded, Measurement};
use crate::packet::decode;
use crate::prelude::*;
use crate::reassembler::Reassembler;

/// Acquisition settings.
///
/// # Example
/// ```
/// use ut32x::acquisition::AcquisitionConfig;
/// use ut32x::command::DataSource;
///
/// let config = AcquisitionConfig::builder()
///     .limit_samples(10)
///     .source(DataSource::Memory)
///     .build();
/// ```
#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AcquisitionConfig {
    /// Stop after this many packets have been decoded. 0 means no limit.
    #[builder(default)]
    pub limit_samples: u64,
    #[builder(default)]
    pub source: DataSource,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Counts samples read against an optional limit.
#[derive(Debug, Default, Clone)]
pub struct SampleLimits {
    limit: u64,
    read: u64,
}

impl SampleLimits {
    /// A `limit` of 0 never triggers.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        SampleLimits { limit, read: 0 }
    }

    pub fn update_samples_read(&mut self, n: u64) {
        self.read += n;
    }

    /// True once the limit has been reached.
    #[must_use]
    pub fn check(&self) -> bool {
        self.limit > 0 && self.read >= self.limit
    }

    #[must_use]
    pub fn samples_read(&self) -> u64 {
        self.read
    }
}

/// A [Measurement] along with the time it was received.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sample {
    #[serde(flatten)]
    pub measurement: Measurement,
    pub received: DateTime<Utc>,
}

/// Destination for decoded samples.
pub trait SampleSink {
    /// # Errors
    /// If the sample cannot be delivered.
    fn send(&mut self, sample: Sample) -> Result<()>;
}

impl SampleSink for Vec<Sample> {
    fn send(&mut self, sample: Sample) -> Result<()> {
        self.push(sample);
        Ok(())
    }
}

impl SampleSink for Sender<Sample> {
    fn send(&mut self, sample: Sample) -> Result<()> {
        Sender::send(self, sample).map_err(|_| Error::SinkClosed)
    }
}

/// Session status after handling a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    /// The session should be stopped; further transfers are ignored.
    Stopping,
}

/// Per-device acquisition state.
///
/// # Example
/// ```
/// use ut32x::acquisition::{Acquisition, AcquisitionConfig, Sample, Status};
///
/// let mut acq = Acquisition::new(AcquisitionConfig::builder().limit_samples(1).build(), Vec::<Sample>::new());
/// #[rustfmt::skip]
/// let transfers: [[u8; 8]; 3] = [
///     [0x07, b'0', b':', b'2', b'3', b'5', b'1', b'0'],
///     [0x07, b'0', b'0', b'0', b'0', b'0', b'0', b'0'],
///     [0x05, b'0', b'0', b'1', 0x0d, 0x0a, 0, 0],
/// ];
/// let mut status = Status::Running;
/// for transfer in &transfers {
///     status = acq.receive(transfer).unwrap();
/// }
/// assert_eq!(status, Status::Stopping);
/// assert_eq!(acq.sink()[0].measurement.value, 23.5);
/// ```
pub struct Acquisition<S>
where
    S: SampleSink,
{
    config: AcquisitionConfig,
    reassembler: Reassembler,
    limits: SampleLimits,
    sink: S,
    status: Status,
    emitted: u64,
}

impl<S> Acquisition<S>
where
    S: SampleSink,
{
    pub fn new(config: AcquisitionConfig, sink: S) -> Self {
        Acquisition {
            limits: SampleLimits::new(config.limit_samples),
            config,
            reassembler: Reassembler::new(),
            sink,
            status: Status::Running,
            emitted: 0,
        }
    }

    /// Handle one transfer from the transport.
    ///
    /// # Errors
    /// [Error::SinkClosed] if a decoded sample could not be delivered.
    pub fn receive(&mut self, transfer: &[u8]) -> Result<Status> {
        if self.status == Status::Stopping {
            trace!("stopping; ignoring transfer");
            return Ok(self.status);
        }
        match self.reassembler.handle(transfer) {
            Some(pkt) => self.process(&pkt),
            None => Ok(self.status),
        }
    }

    fn process(&mut self, pkt: &[u8]) -> Result<Status> {
        let span = span!(Level::TRACE, "packet", n = self.limits.samples_read());
        let _guard = span.enter();

        let decoded = decode(pkt);

        // Packets are counted even without a measurement so a limit still works
        // when reading memory, where unused slots come through as empty.
        self.limits.update_samples_read(1);
        if self.limits.check() {
            info!(
                samples_read = self.limits.samples_read(),
                "sample limit reached"
            );
            self.status = Status::Stopping;
        }

        if let Decoded::Measurement(measurement) = decoded {
            self.sink.send(Sample {
                measurement,
                received: Utc::now(),
            })?;
            self.emitted += 1;
        }
        Ok(self.status)
    }

    /// Mark the session as stopping and return [Acquisition::stop_command].
    pub fn stop(&mut self) -> [u8; 2] {
        debug!(reassembler = %self.reassembler, "stopping acquisition");
        self.status = Status::Stopping;
        self.reassembler.reset();
        self.stop_command()
    }

    /// Bytes that tell the device to stop sending.
    #[must_use]
    pub fn stop_command(&self) -> [u8; 2] {
        Command::Stop.encode()
    }

    /// Bytes that start acquisition from the configured source.
    #[must_use]
    pub fn start_command(&self) -> [u8; 2] {
        Command::start(self.config.source).encode()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of packets decoded, with or without a measurement.
    #[must_use]
    pub fn samples_read(&self) -> u64 {
        self.limits.samples_read()
    }

    /// Number of samples delivered to the sink.
    #[must_use]
    pub fn samples_emitted(&self) -> u64 {
        self.emitted
    }

    #[must_use]
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
