//! Reassembly of low-level reports into application packets.
use std::fmt::Display;

use tracing::{debug, trace};

use crate::packet::{PACKET_SIZE, TERMINATOR};
use crate::report::Report;

/// Reassembly state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing buffered. Initial and idle state.
    Empty,
    /// Part of a packet has been buffered.
    Accumulating,
}

/// Accumulates report payloads until a packet terminator is seen.
///
/// Whenever the buffer ends with the `CR LF` terminator its contents are
/// returned as a complete packet. If the buffer grows past [PACKET_SIZE]
/// without a terminator it is flushed anyway so a corrupt stream cannot grow
/// the buffer without bound; the packet decoder rejects such packets.
///
/// # Example
/// ```
/// use ut32x::reassembler::Reassembler;
///
/// let mut reassembler = Reassembler::new();
/// assert!(reassembler.handle(&[0x03, b'0', b'0', b'2', 0, 0, 0, 0]).is_none());
/// let packet = reassembler.handle(&[0x02, 0x0d, 0x0a, 0, 0, 0, 0, 0]).unwrap();
/// assert_eq!(packet, b"002\r\n");
/// assert!(reassembler.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Reassembler {
    buf: Vec<u8>,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Reassembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Reassembler{{state={:?}, len={}}}",
            self.state(),
            self.buf.len()
        )
    }
}

impl Reassembler {
    #[must_use]
    pub fn new() -> Self {
        Reassembler {
            // Worst case is a full report appended to a buffer one byte short of overflowing
            buf: Vec::with_capacity(PACKET_SIZE + Report::MAX_PAYLOAD),
        }
    }

    /// Handle a raw transfer from the transport.
    ///
    /// Transfers that are not exactly [Report::SIZE] bytes are ignored and leave
    /// the reassembly state untouched.
    pub fn handle(&mut self, transfer: &[u8]) -> Option<Vec<u8>> {
        let Some(report) = Report::decode(transfer) else {
            trace!(len = transfer.len(), "ignoring transfer with unexpected length");
            return None;
        };
        self.feed(&report)
    }

    /// Append the payload of `report`, returning a packet if one was completed
    /// or force-flushed.
    pub fn feed(&mut self, report: &Report) -> Option<Vec<u8>> {
        trace!(report = %report, reassembler = %self, "feed");
        self.buf.extend_from_slice(report.payload());

        // The terminator may be split across reports so check the buffer tail
        if self.buf.ends_with(&TERMINATOR) {
            trace!(len = self.buf.len(), "end of packet");
            return Some(self.take());
        }
        if self.buf.len() > PACKET_SIZE {
            debug!(reassembler = %self, "buffer overrun");
            return Some(self.take());
        }
        None
    }

    fn take(&mut self) -> Vec<u8> {
        let packet = self.buf.clone();
        self.buf.clear();
        packet
    }

    /// Drop any partially buffered packet.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    #[must_use]
    pub fn state(&self) -> State {
        if self.buf.is_empty() {
            State::Empty
        } else {
            State::Accumulating
        }
    }

    /// Number of bytes currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
