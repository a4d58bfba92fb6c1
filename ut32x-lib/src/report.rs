//! Low-level HID reports.
//!
//! The UT32x talks through a CH9325 USB-to-serial bridge that wraps the serial
//! stream into fixed 8 byte reports. The low nibble of the first byte is the
//! number of valid payload bytes that follow; the rest is padding.
use std::fmt::Display;
use std::io::{ErrorKind, Read};

use crate::prelude::*;

/// A single fixed-size report as received from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    data: [u8; Report::SIZE],
}

impl Report {
    /// Size of every report in bytes.
    pub const SIZE: usize = 8;
    /// Maximum number of payload bytes a report can carry.
    pub const MAX_PAYLOAD: usize = Self::SIZE - 1;

    /// Construct from the provided bytes, or `None` if `dat` is not exactly
    /// [Report::SIZE] bytes.
    #[must_use]
    pub fn decode(dat: &[u8]) -> Option<Self> {
        let data: [u8; Self::SIZE] = dat.try_into().ok()?;
        Some(Report { data })
    }

    /// Number of valid payload bytes following the length byte.
    ///
    /// The length nibble can encode up to 15, but only 7 bytes are available so
    /// larger values are clamped.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        usize::from(self.data[0] & 0x0f).min(Self::MAX_PAYLOAD)
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[1..=self.payload_len()]
    }

    /// All report bytes, including the length byte and padding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Report{{len={}, payload={}}}",
            self.payload_len(),
            hex::encode(self.payload())
        )
    }
}

struct ReportReaderIter<R>
where
    R: Read + Send,
{
    reader: R,
    done: bool,
}

impl<R> ReportReaderIter<R>
where
    R: Read + Send,
{
    /// Fill `buf` as far as the reader allows, returning the number of bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            match self.reader.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(total)
    }
}

impl<R> Iterator for ReportReaderIter<R>
where
    R: Read + Send,
{
    type Item = Result<Report>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = [0u8; Report::SIZE];
        match self.fill(&mut buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) if n < Report::SIZE => {
                self.done = true;
                Some(Err(Error::NotEnoughData {
                    actual: n,
                    minimum: Report::SIZE,
                }))
            }
            Ok(_) => Some(Ok(Report { data: buf })),
            Err(err) => {
                self.done = true;
                Some(Err(Error::Io(err)))
            }
        }
    }
}

/// Return an iterator providing [Report]s read from a capture of back-to-back
/// 8 byte reports.
///
/// Iteration ends at EOF on a report boundary. A trailing partial report is
/// reported as [Error::NotEnoughData].
///
/// # Example
/// ```
/// use ut32x::report::read_reports;
///
/// let dat: &[u8] = &[0x02, b'0', b'1', 0, 0, 0, 0, 0];
/// let reports: Vec<_> = read_reports(dat).filter_map(Result::ok).collect();
/// assert_eq!(reports[0].payload(), b"01");
/// ```
pub fn read_reports<R>(reader: R) -> impl Iterator<Item = Result<Report>>
where
    R: Read + Send,
{
    ReportReaderIter {
        reader,
        done: false,
    }
}
