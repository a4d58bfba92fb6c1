//! Host to device commands.
//!
//! Commands are written to the OUT endpoint as a length byte of 1 followed by a
//! single command code.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the device reads measurements from.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Live readings from the probes.
    #[default]
    Live,
    /// Readings stored in device memory. Unused memory slots come through as
    /// empty-slot packets.
    Memory,
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(DataSource::Live),
            "memory" => Ok(DataSource::Memory),
            _ => Err(format!("invalid data source {s:?}; expected live or memory")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetLive,
    Stop,
    GetStored,
}

impl Command {
    /// Length byte preceding the command code.
    const LEN: u8 = 0x01;

    /// Command that starts acquisition from `source`.
    #[must_use]
    pub fn start(source: DataSource) -> Self {
        match source {
            DataSource::Live => Command::GetLive,
            DataSource::Memory => Command::GetStored,
        }
    }

    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Command::GetLive => 0x01,
            Command::Stop => 0x02,
            Command::GetStored => 0x07,
        }
    }

    /// Bytes to write to the device.
    #[must_use]
    pub fn encode(&self) -> [u8; 2] {
        [Self::LEN, self.code()]
    }
}
