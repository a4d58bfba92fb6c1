use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::packet::Reject;

/// Temperature unit reported by the device.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Celsius,
    Fahrenheit,
    Kelvin,
    /// Unit code not known to us. The value is still usable.
    Unknown,
}

impl Unit {
    /// Map a unit code, i.e., the unit byte minus ASCII `'0'`.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Unit::Celsius,
            2 => Unit::Fahrenheit,
            3 => Unit::Kelvin,
            _ => Unit::Unknown,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Kelvin => "K",
            Unit::Unknown => "?",
        }
    }
}

/// Logical channel a measurement belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Probe T1
    T1,
    /// Probe T2
    T2,
    /// Difference T1-T2
    Difference,
}

impl Channel {
    /// Map a channel code, i.e., the channel byte minus ASCII `'0'`, or `None` if
    /// the code is not a known channel.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Channel::T1),
            1 => Some(Channel::T2),
            2 | 3 => Some(Channel::Difference),
            _ => None,
        }
    }

    /// Position of this channel in the device's channel list.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Channel::T1 => 0,
            Channel::T2 => 1,
            Channel::Difference => 2,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Channel::T1 => "T1",
            Channel::T2 => "T2",
            Channel::Difference => "T1-T2",
        }
    }

    /// True if values on this channel are relative to another channel.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        matches!(self, Channel::Difference)
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single decoded temperature value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Temperature in whole degrees of `unit`.
    pub value: f32,
    pub unit: Unit,
    pub channel: Channel,
    /// Set only for [Channel::Difference].
    pub relative: bool,
}

impl Measurement {
    #[must_use]
    pub fn new(value: f32, unit: Unit, channel: Channel) -> Self {
        Measurement {
            value,
            unit,
            channel,
            relative: channel.is_relative(),
        }
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:.1}{}", self.channel, self.value, self.unit.symbol())?;
        if self.relative {
            f.write_str(" (relative)")?;
        }
        Ok(())
    }
}

/// Outcome of decoding one packet.
///
/// Both variants count as a sample read; only [Decoded::Measurement] carries data.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Measurement(Measurement),
    /// No value, either because the device reported an empty slot or because the
    /// packet was rejected.
    NoMeasurement(Reject),
}

impl Decoded {
    #[must_use]
    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            Decoded::Measurement(m) => Some(m),
            Decoded::NoMeasurement(_) => None,
        }
    }

    #[must_use]
    pub fn is_measurement(&self) -> bool {
        matches!(self, Decoded::Measurement(_))
    }
}
