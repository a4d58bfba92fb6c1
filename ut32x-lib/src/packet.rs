//! UT32x application packet decoding.
//!
//! An application packet is 19 ASCII-ish bytes terminated by `CR LF`:
//!
//! ```text
//! offset  0    1..=4       5     6..=7  8    9..=12  13       14..=15  16   17  18
//!        [?]  [temp x10]  [unit] [?]   ['0'] [?]    [channel] [?]     ['1'] CR  LF
//! ```
//!
//! The temperature field holds tenths of a degree as ASCII digits, where `:` is a
//! blank and `;` is a negative sign. A field of `;;;;` means there is no value,
//! e.g., a missing probe or an unused memory slot.
use tracing::{debug, trace, warn};

use crate::measurement::{Channel, Decoded, Measurement, Unit};

/// Canonical length of an application packet, including terminator.
pub const PACKET_SIZE: usize = 19;
/// Packet terminator.
pub const TERMINATOR: [u8; 2] = [0x0d, 0x0a];
/// Temperature field blank.
pub const BLANK: u8 = b':';
/// Temperature field negative sign.
pub const NEGATIVE: u8 = b';';

const TEMPERATURE_OFFSET: usize = 1;
const TEMPERATURE_LEN: usize = 4;
const UNIT_OFFSET: usize = 5;
const CHANNEL_OFFSET: usize = 13;
/// Fixed framing bytes and the values they must have.
const MARKERS: [(usize, u8); 2] = [(8, b'0'), (16, b'1')];
const EMPTY_SLOT: [u8; TEMPERATURE_LEN] = [NEGATIVE; TEMPERATURE_LEN];

/// Reason a packet did not produce a [Measurement].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    #[error("expected 19 bytes, got {0}")]
    Length(usize),
    #[error("missing packet terminator")]
    Terminator,
    #[error("bad marker byte 0x{value:02x} at offset {offset}")]
    Marker { offset: usize, value: u8 },
    /// The device explicitly reported no value.
    #[error("empty slot")]
    EmptySlot,
    #[error("double negative sign")]
    DoubleSign,
    #[error("invalid digit 0x{0:02x}")]
    InvalidDigit(u8),
    #[error("unknown channel 0x{0:02x}")]
    UnknownChannel(u8),
}

/// Parse a 4 byte temperature field in tenths of a degree into degrees.
///
/// # Errors
/// [Reject::DoubleSign] if more than one negative sign is present, or
/// [Reject::InvalidDigit] for any byte that is not a digit, blank, or sign.
///
/// # Example
/// ```
/// use ut32x::packet::parse_temperature;
///
/// assert_eq!(parse_temperature(b":025").unwrap(), 2.5);
/// assert_eq!(parse_temperature(b";025").unwrap(), -2.5);
/// assert!(parse_temperature(b";;25").is_err());
/// ```
pub fn parse_temperature(field: &[u8; 4]) -> Result<f32, Reject> {
    let mut negative = false;
    let mut tenths: u32 = 0;
    for &b in field {
        match b {
            BLANK => continue,
            NEGATIVE => {
                if negative {
                    return Err(Reject::DoubleSign);
                }
                negative = true;
            }
            b'0'..=b'9' => tenths = tenths * 10 + u32::from(b - b'0'),
            _ => return Err(Reject::InvalidDigit(b)),
        }
    }
    // at most 4 digits, so the conversion is exact
    let value = tenths as f32 / 10.0;
    Ok(if negative { -value } else { value })
}

/// Check length, terminator, and marker bytes.
fn validate(pkt: &[u8]) -> Result<(), Reject> {
    if pkt.len() != PACKET_SIZE {
        return Err(Reject::Length(pkt.len()));
    }
    if pkt[PACKET_SIZE - TERMINATOR.len()..] != TERMINATOR {
        return Err(Reject::Terminator);
    }
    for (offset, expected) in MARKERS {
        if pkt[offset] != expected {
            return Err(Reject::Marker {
                offset,
                value: pkt[offset],
            });
        }
    }
    Ok(())
}

fn decode_measurement(pkt: &[u8]) -> Result<Measurement, Reject> {
    validate(pkt)?;

    let mut field = [0u8; TEMPERATURE_LEN];
    field.copy_from_slice(&pkt[TEMPERATURE_OFFSET..TEMPERATURE_OFFSET + TEMPERATURE_LEN]);
    if field == EMPTY_SLOT {
        return Err(Reject::EmptySlot);
    }
    let value = parse_temperature(&field)?;

    let unit = Unit::from_code(pkt[UNIT_OFFSET].wrapping_sub(b'0'));
    if unit == Unit::Unknown {
        debug!("unknown unit 0x{:02x}", pkt[UNIT_OFFSET]);
    }

    let channel = Channel::from_code(pkt[CHANNEL_OFFSET].wrapping_sub(b'0'))
        .ok_or(Reject::UnknownChannel(pkt[CHANNEL_OFFSET]))?;

    Ok(Measurement::new(value, unit, channel))
}

/// Decode an assembled packet.
///
/// Decoding never fails; malformed packets, empty slots, and unknown channels
/// all produce [Decoded::NoMeasurement] with the reason.
///
/// # Example
/// ```
/// use ut32x::measurement::{Channel, Decoded, Unit};
/// use ut32x::packet::decode;
///
/// let decoded = decode(b"0:235100000000001\r\n");
/// let m = decoded.measurement().unwrap();
/// assert_eq!(m.value, 23.5);
/// assert_eq!(m.unit, Unit::Celsius);
/// assert_eq!(m.channel, Channel::T1);
/// ```
#[must_use]
pub fn decode(pkt: &[u8]) -> Decoded {
    trace!(len = pkt.len(), bytes = %hex::encode(pkt), "got a packet");
    match decode_measurement(pkt) {
        Ok(m) => Decoded::Measurement(m),
        Err(reject) => {
            match reject {
                Reject::UnknownChannel(_) => warn!("dropping packet: {reject}"),
                _ => debug!("dropping packet: {reject}"),
            }
            Decoded::NoMeasurement(reject)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    /// Build a valid packet with the given temperature field, unit byte, and channel byte.
    fn packet(temp: &[u8; 4], unit: u8, channel: u8) -> Vec<u8> {
        let mut pkt = b"0:000100000000001\r\n".to_vec();
        pkt[TEMPERATURE_OFFSET..TEMPERATURE_OFFSET + 4].copy_from_slice(temp);
        pkt[UNIT_OFFSET] = unit;
        pkt[CHANNEL_OFFSET] = channel;
        pkt
    }

    #[test_case(b"0025", 2.5)]
    #[test_case(b":025", 2.5)]
    #[test_case(b";025", -2.5)]
    #[test_case(b"::::", 0.0)]
    #[test_case(b"9999", 999.9)]
    #[test_case(b":;12", -1.2)]
    #[test_case(b"12;3", -12.3)]
    fn parse_temperature_values(field: &[u8; 4], expected: f32) {
        assert_eq!(parse_temperature(field).unwrap(), expected);
    }

    #[test_case(b";;25", Reject::DoubleSign)]
    #[test_case(b";;;;", Reject::DoubleSign)]
    #[test_case(b"00a5", Reject::InvalidDigit(b'a'))]
    #[test_case(b" 025", Reject::InvalidDigit(b' '))]
    #[test_case(b"---1", Reject::InvalidDigit(b'-'))]
    fn parse_temperature_failures(field: &[u8; 4], expected: Reject) {
        assert_eq!(parse_temperature(field).unwrap_err(), expected);
    }

    #[test]
    fn decode_negative_celsius_t1() {
        let decoded = decode(&packet(b";025", b'1', b'0'));

        assert_eq!(
            decoded,
            Decoded::Measurement(Measurement {
                value: -2.5,
                unit: Unit::Celsius,
                channel: Channel::T1,
                relative: false,
            })
        );
    }

    #[test_case(b'1', Unit::Celsius)]
    #[test_case(b'2', Unit::Fahrenheit)]
    #[test_case(b'3', Unit::Kelvin)]
    #[test_case(b'9', Unit::Unknown)]
    #[test_case(b'0', Unit::Unknown)]
    #[test_case(b'/', Unit::Unknown)]
    fn decode_units(unit: u8, expected: Unit) {
        let decoded = decode(&packet(b"0123", unit, b'0'));
        let m = decoded.measurement().expect("unit never rejects a packet");
        assert_eq!(m.unit, expected);
        assert_eq!(m.value, 12.3);
    }

    #[test_case(b'0', Channel::T1, false)]
    #[test_case(b'1', Channel::T2, false)]
    #[test_case(b'2', Channel::Difference, true)]
    #[test_case(b'3', Channel::Difference, true)]
    fn decode_channels(channel: u8, expected: Channel, relative: bool) {
        let decoded = decode(&packet(b"0123", b'1', channel));
        let m = decoded.measurement().unwrap();
        assert_eq!(m.channel, expected);
        assert_eq!(m.relative, relative);
    }

    #[test_case(b'5')]
    #[test_case(b'4')]
    #[test_case(0x00)]
    #[test_case(b'A')]
    fn decode_unknown_channel(channel: u8) {
        assert_eq!(
            decode(&packet(b"0123", b'1', channel)),
            Decoded::NoMeasurement(Reject::UnknownChannel(channel))
        );
    }

    #[test]
    fn decode_empty_slot() {
        assert_eq!(
            decode(&packet(b";;;;", b'1', b'0')),
            Decoded::NoMeasurement(Reject::EmptySlot)
        );
        // Distinct from a parse failure
        assert_eq!(
            decode(&packet(b";;25", b'1', b'0')),
            Decoded::NoMeasurement(Reject::DoubleSign)
        );
    }

    #[test]
    fn decode_empty_slot_with_unknown_channel() {
        assert_eq!(
            decode(&packet(b";;;;", b'1', b'7')),
            Decoded::NoMeasurement(Reject::EmptySlot)
        );
    }

    #[test]
    fn decode_wrong_length() {
        let pkt = packet(b"0123", b'1', b'0');

        assert_eq!(
            decode(&pkt[..18]),
            Decoded::NoMeasurement(Reject::Length(18))
        );
        assert_eq!(decode(&[]), Decoded::NoMeasurement(Reject::Length(0)));

        let mut long = vec![b'0'];
        long.extend_from_slice(&pkt);
        assert_eq!(decode(&long), Decoded::NoMeasurement(Reject::Length(20)));
    }

    #[test]
    fn decode_bad_terminator() {
        let mut pkt = packet(b"0123", b'1', b'0');
        pkt[18] = b'\r';
        assert_eq!(decode(&pkt), Decoded::NoMeasurement(Reject::Terminator));

        let mut pkt = packet(b"0123", b'1', b'0');
        pkt[17] = b'\n';
        assert_eq!(decode(&pkt), Decoded::NoMeasurement(Reject::Terminator));
    }

    #[test]
    fn decode_bad_markers() {
        let mut pkt = packet(b"0123", b'1', b'0');
        pkt[8] = b'1';
        assert_eq!(
            decode(&pkt),
            Decoded::NoMeasurement(Reject::Marker {
                offset: 8,
                value: b'1'
            })
        );

        let mut pkt = packet(b"0123", b'1', b'0');
        pkt[16] = b'0';
        assert_eq!(
            decode(&pkt),
            Decoded::NoMeasurement(Reject::Marker {
                offset: 16,
                value: b'0'
            })
        );
    }

    #[test]
    fn reject_messages() {
        assert_eq!(Reject::Length(3).to_string(), "expected 19 bytes, got 3");
        assert_eq!(
            Reject::Marker {
                offset: 8,
                value: 0x41
            }
            .to_string(),
            "bad marker byte 0x41 at offset 8"
        );
        assert_eq!(Reject::UnknownChannel(0x35).to_string(), "unknown channel 0x35");
    }
}
