use std::io::Write;

use anyhow::{bail, Context, Result};
use ut32x::measurement::Decoded;
use ut32x::packet::decode;

use crate::Format;

pub fn packet<W: Write>(hex: &str, format: Format, mut out: W) -> Result<()> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    let dat = hex::decode(&hex).context("invalid hex")?;
    if dat.is_empty() {
        bail!("no packet bytes");
    }

    match (decode(&dat), format) {
        (Decoded::Measurement(m), Format::Text) => writeln!(out, "{m}")?,
        (Decoded::Measurement(m), Format::Json) => {
            serde_json::to_writer(&mut out, &m)?;
            writeln!(out)?;
        }
        (Decoded::NoMeasurement(reject), Format::Text) => {
            writeln!(out, "no measurement: {reject}")?;
        }
        (Decoded::NoMeasurement(reject), Format::Json) => {
            serde_json::to_writer(&mut out, &serde_json::json!({ "rejected": reject.to_string() }))?;
            writeln!(out)?;
        }
    }
    Ok(())
}
