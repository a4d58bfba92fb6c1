mod decode;
mod packet;

use std::io::{stderr, stdout};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use ut32x::acquisition::AcquisitionConfig;
use ut32x::command::DataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a capture of raw 8 byte HID reports.
    ///
    /// The capture is expected to contain the reports exactly as received from the
    /// device, back to back, with no additional framing.
    Decode {
        /// Stop after this many packets have been decoded, including packets that
        /// contain no measurement. 0 means no limit.
        #[arg(short, long, default_value_t = 0)]
        limit: u64,

        /// Data source the capture was recorded from (live or memory).
        #[arg(short, long, default_value = "live")]
        source: DataSource,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,

        /// Input capture file
        input: PathBuf,
    },
    /// Decode a single assembled packet given as hex.
    Packet {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,

        /// Packet bytes as hex, e.g., 303a3233353130303030303030303030310d0a
        hex: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("UT32X_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Decode {
            limit,
            source,
            format,
            input,
        } => {
            let config = AcquisitionConfig::builder()
                .limit_samples(*limit)
                .source(*source)
                .build();
            debug!("config: {config:?}");
            let summary = decode::decode(input, config, *format, stdout().lock())?;
            info!(
                packets = summary.packets,
                samples = summary.samples,
                stopped = summary.stopped,
                "decoded {input:?}"
            );
            Ok(())
        }
        Commands::Packet { format, hex } => packet::packet(hex, *format, stdout().lock()),
    }
}
