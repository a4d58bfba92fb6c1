#![doc = include_str!("../README.md")]

mod error;

pub mod acquisition;
pub mod command;
pub mod measurement;
pub mod packet;
pub mod reassembler;
pub mod report;

pub use error::{Error, Result};

pub(crate) mod prelude {
    pub(crate) use crate::error::{Error, Result};
}
