//! Frame input and sequence handling.
//!
//! This module holds the in-memory frame sequence every reducer consumes,
//! plus the source abstraction through which decoded frames arrive. How a
//! video container is decoded is not this crate's concern.

mod buffer;
mod config;
mod frame;
mod source;

pub use buffer::{FrameSequence, SequenceDims};
pub use config::{ConfigError, FileConfig, SourceConfig};
pub use frame::Frame;
pub use source::{collect_sequence, FrameSource, SourceError, SyntheticSource};
