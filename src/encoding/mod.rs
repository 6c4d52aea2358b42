//! The multi-target character transcoder: target tables, the transcode
//! operations, and whitespace flattening.

pub mod targets;
pub mod transcoder;
pub mod whitespace;

pub use targets::{Mapping, Target};
pub use transcoder::{BoundedBuffer, LineEnding, Transcoder, parse_utf8, validate_table, write_utf8};
