//! The Nanovox command protocol and its binary file formats.
//!
//! [`Command`] is the closed set of operations a nanobot can execute in
//! one tick. Construction validates the geometric class of every
//! argument, so a `Command` value is well-formed by type.
//!
//! Two wire formats are implemented, both byte-exact inverses of their
//! writers:
//!
//! - **Model files** ([`read_model`]/[`write_model`]): one resolution
//!   byte, then R³ voxel bits packed MSB-first in x-major order.
//! - **Trace files** ([`read_trace`]/[`write_trace`]): a plain
//!   concatenation of 1–5 byte command encodings, consumed to EOF.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod command;
mod error;
mod model;
mod trace;

pub use command::Command;
pub use error::{CodecError, CommandError};
pub use model::{read_model, write_model};
pub use trace::{decode_command, encode_command, read_trace, write_trace};
