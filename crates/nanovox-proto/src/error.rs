//! Error types for command construction and the binary codecs.

use std::fmt;

/// A command constructor was given a displacement of the wrong class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// The argument does not satisfy the class the command requires.
    InvalidArgument {
        /// What was expected and what was given.
        detail: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { detail } => write!(f, "invalid command argument: {detail}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Errors from reading or writing the binary model and trace formats.
#[derive(Debug)]
pub enum CodecError {
    /// The model file is not a valid encoding: bad resolution byte or
    /// truncated voxel payload.
    CorruptModel {
        /// What went wrong.
        detail: String,
    },
    /// The trace stream contains a byte sequence that decodes to no
    /// valid command.
    MalformedTrace {
        /// What went wrong.
        detail: String,
    },
    /// An underlying I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptModel { detail } => write!(f, "corrupt model: {detail}"),
            Self::MalformedTrace { detail } => write!(f, "malformed trace: {detail}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<CommandError> for CodecError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::InvalidArgument { detail } => Self::MalformedTrace { detail },
        }
    }
}
