use std::{fmt, io};

use thiserror::Error;

/// One of the two sources taking part in a comparison.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Reasons a comparison could not produce a verdict.
///
/// Differing content is not an error: it is reported as `Ok(false)`.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("failed reading from source {side}: {source}")]
    Read {
        side: Side,
        #[source]
        source: io::Error,
    },
    #[error("failed querying the length of source {side}: {source}")]
    Length {
        side: Side,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("comparison was cancelled")]
    Cancelled,
    #[error("buffer size must be greater than zero")]
    InvalidBufferSize,
}

impl CompareError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CompareError::Cancelled)
    }
}

pub type Result<T, E = CompareError> = std::result::Result<T, E>;
