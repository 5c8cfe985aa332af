//! Error types for assetstore

use std::io;

use thiserror::Error;

/// Result type alias for assetstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Stored bytes were not valid UTF-8
    #[error("Invalid UTF-8 in record for key {0:?}")]
    Utf8(String),

    /// Key or value does not fit in a record length field
    #[error("Record too large: {0} bytes")]
    RecordTooLarge(usize),

    /// Store is closed
    #[error("Store is closed")]
    Closed,
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        Error::Parse(format!("{:?}", err))
    }
}
