//! Error types for the FSE codec.

use thiserror::Error;

/// Error variants for FSE block operations.
///
/// Every fallible operation in this crate returns exactly one of these;
/// the codec never retries, logs, or recovers partially on its own.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A parameter is outside the supported range: table log out of bounds,
    /// too many symbols, empty input, or counts that do not fit the table.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// A serialized table header could not be parsed, or describes more
    /// probability mass than the table can hold.
    #[error("malformed table header")]
    MalformedHeader,

    /// The compressed payload is internally inconsistent: decoding did not
    /// consume the stream exactly back to its start.
    #[error("corrupt compressed stream")]
    CorruptStream,

    /// The compressed block claims more input bytes than the caller declared
    /// available.
    #[error("compressed block exceeds declared source capacity")]
    SourceOverrun,
}

/// A specialized Result type for FSE operations.
pub type Result<T> = std::result::Result<T, Error>;
