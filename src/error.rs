//! Error type shared by every fallible operation in the crate.

use core::fmt;

/// Errors surfaced by the WAD codec.
///
/// All errors are fatal to the operation that produced them; no partial
/// output is returned alongside an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WadError {
    /// The stream does not start with the `WAD` magic bytes.
    BadMagic,
    /// Two literal packets are adjacent in the stream.
    DoubleLiteral,
    /// A packet extends past the end of the source buffer.
    TruncatedInput,
    /// A flag/length combination that the packet grammar cannot produce.
    CorruptPacket,
    /// A match references bytes before the start of the output.
    BadLookback,
    /// A caller-supplied parameter is unusable; the message names it.
    InvalidParameter(&'static str),
}

impl WadError {
    /// Stable, human-readable name for the error condition.
    pub fn error_name(&self) -> &'static str {
        match self {
            WadError::BadMagic => "bad magic: stream does not start with \"WAD\"",
            WadError::DoubleLiteral => "two adjacent literal packets",
            WadError::TruncatedInput => "packet reads past the end of the input",
            WadError::CorruptPacket => "unrepresentable flag/length combination",
            WadError::BadLookback => "match lookback precedes the start of the output",
            WadError::InvalidParameter(_) => "invalid parameter",
        }
    }
}

impl fmt::Display for WadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WadError::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
            other => f.write_str(other.error_name()),
        }
    }
}

impl std::error::Error for WadError {}
