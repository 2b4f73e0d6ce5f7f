//! Error types for trackwire-core

/// Result type alias for trackwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Codec errors
///
/// Checksum mismatches and malformed timestamps are deliberately absent:
/// both are recoverable and surface as flags on the decoded frame instead
/// (see `ascii::ChecksumStatus` and `FrameTimestamp::Unparsed`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// ASCII frame has fewer comma-separated fields than the protocol minimum
    #[error("Too few fields: expected at least {expected}, got {actual}")]
    TooFewFields {
        expected: usize,
        actual: usize,
    },

    /// Binary frame is too short to hold header and checksum
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// Binary frame does not start and end with the 0x7E flag byte
    #[error("Missing 0x7E frame flag")]
    MissingFrameFlag,

    /// A 0x7D escape byte is followed by neither 0x01 nor 0x02
    #[error("Unescaped control byte at offset {offset}")]
    UnescapedControlByte {
        offset: usize,
    },

    /// Phone number cannot be normalized to 12 BCD digits
    #[error("Invalid phone number: {0:?}")]
    InvalidPhoneNumber(String),

    /// Command text contains bytes outside the device codepage
    #[error("Command not encodable at byte offset {offset}")]
    UnencodableCommand {
        offset: usize,
    },

    /// Message body exceeds the 10-bit length field
    #[error("Message body too large: {size} bytes (max: {max} bytes)")]
    BodyTooLarge {
        size: usize,
        max: usize,
    },
}

impl Error {
    /// Check if the error is a wire-framing failure (as opposed to a
    /// caller-supplied input the codec refused to encode)
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::TooFewFields { .. }
                | Self::FrameTooShort { .. }
                | Self::MissingFrameFlag
                | Self::UnescapedControlByte { .. }
        )
    }
}
