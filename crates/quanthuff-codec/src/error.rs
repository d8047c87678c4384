//! Error type shared by every stage of the codec.

use thiserror::Error;

/// Errors produced while quantizing, entropy coding or (de)serializing.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The artifact is structurally invalid and cannot be decoded.
    #[error("Malformed artifact: {0}")]
    MalformedArtifact(String),

    /// The quantizer options are rejected before classification starts.
    #[error("Unsupported quantizer config: {0}")]
    UnsupportedQuantizerConfig(String),

    /// The bitstream ended before every expected symbol was decoded.
    ///
    /// Decoding itself never fails with this; it is produced on request by
    /// [`Decoded::into_complete`](crate::Decoded::into_complete).
    #[error("Incomplete pixel data: decoded {decoded} of {expected} symbols")]
    IncompletePixelData { decoded: usize, expected: usize },

    /// A symbol stream holds a symbol the code table has no code for.
    #[error("Symbol {symbol} at position {position} has no Huffman code")]
    UncodedSymbol { symbol: u32, position: usize },

    /// The pixel volume handed to the encoder is unusable.
    #[error("Invalid pixel volume {width}x{height}x{channels}: {reason}")]
    InvalidVolume {
        width: usize,
        height: usize,
        channels: usize,
        reason: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedArtifact(reason.into())
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        CodecError::UnsupportedQuantizerConfig(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodecError>;
