use core::{convert::Infallible, fmt};

use thiserror::Error;

/// Which limit a header ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Element count of an array header.
    Array,
    /// Pair count of a map header.
    Map,
    /// Payload length of a `str`, `bin` or `ext` header.
    Raw,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Array => "array",
            Self::Map => "map",
            Self::Raw => "raw payload",
        })
    }
}

/// Input that is not valid MessagePack, or that the configured limits reject.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The marker byte is not assigned a type (`0xc1`).
    #[error("invalid type marker 0x{0:02x}")]
    InvalidMarker(u8),
    /// A header declared more elements, pairs or payload bytes than allowed.
    #[error("{kind} of size {declared} exceeds the limit of {limit}")]
    SizeLimitExceeded {
        /// The header kind.
        kind: LimitKind,
        /// The size the header declared.
        declared: usize,
        /// The configured limit.
        limit: usize,
    },
    /// Containers are nested deeper than allowed.
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
    /// A value ended before the bytes its header declared.
    #[error("value ended before its declared length")]
    Truncated,
}

/// What went wrong during a decode attempt.
#[derive(Debug, Error, PartialEq)]
pub enum ErrorSource<E> {
    /// The value factory refused to build a value.
    #[error("factory error: {0}")]
    Factory(E),
    /// The buffered bytes are malformed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// A failed decode attempt.
///
/// `offset` is the position of the offending byte in the stream, counted from
/// construction or the last [`reset`](crate::StreamingUnpacker::reset). The
/// unpacker keeps every byte of the failed value buffered.
#[derive(Debug, Error, PartialEq)]
#[error("{source} at byte {offset}")]
pub struct UnpackError<E = Infallible> {
    pub(crate) source: ErrorSource<E>,
    pub(crate) offset: usize,
}

impl<E> UnpackError<E> {
    pub(crate) fn new(source: ErrorSource<E>, offset: usize) -> Self {
        Self { source, offset }
    }

    /// Stream position of the offending byte.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The underlying cause.
    #[must_use]
    pub fn source_ref(&self) -> &ErrorSource<E> {
        &self.source
    }

    /// Consumes the error, returning the underlying cause.
    #[must_use]
    pub fn into_source(self) -> ErrorSource<E> {
        self.source
    }

    /// The decode error, unless the factory failed.
    #[must_use]
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match &self.source {
            ErrorSource::Decode(e) => Some(e),
            ErrorSource::Factory(_) => None,
        }
    }

    /// Whether a header declared a size above a configured limit.
    #[must_use]
    pub fn is_size_limit_exceeded(&self) -> bool {
        matches!(
            self.decode_error(),
            Some(DecodeError::SizeLimitExceeded { .. })
        )
    }
}
