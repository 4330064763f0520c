use thiserror::Error;

/// All possible errors that `lexid` can produce.
///
/// Generation itself is infallible in the current design: clock rollback
/// is absorbed internally by waiting or advancing the epoch field, never
/// surfaced to the caller. The only runtime failure [`crate::Generator::next`]
/// can report is a poisoned lock, and only when the default
/// `std::sync::Mutex` is in use.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A generator component exceeded its 16-bit field range at
    /// construction.
    ///
    /// The check is explicit even though the encoded field is 16 bits
    /// wide: constructors accept wider integers so that out-of-range
    /// values are rejected rather than silently truncated.
    #[error("{field} {value} out of range 0-65535")]
    RangeError {
        /// Which component was rejected (`"region id"` or `"node id"`).
        field: &'static str,
        /// The offending value.
        value: u32,
    },

    /// A string could not be parsed back into an [`crate::Id`].
    #[error("invalid id format: {0}")]
    InvalidFormat(#[from] FormatError),

    /// Another thread panicked while holding the generator lock.
    ///
    /// Not constructed when the `parking-lot` feature is enabled, since
    /// `parking_lot` locks cannot poison.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

/// Why [`crate::Id::parse`] rejected its input.
///
/// Parsing dispatches on input byte length alone: 16 bytes are taken
/// verbatim, 22 characters are decoded as unpadded URL-safe base64, and
/// 32 characters as hex. Every other length is rejected outright.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The input length matched none of the three accepted encodings.
    #[error("unsupported id string length {len}")]
    UnsupportedLength { len: usize },

    /// A 32-character input failed to decode as hex.
    #[error("invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A 22-character input failed to decode as URL-safe base64.
    #[error("invalid base64 encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A 22-character input decoded, but not to 16 bytes.
    #[error("decoded to {len} bytes, expected 16")]
    DecodedLength { len: usize },
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
