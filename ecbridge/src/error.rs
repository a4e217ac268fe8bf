//! Error types.

use thiserror::Error;

/// Result type with the `ecbridge` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by the curve bridge and the protocol engines layered on it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Unknown curve name, identifier or OID, or the curve lacks the
    /// requested capability.
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(&'static str),

    /// Key material with the wrong length, an out of range scalar, a point
    /// which is not on the curve, or keys belonging to different curves.
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    /// Malformed operation parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Operation invoked out of sequence.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Caller supplied output buffer has the wrong size.
    #[error("output buffer has {actual} bytes, expected {expected}")]
    BufferSize {
        /// Required buffer length.
        expected: usize,
        /// Length of the buffer that was supplied.
        actual: usize,
    },

    /// Structurally invalid signature.
    #[error("malformed signature: {0}")]
    BadSignature(&'static str),

    /// Input bounds violation or ciphertext rejected during decryption.
    #[error("bad padding")]
    BadPadding,

    /// The curve engine has not been enabled.
    #[error("native curve engine unavailable")]
    Unavailable,
}

impl Error {
    /// Check that a caller supplied output buffer has exactly `expected` bytes.
    pub(crate) fn check_output(expected: usize, out: &[u8]) -> Result<()> {
        if out.len() == expected {
            Ok(())
        } else {
            Err(Error::BufferSize {
                expected,
                actual: out.len(),
            })
        }
    }
}
