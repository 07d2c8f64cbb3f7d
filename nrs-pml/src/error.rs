//!
//! Decode errors.
//!

use thiserror::Error;

/// Why (part of) a buffer could not be decoded.
///
/// Positions are 1-based and refer to the buffer as it was received.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is not valid UTF-8 after `valid_up_to` bytes
    #[error("invalid utf-8 after byte {valid_up_to}")]
    Utf8 {
        /// The length of the valid prefix
        valid_up_to: usize,
    },
    /// The buffer is not well-formed, namespace-valid XML
    #[error("malformed PML at line {row}, column {col}: {reason}")]
    Xml {
        /// The line of the error
        row: u32,
        /// The column of the error
        col: u32,
        /// The parser's description of the problem
        reason: String,
    },
}
