//! Error types for field decoding

use thiserror::Error;

/// Errors produced when decoding tokenized response fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The raw code is the hardware "value unknown" sentinel
    #[error("raw code is the unknown-value sentinel")]
    OutOfRange,
}
