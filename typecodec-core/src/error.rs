//! Error types for typecodec operations

use crate::io::TokenKind;
use crate::types::TypeDescriptor;

/// Errors that can occur while encoding or decoding a value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// No codec is registered for the type, nor for any of its ancestors
    #[error("No codec for {descriptor}: {reason}")]
    Resolution {
        /// The descriptor that failed to resolve.
        descriptor: TypeDescriptor,
        /// Why the lookup failed.
        reason: String,
    },

    /// Decode needs a fresh instance but the type has no zero-argument constructor
    #[error("No zero-argument constructor registered for {0}")]
    Construction(TypeDescriptor),

    /// A key appeared twice while building an object or map
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The token stream does not match the expected structure
    #[error("Malformed stream: expected {expected}, found {}", found.map_or("end of stream".to_string(), |k| k.to_string()))]
    MalformedStream {
        /// The token kind the decoder required.
        expected: TokenKind,
        /// The token kind actually observed, `None` at end of stream.
        found: Option<TokenKind>,
    },

    /// An element carried a different label than the one required
    #[error("Unexpected element label: expected {expected:?}, found {found:?}")]
    UnexpectedLabel {
        /// The label the decoder required.
        expected: String,
        /// The label actually read.
        found: String,
    },

    /// A primitive token could not be converted to the target value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Tokens remained after a complete top-level value
    #[error("{0} trailing tokens after value")]
    TrailingTokens(usize),

    /// Value nesting exceeded the configured limit
    #[error("Nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),
}

impl CodecError {
    /// Shorthand for a [`CodecError::Resolution`] error
    pub fn resolution(descriptor: &TypeDescriptor, reason: impl Into<String>) -> Self {
        CodecError::Resolution {
            descriptor: descriptor.clone(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`CodecError::MalformedStream`] error
    pub fn malformed(expected: TokenKind, found: Option<TokenKind>) -> Self {
        CodecError::MalformedStream { expected, found }
    }
}
