use thiserror::Error;

/// The closed set of errors the decoder can raise (spec §7).
///
/// Every variant is terminal: once returned from [`crate::Decoder::feed`]
/// the owning state moves to `Phase::Error`, and any further `feed` call
/// fails with [`ParseError::AlreadyErrored`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid line ending at offset {offset}: {message}")]
    InvalidLineEnding { message: String, offset: usize },

    #[error("line too large at offset {offset}: {message}")]
    LineTooLarge { message: String, offset: usize },

    #[error("invalid start line: {message}")]
    InvalidStartLine { message: String },

    #[error("unsupported HTTP version: {message}")]
    UnsupportedHttpVersion { message: String },

    #[error("invalid status code: {message}")]
    InvalidStatusCode { message: String },

    #[error("header missing colon: {message}")]
    HeaderMissingColon { message: String },

    #[error("header name empty: {message}")]
    HeaderNameEmpty { message: String },

    #[error("invalid header name: {message}")]
    InvalidHeaderName { message: String },

    #[error("header line too large: {message}")]
    HeaderLineTooLarge { message: String },

    #[error("header name too large: {message}")]
    HeaderNameTooLarge { message: String },

    #[error("header value too large: {message}")]
    HeaderValueTooLarge { message: String },

    #[error("header block too large: {message}")]
    HeadersTooLarge { message: String },

    #[error("too many headers: {message}")]
    HeadersTooMany { message: String },

    #[error("invalid framing syntax: {message}")]
    InvalidSyntax { message: String },

    #[error("unsupported feature: {message}")]
    UnsupportedFeature { message: String },

    #[error("message too large: {message}")]
    MessageTooLarge { message: String },

    #[error("feed called on a finished decoder")]
    AlreadyFinished,

    #[error("feed called on an errored decoder")]
    AlreadyErrored,
}

impl ParseError {
    /// The byte offset the error occurred at, when the decoder tracked one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::InvalidLineEnding { offset, .. } | Self::LineTooLarge { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

/// Errors surfaced while encoding a message (spec §4.9, §5).
///
/// The encoder cannot fail while serializing a start line or header block —
/// those are built from already-validated Rust values. The only failure
/// mode is a body producer (an async [`futures_core::Stream`]) yielding an
/// error, which is propagated only after any already-buffered bytes have
/// been delivered.
#[derive(Debug, Error)]
pub enum EncodeError<E> {
    #[error("body producer failed: {0}")]
    Body(E),
}
