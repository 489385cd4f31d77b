//! Error types for the dog API client.
//!
//! # Design
//! A fetch can fail in three ways and only two of them carry an error value.
//! Transport failures are forwarded verbatim in `TransportError`. Decode
//! failures land in `DecodeError`, which exposes a stable `domain`/`code` pair
//! so callers can tell decode failures apart without matching on messages.
//! A response with a non-200 status and no transport error has no error value
//! at all; see [`Outcome`](crate::Outcome).

use std::fmt;

use thiserror::Error;

/// Stable domain shared by every [`DecodeError`].
pub const DECODE_ERROR_DOMAIN: &str = "dog_api.decode";

/// Broad class of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Could not establish a connection.
    Connect,
    /// The request or response timed out.
    Timeout,
    /// The response body could not be read.
    Body,
    /// The request could not be built or sent.
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// A failure reported by the transport layer.
///
/// Opaque to the client: it is never inspected, only delivered to the caller
/// exactly as the transport produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error ({kind}): {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else if err.is_request() || err.is_builder() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// What went wrong while decoding a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// Reading the input failed.
    Io,
    /// The input is not valid JSON.
    Syntax,
    /// The input ended in the middle of a value.
    UnexpectedEof,
    /// Valid JSON with the wrong shape, e.g. a string where a number belongs.
    InvalidData,
    /// A record lacks a required field.
    MissingField,
}

impl DecodeErrorKind {
    /// Stable numeric code within [`DECODE_ERROR_DOMAIN`].
    pub fn code(self) -> u32 {
        match self {
            DecodeErrorKind::Io => 0,
            DecodeErrorKind::Syntax => 1,
            DecodeErrorKind::UnexpectedEof => 2,
            DecodeErrorKind::InvalidData => 3,
            DecodeErrorKind::MissingField => 4,
        }
    }
}

/// The response body could not be decoded into `Vec<Dog>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    message: String,
    line: usize,
    column: usize,
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    pub fn domain(&self) -> &'static str {
        DECODE_ERROR_DOMAIN
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-based line of the failure, or 0 when unknown.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "decode failed ({DECODE_ERROR_DOMAIN}/{}): {}",
            self.kind.code(),
            self.message
        )
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let message = err.to_string();
        let kind = match err.classify() {
            Category::Io => DecodeErrorKind::Io,
            Category::Syntax => DecodeErrorKind::Syntax,
            Category::Eof => DecodeErrorKind::UnexpectedEof,
            // serde reports missing fields as data errors; the message prefix
            // is the only stable marker it exposes.
            Category::Data if message.starts_with("missing field") => DecodeErrorKind::MissingField,
            Category::Data => DecodeErrorKind::InvalidData,
        };
        Self {
            kind,
            message,
            line: err.line(),
            column: err.column(),
        }
    }
}

/// The error half of a failed [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl FetchError {
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            FetchError::Transport(err) => Some(err),
            FetchError::Decode(_) => None,
        }
    }

    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            FetchError::Decode(err) => Some(err),
            FetchError::Transport(_) => None,
        }
    }
}

/// Errors raised while constructing a client or transport.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL does not parse, or cannot have relative paths joined
    /// onto it (e.g. `mailto:` URLs).
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),
}
