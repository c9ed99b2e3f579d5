//! # WireFrame
//!
//! A **strict, incremental HTTP/1.x message codec** implemented as a pair
//! of state machines — [`Decoder`] and [`Encoder`] — following RFC 9112
//! framing rules byte-for-byte.
//!
//! [`Decoder`] is push-driven: it accepts arbitrary byte fragments via
//! [`Decoder::feed`] with no assumption about how the caller split them,
//! and reports what happened through a per-call [`Event`] delta.
//! [`Encoder`] serializes a start line, headers, and a body (including an
//! async byte producer) into the corresponding wire bytes.
//!
//! ## Quick start — one-shot decoding
//!
//! ```rust
//! use wireframe::{decode_message, Limits, MessageType};
//!
//! let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let message = decode_message(MessageType::Request, raw, Limits::default()).unwrap();
//! assert_eq!(message.headers[0], ("Host".to_string(), "example.com".to_string()));
//! ```
//!
//! ## Quick start — incremental decoding
//!
//! ```rust
//! use wireframe::{Decoder, Limits};
//!
//! let mut decoder = Decoder::new_request_state(Limits::default());
//!
//! decoder.feed(b"GET / HTTP/1.1\r\n").unwrap();
//! assert!(!decoder.is_finished());
//!
//! decoder.feed(b"Host: example.com\r\n\r\n").unwrap();
//! assert!(decoder.is_finished());
//! ```

pub mod body;
mod decoder;
mod encoder;
mod error;
mod event;
mod framing;
mod headerblock;
mod headers;
mod limits;
mod line;
mod output;
mod startline;
mod types;

pub use body::BodyStrategy;
pub use decoder::{Decoder, MessageType};
pub use encoder::{Body, Encoded, Encoder, EncoderConfig};
pub use error::{EncodeError, ParseError};
pub use event::Event;
pub use framing::{strip_hop_by_hop, HOP_BY_HOP};
pub use headers::HeaderMap;
pub use limits::Limits;
pub use output::{format_debug, format_headers_only, format_json, DecodedMessage};
pub use types::{canonical_reason, parse_status_code, HttpVersion, Method, StartLine};

/// Errors from the one-shot [`decode_message`] convenience wrapper.
///
/// [`ParseError`] is the core's closed decode-error set (spec §7); this
/// adds the one case that only matters to a single-call caller — the
/// input ran out before the message reached `finished`.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("input ended before the message was complete")]
    Incomplete,
}

/// Decode one complete HTTP message from a byte slice in a single call.
///
/// This is a convenience wrapper around [`Decoder`] for callers that
/// already have the whole message in memory. For true incremental or
/// streaming use, drive a [`Decoder`] directly and read [`Decoder::events`]
/// after each [`Decoder::feed`].
pub fn decode_message(
    message_type: MessageType,
    data: &[u8],
    limits: Limits,
) -> Result<DecodedMessage, MessageError> {
    let mut decoder = match message_type {
        MessageType::Request => Decoder::new_request_state(limits),
        MessageType::Response => Decoder::new_response_state(limits),
    };

    decoder.feed(data)?;

    let mut body = Vec::new();
    for event in decoder.events() {
        if let Event::BodyData { bytes, .. } = event {
            body.extend_from_slice(bytes);
        }
    }

    if !decoder.is_finished() {
        return Err(MessageError::Incomplete);
    }

    Ok(DecodedMessage {
        start_line: decoder
            .start_line()
            .cloned()
            .expect("a finished decoder has parsed a start line"),
        headers: decoder
            .headers()
            .map(|h| h.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect())
            .unwrap_or_default(),
        body,
    })
}
