use bytes::Bytes;

use crate::body::BodyStrategy;
use crate::headers::HeaderMap;
use crate::types::StartLine;

/// One entry in the per-feed event delta (spec §3).
///
/// [`crate::Decoder::feed`] resets the event log at the start of every
/// call, so a consumer reads `events()` after each `feed` to get exactly
/// the events produced by that call.
#[derive(Debug, Clone)]
pub enum Event {
    /// Emitted exactly once, on the first `feed` call.
    MessageBegin,
    /// The request line or status line was parsed.
    StartLine(StartLine),
    /// The header block has started.
    HeadersBegin,
    /// One header field value. Emitted once per value (duplicates repeat
    /// this event rather than being merged).
    Header { name: String, value: String },
    /// The header block is complete; carries the full normalized map,
    /// including any chunked-transfer trailers merged in afterwards.
    HeadersComplete { headers: HeaderMap },
    /// The body strategy has been decided.
    BodyBegin { strategy: BodyStrategy },
    /// A slice of body bytes. May be emitted multiple times per body.
    BodyData { bytes: Bytes, size: usize },
    /// The body is fully read.
    BodyComplete { total_size: u64 },
    /// Emitted exactly once, when the decoder reaches `Phase::Finished`.
    MessageComplete,
}
