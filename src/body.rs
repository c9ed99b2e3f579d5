pub mod chunked;
pub mod fixed;

/// The decoded body-framing strategy (spec §3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    /// No body: no Content-Length, no Transfer-Encoding, or Content-Length
    /// is zero.
    None,
    /// Exactly `n` bytes follow.
    Fixed(u64),
    /// RFC 9112 chunked transfer-coding, with optional trailers.
    Chunked,
}
