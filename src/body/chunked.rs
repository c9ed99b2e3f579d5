use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ParseError;
use crate::event::Event;
use crate::headers::{self, HeaderMap};
use crate::limits::Limits;
use crate::line::{self, LineScan};

/// Decoder substates for RFC 9112 chunked transfer-coding (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sub {
    Size,
    Data(u64),
    Crlf,
    Trailer,
    Done,
}

/// Incremental chunked-body decoder. Owns the substate; the driver
/// ([`crate::decoder::Decoder`]) owns the carry buffer and calls
/// [`ChunkedParser::advance`] repeatedly.
#[derive(Debug, Clone)]
pub struct ChunkedParser {
    sub: Sub,
    total: u64,
    trailers: HeaderMap,
}

impl ChunkedParser {
    pub fn new() -> Self {
        Self {
            sub: Sub::Size,
            total: 0,
            trailers: HeaderMap::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn into_trailers(self) -> HeaderMap {
        self.trailers
    }

    /// Advance the state machine as far as possible over `buf[offset..]`,
    /// pushing [`Event::BodyData`]/[`Event::BodyComplete`] into `events`.
    /// Returns the number of bytes consumed from `offset`.
    pub fn advance(
        &mut self,
        buf: &Bytes,
        offset: usize,
        limits: &Limits,
        events: &mut Vec<Event>,
    ) -> Result<usize, ParseError> {
        let mut pos = offset;

        loop {
            match self.sub {
                Sub::Size => match self.read_size_line(buf, pos, limits)? {
                    Some((size, consumed)) => {
                        pos += consumed;
                        if size == 0 {
                            self.sub = Sub::Trailer;
                        } else {
                            self.sub = Sub::Data(size);
                        }
                    }
                    None => return Ok(pos - offset),
                },
                Sub::Data(remaining) => {
                    let available = (buf.len() - pos) as u64;
                    if available == 0 && remaining > 0 {
                        return Ok(pos - offset);
                    }
                    let take = remaining.min(available) as usize;
                    if take > 0 {
                        let slice = buf.slice(pos..pos + take);
                        events.push(Event::BodyData {
                            size: slice.len(),
                            bytes: slice,
                        });
                        self.total += take as u64;
                        pos += take;
                    }
                    let left = remaining - take as u64;
                    if left == 0 {
                        self.sub = Sub::Crlf;
                    } else {
                        self.sub = Sub::Data(left);
                        return Ok(pos - offset);
                    }
                }
                Sub::Crlf => match line::scan_line(buf, pos, 2)? {
                    LineScan::Found { end, consumed } => {
                        if end != pos {
                            return Err(ParseError::InvalidSyntax {
                                message: "missing CRLF after chunk data".to_string(),
                            });
                        }
                        pos += consumed;
                        self.sub = Sub::Size;
                    }
                    LineScan::Incomplete => return Ok(pos - offset),
                },
                Sub::Trailer => match line::scan_line(buf, pos, limits.max_header_line_bytes)? {
                    LineScan::Found { end, consumed } => {
                        if end == pos {
                            pos += consumed;
                            self.sub = Sub::Done;
                        } else {
                            self.parse_trailer_line(&buf[pos..end])?;
                            pos += consumed;
                        }
                    }
                    LineScan::Incomplete => return Ok(pos - offset),
                },
                Sub::Done => {
                    events.push(Event::BodyComplete { total_size: self.total });
                    return Ok(pos - offset);
                }
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.sub == Sub::Done
    }

    /// Consume the chunk-size line (`hex-size [;ext] CRLF`), tolerating
    /// whitespace around the size and ignoring chunk extensions.
    fn read_size_line(
        &mut self,
        buf: &Bytes,
        pos: usize,
        limits: &Limits,
    ) -> Result<Option<(u64, usize)>, ParseError> {
        match line::scan_line(buf, pos, limits.max_chunk_size_line_bytes)? {
            LineScan::Found { end, consumed } => {
                let line = trim_ows(&buf[pos..end]);
                let hex_end = line
                    .iter()
                    .position(|b| !b.is_ascii_hexdigit())
                    .unwrap_or(line.len());
                if hex_end == 0 || !line[0].is_ascii_hexdigit() {
                    return Err(ParseError::InvalidSyntax {
                        message: "chunk size must start with a hex digit".to_string(),
                    });
                }
                let size = u64::from_str_radix(
                    std::str::from_utf8(&line[..hex_end]).expect("hex digits are ascii"),
                    16,
                )
                .map_err(|_| ParseError::InvalidSyntax {
                    message: "chunk size overflowed".to_string(),
                })?;
                Ok(Some((size, consumed)))
            }
            LineScan::Incomplete => Ok(None),
        }
    }

    fn parse_trailer_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return Err(ParseError::HeaderMissingColon {
                message: "trailer field missing ':'".to_string(),
            });
        };
        if colon == 0 {
            return Err(ParseError::HeaderNameEmpty {
                message: "trailer field name is empty".to_string(),
            });
        }
        let name = &line[..colon];
        if name.first().is_some_and(|&b| b == b' ' || b == b'\t') {
            return Err(ParseError::InvalidHeaderName {
                message: "trailer field name has leading whitespace".to_string(),
            });
        }
        headers::validate_header_name(name)?;
        let value = trim_ows(&line[colon + 1..]);
        self.trailers.append(
            String::from_utf8_lossy(name).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        );
        Ok(())
    }
}

impl Default for ChunkedParser {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_ows(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(start, |p| p + 1);
    &bytes[start..end]
}

// ---------------------------------------------------------------------------
// Chunked encoder
// ---------------------------------------------------------------------------

/// Encode one data chunk as `hex-size\r\ndata\r\n`. Callers must not pass an
/// empty `data` slice (spec §4.9: empty producer yields are skipped by the
/// caller so a zero chunk is never emitted except as the terminator).
pub fn encode_chunk(data: &[u8], out: &mut BytesMut) {
    debug_assert!(!data.is_empty());
    let mut hex = [0u8; 16];
    let len = write_hex(data.len() as u64, &mut hex);
    out.reserve(len + 2 + data.len() + 2);
    out.put_slice(&hex[..len]);
    out.put_slice(b"\r\n");
    out.put_slice(data);
    out.put_slice(b"\r\n");
}

/// Encode the terminating zero-chunk plus an optional trailer block.
pub fn encode_terminator(trailers: &HeaderMap, out: &mut BytesMut) {
    out.put_slice(b"0\r\n");
    if !trailers.is_empty() {
        out.put(headers::write_headers(trailers));
    }
    out.put_slice(b"\r\n");
}

fn write_hex(mut n: u64, buf: &mut [u8; 16]) -> usize {
    if n == 0 {
        buf[0] = b'0';
        return 1;
    }
    let mut tmp = [0u8; 16];
    let mut i = 16;
    while n > 0 {
        i -= 1;
        tmp[i] = match (n & 0xF) as u8 {
            d @ 0..=9 => b'0' + d,
            d => b'a' + (d - 10),
        };
        n >>= 4;
    }
    let len = 16 - i;
    buf[..len].copy_from_slice(&tmp[i..]);
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_for(input: &[u8]) -> (Vec<Event>, ChunkedParser) {
        let buf = Bytes::copy_from_slice(input);
        let limits = Limits::default();
        let mut parser = ChunkedParser::new();
        let mut events = Vec::new();
        let consumed = parser.advance(&buf, 0, &limits, &mut events).unwrap();
        assert_eq!(consumed, input.len(), "should consume the whole input");
        (events, parser)
    }

    #[test]
    fn decodes_simple_chunks() {
        let (events, parser) = events_for(b"5\r\nHello\r\n6\r\n World\r\n0\r\n\r\n");
        assert!(parser.is_done());
        let mut body = Vec::new();
        let mut total = None;
        for ev in events {
            match ev {
                Event::BodyData { bytes, .. } => body.extend_from_slice(&bytes),
                Event::BodyComplete { total_size } => total = Some(total_size),
                _ => unreachable!(),
            }
        }
        assert_eq!(body, b"Hello World");
        assert_eq!(total, Some(11));
    }

    #[test]
    fn zero_chunk_only_completes_with_no_data() {
        let (events, parser) = events_for(b"0\r\n\r\n");
        assert!(parser.is_done());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::BodyComplete { total_size: 0 }));
    }

    #[test]
    fn trailers_are_captured() {
        let (_, parser) = events_for(b"0\r\nX-Trailer: v\r\n\r\n");
        let trailers = parser.into_trailers();
        assert_eq!(trailers.get("x-trailer"), Some("v"));
    }

    #[test]
    fn rejects_non_hex_leading_byte() {
        let buf = Bytes::copy_from_slice(b"-1\r\n");
        let limits = Limits::default();
        let mut parser = ChunkedParser::new();
        let mut events = Vec::new();
        let err = parser.advance(&buf, 0, &limits, &mut events).unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { .. }));
    }

    #[test]
    fn chunk_extensions_are_ignored() {
        let (events, _) = events_for(b"5;ext=foo\r\nHello\r\n0\r\n\r\n");
        let mut body = Vec::new();
        for ev in events {
            if let Event::BodyData { bytes, .. } = ev {
                body.extend_from_slice(&bytes);
            }
        }
        assert_eq!(body, b"Hello");
    }

    #[test]
    fn encode_round_trips_through_decode() {
        let mut out = BytesMut::new();
        encode_chunk(b"Hello", &mut out);
        encode_chunk(b" World", &mut out);
        encode_terminator(&HeaderMap::new(), &mut out);

        let (events, parser) = events_for(&out);
        assert!(parser.is_done());
        let mut body = Vec::new();
        for ev in events {
            if let Event::BodyData { bytes, .. } = ev {
                body.extend_from_slice(&bytes);
            }
        }
        assert_eq!(body, b"Hello World");
    }
}
