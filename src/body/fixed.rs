use bytes::Bytes;

use crate::event::Event;

/// Incremental fixed-length (`Content-Length`) body decoder (spec §4.6).
///
/// Any bytes beyond `expected` are left untouched in the caller's buffer —
/// pipelining multiple messages on one connection is outside the core.
#[derive(Debug, Clone, Copy)]
pub struct FixedBodyParser {
    expected: u64,
    received: u64,
}

impl FixedBodyParser {
    pub fn new(expected: u64) -> Self {
        Self {
            expected,
            received: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.received == self.expected
    }

    /// Consume `min(expected - received, available)` bytes from
    /// `buf[offset..]`, emitting them as a single [`Event::BodyData`], and
    /// a [`Event::BodyComplete`] once `received == expected`. Returns the
    /// number of bytes consumed.
    pub fn advance(&mut self, buf: &Bytes, offset: usize, events: &mut Vec<Event>) -> usize {
        let available = (buf.len() - offset) as u64;
        let remaining = self.expected - self.received;
        let take = remaining.min(available);

        if take > 0 {
            let slice = buf.slice(offset..offset + take as usize);
            events.push(Event::BodyData {
                size: slice.len(),
                bytes: slice,
            });
            self.received += take;
        }

        if self.is_done() {
            events.push(Event::BodyComplete {
                total_size: self.expected,
            });
        }

        take as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_exactly_n_bytes_and_leaves_rest() {
        let buf = Bytes::copy_from_slice(b"helloEXTRA");
        let mut parser = FixedBodyParser::new(5);
        let mut events = Vec::new();
        let consumed = parser.advance(&buf, 0, &mut events);
        assert_eq!(consumed, 5);
        assert!(parser.is_done());
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::BodyData { bytes, size } => {
                assert_eq!(&bytes[..], b"hello");
                assert_eq!(*size, 5);
            }
            _ => unreachable!(),
        }
        assert!(matches!(events[1], Event::BodyComplete { total_size: 5 }));
    }

    #[test]
    fn zero_length_body_completes_with_no_data_event() {
        let buf = Bytes::new();
        let mut parser = FixedBodyParser::new(0);
        let mut events = Vec::new();
        parser.advance(&buf, 0, &mut events);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::BodyComplete { total_size: 0 }));
    }

    #[test]
    fn splits_across_multiple_feeds() {
        let mut parser = FixedBodyParser::new(5);
        let mut events = Vec::new();
        let buf1 = Bytes::copy_from_slice(b"hel");
        assert_eq!(parser.advance(&buf1, 0, &mut events), 3);
        assert!(!parser.is_done());
        assert_eq!(events.len(), 1);

        let buf2 = Bytes::copy_from_slice(b"lo");
        assert_eq!(parser.advance(&buf2, 0, &mut events), 2);
        assert!(parser.is_done());
        assert_eq!(events.len(), 2);
    }
}
