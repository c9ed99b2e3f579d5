use bytes::{Bytes, BytesMut};

use crate::body::chunked::ChunkedParser;
use crate::body::fixed::FixedBodyParser;
use crate::body::BodyStrategy;
use crate::error::ParseError;
use crate::event::Event;
use crate::framing;
use crate::headerblock::HeaderBlockState;
use crate::headers::HeaderMap;
use crate::limits::Limits;
use crate::line::{self, LineScan};
use crate::startline;
use crate::types::StartLine;

/// Which start-line grammar a [`Decoder`] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    StartLine,
    Headers,
    BodyFixed,
    BodyChunked,
    Finished,
    Error,
}

/// A push-driven HTTP/1.x decoder (spec §3, §4.7).
///
/// Owns a rolling carry buffer and advances through `{start-line, headers,
/// body}` as [`Decoder::feed`] is called with arbitrary byte fragments. Not
/// `Send`/shareable across concurrent tasks by design — serialize all calls
/// on a given state (spec §5).
pub struct Decoder {
    message_type: MessageType,
    phase: Phase,
    carry: Bytes,
    message_began: bool,
    expect_no_body: bool,

    start_line: Option<StartLine>,
    header_state: Option<HeaderBlockState>,
    headers: Option<HeaderMap>,
    fixed: Option<FixedBodyParser>,
    chunked: Option<ChunkedParser>,

    events: Vec<Event>,
    error: Option<ParseError>,
    limits: Limits,
}

impl Decoder {
    /// A fresh decoder for a request (request-line grammar).
    pub fn new_request_state(limits: Limits) -> Self {
        Self::new(MessageType::Request, limits)
    }

    /// A fresh decoder for a response (status-line grammar).
    pub fn new_response_state(limits: Limits) -> Self {
        Self::new(MessageType::Response, limits)
    }

    fn new(message_type: MessageType, limits: Limits) -> Self {
        Self {
            message_type,
            phase: Phase::StartLine,
            carry: Bytes::new(),
            message_began: false,
            expect_no_body: false,
            start_line: None,
            header_state: None,
            headers: None,
            fixed: None,
            chunked: None,
            events: Vec::new(),
            error: None,
            limits,
        }
    }

    /// Force `BodyStrategy::None` regardless of headers, for integrators
    /// that track a paired HEAD request (spec §9).
    pub fn set_expect_no_body(&mut self, expect_no_body: bool) {
        self.expect_no_body = expect_no_body;
    }

    /// Feed a byte fragment. The event log is reset at the start of every
    /// call; read [`Decoder::events`] afterwards for this call's delta.
    pub fn feed(&mut self, data: &[u8]) -> Result<(), ParseError> {
        match self.phase {
            Phase::Finished => return Err(ParseError::AlreadyFinished),
            Phase::Error => return Err(ParseError::AlreadyErrored),
            _ => {}
        }

        self.events.clear();

        if data.is_empty() {
            return Ok(());
        }

        if !self.message_began {
            self.events.push(Event::MessageBegin);
            self.message_began = true;
        }

        let mut merged = BytesMut::with_capacity(self.carry.len() + data.len());
        merged.extend_from_slice(&self.carry);
        merged.extend_from_slice(data);
        let buf = merged.freeze();

        match self.run(&buf) {
            Ok(pos) => {
                self.carry = buf.slice(pos..);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "decoder entering error state");
                self.phase = Phase::Error;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// The event delta produced by the most recent `feed` call.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_errored(&self) -> bool {
        self.phase == Phase::Error
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn start_line(&self) -> Option<&StartLine> {
        self.start_line.as_ref()
    }

    /// The final normalized header map, including chunked trailers merged
    /// in after the body (only meaningful once `is_finished()`).
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    // -- driver -------------------------------------------------------------

    fn run(&mut self, buf: &Bytes) -> Result<usize, ParseError> {
        let mut pos = 0usize;
        loop {
            match self.phase {
                Phase::StartLine => match self.advance_start_line(buf, pos)? {
                    Some(new_pos) => pos = new_pos,
                    None => return Ok(pos),
                },
                Phase::Headers => match self.advance_headers(buf, pos)? {
                    Some(new_pos) => pos = new_pos,
                    None => return Ok(pos),
                },
                Phase::BodyFixed => {
                    let consumed = {
                        let fixed = self.fixed.as_mut().expect("body-fixed state present");
                        fixed.advance(buf, pos, &mut self.events)
                    };
                    pos += consumed;
                    if self.fixed.as_ref().expect("present").is_done() {
                        self.finish_message();
                    } else {
                        return Ok(pos);
                    }
                }
                Phase::BodyChunked => {
                    let consumed = {
                        let chunked = self.chunked.as_mut().expect("body-chunked state present");
                        chunked.advance(buf, pos, &self.limits, &mut self.events)?
                    };
                    pos += consumed;
                    if self.chunked.as_ref().expect("present").is_done() {
                        self.merge_trailers();
                        self.finish_message();
                    } else {
                        return Ok(pos);
                    }
                }
                Phase::Finished | Phase::Error => return Ok(pos),
            }
        }
    }

    fn advance_start_line(&mut self, buf: &Bytes, pos: usize) -> Result<Option<usize>, ParseError> {
        match line::scan_line(buf, pos, self.limits.max_start_line_bytes)? {
            LineScan::Found { end, consumed } => {
                let start_line = match self.message_type {
                    MessageType::Request => startline::parse_request_line(&buf[pos..end])?,
                    MessageType::Response => startline::parse_status_line(&buf[pos..end])?,
                };

                if let StartLine::Response { status, .. } = &start_line {
                    if is_bodyless_status(*status) {
                        self.expect_no_body = true;
                    }
                }

                self.events.push(Event::StartLine(start_line.clone()));
                self.start_line = Some(start_line);
                self.header_state = Some(HeaderBlockState::new());
                self.events.push(Event::HeadersBegin);
                self.phase = Phase::Headers;
                Ok(Some(pos + consumed))
            }
            LineScan::Incomplete => Ok(None),
        }
    }

    fn advance_headers(&mut self, buf: &Bytes, mut pos: usize) -> Result<Option<usize>, ParseError> {
        loop {
            match self.scan_header_line(buf, pos)? {
                LineScan::Found { end, consumed } if end == pos => {
                    // Empty line: header block terminator.
                    let mut state = self.header_state.take().expect("header_state present");
                    state.finish(consumed, &self.limits)?;
                    pos += consumed;

                    let headers = state.headers;
                    self.events.push(Event::HeadersComplete {
                        headers: headers.clone(),
                    });

                    let strategy = framing::decide_strategy(&headers, self.expect_no_body)?;
                    self.headers = Some(headers);

                    match strategy {
                        BodyStrategy::None => {
                            self.phase = Phase::Finished;
                        }
                        BodyStrategy::Fixed(n) => {
                            self.events.push(Event::BodyBegin { strategy });
                            self.fixed = Some(FixedBodyParser::new(n));
                            self.phase = Phase::BodyFixed;
                        }
                        BodyStrategy::Chunked => {
                            self.events.push(Event::BodyBegin { strategy });
                            self.chunked = Some(ChunkedParser::new());
                            self.phase = Phase::BodyChunked;
                        }
                    }

                    return Ok(Some(pos));
                }
                LineScan::Found { end, consumed } => {
                    let state = self.header_state.as_mut().expect("header_state present");
                    let (name, value) = state.consume_line(&buf[pos..end], consumed, &self.limits)?;
                    self.events.push(Event::Header { name, value });
                    pos += consumed;
                }
                LineScan::Incomplete => {
                    let state = self.header_state.as_ref().expect("header_state present");
                    let pending = buf.len() - pos;
                    if state.received_bytes() + pending > self.limits.max_header_block_bytes {
                        return Err(ParseError::HeadersTooLarge {
                            message: format!(
                                "header block exceeds {} bytes before a full line was seen",
                                self.limits.max_header_block_bytes
                            ),
                        });
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn scan_header_line(&self, buf: &Bytes, pos: usize) -> Result<LineScan, ParseError> {
        match line::scan_line(buf, pos, self.limits.max_header_line_bytes) {
            Err(ParseError::LineTooLarge { message, .. }) => Err(ParseError::HeaderLineTooLarge { message }),
            other => other,
        }
    }

    fn merge_trailers(&mut self) {
        let trailers = self
            .chunked
            .take()
            .expect("chunked state present when merging trailers")
            .into_trailers();
        if trailers.is_empty() {
            return;
        }
        let headers = self.headers.get_or_insert_with(HeaderMap::new);
        for (name, value) in trailers.iter() {
            headers.append(name.to_string(), value.to_string());
        }
    }

    fn finish_message(&mut self) {
        tracing::trace!(message_type = ?self.message_type, "message complete");
        self.phase = Phase::Finished;
        self.events.push(Event::MessageComplete);
    }
}

/// Status codes whose responses never carry a body (spec §4.4): 1xx, 204,
/// 304. (A response to a HEAD request is handled via `set_expect_no_body`,
/// since the core does not track paired requests.)
fn is_bodyless_status(status: u16) -> bool {
    (100..200).contains(&status) || status == 204 || status == 304
}
