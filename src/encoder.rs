use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{BufMut, Bytes, BytesMut};
use futures_core::Stream;

use crate::body::chunked;
use crate::error::EncodeError;
use crate::framing;
use crate::headers::{self, HeaderMap};
use crate::types::StartLine;

/// The body half of an outgoing message (spec §4.9).
///
/// `AsyncBytes` carries an arbitrary [`Stream`] of byte chunks — the encoder
/// does not require a runtime, it only needs `Stream::poll_next`.
pub enum Body<S> {
    /// No body bytes; Content-Length/Transfer-Encoding are both absent.
    Empty,
    /// UTF-8 text; `Content-Length` is set to its byte length.
    Text(String),
    /// Raw bytes; `Content-Length` is set to the buffer length.
    Bytes(Bytes),
    /// An async byte producer; `Transfer-Encoding: chunked` is set and the
    /// stream is chunk-encoded as it is pulled.
    AsyncBytes(S),
}

/// Tuning knobs for [`Encoder::encode`] (spec §6).
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Maximum bytes per emitted chunk for an `AsyncBytes` body; a single
    /// large producer yield is split across multiple chunks.
    pub chunk_size: usize,
    /// Trailer header fields appended after the final chunk, when the body
    /// is chunk-encoded.
    pub trailers: HeaderMap,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8192,
            trailers: HeaderMap::new(),
        }
    }
}

/// Serializes a start line, headers, and body into the wire bytes of one
/// HTTP message (spec §4.9).
///
/// Stateless: all state needed lives in the returned [`Encoded`] stream.
pub struct Encoder;

impl Encoder {
    /// Prepare a message for encoding.
    ///
    /// `headers` is normalized (stripped of hop-by-hop fields, see
    /// [`framing::strip_hop_by_hop`]) and given framing headers before any
    /// bytes are produced — satisfying the atomicity guarantee (spec §4.9,
    /// S7): the full start-line + header block is ready to hand out before
    /// an `AsyncBytes` producer is ever polled.
    pub fn encode<S, E>(
        start_line: StartLine,
        mut headers: HeaderMap,
        body: Body<S>,
        config: EncoderConfig,
    ) -> Encoded<S, E>
    where
        S: Stream<Item = Result<Bytes, E>>,
    {
        framing::strip_hop_by_hop(&mut headers);

        match &body {
            Body::Empty => {}
            Body::Text(text) => headers.set("Content-Length", text.len().to_string()),
            Body::Bytes(bytes) => headers.set("Content-Length", bytes.len().to_string()),
            Body::AsyncBytes(_) => headers.set("Transfer-Encoding", "chunked"),
        }

        let mut head = BytesMut::new();
        write_start_line(&start_line, &mut head);
        head.put(headers::write_headers(&headers));
        head.put_slice(b"\r\n");

        let body_bytes = match body {
            Body::Empty => BodyBytes::None,
            Body::Text(text) => BodyBytes::Fixed(Bytes::from(text.into_bytes())),
            Body::Bytes(bytes) => BodyBytes::Fixed(bytes),
            Body::AsyncBytes(stream) => BodyBytes::Chunked {
                stream,
                chunk_size: config.chunk_size,
                trailers: config.trailers,
                done: false,
            },
        };

        Encoded {
            head: Some(head.freeze()),
            body: body_bytes,
        }
    }
}

fn write_start_line(start_line: &StartLine, out: &mut BytesMut) {
    match start_line {
        StartLine::Request {
            method,
            target,
            version,
        } => {
            out.put_slice(method.as_str().as_bytes());
            out.put_slice(b" ");
            out.put_slice(target.as_bytes());
            out.put_slice(b" ");
            out.put_slice(version.as_str().as_bytes());
        }
        StartLine::Response {
            version,
            status,
            reason,
        } => {
            out.put_slice(version.as_str().as_bytes());
            out.put_slice(b" ");
            out.put_slice(status.to_string().as_bytes());
            out.put_slice(b" ");
            out.put_slice(reason.as_bytes());
        }
    }
    out.put_slice(b"\r\n");
}

enum BodyBytes<S> {
    None,
    /// A `Content-Length`-framed body delivered as a single yield.
    Fixed(Bytes),
    Chunked {
        stream: S,
        chunk_size: usize,
        trailers: HeaderMap,
        done: bool,
    },
}

/// The async byte sequence produced by [`Encoder::encode`] (spec §5).
///
/// Implements [`Stream`] so it can be driven by any executor without this
/// crate depending on one. The full start-line + header block is always
/// the first item yielded, before the body producer (if any) is polled —
/// see [`Encoder::encode`]'s atomicity note.
pub struct Encoded<S, E> {
    head: Option<Bytes>,
    body: BodyBytes<S>,
}

impl<S, E> Stream for Encoded<S, E>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, EncodeError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(head) = this.head.take() {
            return Poll::Ready(Some(Ok(head)));
        }

        match &mut this.body {
            BodyBytes::None => Poll::Ready(None),
            BodyBytes::Fixed(bytes) => {
                if bytes.is_empty() {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(std::mem::take(bytes))))
                }
            }
            BodyBytes::Chunked {
                stream,
                chunk_size,
                trailers,
                done,
            } => {
                if *done {
                    return Poll::Ready(None);
                }
                loop {
                    match Pin::new(&mut *stream).poll_next(cx) {
                        Poll::Ready(Some(Ok(chunk))) => {
                            if chunk.is_empty() {
                                continue;
                            }
                            let mut out = BytesMut::new();
                            for piece in chunk.chunks(*chunk_size) {
                                chunked::encode_chunk(piece, &mut out);
                            }
                            return Poll::Ready(Some(Ok(out.freeze())));
                        }
                        Poll::Ready(Some(Err(e))) => {
                            *done = true;
                            return Poll::Ready(Some(Err(EncodeError::Body(e))));
                        }
                        Poll::Ready(None) => {
                            *done = true;
                            let mut out = BytesMut::new();
                            chunked::encode_terminator(trailers, &mut out);
                            return Poll::Ready(Some(Ok(out.freeze())));
                        }
                        Poll::Pending => return Poll::Pending,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HttpVersion, Method};
    use futures_util::stream;
    use futures_util::StreamExt;

    fn request_line() -> StartLine {
        StartLine::Request {
            method: Method::from_bytes(b"POST").unwrap(),
            target: "/stream".to_string(),
            version: HttpVersion::Http11,
        }
    }

    #[tokio::test]
    async fn encodes_fixed_length_text_body() {
        let mut headers = HeaderMap::new();
        headers.append("Host", "example.com");
        let body: Body<stream::Empty<Result<Bytes, std::convert::Infallible>>> =
            Body::Text("hello".to_string());

        let mut encoded = Encoder::encode(request_line(), headers, body, EncoderConfig::default());
        let head = encoded.next().await.unwrap().unwrap();
        let head = String::from_utf8(head.to_vec()).unwrap();
        assert!(head.starts_with("POST /stream HTTP/1.1\r\n"));
        assert!(head.contains("Content-Length: 5\r\n"));
        assert!(head.ends_with("\r\n\r\n"));

        let body_chunk = encoded.next().await.unwrap().unwrap();
        assert_eq!(&body_chunk[..], b"hello");
        assert!(encoded.next().await.is_none());
    }

    #[tokio::test]
    async fn empty_body_has_no_framing_header_and_no_data_item() {
        let headers = HeaderMap::new();
        let body: Body<stream::Empty<Result<Bytes, std::convert::Infallible>>> = Body::Empty;
        let mut encoded = Encoder::encode(request_line(), headers, body, EncoderConfig::default());
        let head = encoded.next().await.unwrap().unwrap();
        let head = String::from_utf8(head.to_vec()).unwrap();
        assert!(!head.to_ascii_lowercase().contains("content-length"));
        assert!(encoded.next().await.is_none());
    }

    #[tokio::test]
    async fn strips_hop_by_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.append("Connection", "close");
        headers.append("Content-Type", "text/plain");
        let body: Body<stream::Empty<Result<Bytes, std::convert::Infallible>>> = Body::Empty;
        let mut encoded = Encoder::encode(request_line(), headers, body, EncoderConfig::default());
        let head = encoded.next().await.unwrap().unwrap();
        let head = String::from_utf8(head.to_vec()).unwrap();
        assert!(!head.to_ascii_lowercase().contains("connection"));
        assert!(head.contains("Content-Type: text/plain"));
    }

    #[tokio::test]
    async fn async_body_is_chunk_encoded_after_atomic_head() {
        let headers = HeaderMap::new();
        let producer = stream::iter(vec![
            Ok::<_, std::convert::Infallible>(Bytes::from_static(b"Hello")),
            Ok(Bytes::from_static(b" World")),
        ]);
        let body = Body::AsyncBytes(producer);

        let mut encoded = Encoder::encode(request_line(), headers, body, EncoderConfig::default());

        let head = encoded.next().await.unwrap().unwrap();
        let head = String::from_utf8(head.to_vec()).unwrap();
        assert!(head.contains("Transfer-Encoding: chunked\r\n"));
        assert!(head.ends_with("\r\n\r\n"));

        let mut rest = Vec::new();
        while let Some(chunk) = encoded.next().await {
            rest.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(rest, b"5\r\nHello\r\n6\r\n World\r\n0\r\n\r\n");
    }

    #[tokio::test]
    async fn empty_producer_yields_are_skipped() {
        let headers = HeaderMap::new();
        let producer = stream::iter(vec![
            Ok::<_, std::convert::Infallible>(Bytes::new()),
            Ok(Bytes::from_static(b"data")),
        ]);
        let body = Body::AsyncBytes(producer);
        let mut encoded = Encoder::encode(request_line(), headers, body, EncoderConfig::default());
        encoded.next().await; // head
        let mut rest = Vec::new();
        while let Some(chunk) = encoded.next().await {
            rest.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(rest, b"4\r\ndata\r\n0\r\n\r\n");
    }

    #[tokio::test]
    async fn producer_error_propagates_after_head() {
        let headers = HeaderMap::new();
        let producer = stream::iter(vec![Err::<Bytes, _>("boom")]);
        let body = Body::AsyncBytes(producer);
        let mut encoded = Encoder::encode(request_line(), headers, body, EncoderConfig::default());
        assert!(encoded.next().await.unwrap().is_ok());
        let err = encoded.next().await.unwrap();
        assert!(matches!(err, Err(EncodeError::Body("boom"))));
    }

    #[tokio::test]
    async fn trailers_are_emitted_after_terminator() {
        let headers = HeaderMap::new();
        let producer = stream::iter(vec![Ok::<_, std::convert::Infallible>(Bytes::from_static(
            b"x",
        ))]);
        let body = Body::AsyncBytes(producer);
        let mut config = EncoderConfig::default();
        config.trailers.append("X-Checksum", "abc");

        let mut encoded = Encoder::encode(request_line(), headers, body, config);
        encoded.next().await; // head
        let mut rest = Vec::new();
        while let Some(chunk) = encoded.next().await {
            rest.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(rest, b"1\r\nx\r\n0\r\nX-Checksum: abc\r\n\r\n");
    }
}
