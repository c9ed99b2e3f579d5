use crate::body::BodyStrategy;
use crate::error::ParseError;
use crate::headers::HeaderMap;

/// Decide the body-framing strategy from a completed header block
/// (spec §4.4). `expect_no_body` forces `BodyStrategy::None` regardless of
/// the headers — set by the decoder for 1xx/204/304 responses and for
/// integrators who track a paired HEAD request (spec §9).
pub fn decide_strategy(headers: &HeaderMap, expect_no_body: bool) -> Result<BodyStrategy, ParseError> {
    if expect_no_body {
        return Ok(BodyStrategy::None);
    }

    if headers.contains("transfer-encoding") {
        return decide_transfer_encoding(headers);
    }

    if headers.contains("content-length") {
        return decide_content_length(headers);
    }

    Ok(BodyStrategy::None)
}

fn decide_transfer_encoding(headers: &HeaderMap) -> Result<BodyStrategy, ParseError> {
    let tokens: Vec<String> = headers
        .get_all("transfer-encoding")
        .iter()
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.len() != 1 || tokens[0] != "chunked" {
        return Err(ParseError::UnsupportedFeature {
            message: format!(
                "unsupported Transfer-Encoding tokens: {tokens:?} (only a sole 'chunked' is supported)"
            ),
        });
    }

    if headers.contains("content-length") {
        return Err(ParseError::InvalidSyntax {
            message: "Content-Length with Transfer-Encoding".to_string(),
        });
    }

    Ok(BodyStrategy::Chunked)
}

fn decide_content_length(headers: &HeaderMap) -> Result<BodyStrategy, ParseError> {
    let values = headers.get_all("content-length");
    let first = values[0].trim();
    if values.iter().any(|v| v.trim() != first) {
        return Err(ParseError::InvalidSyntax {
            message: "multiple distinct Content-Length values".to_string(),
        });
    }

    if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidSyntax {
            message: format!("Content-Length {first:?} is not a non-negative integer"),
        });
    }

    let length: u64 = first.parse().map_err(|_| ParseError::MessageTooLarge {
        message: format!("Content-Length {first:?} exceeds the supported integer range"),
    })?;

    if length == 0 {
        Ok(BodyStrategy::None)
    } else {
        Ok(BodyStrategy::Fixed(length))
    }
}

/// Hop-by-hop headers that must never be forwarded (RFC 9110 §7.6.1,
/// spec §4.9). The encoder strips these before applying its own framing.
pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Strip hop-by-hop headers, including any header named by a token inside
/// an existing `Connection` value.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let connection_tokens: Vec<String> = headers
        .get_all("connection")
        .iter()
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    for token in connection_tokens {
        headers.remove(&token);
    }
}
