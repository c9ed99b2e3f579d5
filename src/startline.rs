use crate::error::ParseError;
use crate::types::{self, HttpVersion, Method, StartLine};

/// Parse a request line: `method SP request-target SP HTTP-version`
/// (spec §4.2). Leading/trailing spaces are trimmed and runs of interior
/// spaces collapse to a single separator.
pub fn parse_request_line(line: &[u8]) -> Result<StartLine, ParseError> {
    let (method, target, version) = split_three_fields(line)?;

    if target.is_empty() {
        return Err(ParseError::InvalidStartLine {
            message: "request target must not be empty".to_string(),
        });
    }

    Ok(StartLine::Request {
        method: Method::from_bytes(method)?,
        target: String::from_utf8_lossy(target).into_owned(),
        version: HttpVersion::from_bytes(version)?,
    })
}

/// Parse a status line: `HTTP-version SP status-code SP [reason-phrase]`
/// (spec §4.2). The reason phrase may be empty or absent; when absent, the
/// canonical phrase for the status code is filled in.
pub fn parse_status_line(line: &[u8]) -> Result<StartLine, ParseError> {
    let trimmed = trim_ows(line);
    let mut parts = trimmed.splitn(3, |&b| b == b' ');

    let version = parts.next().unwrap_or(b"");
    let status = parts.next().ok_or_else(|| ParseError::InvalidStartLine {
        message: "status line missing status code".to_string(),
    })?;
    let reason = parts.next().unwrap_or(b"");

    let version = HttpVersion::from_bytes(version)?;
    let status = types::parse_status_code(status)?;
    let reason = if reason.is_empty() {
        types::canonical_reason(status).to_string()
    } else {
        String::from_utf8_lossy(reason).into_owned()
    };

    Ok(StartLine::Response {
        version,
        status,
        reason,
    })
}

/// Split a request line into exactly three whitespace-separated fields,
/// trimming leading/trailing spaces and collapsing interior runs of spaces.
fn split_three_fields(line: &[u8]) -> Result<(&[u8], &[u8], &[u8]), ParseError> {
    let trimmed = trim_ows(line);

    let Some(sp1) = trimmed.iter().position(|&b| b == b' ') else {
        return Err(ParseError::InvalidStartLine {
            message: "start line has too few fields".to_string(),
        });
    };
    let method = &trimmed[..sp1];
    let rest = skip_spaces(&trimmed[sp1 + 1..]);

    let Some(sp2) = rest.iter().position(|&b| b == b' ') else {
        return Err(ParseError::InvalidStartLine {
            message: "start line has too few fields".to_string(),
        });
    };
    let target = &rest[..sp2];
    let version = skip_spaces(&rest[sp2 + 1..]);

    if method.is_empty() || version.is_empty() {
        return Err(ParseError::InvalidStartLine {
            message: "start line has an empty field".to_string(),
        });
    }

    Ok((method, target, version))
}

fn skip_spaces(bytes: &[u8]) -> &[u8] {
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }
    &bytes[i..]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_request_line() {
        let sl = parse_request_line(b"GET /path HTTP/1.1").unwrap();
        assert_eq!(
            sl,
            StartLine::Request {
                method: Method::from_bytes(b"GET").unwrap(),
                target: "/path".to_string(),
                version: HttpVersion::Http11,
            }
        );
    }

    #[test]
    fn collapses_interior_whitespace() {
        let sl = parse_request_line(b"GET   /path   HTTP/1.1").unwrap();
        assert_eq!(
            sl,
            StartLine::Request {
                method: Method::from_bytes(b"GET").unwrap(),
                target: "/path".to_string(),
                version: HttpVersion::Http11,
            }
        );
    }

    #[test]
    fn rejects_empty_target() {
        assert!(parse_request_line(b"GET  HTTP/1.1").is_err());
    }

    #[test]
    fn options_asterisk_is_opaque() {
        let sl = parse_request_line(b"OPTIONS * HTTP/1.1").unwrap();
        assert_eq!(
            sl,
            StartLine::Request {
                method: Method::from_bytes(b"OPTIONS").unwrap(),
                target: "*".to_string(),
                version: HttpVersion::Http11,
            }
        );
    }

    #[test]
    fn parses_status_line_with_reason() {
        let sl = parse_status_line(b"HTTP/1.1 404 Not Found").unwrap();
        assert_eq!(
            sl,
            StartLine::Response {
                version: HttpVersion::Http11,
                status: 404,
                reason: "Not Found".to_string(),
            }
        );
    }

    #[test]
    fn fills_missing_reason_with_canonical_phrase() {
        let sl = parse_status_line(b"HTTP/1.1 200").unwrap();
        assert_eq!(
            sl,
            StartLine::Response {
                version: HttpVersion::Http11,
                status: 200,
                reason: "OK".to_string(),
            }
        );
    }

    #[test]
    fn unknown_code_with_missing_reason_is_unknown() {
        let sl = parse_status_line(b"HTTP/1.1 499").unwrap();
        assert_eq!(
            sl,
            StartLine::Response {
                version: HttpVersion::Http11,
                status: 499,
                reason: "Unknown".to_string(),
            }
        );
    }

    #[test]
    fn rejects_bad_status_code() {
        assert!(parse_status_line(b"HTTP/1.1 abc reason").is_err());
        assert!(parse_status_line(b"HTTP/1.1 99 reason").is_err());
        assert!(parse_status_line(b"HTTP/1.1 600 reason").is_err());
    }
}
