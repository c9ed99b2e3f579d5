use std::fmt;

use serde::Serialize;

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// An HTTP request method.
///
/// Per spec §3 the core treats the method as an opaque `token`, uppercased
/// on output — it is not restricted to a fixed enumeration of well-known
/// verbs, so custom/extension methods round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Method(String);

impl Method {
    /// Parse a method token from bytes, uppercasing it for storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.is_empty() {
            return Err(ParseError::InvalidStartLine {
                message: "method must not be empty".to_string(),
            });
        }
        if !bytes.iter().all(|&b| is_tchar(b)) {
            return Err(ParseError::InvalidStartLine {
                message: "method contains non-token characters".to_string(),
            });
        }
        let upper = bytes.to_ascii_uppercase();
        Ok(Self(String::from_utf8(upper).expect("tchar is ASCII")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `tchar` — characters allowed in HTTP tokens (method, header names).
///
/// `tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///          "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA`
#[inline]
pub(crate) fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

// ---------------------------------------------------------------------------
// HttpVersion
// ---------------------------------------------------------------------------

/// HTTP protocol version. Only 1.0 and 1.1 are accepted (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpVersion {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
}

impl HttpVersion {
    /// Parse `HTTP/<major>.<minor>` (case-insensitive on the `HTTP` token).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() == 8
            && bytes[..5].eq_ignore_ascii_case(b"HTTP/")
            && bytes[6] == b'.'
            && bytes[5].is_ascii_digit()
            && bytes[7].is_ascii_digit()
        {
            return match (bytes[5], bytes[7]) {
                (b'1', b'0') => Ok(Self::Http10),
                (b'1', b'1') => Ok(Self::Http11),
                _ => Err(ParseError::UnsupportedHttpVersion {
                    message: format!("{:?} is not 1.0 or 1.1", String::from_utf8_lossy(bytes)),
                }),
            };
        }
        Err(ParseError::UnsupportedHttpVersion {
            message: format!("malformed version string {:?}", String::from_utf8_lossy(bytes)),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status code / reason phrase
// ---------------------------------------------------------------------------

/// Parse and validate a 3-digit status code (100..599 inclusive, spec §4.2).
pub fn parse_status_code(bytes: &[u8]) -> Result<u16, ParseError> {
    if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(ParseError::InvalidStatusCode {
            message: format!("{:?} is not a 3-digit code", String::from_utf8_lossy(bytes)),
        });
    }
    let code: u16 = std::str::from_utf8(bytes)
        .expect("checked ascii digit")
        .parse()
        .expect("3 ascii digits always parse");
    if !(100..=599).contains(&code) {
        return Err(ParseError::InvalidStatusCode {
            message: format!("{code} is out of range 100..599"),
        });
    }
    Ok(code)
}

/// The canonical reason phrase for a status code, or `"Unknown"`.
pub fn canonical_reason(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    }
}

// ---------------------------------------------------------------------------
// Start line
// ---------------------------------------------------------------------------

/// A decoded request line or status line (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StartLine {
    Request {
        method: Method,
        target: String,
        version: HttpVersion,
    },
    Response {
        version: HttpVersion,
        status: u16,
        reason: String,
    },
}

impl StartLine {
    pub fn version(&self) -> HttpVersion {
        match self {
            Self::Request { version, .. } | Self::Response { version, .. } => *version,
        }
    }
}
