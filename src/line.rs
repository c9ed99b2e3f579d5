use crate::error::ParseError;

/// Outcome of [`scan_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineScan {
    /// A CRLF-terminated line was found.
    ///
    /// `end` is the offset of the first byte after the line's own content
    /// (exclusive of CRLF); `consumed` is the total number of bytes the
    /// line occupies on the wire, including the terminating CRLF.
    Found { end: usize, consumed: usize },
    /// No CRLF was found within the limit and no protocol error occurred;
    /// the caller should wait for more bytes.
    Incomplete,
}

/// Locate the next CRLF-terminated line in `buf`, starting at `start`.
///
/// Bare CR and bare LF are rejected as `invalid-line-ending` to block
/// request smuggling (spec §4.1). The running line length is checked
/// byte-by-byte against `limit` so a line can never grow unbounded before
/// the caller learns about it.
pub fn scan_line(buf: &[u8], start: usize, limit: usize) -> Result<LineScan, ParseError> {
    let mut i = start;
    let mut len = 0usize;
    let mut cr_pending = false;

    while i < buf.len() {
        let byte = buf[i];

        if cr_pending {
            if byte == b'\n' {
                return Ok(LineScan::Found {
                    end: i - 1,
                    consumed: i + 1 - start,
                });
            }
            return Err(ParseError::InvalidLineEnding {
                message: "CR not followed by LF".to_string(),
                offset: i,
            });
        }

        if byte == b'\r' {
            cr_pending = true;
            i += 1;
            continue;
        }

        if byte == b'\n' {
            return Err(ParseError::InvalidLineEnding {
                message: "LF without preceding CR".to_string(),
                offset: i,
            });
        }

        len += 1;
        if len > limit {
            return Err(ParseError::LineTooLarge {
                message: format!("line exceeded {limit} bytes"),
                offset: i,
            });
        }
        i += 1;
    }

    Ok(LineScan::Incomplete)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_line() {
        let buf = b"GET / HTTP/1.1\r\nHost: x\r\n";
        let scan = scan_line(buf, 0, 100).unwrap();
        assert_eq!(
            scan,
            LineScan::Found {
                end: 14,
                consumed: 16
            }
        );
    }

    #[test]
    fn incomplete_without_crlf() {
        let buf = b"GET / HTTP/1.1";
        assert_eq!(scan_line(buf, 0, 100).unwrap(), LineScan::Incomplete);
    }

    #[test]
    fn bare_lf_is_rejected() {
        let buf = b"GET / HTTP/1.1\nHost: x\r\n";
        let err = scan_line(buf, 0, 100).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLineEnding { .. }));
    }

    #[test]
    fn bare_cr_is_rejected() {
        let buf = b"GET / HTTP/1.1\rXXX";
        let err = scan_line(buf, 0, 100).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLineEnding { .. }));
    }

    #[test]
    fn line_too_large_is_rejected_byte_by_byte() {
        let buf = vec![b'a'; 200];
        let err = scan_line(&buf, 0, 100).unwrap_err();
        assert!(matches!(err, ParseError::LineTooLarge { .. }));
    }

    #[test]
    fn respects_start_offset() {
        let buf = b"XXXXXGET / HTTP/1.1\r\n";
        let scan = scan_line(buf, 5, 100).unwrap();
        assert_eq!(
            scan,
            LineScan::Found {
                end: 19,
                consumed: 16
            }
        );
    }
}
