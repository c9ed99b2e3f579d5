use crate::error::ParseError;
use crate::headers::{self, HeaderMap};
use crate::limits::Limits;

/// Accumulates a header block line-by-line (spec §4.3): a normalized
/// multimap plus a running byte count used to enforce `max_header_block_bytes`
/// and `max_header_count`.
#[derive(Debug, Default)]
pub struct HeaderBlockState {
    pub headers: HeaderMap,
    received_bytes: usize,
}

impl HeaderBlockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received_bytes(&self) -> usize {
        self.received_bytes
    }

    /// Parse one non-empty header-field line (content only, CRLF excluded)
    /// and append it to the map. `line_bytes_on_wire` is the line's full
    /// byte count including its terminating CRLF, for block-size accounting.
    ///
    /// Returns the `(lowercased name, value)` pair for event emission.
    pub fn consume_line(
        &mut self,
        line: &[u8],
        line_bytes_on_wire: usize,
        limits: &Limits,
    ) -> Result<(String, String), ParseError> {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return Err(ParseError::HeaderMissingColon {
                message: format!("{:?} has no ':'", String::from_utf8_lossy(line)),
            });
        };
        if colon == 0 {
            return Err(ParseError::HeaderNameEmpty {
                message: "header field name is empty".to_string(),
            });
        }

        let raw_name = &line[..colon];
        if raw_name[0] == b' ' || raw_name[0] == b'\t' {
            return Err(ParseError::InvalidHeaderName {
                message: "header field name has leading whitespace (obsolete line folding is not supported)".to_string(),
            });
        }
        let name = trim_trailing_ows(raw_name);
        if name.len() > limits.max_header_name_bytes {
            return Err(ParseError::HeaderNameTooLarge {
                message: format!("header name exceeds {} bytes", limits.max_header_name_bytes),
            });
        }
        headers::validate_header_name(name)?;

        let value = trim_ows(&line[colon + 1..]);
        if value.len() > limits.max_header_value_bytes {
            return Err(ParseError::HeaderValueTooLarge {
                message: format!("header value exceeds {} bytes", limits.max_header_value_bytes),
            });
        }

        let name = String::from_utf8_lossy(name).into_owned();
        let value = String::from_utf8_lossy(value).into_owned();
        let lower = name.to_ascii_lowercase();

        self.headers.append(name, value.clone());

        self.received_bytes += line_bytes_on_wire;
        if self.received_bytes > limits.max_header_block_bytes {
            return Err(ParseError::HeadersTooLarge {
                message: format!("header block exceeds {} bytes", limits.max_header_block_bytes),
            });
        }
        if self.headers.len() > limits.max_header_count {
            return Err(ParseError::HeadersTooMany {
                message: format!("header count reached {}", limits.max_header_count),
            });
        }

        Ok((lower, value))
    }

    /// Account for the terminating empty line and check the block-size
    /// limit one final time.
    pub fn finish(&mut self, terminator_bytes: usize, limits: &Limits) -> Result<(), ParseError> {
        self.received_bytes += terminator_bytes;
        if self.received_bytes > limits.max_header_block_bytes {
            return Err(ParseError::HeadersTooLarge {
                message: format!("header block exceeds {} bytes", limits.max_header_block_bytes),
            });
        }
        Ok(())
    }
}

fn trim_trailing_ows(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |p| p + 1);
    &bytes[..end]
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
