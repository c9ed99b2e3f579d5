use std::collections::HashMap;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ParseError;
use crate::types::is_tchar;

/// A normalized, order-preserving HTTP header collection (spec §3).
///
/// Lookups are case-insensitive and keyed by the lowercased field name;
/// a parallel ordered list keeps `(raw-name, value)` pairs in the exact
/// order they were received (or inserted), for round-trip fidelity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    by_name: HashMap<String, Vec<String>>,
    raw: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header field. Duplicates accumulate rather than overwrite.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.by_name
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.clone());
        self.raw.push((name, value));
    }

    /// All values for `name` (case-insensitive), in receipt order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first value for `name` (case-insensitive), if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Iterate `(raw-name, value)` pairs in original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.raw.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Remove every value for `name` (case-insensitive). Returns whether
    /// anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        let removed = self.by_name.remove(&lower).is_some();
        if removed {
            self.raw.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        }
        removed
    }

    /// Set `name` to a single value, discarding any previous values.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.append(name, value);
    }
}

/// Validate a header field name against the `token` grammar (spec §3).
pub fn validate_header_name(name: &[u8]) -> Result<(), ParseError> {
    if name.is_empty() {
        return Err(ParseError::HeaderNameEmpty {
            message: "header name must not be empty".to_string(),
        });
    }
    if !name.iter().all(|&b| is_tchar(b)) {
        return Err(ParseError::InvalidHeaderName {
            message: format!(
                "{:?} contains characters outside the token grammar",
                String::from_utf8_lossy(name)
            ),
        });
    }
    Ok(())
}

/// Canonicalize a header name for output (spec §4.8): lowercase, split on
/// `-`, title-case each token, rejoin on `-` — except for a fixed set of
/// all-uppercase exceptions matched against the lowercased token.
pub fn canonicalize_name(name: &str) -> String {
    name.split('-')
        .map(|token| {
            let lower = token.to_ascii_lowercase();
            match lower.as_str() {
                "te" => "TE".to_string(),
                "dnt" => "DNT".to_string(),
                "etag" => "ETag".to_string(),
                "www" => "WWW".to_string(),
                "md5" => "MD5".to_string(),
                "csrf" => "CSRF".to_string(),
                _ => title_case(&lower),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn title_case(lower: &str) -> String {
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Serialize a header map to its canonical wire form: one
/// `${CanonicalName}: ${value}\r\n` line per value, in the map's insertion
/// order (spec §4.8). Does not include the header-block terminator.
pub fn write_headers(headers: &HeaderMap) -> Bytes {
    let mut buf = BytesMut::with_capacity(headers.len() * 32);
    for (name, value) in headers.iter() {
        buf.put_slice(canonicalize_name(name).as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\r\n");
    }
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_duplicates() {
        let mut h = HeaderMap::new();
        h.append("Set-Cookie", "a=1");
        h.append("Host", "example.com");
        h.append("set-cookie", "b=2");

        assert_eq!(h.get_all("Set-Cookie"), ["a=1", "b=2"]);
        assert_eq!(h.get("host"), Some("example.com"));
        assert_eq!(
            h.iter().collect::<Vec<_>>(),
            vec![
                ("Set-Cookie", "a=1"),
                ("Host", "example.com"),
                ("set-cookie", "b=2"),
            ]
        );
    }

    #[test]
    fn canonicalize_common_names() {
        assert_eq!(canonicalize_name("content-type"), "Content-Type");
        assert_eq!(canonicalize_name("HOST"), "Host");
        assert_eq!(canonicalize_name("x-custom-header"), "X-Custom-Header");
    }

    #[test]
    fn canonicalize_exceptions() {
        assert_eq!(canonicalize_name("te"), "TE");
        assert_eq!(canonicalize_name("dnt"), "DNT");
        assert_eq!(canonicalize_name("etag"), "ETag");
        assert_eq!(canonicalize_name("www-authenticate"), "WWW-Authenticate");
        assert_eq!(canonicalize_name("content-md5"), "Content-MD5");
        assert_eq!(canonicalize_name("x-csrf-token"), "X-CSRF-Token");
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(validate_header_name(b"").is_err());
        assert!(validate_header_name(b"x y").is_err());
        assert!(validate_header_name(b"valid-Name_1").is_ok());
    }
}
