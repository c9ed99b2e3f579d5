use serde::Serialize;

use crate::types::StartLine;

/// A fully decoded HTTP message, flattened from a [`crate::Decoder`]'s
/// event stream into a single snapshot for display or serialization.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedMessage {
    pub start_line: StartLine,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Serialize a [`DecodedMessage`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(message: &DecodedMessage, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(message).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(message).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render a [`DecodedMessage`] in a human-readable debug format.
pub fn format_debug(message: &DecodedMessage) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("=== HTTP Message ===\n");
    match &message.start_line {
        StartLine::Request {
            method,
            target,
            version,
        } => {
            out.push_str(&format!("Method:  {method}\n"));
            out.push_str(&format!("Target:  {target}\n"));
            out.push_str(&format!("Version: {version}\n"));
        }
        StartLine::Response {
            version,
            status,
            reason,
        } => {
            out.push_str(&format!("Version: {version}\n"));
            out.push_str(&format!("Status:  {status} {reason}\n"));
        }
    }

    out.push_str(&format!("\n--- Headers ({}) ---\n", message.headers.len()));
    for (name, value) in &message.headers {
        out.push_str(&format!("  {name}: {value}\n"));
    }

    if message.body.is_empty() {
        out.push_str("\n--- No Body ---\n");
    } else {
        out.push_str(&format!("\n--- Body ({} bytes) ---\n", message.body.len()));
        match std::str::from_utf8(&message.body) {
            Ok(s) => out.push_str(s),
            Err(_) => out.push_str(&format!("<binary data: {} bytes>", message.body.len())),
        }
        out.push('\n');
    }

    out.push_str("====================\n");
    out
}

/// Render only the start line and headers (no body).
pub fn format_headers_only(message: &DecodedMessage) -> String {
    let mut out = String::with_capacity(64 + message.headers.len() * 40);

    match &message.start_line {
        StartLine::Request {
            method,
            target,
            version,
        } => out.push_str(&format!("{method} {target} {version}\n")),
        StartLine::Response {
            version,
            status,
            reason,
        } => out.push_str(&format!("{version} {status} {reason}\n")),
    }

    for (name, value) in &message.headers {
        out.push_str(&format!("{name}: {value}\n"));
    }

    out
}
