/// Configurable safety limits enforced by the decoder (spec §3, §6).
///
/// All sizes are in bytes. Defaults match spec §3: 16 KiB start line,
/// 8 KiB header line, 256 B header name, 8 KiB header value, 64 KiB total
/// header block, 100 headers, 64 B chunk-size line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length of the start line (request line or status line).
    pub max_start_line_bytes: usize,
    /// Maximum length of a single header field line.
    pub max_header_line_bytes: usize,
    /// Maximum length of a header field name.
    pub max_header_name_bytes: usize,
    /// Maximum length of a header field value.
    pub max_header_value_bytes: usize,
    /// Maximum total size of the header block (all field lines combined).
    pub max_header_block_bytes: usize,
    /// Maximum number of header fields.
    pub max_header_count: usize,
    /// Maximum length of a chunk-size line (size plus extensions).
    pub max_chunk_size_line_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_start_line_bytes: 16 * 1024,
            max_header_line_bytes: 8 * 1024,
            max_header_name_bytes: 256,
            max_header_value_bytes: 8 * 1024,
            max_header_block_bytes: 64 * 1024,
            max_header_count: 100,
            max_chunk_size_line_bytes: 64,
        }
    }
}
