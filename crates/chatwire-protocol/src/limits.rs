//! Size ceilings and the truncation policy for oversized payloads.
//!
//! Oversized text is always shortened with a visible marker appended, never
//! silently dropped and never left unbounded.

/// Marker appended to a token truncated at the frame ceiling.
pub const TOKEN_TRUNCATED_MARKER: &str = "... [token truncated due to size]";

/// Marker appended to a tool input truncated at the tool-field ceiling.
pub const TOOL_INPUT_TRUNCATED_MARKER: &str = "... [input truncated due to size]";

/// Marker appended to a tool output truncated at the tool-field ceiling.
pub const TOOL_OUTPUT_TRUNCATED_MARKER: &str = "... [output truncated due to size]";

/// Notice appended exactly once when a conversation turn hits its ceiling.
pub const TURN_TRUNCATED_NOTICE: &str = "\n\n[Response truncated due to size limitations]";

/// Size ceilings and transport tuning for one streamed turn.
///
/// All knobs are overridable through server configuration; the defaults are
/// safe for arbitrarily large tool outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLimits {
    /// Ceiling for one encoded wire record, in bytes.
    pub frame_ceiling: usize,
    /// Ceiling for a string `ToolStart.input` / `ToolEnd.output`, in bytes.
    pub tool_field_ceiling: usize,
    /// Ceiling for the accumulated conversation turn, in bytes.
    pub turn_ceiling: usize,
    /// Largest single transport write, in bytes.
    pub write_chunk: usize,
    /// Transport queue high-water mark, in bytes.
    pub high_water_mark: usize,
}

impl Default for StreamLimits {
    fn default() -> Self {
        Self {
            frame_ceiling: 16 * 1024,
            tool_field_ceiling: 32 * 1024,
            turn_ceiling: 75_000,
            write_chunk: 4096,
            high_water_mark: 16 * 1024,
        }
    }
}

/// Shorten `text` to at most `ceiling` bytes plus `marker`.
///
/// The cut lands on a char boundary, so the result is always valid UTF-8 and
/// never exceeds ceiling plus marker length.
pub fn truncate_with_marker(text: &str, ceiling: usize, marker: &str) -> String {
    if text.len() <= ceiling {
        return text.to_string();
    }
    let mut cut = ceiling;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = String::with_capacity(cut + marker.len());
    truncated.push_str(&text[..cut]);
    truncated.push_str(marker);
    truncated
}
