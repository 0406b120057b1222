//! Stateful UTF-8 decoding for chunked network reads.
//!
//! A read can end mid-character; the decoder carries the incomplete tail
//! (at most 3 bytes) into the next call, so slicing the input at arbitrary
//! byte offsets never corrupts a multi-byte character. Genuinely invalid
//! bytes become U+FFFD instead of failing the stream.

/// Reads above this size are sliced before decoding to bound the peak
/// decode-buffer size.
pub const MAX_DECODE_CHUNK: usize = 16 * 1024;

/// Streaming UTF-8 decoder with carry-over state.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, prepending any bytes held over from the last call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let joined;
        let input: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut bytes = std::mem::take(&mut self.pending);
            bytes.extend_from_slice(chunk);
            joined = bytes;
            &joined
        };

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        Some(bad) => {
                            out.push('\u{FFFD}');
                            rest = &after[bad..];
                        }
                        None => {
                            // Incomplete trailing sequence; hold it for the
                            // next read.
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Bytes held over from the previous call.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}
