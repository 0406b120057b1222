//! Wire codec: frames to delimited records and back.
//!
//! Each wire record is `data: <JSON object>\n\n`. Decoding is driven
//! chunk-by-chunk: `RecordDecoder` keeps unparsed trailing text as leftover,
//! so a record split across any number of reads reassembles once the rest
//! arrives.

use crate::error::Result;
use crate::frame::Frame;

/// Prefix of every data-bearing wire line.
pub const DATA_PREFIX: &str = "data: ";

/// Delimiter terminating one wire record.
pub const RECORD_DELIMITER: &str = "\n\n";

/// Serialize a frame into one wire record.
pub fn encode(frame: &Frame) -> Result<String> {
    let json = serde_json::to_string(frame)?;
    Ok(format!("{DATA_PREFIX}{json}{RECORD_DELIMITER}"))
}

/// Incremental record decoder with leftover state.
///
/// `push` is a pure function of (previous leftover, new text): feeding the
/// same stream in different chunkings yields the same frame sequence.
#[derive(Debug, Default)]
pub struct RecordDecoder {
    leftover: String,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every record completed by `text`; the remainder stays buffered
    /// until more input arrives.
    pub fn push(&mut self, text: &str) -> Vec<Frame> {
        self.leftover.push_str(text);

        let mut frames = Vec::new();
        while let Some(end) = self.leftover.find(RECORD_DELIMITER) {
            let rest = self.leftover.split_off(end + RECORD_DELIMITER.len());
            let record = std::mem::replace(&mut self.leftover, rest);
            let record = &record[..end];

            for line in record.lines() {
                // Lines without the data prefix are SSE comments/keepalives.
                let Some(data) = line.strip_prefix(DATA_PREFIX) else {
                    continue;
                };
                match serde_json::from_str::<Frame>(data) {
                    Ok(frame) => frames.push(frame),
                    Err(err) => {
                        // A delimited record can never become valid with more
                        // bytes; partial data is what leftover retains.
                        tracing::warn!(len = data.len(), error = %err, "Skipping malformed wire record");
                    }
                }
            }
        }
        frames
    }

    /// Unparsed trailing text pending more input.
    pub fn leftover(&self) -> &str {
        &self.leftover
    }
}
