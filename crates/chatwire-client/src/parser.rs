//! Incremental frame parser over arbitrarily-chunked byte input.

use chatwire_protocol::{Frame, RecordDecoder};

use crate::decode::{MAX_DECODE_CHUNK, Utf8Decoder};

/// Reconstructs frames from network reads.
///
/// State is just the decoder carry-over and the record leftover, so the
/// output depends only on the byte sequence, not on how it was chunked.
#[derive(Debug, Default)]
pub struct StreamParser {
    utf8: Utf8Decoder,
    records: RecordDecoder,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every frame completed by `chunk`.
    ///
    /// Large reads are sliced into bounded sub-chunks before decoding; the
    /// stateful decoder keeps slicing safe across character boundaries.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        for piece in chunk.chunks(MAX_DECODE_CHUNK) {
            let text = self.utf8.decode(piece);
            if !text.is_empty() {
                frames.extend(self.records.push(&text));
            }
        }
        frames
    }

    /// Unparsed record text pending more input.
    pub fn leftover(&self) -> &str {
        self.records.leftover()
    }
}
