//! SSE emitter: typed frames to bounded wire records.
//!
//! The emitter owns the oversize policy. String tool fields are cut at the
//! tool-field ceiling, oversized tokens are cut at the frame ceiling, and
//! anything else too large for one record is simply handed to the transport,
//! which writes it as independent bounded chunks; reassembly is the client
//! parser's job, not the emitter's.

use bytes::Bytes;
use chatwire_protocol::{
    Frame, StreamLimits, TOKEN_TRUNCATED_MARKER, TOOL_INPUT_TRUNCATED_MARKER,
    TOOL_OUTPUT_TRUNCATED_MARKER, encode, truncate_with_marker,
};
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::ChannelWriter;

/// Per-turn frame emitter over a byte transport.
pub struct SseEmitter {
    writer: Option<ChannelWriter>,
    limits: StreamLimits,
}

impl SseEmitter {
    pub fn new(writer: ChannelWriter, limits: StreamLimits) -> Self {
        Self {
            writer: Some(writer),
            limits,
        }
    }

    /// Emit `Connected`; called right after the transport opens, before any
    /// agent work starts.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        self.emit(&Frame::Connected).await
    }

    /// Apply the oversize policy, serialize, and write one frame.
    pub async fn emit(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let Some(writer) = &self.writer else {
            return Err(TransportError::Closed);
        };

        let frame = self.bound_tool_fields(frame);
        let mut record = match encode(&frame) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize frame, dropping");
                return Ok(());
            }
        };

        if record.len() > self.limits.frame_ceiling {
            if let Frame::Token { token } = &frame {
                // Tokens are fragments of a stream; truncating one in place
                // is safe and keeps the record near the ceiling.
                tracing::warn!(len = record.len(), "Large token frame detected, truncating");
                let bounded = Frame::token(truncate_with_marker(
                    token,
                    self.limits.frame_ceiling,
                    TOKEN_TRUNCATED_MARKER,
                ));
                record = match encode(&bounded) {
                    Ok(record) => record,
                    Err(err) => {
                        tracing::warn!(error = %err, "Failed to re-serialize truncated token, dropping");
                        return Ok(());
                    }
                };
            } else {
                // The transport writes this as independent bounded chunks;
                // the client reassembles at the byte level.
                tracing::warn!(len = record.len(), "Large wire record detected, splitting");
            }
        }

        let result = writer.write(Bytes::from(record)).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Stream write failed");
        }
        result
    }

    /// Release the transport. Idempotent; runs on every turn exit path.
    pub async fn close(&mut self) {
        if let Some(writer) = self.writer.take() {
            drop(writer);
            tracing::debug!("Stream emitter closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    fn bound_tool_fields(&self, frame: &Frame) -> Frame {
        let ceiling = self.limits.tool_field_ceiling;
        match frame {
            Frame::ToolStart { tool, input } => Frame::ToolStart {
                tool: tool.clone(),
                input: bound_string_value(input, ceiling, TOOL_INPUT_TRUNCATED_MARKER, "input"),
            },
            Frame::ToolEnd { tool, output } => Frame::ToolEnd {
                tool: tool.clone(),
                output: bound_string_value(output, ceiling, TOOL_OUTPUT_TRUNCATED_MARKER, "output"),
            },
            other => other.clone(),
        }
    }
}

/// Truncate string payloads; non-string JSON falls through to the generic
/// frame ceiling.
fn bound_string_value(value: &Value, ceiling: usize, marker: &str, field: &str) -> Value {
    match value {
        Value::String(text) if text.len() > ceiling => {
            tracing::warn!(field, len = text.len(), "Large tool payload detected, truncating");
            Value::String(truncate_with_marker(text, ceiling, marker))
        }
        other => other.clone(),
    }
}
