//! Byte transport between the emitter and the HTTP response body.
//!
//! A bounded channel of byte chunks with an explicit backpressure contract:
//! the queue capacity derives from the configured high-water mark, and every
//! write is split into pieces no larger than the write-chunk size before it
//! is enqueued, so a single oversized write can never spike memory. There is
//! no retry; once the consumer is gone the turn is abandoned.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use chatwire_protocol::StreamLimits;
use futures::Stream;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// Create the write/read halves of a per-turn byte channel.
pub fn byte_channel(limits: &StreamLimits) -> (ChannelWriter, ChannelBody) {
    let chunk_size = limits.write_chunk.max(1);
    let capacity = (limits.high_water_mark / chunk_size).max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelWriter { tx, chunk_size }, ChannelBody { rx })
}

/// Write half: splits payloads into bounded chunks and queues them.
///
/// Writes that would exceed the high-water mark suspend until the consumer
/// drains; dropping the writer ends the stream.
#[derive(Debug)]
pub struct ChannelWriter {
    tx: mpsc::Sender<Bytes>,
    chunk_size: usize,
}

impl ChannelWriter {
    pub async fn write(&self, payload: Bytes) -> Result<(), TransportError> {
        let mut rest = payload;
        while !rest.is_empty() {
            let piece = rest.split_to(rest.len().min(self.chunk_size));
            self.tx
                .send(piece)
                .await
                .map_err(|_| TransportError::Closed)?;
        }
        Ok(())
    }
}

/// Read half: a byte stream suitable for `axum::body::Body::from_stream`.
#[derive(Debug)]
pub struct ChannelBody {
    rx: mpsc::Receiver<Bytes>,
}

impl Stream for ChannelBody {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|chunk| chunk.map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn limits(write_chunk: usize, high_water_mark: usize) -> StreamLimits {
        StreamLimits {
            write_chunk,
            high_water_mark,
            ..StreamLimits::default()
        }
    }

    async fn collect(mut body: ChannelBody) -> Vec<Bytes> {
        let mut chunks = Vec::new();
        while let Some(chunk) = body.next().await {
            chunks.push(chunk.unwrap());
        }
        chunks
    }

    #[tokio::test]
    async fn large_writes_are_split_into_bounded_chunks() {
        let (writer, body) = byte_channel(&limits(4096, 64 * 1024));
        let payload = Bytes::from(vec![7u8; 10_240]);
        writer.write(payload.clone()).await.unwrap();
        drop(writer);

        let chunks = collect(body).await;
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|chunk| chunk.len() <= 4096));
        let joined: Vec<u8> = chunks.concat();
        assert_eq!(joined, payload);
    }

    #[tokio::test]
    async fn write_beyond_high_water_mark_queues_until_drained() {
        // Capacity of exactly two chunks.
        let (writer, mut body) = byte_channel(&limits(1024, 2048));
        writer.write(Bytes::from(vec![0u8; 2048])).await.unwrap();

        let mut blocked = Box::pin(writer.write(Bytes::from(vec![1u8; 1024])));
        assert!(futures::poll!(blocked.as_mut()).is_pending());

        // Draining one chunk frees a slot and the queued write completes.
        body.next().await.unwrap().unwrap();
        blocked.await.unwrap();
    }

    #[tokio::test]
    async fn write_after_consumer_drop_is_a_terminal_error() {
        let (writer, body) = byte_channel(&limits(1024, 2048));
        drop(body);
        let result = writer.write(Bytes::from_static(b"late")).await;
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn dropping_the_writer_ends_the_stream() {
        let (writer, body) = byte_channel(&limits(1024, 2048));
        writer.write(Bytes::from_static(b"bye")).await.unwrap();
        drop(writer);
        assert_eq!(collect(body).await.concat(), b"bye");
    }
}
