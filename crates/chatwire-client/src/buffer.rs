//! Flush buffer between the transcript and the render sink.
//!
//! Stages the latest transcript snapshot and decides when it should reach
//! the sink: short delays while output is small, progressively longer as it
//! grows, so large turns don't thrash the renderer. Two ceilings bound
//! memory independently of flush timing: a hard ceiling on what is staged
//! and a render-time guard on what is handed out.

use std::time::Duration;

use chatwire_protocol::TURN_TRUNCATED_NOTICE;

/// Tuning for the flush buffer. The delays are policy, not correctness;
/// ordering and truncation guarantees hold for any values.
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Hard ceiling on staged text; beyond it only a tail is kept.
    pub hard_ceiling: usize,
    /// Tail kept when the hard ceiling trips.
    pub keep_tail: usize,
    /// Render payloads beyond this are cut down at flush time.
    pub render_ceiling: usize,
    /// Tail kept by the flush-time guard.
    pub render_tail: usize,
    /// Flush delay for small buffers.
    pub base_delay: Duration,
    pub medium_threshold: usize,
    pub medium_delay: Duration,
    pub large_threshold: usize,
    pub large_delay: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            hard_ceiling: 100_000,
            keep_tail: 50_000,
            render_ceiling: 200_000,
            render_tail: 100_000,
            base_delay: Duration::from_millis(50),
            medium_threshold: 10_000,
            medium_delay: Duration::from_millis(200),
            large_threshold: 50_000,
            large_delay: Duration::from_millis(500),
        }
    }
}

/// Accumulator of not-yet-flushed render text.
#[derive(Debug)]
pub struct FlushBuffer {
    pending: Option<String>,
    config: BufferConfig,
}

impl FlushBuffer {
    pub fn new(config: BufferConfig) -> Self {
        Self {
            pending: None,
            config,
        }
    }

    /// Stage a snapshot and return the delay to (re)schedule the flush.
    pub fn stage(&mut self, snapshot: &str) -> Duration {
        let staged = if snapshot.len() > self.config.hard_ceiling {
            tracing::warn!(
                len = snapshot.len(),
                "Stream buffer exceeding safe size, truncating"
            );
            tail(snapshot, self.config.keep_tail).to_string()
        } else {
            snapshot.to_string()
        };

        let delay = self.delay_for(staged.len());
        self.pending = Some(staged);
        delay
    }

    /// Take the staged text for rendering, applying the flush-time guard.
    pub fn take(&mut self) -> Option<String> {
        let staged = self.pending.take()?;
        if staged.len() > self.config.render_ceiling {
            let mut cut = tail(&staged, self.config.render_tail).to_string();
            cut.push_str(TURN_TRUNCATED_NOTICE);
            return Some(cut);
        }
        Some(staged)
    }

    /// Drop staged text without rendering it.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn delay_for(&self, len: usize) -> Duration {
        if len > self.config.large_threshold {
            self.config.large_delay
        } else if len > self.config.medium_threshold {
            self.config.medium_delay
        } else {
            self.config.base_delay
        }
    }
}

/// Char-boundary-safe suffix of at most `keep` bytes.
fn tail(text: &str, keep: usize) -> &str {
    if text.len() <= keep {
        return text;
    }
    let mut start = text.len() - keep;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_text_comes_back_on_take() {
        let mut buffer = FlushBuffer::new(BufferConfig::default());
        buffer.stage("hello");
        assert_eq!(buffer.take().as_deref(), Some("hello"));
        assert!(buffer.take().is_none());
    }

    #[test]
    fn restaging_replaces_the_pending_snapshot() {
        let mut buffer = FlushBuffer::new(BufferConfig::default());
        buffer.stage("hel");
        buffer.stage("hello");
        assert_eq!(buffer.take().as_deref(), Some("hello"));
    }

    #[test]
    fn delay_grows_with_buffer_size() {
        let mut buffer = FlushBuffer::new(BufferConfig::default());
        assert_eq!(buffer.stage("short"), Duration::from_millis(50));
        assert_eq!(
            buffer.stage(&"x".repeat(20_000)),
            Duration::from_millis(200)
        );
        assert_eq!(
            buffer.stage(&"x".repeat(60_000)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn hard_ceiling_keeps_only_a_bounded_tail() {
        let mut buffer = FlushBuffer::new(BufferConfig::default());
        let mut text = "a".repeat(60_000);
        text.push_str(&"b".repeat(60_000));
        buffer.stage(&text);

        let staged = buffer.take().unwrap();
        assert_eq!(staged.len(), 50_000);
        assert!(staged.chars().all(|c| c == 'b'));
    }

    #[test]
    fn flush_time_guard_truncates_with_a_notice() {
        let config = BufferConfig {
            hard_ceiling: 1_000_000,
            render_ceiling: 200_000,
            render_tail: 100_000,
            ..BufferConfig::default()
        };
        let mut buffer = FlushBuffer::new(config);
        buffer.stage(&"x".repeat(250_000));

        let rendered = buffer.take().unwrap();
        assert!(rendered.ends_with(TURN_TRUNCATED_NOTICE));
        assert_eq!(
            rendered.len(),
            100_000 + TURN_TRUNCATED_NOTICE.len()
        );
    }

    #[test]
    fn clear_drops_pending_text() {
        let mut buffer = FlushBuffer::new(BufferConfig::default());
        buffer.stage("pending");
        buffer.clear();
        assert!(!buffer.is_pending());
        assert!(buffer.take().is_none());
    }

    #[test]
    fn tail_respects_char_boundaries() {
        // 'é' is two bytes; an odd keep lands mid-char.
        let text = "ééééé";
        let kept = tail(text, 5);
        assert_eq!(kept, "éé");
    }
}
