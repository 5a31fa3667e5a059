//! Token Streamer
//!
//! Receives streaming chunks and writes their text to the display as they
//! arrive, marking the start of reasoning with a header once per response.

use crate::api::extract::{extract_streaming_content, THINKING_HEADER};
use crate::api::streaming::StreamChunk;
use crate::dispatch::event_loop::{schedule_threadsafe, EventLoop};
use crate::dispatch::sink::{write_best_effort, TextSink};
use crate::error::Result;
use futures::{Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Streams token deltas to a text sink
///
/// One streamer serves one response at a time. Call [`TokenStreamer::reset`]
/// before each new response, otherwise the reasoning header will not be
/// shown again.
pub struct TokenStreamer {
    sink: Option<Arc<dyn TextSink>>,
    event_loop: Option<Arc<dyn EventLoop>>,
    header: String,
    header_emitted: AtomicBool,
}

impl TokenStreamer {
    /// Create a streamer writing directly to `sink` on the calling thread
    pub fn new(sink: Option<Arc<dyn TextSink>>) -> Self {
        Self {
            sink,
            event_loop: None,
            header: THINKING_HEADER.to_string(),
            header_emitted: AtomicBool::new(false),
        }
    }

    /// Hand writes to a host event loop instead of calling the sink inline
    pub fn with_event_loop(mut self, event_loop: Arc<dyn EventLoop>) -> Self {
        self.event_loop = Some(event_loop);
        self
    }

    /// Replace the header printed ahead of the first reasoning fragment
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn header_emitted(&self) -> bool {
        self.header_emitted.load(Ordering::SeqCst)
    }

    /// Reset state for a new streaming response
    pub fn reset(&self) {
        self.header_emitted.store(false, Ordering::SeqCst);
    }

    /// Handle a streaming token chunk.
    ///
    /// Display failures are logged and never reach the caller, so the stream
    /// keeps flowing whatever happens to the UI.
    pub fn on_token(&self, chunk: &StreamChunk) {
        if let Err(e) = self.dispatch(chunk) {
            warn!(error = %e, "Failed to dispatch streamed token");
        }
    }

    fn dispatch(&self, chunk: &StreamChunk) -> Result<()> {
        let extracted = extract_streaming_content(chunk);

        if let Some(reasoning) = extracted.reasoning {
            let text = if self.header_emitted.swap(true, Ordering::SeqCst) {
                reasoning
            } else {
                format!("{}{}", self.header, reasoning)
            };
            self.write_text(text)?;
        }

        if let Some(content) = extracted.content {
            self.write_text(content)?;
        }

        Ok(())
    }

    /// Schedule text for the sink; without a sink the text is dropped
    fn write_text(&self, text: String) -> Result<()> {
        let Some(sink) = self.sink.clone() else {
            return Ok(());
        };

        let job = Box::new(move || write_best_effort(sink.as_ref(), &text));
        schedule_threadsafe(job, self.event_loop.as_deref())
    }

    /// Feed a whole response to the display, returning the number of chunks
    /// dispatched. Chunks that failed to decode are logged and skipped.
    pub async fn consume<S>(&self, stream: S) -> usize
    where
        S: Stream<Item = Result<StreamChunk>>,
    {
        self.reset();
        futures::pin_mut!(stream);

        let mut dispatched = 0;
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    self.on_token(&chunk);
                    dispatched += 1;
                }
                Err(e) => warn!(error = %e, "Skipping undecodable stream chunk"),
            }
        }
        dispatched
    }
}

impl std::fmt::Debug for TokenStreamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStreamer")
            .field("has_sink", &self.sink.is_some())
            .field("has_event_loop", &self.event_loop.is_some())
            .field("header", &self.header)
            .field("header_emitted", &self.header_emitted())
            .finish()
    }
}
