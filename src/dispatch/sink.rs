//! Best-effort text sink
//!
//! A sink is whatever renders streamed text. Failures inside it are the
//! display's problem, not the stream's, so they are logged and dropped here.

use tracing::warn;

/// Destination for streamed text
pub trait TextSink: Send + Sync {
    fn write(&self, text: &str) -> anyhow::Result<()>;
}

impl<F> TextSink for F
where
    F: Fn(&str) -> anyhow::Result<()> + Send + Sync,
{
    fn write(&self, text: &str) -> anyhow::Result<()> {
        self(text)
    }
}

/// Write to the sink, logging and discarding any failure
pub fn write_best_effort(sink: &dyn TextSink, text: &str) {
    if let Err(e) = sink.write(text) {
        warn!(error = %e, len = text.len(), "Failed to write streamed text to display");
    }
}
