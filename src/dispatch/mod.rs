//! Dispatch Module
//!
//! Delivery of streamed text to the display: the token streamer, the
//! best-effort sink and the host event loop seam.

pub mod event_loop;
pub mod sink;
pub mod streamer;

pub use event_loop::{schedule_threadsafe, EventLoop, Job, RunningGuard, TokioEventLoop};
pub use sink::{write_best_effort, TextSink};
pub use streamer::TokenStreamer;
