//! API Module
//!
//! Streaming chunk schema, SSE decoding and text extraction.

pub mod extract;
pub mod streaming;

pub use extract::{extract_streaming_content, StreamingContent, REASONING_HEADER, THINKING_HEADER};
pub use streaming::{
    parse_sse_line, sse_chunks, SseDecoder, StreamChoice, StreamChunk, StreamDelta, Usage,
    INVALID_CHOICE_INDEX,
};
