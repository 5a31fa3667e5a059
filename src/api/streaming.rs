//! Streaming Chunk Schema
//!
//! Wire types for OpenAI-compatible `chat.completion.chunk` payloads and
//! Server-Sent Events (SSE) decoding into them.
//!
//! Decoding is tolerant: missing metadata is absent, a text field carrying a
//! non-string value is treated as absent rather than failing the chunk.

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Deserializer, Serialize};

/// A streaming chunk from the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Chunk ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Object type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,

    /// Model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Choices with deltas
    #[serde(default)]
    pub choices: Vec<StreamChoice>,

    /// Usage info (only in final chunk for some providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A choice in a streaming chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChoice {
    /// Choice index; providers that only ever stream one choice may omit it.
    /// A value that is not an integer decodes as [`INVALID_CHOICE_INDEX`].
    #[serde(
        default,
        deserialize_with = "lenient_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub index: Option<i64>,

    /// The delta (partial message)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<StreamDelta>,

    /// Finish reason (set in final chunk)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_reason: Option<String>,
}

/// Index given to a choice whose `index` is present but not an integer
pub const INVALID_CHOICE_INDEX: i64 = -1;

impl StreamChoice {
    /// Index of this choice, a missing index counting as the primary choice
    pub fn index_or_default(&self) -> i64 {
        self.index.unwrap_or(0)
    }
}

/// Delta content in a streaming chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDelta {
    /// Role (usually only in first chunk)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,

    /// Content delta
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<String>,

    /// Reasoning (chain-of-thought) delta
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reasoning_content: Option<String>,

    /// Tool calls delta, kept opaque since only text is displayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_index<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => Some(
            n.as_i64()
                .or_else(|| n.as_u64().map(|_| i64::MAX))
                .unwrap_or(INVALID_CHOICE_INDEX),
        ),
        Some(_) => Some(INVALID_CHOICE_INDEX),
    })
}

/// Parse SSE data line into a StreamChunk
pub fn parse_sse_line(line: &str) -> Result<Option<StreamChunk>> {
    // Skip empty lines and comments
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(None);
    }

    // Ignore other event fields (event:, id:, retry:)
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();

    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| {
        Error::Stream(format!("Failed to parse SSE chunk: {}. Data: {}", e, data))
    })?;

    Ok(Some(chunk))
}

/// Incremental SSE decoder
///
/// Network reads split lines anywhere, including inside a multi-byte UTF-8
/// sequence, so bytes are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every chunk completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk>> {
        self.buffer.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(parsed) = Self::decode_line(&line) {
                chunks.push(parsed);
            }
        }
        chunks
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Option<Result<StreamChunk>> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        Self::decode_line(&line)
    }

    fn decode_line(line: &[u8]) -> Option<Result<StreamChunk>> {
        let text = String::from_utf8_lossy(line);
        parse_sse_line(&text).transpose()
    }
}

/// Adapt a byte stream (e.g. an HTTP response body) into a stream of chunks
pub fn sse_chunks<S, E>(bytes: S) -> impl Stream<Item = Result<StreamChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: std::fmt::Display,
{
    async_stream::stream! {
        let mut decoder = SseDecoder::new();
        futures::pin_mut!(bytes);

        while let Some(item) = bytes.next().await {
            match item {
                Ok(data) => {
                    for chunk in decoder.push(&data) {
                        yield chunk;
                    }
                }
                Err(e) => {
                    yield Err(Error::Stream(format!("Byte stream failed: {}", e)));
                    return;
                }
            }
        }

        if let Some(chunk) = decoder.finish() {
            yield chunk;
        }
    }
}
