//! Chunk Extraction
//!
//! Pulls the displayable reasoning and content fragments out of one
//! streaming chunk.

use crate::api::streaming::StreamChunk;

/// Header used for reasoning in both streaming and non-streaming render paths
pub const REASONING_HEADER: &str = "**Reasoning**:\n";

/// Header the TUI prints ahead of the first reasoning fragment of a response
pub const THINKING_HEADER: &str = "💭 Thinking:\n";

/// Extracted content from a streaming chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamingContent {
    pub reasoning: Option<String>,
    pub content: Option<String>,
}

impl StreamingContent {
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_none() && self.content.is_none()
    }
}

/// Extract reasoning and content from a streaming chunk.
///
/// Only the primary choice (index 0) is considered; other choices would
/// interleave their text with it. Whitespace-only reasoning and empty content
/// count as absent.
pub fn extract_streaming_content(chunk: &StreamChunk) -> StreamingContent {
    let Some(delta) = chunk
        .choices
        .iter()
        .filter(|choice| choice.index_or_default() == 0)
        .find_map(|choice| choice.delta.as_ref())
    else {
        return StreamingContent::default();
    };

    StreamingContent {
        reasoning: delta
            .reasoning_content
            .as_ref()
            .filter(|text| !text.trim().is_empty())
            .cloned(),
        content: delta
            .content
            .as_ref()
            .filter(|text| !text.is_empty())
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::streaming::{StreamChoice, StreamDelta};

    fn choice(index: Option<i64>, reasoning: Option<&str>, content: Option<&str>) -> StreamChoice {
        StreamChoice {
            index,
            delta: Some(StreamDelta {
                reasoning_content: reasoning.map(str::to_string),
                content: content.map(str::to_string),
                ..Default::default()
            }),
            finish_reason: None,
        }
    }

    fn chunk(choices: Vec<StreamChoice>) -> StreamChunk {
        StreamChunk {
            choices,
            ..Default::default()
        }
    }

    #[test]
    fn test_whitespace_reasoning_and_empty_content_are_absent() {
        let result = extract_streaming_content(&chunk(vec![choice(Some(0), Some("  "), Some(""))]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_reasoning_keeps_surrounding_whitespace() {
        let result = extract_streaming_content(&chunk(vec![choice(Some(0), Some(" step 1\n"), None)]));
        assert_eq!(result.reasoning.as_deref(), Some(" step 1\n"));
        assert_eq!(result.content, None);
    }

    #[test]
    fn test_content_whitespace_is_kept() {
        let result = extract_streaming_content(&chunk(vec![choice(Some(0), None, Some(" "))]));
        assert_eq!(result.content.as_deref(), Some(" "));
    }

    #[test]
    fn test_only_primary_choice_regardless_of_order() {
        let first_is_secondary = chunk(vec![
            choice(Some(1), Some("other thoughts"), Some("other")),
            choice(Some(0), Some("thoughts"), Some("main")),
        ]);
        let first_is_primary = chunk(vec![
            choice(Some(0), Some("thoughts"), Some("main")),
            choice(Some(1), Some("other thoughts"), Some("other")),
        ]);

        for c in [first_is_secondary, first_is_primary] {
            let result = extract_streaming_content(&c);
            assert_eq!(result.reasoning.as_deref(), Some("thoughts"));
            assert_eq!(result.content.as_deref(), Some("main"));
        }
    }

    #[test]
    fn test_missing_index_is_primary() {
        let result = extract_streaming_content(&chunk(vec![choice(None, None, Some("hi"))]));
        assert_eq!(result.content.as_deref(), Some("hi"));
    }

    #[test]
    fn test_malformed_index_is_not_primary() {
        for index in ["-1", "1.5", "4294967296"] {
            let json = format!(
                r#"{{"choices":[{{"index":{},"delta":{{"content":"from secondary"}}}}]}}"#,
                index
            );
            let chunk: StreamChunk = serde_json::from_str(&json).unwrap();
            assert!(extract_streaming_content(&chunk).is_empty(), "index {}", index);
        }
    }

    #[test]
    fn test_primary_without_delta_falls_through() {
        let no_delta = StreamChoice {
            index: Some(0),
            delta: None,
            finish_reason: Some("stop".to_string()),
        };
        let result = extract_streaming_content(&chunk(vec![no_delta, choice(Some(0), None, Some("late"))]));
        assert_eq!(result.content.as_deref(), Some("late"));
    }

    #[test]
    fn test_no_primary_choice() {
        assert!(extract_streaming_content(&chunk(vec![])).is_empty());
        assert!(extract_streaming_content(&chunk(vec![choice(Some(2), Some("x"), Some("y"))])).is_empty());
    }

    #[test]
    fn test_first_primary_delta_wins_even_if_empty() {
        let result = extract_streaming_content(&chunk(vec![
            choice(Some(0), None, None),
            choice(Some(0), None, Some("second")),
        ]));
        assert!(result.is_empty());
    }
}
