//! llm-stream-ui - token streaming display and settings choices
//!
//! Glue between an LLM streaming API and a terminal UI: streaming chunks are
//! reduced to reasoning and content text and handed to the display, and the
//! settings menu gets its provider and model lists from a catalog.
//!
//! ```no_run
//! use llm_stream_ui::{parse_sse_line, TextSink, TokenStreamer};
//! use std::sync::Arc;
//!
//! let sink: Arc<dyn TextSink> = Arc::new(|text: &str| -> anyhow::Result<()> {
//!     print!("{}", text);
//!     Ok(())
//! });
//! let streamer = TokenStreamer::new(Some(sink));
//!
//! streamer.reset();
//! let line = r#"data: {"choices":[{"index":0,"delta":{"content":"Hi"}}]}"#;
//! if let Ok(Some(chunk)) = parse_sse_line(line) {
//!     streamer.on_token(&chunk);
//! }
//! ```

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod options;

pub use api::{
    extract_streaming_content, parse_sse_line, sse_chunks, SseDecoder, StreamChoice,
    StreamChunk, StreamDelta, StreamingContent, REASONING_HEADER, THINKING_HEADER,
};
pub use config::{Catalog, CatalogLoader};
pub use dispatch::{
    schedule_threadsafe, EventLoop, Job, RunningGuard, TextSink, TokenStreamer, TokioEventLoop,
};
pub use error::{Error, Result};
pub use options::{
    is_subscription_provider, model_options, provider_options, subscription_model_options,
    OptionBuilder, SelectOption, CHATGPT_PROVIDER_ID, CHATGPT_PROVIDER_LABEL,
};

// =============================================================================
// Python Bindings
// =============================================================================

#[cfg(feature = "python")]
mod python {
    use crate::api::StreamChunk;
    use crate::dispatch::{TextSink, TokenStreamer};
    use crate::options;
    use pyo3::prelude::*;
    use pyo3::types::PyString;
    use std::sync::Arc;
    use tracing::warn;

    /// Python wrapper for the token streamer
    #[pyclass(name = "TokenStreamer")]
    struct PyTokenStreamer {
        inner: TokenStreamer,
    }

    #[pymethods]
    impl PyTokenStreamer {
        /// Create a streamer writing through an optional Python callable
        #[new]
        #[pyo3(signature = (write_callback=None, header=None))]
        fn new(write_callback: Option<Py<PyAny>>, header: Option<String>) -> Self {
            let sink = write_callback.map(|callback| {
                let sink = move |text: &str| -> anyhow::Result<()> {
                    Python::attach(|py| callback.call1(py, (text,)))?;
                    Ok(())
                };
                Arc::new(sink) as Arc<dyn TextSink>
            });

            let mut inner = TokenStreamer::new(sink);
            if let Some(header) = header {
                inner = inner.with_header(header);
            }
            Self { inner }
        }

        /// Reset state for a new streaming response
        fn reset(&self) {
            self.inner.reset();
        }

        /// Handle one chunk given as a dict or a JSON string
        fn on_token(&self, py: Python<'_>, chunk: &Bound<'_, PyAny>) {
            match chunk_from_python(py, chunk) {
                Ok(chunk) => self.inner.on_token(&chunk),
                Err(e) => warn!(error = %e, "Ignoring chunk that could not be read"),
            }
        }

        #[getter]
        fn header_emitted(&self) -> bool {
            self.inner.header_emitted()
        }
    }

    /// Convert a Python chunk (dict or JSON text) to a StreamChunk
    fn chunk_from_python(py: Python<'_>, chunk: &Bound<'_, PyAny>) -> PyResult<StreamChunk> {
        let json: String = if chunk.is_instance_of::<PyString>() {
            chunk.extract()?
        } else {
            py.import("json")?
                .call_method1("dumps", (chunk,))?
                .extract()?
        };

        serde_json::from_str(&json).map_err(|e| crate::error::Error::from(e).into())
    }

    /// List provider options as (label, id) pairs
    #[pyfunction]
    fn provider_options() -> Vec<(String, String)> {
        options::provider_options()
            .iter()
            .cloned()
            .map(Into::into)
            .collect()
    }

    /// List model options for a provider as (label, id) pairs
    #[pyfunction]
    fn model_options(provider: &str) -> Vec<(String, String)> {
        options::model_options(provider)
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// List the ChatGPT subscription models as (label, id) pairs
    #[pyfunction]
    fn chatgpt_model_options() -> Vec<(String, String)> {
        options::subscription_model_options()
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Check if the given provider is the ChatGPT subscription provider
    #[pyfunction]
    #[pyo3(signature = (provider=None))]
    fn is_chatgpt_provider(provider: Option<&str>) -> bool {
        options::is_subscription_provider(provider)
    }

    /// Python module definition
    #[pymodule]
    fn llm_stream_ui(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        crate::logging::init_tracing();

        m.add_class::<PyTokenStreamer>()?;
        m.add_function(wrap_pyfunction!(provider_options, m)?)?;
        m.add_function(wrap_pyfunction!(model_options, m)?)?;
        m.add_function(wrap_pyfunction!(chatgpt_model_options, m)?)?;
        m.add_function(wrap_pyfunction!(is_chatgpt_provider, m)?)?;
        m.add("CHATGPT_PROVIDER_ID", options::CHATGPT_PROVIDER_ID)?;
        m.add("CHATGPT_PROVIDER_LABEL", options::CHATGPT_PROVIDER_LABEL)?;
        m.add("__version__", env!("CARGO_PKG_VERSION"))?;
        Ok(())
    }
}
