//! Mock summarizer and recording logger for testing
//!
//! This module provides a mock implementation of the `Summarizer` trait that can
//! be configured to return predefined responses or errors without making real API
//! calls, and a `Logger` that keeps every message for later assertions.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tracing::Level;

use super::{Provider, ProviderError, Summarizer, SummaryRequest};
use crate::logging::Logger;

#[derive(Debug, Default)]
struct MockState {
    /// Map of text substrings to responses
    responses: HashMap<String, String>,
    /// Responses handed out one per call before falling back to the others
    sequence: Mutex<VecDeque<String>>,
    /// Default response if no specific match found
    default_response: Option<String>,
    /// If true, always return an error
    should_fail: bool,
    /// Simulated latency of every call
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<SummaryRequest>>,
}

/// Mock summarizer for testing
///
/// Clones share their configuration and counters, so a test can keep one handle
/// while the gateway owns another.
#[derive(Debug, Clone, Default)]
pub struct MockSummarizer {
    state: Arc<MockState>,
}

impl MockSummarizer {
    /// Create a new mock with no configured response (every call errors).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers `response` whenever the request text contains `text_contains`.
    pub fn with_responses(responses: Vec<(&str, &str)>) -> Self {
        Self::from_state(MockState {
            responses: responses
                .into_iter()
                .map(|(text, response)| (text.to_string(), response.to_string()))
                .collect(),
            ..Default::default()
        })
    }

    /// Create a mock with a default response for any request.
    pub fn with_default(response: &str) -> Self {
        Self::from_state(MockState {
            default_response: Some(response.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock that answers with each entry in turn, then with the last one.
    pub fn with_sequence(responses: Vec<&str>) -> Self {
        Self::from_state(MockState {
            default_response: responses.last().map(|r| r.to_string()),
            sequence: Mutex::new(responses.into_iter().map(String::from).collect()),
            ..Default::default()
        })
    }

    /// Create a mock that always fails with an error.
    pub fn with_failure() -> Self {
        Self::from_state(MockState {
            should_fail: true,
            ..Default::default()
        })
    }

    /// Make every call take `delay` before answering. Only valid before the mock is shared.
    pub fn with_delay(self, delay: Duration) -> Self {
        match Arc::try_unwrap(self.state) {
            Ok(mut state) => {
                state.delay = delay;
                Self::from_state(state)
            }
            Err(state) => Self { state },
        }
    }

    fn from_state(state: MockState) -> Self {
        Self { state: Arc::new(state) }
    }

    /// Number of `summarize` calls so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    /// Every request received, in arrival order.
    pub fn requests(&self) -> Vec<SummaryRequest> {
        self.state.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn respond(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let state = &self.state;
        if state.should_fail {
            return Err(ProviderError::EmptyResponse(Provider::Ollama));
        }
        if let Some(next) = state.sequence.lock().ok().and_then(|mut s| s.pop_front()) {
            return Ok(next);
        }
        for (key, response) in &state.responses {
            if request.text.contains(key) {
                return Ok(response.clone());
            }
        }
        state
            .default_response
            .clone()
            .ok_or(ProviderError::EmptyResponse(Provider::Ollama))
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let state = &self.state;
        state.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = state.requests.lock() {
            requests.push(request.clone());
        }

        let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !state.delay.is_zero() {
            tokio::time::sleep(state.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        state.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.respond(request)
    }
}

/// Keeps every log line in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of messages logged at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.entries().iter().filter(|(l, _)| *l == level).count()
    }

    /// True if a message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

/// A local HTTP server that answers every request with `200 OK` and a fixed JSON body.
///
/// Lets the real HTTP backends run end to end without leaving the machine.
pub struct JsonStub {
    url: String,
    hits: Arc<AtomicUsize>,
}

impl JsonStub {
    /// Binds an ephemeral port on 127.0.0.1 and starts serving in the background.
    pub async fn spawn(body: &'static str) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    if read_request(&mut socket).await.is_err() {
                        return;
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Ok(Self { url, hits })
    }

    /// Base URL, `http://127.0.0.1:<port>`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests answered so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Reads one request: headers, then `Content-Length` bytes of body.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return Ok(());
            }
        }
    }
}

//
// Test Fixtures
//

/// A rendered page with every field the extractor looks at.
pub fn sample_page_html() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Getting Started</title>
    <meta name="description" content="How to install and run the project.">
</head>
<body>
    <h1>Getting Started</h1>
    <h2>Install</h2>
    <p>Run the installer.</p>
    <h3>Requirements</h3>
    <p>A recent toolchain.</p>
</body>
</html>
"#
}

/// A page with sub-headings and paragraphs but no title or h1.
pub fn sample_untitled_html() -> &'static str {
    r#"<html><body><h2>Changelog</h2><p>Fixed things.</p></body></html>"#
}

/// Minimal valid HTML with nothing to extract.
pub fn sample_empty_html() -> &'static str {
    r#"<!DOCTYPE html>
<html>
<head></head>
<body></body>
</html>
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> SummaryRequest {
        SummaryRequest::new("ollama", "", "", "prompt", text)
    }

    #[tokio::test]
    async fn test_mock_with_default_response() {
        let mock = MockSummarizer::with_default("test response");
        assert_eq!(mock.summarize(&request("any")).await.unwrap(), "test response");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_with_multiple_responses() {
        let mock = MockSummarizer::with_responses(vec![("blog", "blog summary"), ("docs", "docs summary")]);
        assert_eq!(mock.summarize(&request("a blog post")).await.unwrap(), "blog summary");
        assert_eq!(mock.summarize(&request("the docs")).await.unwrap(), "docs summary");
        assert!(mock.summarize(&request("other")).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_sequence_then_last() {
        let mock = MockSummarizer::with_sequence(vec!["", "b"]);
        assert_eq!(mock.summarize(&request("x")).await.unwrap(), "");
        assert_eq!(mock.summarize(&request("x")).await.unwrap(), "b");
        assert_eq!(mock.summarize(&request("x")).await.unwrap(), "b");
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let mock = MockSummarizer::with_failure();
        assert!(mock.summarize(&request("x")).await.is_err());
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_recording_logger() {
        let logger = RecordingLogger::new();
        logger.warn("careful");
        logger.error("broken");
        assert!(logger.contains(Level::WARN, "care"));
        assert!(!logger.contains(Level::ERROR, "care"));
        assert_eq!(logger.count(Level::ERROR), 1);
        assert_eq!(logger.entries().len(), 2);
    }
}
