//! Scripted provider fakes for pipeline integration tests.
//!
//! The LLM fake routes on distinctive prompt markers so one instance can
//! serve all five call types; each route has a scriptable response queue and
//! a call counter. Search fakes return fixed results and record call times
//! for rate-limit assertions.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use colloquy_engine::{
    CompletionRequest, ImageHit, ImageSearch, LanguageModel, ProviderError, ProviderResult,
    SearchHit, SearchOptions, TextSearch,
};

/// A response queue with a fallback default and a call counter.
pub struct ScriptQueue {
    responses: Mutex<VecDeque<String>>,
    default: String,
    calls: AtomicUsize,
}

impl ScriptQueue {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default: default.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue one scripted response; consumed before the default applies.
    pub fn push(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(response.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

/// LLM fake that dispatches on prompt content.
pub struct RoutedLlm {
    pub topic: ScriptQueue,
    pub selection: ScriptQueue,
    pub query: ScriptQueue,
    pub verification: ScriptQueue,
    pub image_subject: ScriptQueue,
}

impl Default for RoutedLlm {
    fn default() -> Self {
        Self {
            topic: ScriptQueue::new(r#"{"topic": "General Discussion", "keywords": []}"#),
            selection: ScriptQueue::new(r#"{"selected_claims": []}"#),
            query: ScriptQueue::new("test search query"),
            verification: ScriptQueue::new(
                r#"{"verdict": "SUPPORTED", "confidence": 0.9, "explanation": "evidence agrees", "key_facts": []}"#,
            ),
            image_subject: ScriptQueue::new(r#"{"image_subject": "", "search_keywords": []}"#),
        }
    }
}

#[async_trait]
impl LanguageModel for RoutedLlm {
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<String> {
        let prompt = &request.prompt;
        let queue = if prompt.contains("EVIDENCE FROM WEB SEARCH") {
            &self.verification
        } else if prompt.contains("optimized web search query") {
            &self.query
        } else if prompt.contains("selected_claims") {
            &self.selection
        } else if prompt.contains("image_subject") {
            &self.image_subject
        } else if prompt.contains("primary topic") {
            &self.topic
        } else {
            return Err(ProviderError::Malformed(format!(
                "unroutable prompt in test: {}",
                prompt.chars().take(80).collect::<String>()
            )));
        };
        Ok(queue.next())
    }
}

/// Similarity stub that scores every pair with the same value.
pub struct ConstSimilarity(pub f32);

impl colloquy_engine::Similarity for ConstSimilarity {
    fn score(&self, a: &str, b: &str) -> f32 {
        if a == b {
            1.0
        } else {
            self.0
        }
    }
}

/// Text search fake with fixed hits and per-call timestamps.
pub struct StaticTextSearch {
    hits: Vec<SearchHit>,
    calls: AtomicUsize,
    call_times: Mutex<Vec<Instant>>,
}

impl StaticTextSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub fn wikipedia() -> Self {
        Self::new(vec![SearchHit {
            title: "Reference article".to_string(),
            snippet: "A relevant snippet of evidence.".to_string(),
            url: "https://en.wikipedia.org/wiki/Example".to_string(),
        }])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Times at which search calls were observed, in call order.
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextSearch for StaticTextSearch {
    async fn search(
        &self,
        _query: &str,
        _options: &SearchOptions,
    ) -> ProviderResult<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());
        Ok(self.hits.clone())
    }
}

/// Image search fake with a fixed result and an optional artificial delay.
pub struct StaticImageSearch {
    url: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticImageSearch {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSearch for StaticImageSearch {
    async fn search_images(
        &self,
        _query: &str,
        _options: &SearchOptions,
    ) -> ProviderResult<Vec<ImageHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .url
            .clone()
            .map(|image_url| {
                vec![ImageHit {
                    image_url,
                    title: None,
                    source_url: None,
                }]
            })
            .unwrap_or_default())
    }
}
