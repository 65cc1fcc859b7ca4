//! Mock collaborators for boundary tests. Each mock records its calls so
//! tests can follow MOCK → FUNCTION → OUTPUT: set up mocks, call one real
//! pipeline method, assert the output.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::detail::DetailFetcher;
use crate::feed::FeedFetcher;
use crate::format::NotificationPayload;
use crate::notify::{DeliveryStatus, NotifySink};
use crate::translate::Translator;
use crate::types::{FeedPost, PostDetail};

/// A feed post with enough translatable body text to reach delivery.
pub fn feed_post(id: &str) -> FeedPost {
    FeedPost {
        id: id.to_string(),
        url: format!("https://truthsocial.com/@realDonaldTrump/posts/{id}"),
        content: format!("Body of post {id} with plenty of words"),
        timestamp_text: "January 5, 2026 @ 3:41 PM ET".to_string(),
        media_urls: Vec::new(),
    }
}

// --- Feed ---

/// Serves a fixed snapshot on every fetch.
pub struct MockFeed {
    snapshot: Mutex<Vec<FeedPost>>,
}

impl MockFeed {
    pub fn new(snapshot: Vec<FeedPost>) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    pub fn set_snapshot(&self, snapshot: Vec<FeedPost>) {
        *self.snapshot.lock().unwrap() = snapshot;
    }
}

#[async_trait]
impl FeedFetcher for MockFeed {
    async fn fetch(&self) -> Vec<FeedPost> {
        self.snapshot.lock().unwrap().clone()
    }
}

// --- Detail ---

/// Returns the registered detail per URL, or the zero-value record —
/// matching the real enricher's degraded behavior.
#[derive(Default)]
pub struct MockDetail {
    by_url: HashMap<String, PostDetail>,
    calls: Mutex<Vec<String>>,
}

impl MockDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_url(mut self, url: &str, detail: PostDetail) -> Self {
        self.by_url.insert(url.to_string(), detail);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DetailFetcher for MockDetail {
    async fn enrich(&self, url: &str) -> PostDetail {
        self.calls.lock().unwrap().push(url.to_string());
        self.by_url.get(url).cloned().unwrap_or_default()
    }
}

// --- Translator ---

/// Prefixes input with "HU: " so tests can tell translated output apart,
/// or fails every call when built with `failing()`.
pub struct MockTranslator {
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(anyhow!("translation backend unavailable"));
        }
        Ok(format!("HU: {text}"))
    }
}

// --- Sink ---

/// Records every delivery attempt; statuses can be scripted per attempt,
/// defaulting to `Delivered` once the script runs out.
#[derive(Default)]
pub struct MockSink {
    deliveries: Mutex<Vec<NotificationPayload>>,
    script: Mutex<VecDeque<DeliveryStatus>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_status(self, status: DeliveryStatus) -> Self {
        self.script.lock().unwrap().push_back(status);
        self
    }

    pub fn deliveries(&self) -> Vec<NotificationPayload> {
        self.deliveries.lock().unwrap().clone()
    }

    /// Source post URL of each delivery attempt, pulled from the embed's
    /// source-link field.
    pub fn delivered_urls(&self) -> Vec<String> {
        self.deliveries()
            .iter()
            .filter_map(|p| {
                p.embeds[0]
                    .fields
                    .iter()
                    .find(|f| f.name.contains("Eredeti"))
                    .map(|f| {
                        f.value
                            .trim_end_matches(')')
                            .rsplit('(')
                            .next()
                            .unwrap_or_default()
                            .to_string()
                    })
            })
            .collect()
    }
}

#[async_trait]
impl NotifySink for MockSink {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<DeliveryStatus> {
        self.deliveries.lock().unwrap().push(payload.clone());
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DeliveryStatus::Delivered))
    }
}
